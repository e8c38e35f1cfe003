//! Implementation of the `cadence pair` command.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use uuid::Uuid;

use crate::adapters::sqlite::{
    initialize_database, SqliteRelationshipRepository, SqliteUserRepository,
};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Relationship, Role};
use crate::domain::ports::{RelationshipRepository, UserRepository};
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct PairArgs {
    /// Email of the leader
    pub leader: String,

    /// Email of the IC
    pub ic: String,
}

#[derive(Debug, serde::Serialize)]
pub struct PairOutput {
    pub id: Uuid,
    pub leader: String,
    pub ic: String,
}

impl CommandOutput for PairOutput {
    fn to_human(&self) -> String {
        format!("Paired {} with {} ({})", self.leader, self.ic, self.id)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: PairArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = initialize_database(&format!("sqlite:{}", config.database.path))
        .await
        .context("Failed to open database")?;
    let users = SqliteUserRepository::new(pool.clone());
    let relationships = SqliteRelationshipRepository::new(pool);

    let leader = users
        .get_by_email(&args.leader)
        .await?
        .ok_or_else(|| anyhow!("No user with email {}", args.leader))?;
    let ic = users
        .get_by_email(&args.ic)
        .await?
        .ok_or_else(|| anyhow!("No user with email {}", args.ic))?;

    if leader.role != Role::Leader {
        return Err(anyhow!("{} is not a leader", leader.email));
    }
    if ic.role != Role::Ic {
        return Err(anyhow!("{} is not an IC", ic.email));
    }
    if relationships.get_pair(leader.id, ic.id).await?.is_some() {
        return Err(anyhow!("{} and {} are already paired", leader.email, ic.email));
    }

    let relationship = Relationship::new(leader.id, ic.id);
    relationships.create(&relationship).await?;

    output(
        &PairOutput {
            id: relationship.id,
            leader: leader.email,
            ic: ic.email,
        },
        json_mode,
    );
    Ok(())
}
