//! Implementation of the `cadence user` commands.
//!
//! User creation and token issuance are administrative; the REST surface
//! only consumes the records these commands produce.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::adapters::sqlite::{initialize_database, SqliteUserRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Role, User};
use crate::domain::ports::UserRepository;
use crate::infrastructure::config::ConfigLoader;

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// Display name
        name: String,

        /// Unique email address
        #[arg(short, long)]
        email: String,

        /// Role: leader or ic
        #[arg(short, long)]
        role: String,
    },

    /// Issue a fresh API token for a user
    Token {
        /// Email of the user
        email: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct UserOutput {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CommandOutput for UserOutput {
    fn to_human(&self) -> String {
        match &self.token {
            Some(token) => format!("Token for {} ({}): {}", self.name, self.email, token),
            None => format!(
                "Created {} <{}> as {} ({})",
                self.name, self.email, self.role, self.id
            ),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(command: UserCommands, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = initialize_database(&format!("sqlite:{}", config.database.path))
        .await
        .context("Failed to open database")?;
    let users = SqliteUserRepository::new(pool);

    match command {
        UserCommands::Add { name, email, role } => {
            let role = Role::from_str(&role)
                .ok_or_else(|| anyhow!("Invalid role '{role}', expected leader or ic"))?;
            let user = User::new(name, email, role);
            user.validate().map_err(|e| anyhow!(e))?;
            users.create(&user).await?;

            output(
                &UserOutput {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    role: user.role.as_str().to_string(),
                    token: None,
                },
                json_mode,
            );
        }
        UserCommands::Token { email } => {
            let user = users
                .get_by_email(&email)
                .await?
                .ok_or_else(|| anyhow!("No user with email {email}"))?;
            let token = Uuid::new_v4().simple().to_string();
            users.set_token(user.id, &token).await?;

            output(
                &UserOutput {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    role: user.role.as_str().to_string(),
                    token: Some(token),
                },
                json_mode,
            );
        }
    }
    Ok(())
}
