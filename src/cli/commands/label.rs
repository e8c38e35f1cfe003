//! Implementation of the `cadence label` commands.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::adapters::sqlite::{initialize_database, SqliteLabelRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Label;
use crate::domain::ports::LabelRepository;
use crate::infrastructure::config::ConfigLoader;

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    /// Create a shared label
    Add {
        /// Label name
        name: String,

        /// Hex color, e.g. #3b82f6
        #[arg(short, long, default_value = "#64748b")]
        color: String,
    },

    /// List all labels
    List,
}

#[derive(Debug, serde::Serialize)]
pub struct LabelOutput {
    pub labels: Vec<LabelLine>,
}

#[derive(Debug, serde::Serialize)]
pub struct LabelLine {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl CommandOutput for LabelOutput {
    fn to_human(&self) -> String {
        self.labels
            .iter()
            .map(|l| format!("{}  {}  {}", l.id, l.color, l.name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(command: LabelCommands, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = initialize_database(&format!("sqlite:{}", config.database.path))
        .await
        .context("Failed to open database")?;
    let labels = SqliteLabelRepository::new(pool);

    match command {
        LabelCommands::Add { name, color } => {
            let label = Label::new(name, color);
            label.validate().map_err(|e| anyhow!(e))?;
            labels.create(&label).await?;

            output(
                &LabelOutput {
                    labels: vec![LabelLine {
                        id: label.id,
                        name: label.name,
                        color: label.color,
                    }],
                },
                json_mode,
            );
        }
        LabelCommands::List => {
            let all = labels.list().await?;
            output(
                &LabelOutput {
                    labels: all
                        .into_iter()
                        .map(|l| LabelLine {
                            id: l.id,
                            name: l.name,
                            color: l.color,
                        })
                        .collect(),
                },
                json_mode,
            );
        }
    }
    Ok(())
}
