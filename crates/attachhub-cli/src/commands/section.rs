//! Storage section commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use attachhub_core::config::AppConfig;
use attachhub_core::result::AppResult;
use attachhub_core::types::id::SectionId;
use attachhub_entity::section::Section;

use crate::output::{self, OutputFormat};

/// Arguments for section commands
#[derive(Debug, Args)]
pub struct SectionArgs {
    /// Section subcommand
    #[command(subcommand)]
    pub command: SectionCommand,
}

/// Section subcommands
#[derive(Debug, Subcommand)]
pub enum SectionCommand {
    /// List all sections
    List,
    /// Create a new section
    Create {
        /// Section name
        #[arg(short, long)]
        name: String,
        /// Parent section ID (omit for the root)
        #[arg(short, long)]
        parent_id: Option<i64>,
    },
}

/// Section display row
#[derive(Debug, Serialize, Tabled)]
struct SectionRow {
    /// Section ID
    id: i64,
    /// Name
    name: String,
    /// Path
    path: String,
    /// Parent
    parent_id: String,
    /// Created at
    created_at: String,
}

impl From<&Section> for SectionRow {
    fn from(s: &Section) -> Self {
        Self {
            id: s.id.get(),
            name: s.name.clone(),
            path: s.path.clone(),
            parent_id: output::or_dash(s.parent_id),
            created_at: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute section commands
pub async fn execute(args: &SectionArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let services = super::services(config).await?;

    match &args.command {
        SectionCommand::List => {
            services.sections.root().await?;
            let rows: Vec<SectionRow> = services
                .sections
                .list()
                .await?
                .iter()
                .map(SectionRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        SectionCommand::Create { name, parent_id } => {
            let section = services
                .sections
                .create(name, parent_id.map(SectionId::new))
                .await?;
            output::print_item(&SectionRow::from(&section), format);
        }
    }

    Ok(())
}
