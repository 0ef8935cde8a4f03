//! CLI command definitions and dispatch.

pub mod attachment;
pub mod migrate;
pub mod record;
pub mod section;

use std::path::Path;

use clap::{Parser, Subcommand};

use attachhub_core::config::AppConfig;
use attachhub_core::error::AppError;
use attachhub_core::result::AppResult;
use attachhub_core::types::id::SectionId;
use attachhub_entity::attachment::{AttachmentParams, FileUpload};
use attachhub_entity::content::ContentType;
use attachhub_service::Services;

use crate::output::OutputFormat;

/// AttachHub: versioned file attachments for content records
#[derive(Debug, Parser)]
#[command(name = "attachhub", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded next to the base file
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Storage section management
    Section(section::SectionArgs),
    /// Content record management
    Record(record::RecordArgs),
    /// Attachment inspection
    Attachment(attachment::AttachmentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Section(args) => section::execute(args, config, self.format).await,
            Commands::Record(args) => record::execute(args, config, self.format).await,
            Commands::Attachment(args) => attachment::execute(args, config, self.format).await,
        }
    }
}

/// Helper: connect, migrate, and wire the services
pub async fn services(config: &AppConfig) -> AppResult<Services> {
    Services::bootstrap(config).await
}

/// Parse a content type by name, e.g. `attachable` or `HtmlBlock`.
pub fn parse_content_type(s: &str) -> Result<ContentType, String> {
    ContentType::by_name(s).ok_or_else(|| {
        let known: Vec<&str> = ContentType::ALL.iter().map(|ct| ct.name).collect();
        format!("unknown content type '{s}' (expected one of: {})", known.join(", "))
    })
}

/// Read a local file into an upload.
pub async fn read_upload(path: &Path) -> AppResult<FileUpload> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("Not a file path: {}", path.display())))?
        .to_string();
    let data = tokio::fs::read(path).await?;
    Ok(FileUpload::new(name, None, data))
}

/// Build attachment fields from command-line flags.
pub async fn attachment_params(
    section: Option<i64>,
    file: Option<&Path>,
    path: Option<&str>,
) -> AppResult<AttachmentParams> {
    let mut params = AttachmentParams::default();
    if let Some(id) = section {
        params = params.section(SectionId::new(id));
    }
    if let Some(file) = file {
        params = params.file(read_upload(file).await?);
    }
    if let Some(path) = path {
        params = params.path(path);
    }
    Ok(params)
}
