//! Content record commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use attachhub_core::config::AppConfig;
use attachhub_core::result::AppResult;
use attachhub_core::traits::attachment::HasAttachment;
use attachhub_core::types::id::RecordId;
use attachhub_entity::content::{ContentChanges, ContentType, NewContent};
use attachhub_service::Services;

use crate::output::{self, OutputFormat};

/// Arguments for record commands
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Record subcommand
    #[command(subcommand)]
    pub command: RecordCommand,
}

/// Record subcommands
#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List records of a type
    List {
        /// Content type
        #[arg(short = 't', long = "type", value_parser = super::parse_content_type)]
        content_type: ContentType,
    },
    /// Create a record, optionally with an attachment
    Create {
        /// Content type
        #[arg(short = 't', long = "type", value_parser = super::parse_content_type)]
        content_type: ContentType,
        /// Record name
        #[arg(short, long)]
        name: String,
        /// Section to file the attachment under
        #[arg(long)]
        section: Option<i64>,
        /// Local file to attach
        #[arg(long)]
        file: Option<PathBuf>,
        /// Attachment path (defaults to the file name)
        #[arg(long)]
        path: Option<String>,
    },
    /// Update a record and its attachment
    Update {
        /// Content type
        #[arg(short = 't', long = "type", value_parser = super::parse_content_type)]
        content_type: ContentType,
        /// Record ID
        #[arg(long)]
        id: i64,
        /// New record name
        #[arg(short, long)]
        name: Option<String>,
        /// Move the attachment to this section
        #[arg(long)]
        section: Option<i64>,
        /// Replace the attachment content with this local file
        #[arg(long)]
        file: Option<PathBuf>,
        /// New attachment path
        #[arg(long)]
        path: Option<String>,
    },
    /// Show a record, or one of its versions
    Show {
        /// Content type
        #[arg(short = 't', long = "type", value_parser = super::parse_content_type)]
        content_type: ContentType,
        /// Record ID
        #[arg(long)]
        id: i64,
        /// Record version (versioned types only)
        #[arg(short, long)]
        version: Option<i32>,
    },
    /// List the saved versions of a record
    Versions {
        /// Content type
        #[arg(short = 't', long = "type", value_parser = super::parse_content_type)]
        content_type: ContentType,
        /// Record ID
        #[arg(long)]
        id: i64,
    },
}

/// Record display row
#[derive(Debug, Serialize, Tabled)]
struct RecordRow {
    /// Record ID
    id: i64,
    /// Name
    name: String,
    /// Record version
    version: i32,
    /// Attachment ID
    attachment_id: String,
    /// Pinned attachment version
    attachment_version: String,
    /// Attachment path as the record sees it
    file_path: String,
    /// Updated at
    updated_at: String,
}

impl RecordRow {
    async fn build<R>(
        services: &Services,
        record: &R,
        id: RecordId,
        name: &str,
        version: i32,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<Self>
    where
        R: HasAttachment + Sync,
    {
        Ok(Self {
            id: id.get(),
            name: name.to_string(),
            version,
            attachment_id: output::or_dash(record.attachment_id()),
            attachment_version: output::or_dash(record.attachment_version()),
            file_path: output::or_dash(services.content.attachment_file_path(record).await?),
            updated_at: updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
    }
}

/// Execute record commands
pub async fn execute(args: &RecordArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let services = super::services(config).await?;

    match &args.command {
        RecordCommand::List { content_type } => {
            let mut rows = Vec::new();
            for r in services.content.list(*content_type).await? {
                rows.push(RecordRow::build(&services, &r, r.id, &r.name, r.version, r.updated_at).await?);
            }
            output::print_list(&rows, format);
        }
        RecordCommand::Create {
            content_type,
            name,
            section,
            file,
            path,
        } => {
            let params = super::attachment_params(*section, file.as_deref(), path.as_deref()).await?;
            let r = services
                .content
                .create(*content_type, NewContent::named(name).with_attachment(params))
                .await?;
            let row = RecordRow::build(&services, &r, r.id, &r.name, r.version, r.updated_at).await?;
            output::print_item(&row, format);
        }
        RecordCommand::Update {
            content_type,
            id,
            name,
            section,
            file,
            path,
        } => {
            let changes = ContentChanges {
                name: name.clone(),
                attachment: super::attachment_params(*section, file.as_deref(), path.as_deref())
                    .await?,
            };
            let r = services
                .content
                .update(*content_type, RecordId::new(*id), changes)
                .await?;
            let row = RecordRow::build(&services, &r, r.id, &r.name, r.version, r.updated_at).await?;
            output::print_item(&row, format);
        }
        RecordCommand::Show {
            content_type,
            id,
            version,
        } => {
            let id = RecordId::new(*id);
            let row = match version {
                Some(n) => {
                    let v = services
                        .record_versions
                        .as_of_version(*content_type, id, *n)
                        .await?;
                    RecordRow::build(&services, &v, v.record_id, &v.name, v.version, v.updated_at)
                        .await?
                }
                None => {
                    let r = services.content.find(*content_type, id).await?;
                    RecordRow::build(&services, &r, r.id, &r.name, r.version, r.updated_at).await?
                }
            };
            output::print_item(&row, format);
        }
        RecordCommand::Versions { content_type, id } => {
            let mut rows = Vec::new();
            for v in services
                .record_versions
                .versions(*content_type, RecordId::new(*id))
                .await?
            {
                rows.push(
                    RecordRow::build(&services, &v, v.record_id, &v.name, v.version, v.updated_at)
                        .await?,
                );
            }
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
