//! Attachment inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use attachhub_core::config::AppConfig;
use attachhub_core::result::AppResult;
use attachhub_core::traits::storage::ByteStream;
use attachhub_core::types::id::AttachmentId;
use attachhub_entity::attachment::AttachmentVersion;
use attachhub_storage::display_file_path;

use crate::output::{self, OutputFormat};

/// Arguments for attachment commands
#[derive(Debug, Args)]
pub struct AttachmentArgs {
    /// Attachment subcommand
    #[command(subcommand)]
    pub command: AttachmentCommand,
}

/// Attachment subcommands
#[derive(Debug, Subcommand)]
pub enum AttachmentCommand {
    /// List every version of an attachment
    Versions {
        /// Attachment ID
        #[arg(long)]
        id: i64,
    },
    /// Write attachment content to stdout
    Cat {
        /// Attachment ID
        #[arg(long)]
        id: i64,
        /// Version to read (defaults to the current one)
        #[arg(short, long)]
        version: Option<i32>,
    },
}

/// Attachment version display row
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version
    version: i32,
    /// Section ID
    section_id: i64,
    /// Path
    file_path: String,
    /// Original file name
    file_name: String,
    /// MIME type
    file_type: String,
    /// Size in bytes
    file_size: i64,
    /// Storage key
    file_location: String,
    /// Created at
    created_at: String,
}

impl From<&AttachmentVersion> for VersionRow {
    fn from(v: &AttachmentVersion) -> Self {
        Self {
            version: v.version,
            section_id: v.section_id.get(),
            file_path: display_file_path(&v.file_path),
            file_name: v.file_name.clone(),
            file_type: output::or_dash(v.file_type.as_deref()),
            file_size: v.file_size,
            file_location: v.file_location.clone(),
            created_at: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute attachment commands
pub async fn execute(
    args: &AttachmentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let services = super::services(config).await?;

    match &args.command {
        AttachmentCommand::Versions { id } => {
            let rows: Vec<VersionRow> = services
                .attachments
                .versions(AttachmentId::new(*id))
                .await?
                .iter()
                .map(VersionRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        AttachmentCommand::Cat { id, version } => {
            let id = AttachmentId::new(*id);
            let stream = match version {
                Some(n) => {
                    let v = services.attachments.version_at(id, *n).await?;
                    services.attachments.open_content(&v).await?
                }
                None => {
                    let current = services.attachments.find(id).await?;
                    services.attachments.open_content(&current).await?
                }
            };

            copy_stream(stream, &mut tokio::io::stdout()).await?;
        }
    }

    Ok(())
}

/// Write every chunk of `stream` to `out`. Returns the number of bytes
/// written.
async fn copy_stream<W>(mut stream: ByteStream, out: &mut W) -> AppResult<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_copy_stream_writes_every_chunk() {
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];
        let stream: ByteStream = Box::pin(futures::stream::iter(chunks));

        let mut out = Vec::new();
        let written = copy_stream(stream, &mut out).await.unwrap();

        assert_eq!(written, 11);
        assert_eq!(out, b"hello world");
    }

    #[tokio::test]
    async fn test_copy_stream_stops_on_read_error() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from("partial")),
            Err(std::io::Error::other("disk gone")),
            Ok(Bytes::from("never")),
        ];
        let stream: ByteStream = Box::pin(futures::stream::iter(chunks));

        let mut out = Vec::new();
        assert!(copy_stream(stream, &mut out).await.is_err());
        assert_eq!(out, b"partial");
    }
}
