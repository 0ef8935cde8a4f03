//! Content type descriptors.
//!
//! A content type names the tables a kind of record lives in and the
//! capabilities it opts into. Record and version tables share one column
//! layout, see [`ContentRecord`](super::ContentRecord).

use serde::Serialize;

/// Static description of one kind of content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContentType {
    /// Human-readable type name.
    pub name: &'static str,
    /// Table holding the live rows.
    pub table: &'static str,
    /// Table holding record snapshots (used only when `versioned`).
    pub versions_table: &'static str,
    /// Whether records of this type may own an attachment.
    pub belongs_to_attachment: bool,
    /// Whether every save snapshots the record.
    pub versioned: bool,
}

impl ContentType {
    /// Unversioned records owning an attachment.
    pub const ATTACHABLE: Self = Self {
        name: "Attachable",
        table: "attachables",
        versions_table: "attachable_versions",
        belongs_to_attachment: true,
        versioned: false,
    };

    /// Versioned records owning an attachment.
    pub const VERSIONED_ATTACHABLE: Self = Self {
        name: "VersionedAttachable",
        table: "versioned_attachables",
        versions_table: "versioned_attachable_versions",
        belongs_to_attachment: true,
        versioned: true,
    };

    /// Versioned HTML blocks; these never carry a file.
    pub const HTML_BLOCK: Self = Self {
        name: "HtmlBlock",
        table: "html_blocks",
        versions_table: "html_block_versions",
        belongs_to_attachment: false,
        versioned: true,
    };

    /// Every built-in content type.
    pub const ALL: [Self; 3] = [Self::ATTACHABLE, Self::VERSIONED_ATTACHABLE, Self::HTML_BLOCK];

    /// Whether records of this type may own an attachment.
    pub fn belongs_to_attachment(&self) -> bool {
        self.belongs_to_attachment
    }

    /// Look up a built-in type by name or table name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ct| {
            ct.name.eq_ignore_ascii_case(name) || ct.table.eq_ignore_ascii_case(name)
        })
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}
