//! Upload input value objects.

use bytes::Bytes;

use attachhub_core::types::id::SectionId;

/// An uploaded file as handed over by the caller.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// File name on the uploader's machine.
    pub original_filename: String,
    /// MIME type declared by the uploader.
    pub content_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

impl FileUpload {
    /// Create an upload from raw parts.
    pub fn new(
        original_filename: impl Into<String>,
        content_type: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type: content_type.map(String::from),
            data: data.into(),
        }
    }

    /// Content size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Attachment fields a content record accepts on save.
#[derive(Debug, Clone, Default)]
pub struct AttachmentParams {
    /// Target storage section.
    pub section_id: Option<SectionId>,
    /// New file content.
    pub file: Option<FileUpload>,
    /// Requested path; defaults to the upload's original file name.
    pub file_path: Option<String>,
}

impl AttachmentParams {
    /// Whether no attachment field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.section_id.is_none() && self.file.is_none() && self.file_path.is_none()
    }

    /// Set the section.
    pub fn section(mut self, section_id: SectionId) -> Self {
        self.section_id = Some(section_id);
        self
    }

    /// Set the file content.
    pub fn file(mut self, file: FileUpload) -> Self {
        self.file = Some(file);
        self
    }

    /// Set the requested path.
    pub fn path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }
}
