//! Capability trait for records that point at an attachment.

use crate::types::id::AttachmentId;

/// A record that may reference one attachment at a pinned version.
///
/// Implemented by live content records and by their historical snapshots,
/// so the same lookup resolves "the attachment as this row saw it" for
/// either.
pub trait HasAttachment {
    /// The referenced attachment, if any.
    fn attachment_id(&self) -> Option<AttachmentId>;

    /// The attachment version this row is pinned to.
    fn attachment_version(&self) -> Option<i32>;

    /// Whether an attachment is currently bound.
    fn has_attachment(&self) -> bool {
        self.attachment_id().is_some()
    }

    /// The `(id, version)` pair, present only when both halves are set.
    fn attachment_ref(&self) -> Option<(AttachmentId, i32)> {
        Some((self.attachment_id()?, self.attachment_version()?))
    }
}
