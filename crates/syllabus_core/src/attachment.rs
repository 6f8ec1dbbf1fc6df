//! Files attached to a chapter, and the loader that keeps the displayed
//! list in step with the selection.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{Result, SyllabusError};
use crate::outline::FolderIndex;

/// Largest accepted upload, in bytes
pub const MAX_ATTACHMENT_SIZE: usize = 10 * 1024 * 1024;

/// Stored metadata of one attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Attachment {
    /// UUID v4
    pub id: String,
    /// Owning course
    pub course_id: String,
    /// Root chapter the file belongs to
    pub chapter: FolderIndex,
    /// Name on disk (`<id><ext>`)
    pub filename: String,
    /// Name as uploaded
    pub original_name: String,
    /// Validated MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Upload time
    pub uploaded_at: DateTime<Utc>,
}

/// A file about to be attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Name as uploaded
    pub original_name: String,
    /// Declared type; detected from the extension when absent
    pub mime_type: Option<String>,
    /// File bytes
    pub data: Vec<u8>,
}

impl AttachmentUpload {
    /// Upload with the type detected from the name
    pub fn new(original_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: None,
            data,
        }
    }

    /// Builder: declare the MIME type explicitly
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Check size, type and file signature. Returns the effective MIME type.
    pub fn validate(&self) -> Result<String> {
        if self.data.is_empty() {
            return Err(invalid(format!("'{}' is empty", self.original_name)));
        }
        if self.data.len() > MAX_ATTACHMENT_SIZE {
            return Err(invalid(format!(
                "'{}' exceeds the maximum size of {} bytes",
                self.original_name, MAX_ATTACHMENT_SIZE
            )));
        }
        // an empty or generic declared type counts as undeclared
        let declared = self
            .mime_type
            .as_deref()
            .filter(|mime| !mime.is_empty() && *mime != "application/octet-stream");
        let mime_type = match declared {
            Some(declared) => declared.to_string(),
            None => detect_mime_type(&self.original_name)
                .ok_or_else(|| invalid(format!("cannot tell the type of '{}'", self.original_name)))?
                .to_string(),
        };
        let Some(signature) = signature_of(&mime_type) else {
            return Err(invalid(format!("file type {} is not allowed", mime_type)));
        };
        if !self.data.starts_with(signature) {
            return Err(invalid(format!(
                "content of '{}' does not match {}",
                self.original_name, mime_type
            )));
        }
        if mime_type == "image/webp" && self.data.get(8..12) != Some(b"WEBP".as_slice()) {
            return Err(invalid("invalid WEBP file signature".to_string()));
        }
        Ok(mime_type)
    }
}

fn invalid(reason: String) -> SyllabusError {
    SyllabusError::InvalidAttachment(reason)
}

/// Allowed types and their leading magic bytes (empty = no check)
const ALLOWED_TYPES: &[(&str, &[u8])] = &[
    ("application/pdf", b"%PDF"),
    ("image/jpeg", &[0xFF, 0xD8, 0xFF]),
    ("image/png", &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
    ("image/gif", b"GIF8"),
    ("image/webp", b"RIFF"),
    ("text/plain", b""),
    ("text/markdown", b""),
    ("text/html", b""),
    ("text/css", b""),
    ("text/javascript", b""),
    ("text/x-typescript", b""),
    ("text/x-go", b""),
    ("text/x-python", b""),
    ("text/x-rust", b""),
    ("text/x-c", b""),
    ("text/x-c++", b""),
    ("text/x-java", b""),
    ("text/x-sh", b""),
    ("application/json", b""),
    ("application/xml", b""),
    ("application/x-yaml", b""),
];

fn signature_of(mime_type: &str) -> Option<&'static [u8]> {
    ALLOWED_TYPES
        .iter()
        .find(|(name, _)| *name == mime_type)
        .map(|(_, signature)| *signature)
}

/// MIME type guessed from a file extension
pub fn detect_mime_type(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" => "text/html",
        "css" => "text/css",
        "js" | "jsx" => "text/javascript",
        "ts" | "tsx" => "text/x-typescript",
        "go" => "text/x-go",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "c" | "h" => "text/x-c",
        "cpp" | "hpp" => "text/x-c++",
        "java" => "text/x-java",
        "sh" => "text/x-sh",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/x-yaml",
        _ => return None,
    };
    Some(mime)
}

/// Proof of which request a fetch result answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Chapter the request was made for
    pub chapter: FolderIndex,
    generation: u64,
}

/// Attachment list for the selected chapter.
///
/// Only the result for the most recent request is committed; anything older
/// was overtaken by a selection change and is dropped.
#[derive(Debug, Clone, Default)]
pub struct AttachmentLoader {
    generation: u64,
    pending: Option<FetchTicket>,
    chapter: Option<FolderIndex>,
    attachments: Vec<Attachment>,
}

impl AttachmentLoader {
    /// Idle loader with no attachments
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `chapter`; supersedes any fetch in flight
    pub fn request(&mut self, chapter: FolderIndex) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            chapter,
            generation: self.generation,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// Store the result of a fetch. Returns false if the ticket is stale.
    ///
    /// A failed fetch commits an empty list.
    pub fn commit(&mut self, ticket: FetchTicket, result: Result<Vec<Attachment>>) -> bool {
        if self.pending != Some(ticket) {
            log::debug!(
                "Dropping stale attachment list for chapter {}",
                ticket.chapter
            );
            return false;
        }
        self.pending = None;
        self.chapter = Some(ticket.chapter);
        self.attachments = result.unwrap_or_else(|e| {
            log::debug!("Could not load attachments for chapter {}: {}", ticket.chapter, e);
            Vec::new()
        });
        true
    }

    /// Withdraw `ticket` if it is still the pending request
    pub fn cancel(&mut self, ticket: FetchTicket) {
        if self.pending == Some(ticket) {
            self.pending = None;
        }
    }

    /// Forget the current list and any pending fetch
    pub fn clear(&mut self) {
        self.pending = None;
        self.chapter = None;
        self.attachments.clear();
    }

    /// Whether a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Chapter the committed list belongs to
    pub fn chapter(&self) -> Option<FolderIndex> {
        self.chapter
    }

    /// Attachments of the loaded chapter
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(id: &str, chapter: u32) -> Attachment {
        Attachment {
            id: id.to_string(),
            course_id: "rust".to_string(),
            chapter: FolderIndex(chapter),
            filename: format!("{}.pdf", id),
            original_name: "notes.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 4,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut loader = AttachmentLoader::new();
        let for_a = loader.request(FolderIndex(1));
        let for_b = loader.request(FolderIndex(2));

        assert!(!loader.commit(for_a, Ok(vec![attachment("a", 1)])));
        assert!(loader.attachments().is_empty());
        assert!(loader.is_loading());

        assert!(loader.commit(for_b, Ok(vec![attachment("b", 2)])));
        assert_eq!(loader.chapter(), Some(FolderIndex(2)));
        assert_eq!(loader.attachments()[0].id, "b");
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_same_ticket_cannot_commit_twice() {
        let mut loader = AttachmentLoader::new();
        let ticket = loader.request(FolderIndex(1));
        assert!(loader.commit(ticket, Ok(vec![attachment("a", 1)])));
        assert!(!loader.commit(ticket, Ok(Vec::new())));
        assert_eq!(loader.attachments().len(), 1);
    }

    #[test]
    fn test_failed_fetch_commits_empty_list() {
        let mut loader = AttachmentLoader::new();
        let first = loader.request(FolderIndex(1));
        loader.commit(first, Ok(vec![attachment("a", 1)]));
        let second = loader.request(FolderIndex(1));
        assert!(loader.commit(second, Err(SyllabusError::CourseNotFound("x".into()))));
        assert!(loader.attachments().is_empty());
    }

    #[test]
    fn test_validate_checks_signature_and_type() {
        let pdf = AttachmentUpload::new("slides.pdf", b"%PDF-1.7".to_vec());
        assert_eq!(pdf.validate().unwrap(), "application/pdf");

        let fake = AttachmentUpload::new("slides.pdf", b"hello".to_vec());
        assert!(matches!(fake.validate(), Err(SyllabusError::InvalidAttachment(_))));

        let exe = AttachmentUpload::new("tool.exe", vec![0x4D, 0x5A]);
        assert!(exe.validate().is_err());

        let declared = AttachmentUpload::new("main", b"fn main() {}".to_vec())
            .with_mime_type("text/x-rust");
        assert_eq!(declared.validate().unwrap(), "text/x-rust");

        let empty = AttachmentUpload::new("a.txt", Vec::new());
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_webp_needs_full_signature() {
        let mut data = b"RIFF\0\0\0\0WEBP".to_vec();
        assert!(AttachmentUpload::new("a.webp", data.clone()).validate().is_ok());
        data[8] = b'X';
        assert!(AttachmentUpload::new("a.webp", data).validate().is_err());
    }

    #[test]
    fn test_generic_declared_type_falls_back_to_extension() {
        let upload = AttachmentUpload::new("slides.pdf", b"%PDF-1.4".to_vec())
            .with_mime_type("application/octet-stream");
        assert_eq!(upload.validate().unwrap(), "application/pdf");

        let upload = AttachmentUpload::new("notes.md", b"# Notes".to_vec()).with_mime_type("");
        assert_eq!(upload.validate().unwrap(), "text/markdown");

        let upload = AttachmentUpload::new("blob", b"data".to_vec())
            .with_mime_type("application/octet-stream");
        assert!(matches!(
            upload.validate(),
            Err(SyllabusError::InvalidAttachment(_))
        ));
    }

    #[test]
    fn test_detect_mime_type_ignores_case() {
        assert_eq!(detect_mime_type("Photo.JPG"), Some("image/jpeg"));
        assert_eq!(detect_mime_type("README"), None);
    }
}
