use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::attachment::{Attachment, AttachmentUpload};
use crate::error::{Result, SyllabusError};
use crate::fs::FileSystem;
use crate::outline::FolderIndex;

use super::AttachmentStore;

const MANIFEST_FILE: &str = "manifest.json";

/// Attachments kept as `<root>/<course_id>/<chapter>/<id><ext>` with a
/// `manifest.json` per chapter directory.
pub struct FolderAttachmentStore<FS: FileSystem> {
    fs: FS,
    root: PathBuf,
}

impl<FS: FileSystem> FolderAttachmentStore<FS> {
    /// Store rooted at `root`
    pub fn new(fs: FS, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    fn chapter_dir(&self, course_id: &str, chapter: FolderIndex) -> PathBuf {
        self.root.join(course_id).join(chapter.to_string())
    }

    fn read_manifest(&self, dir: &Path) -> Result<Vec<Attachment>> {
        let path = dir.join(MANIFEST_FILE);
        if !self.fs.exists(&path) {
            return Ok(Vec::new());
        }
        let text = self
            .fs
            .read_to_string(&path)
            .map_err(|source| SyllabusError::FileRead {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| SyllabusError::JsonFile { path, source })
    }

    fn write_manifest(&self, dir: &Path, attachments: &[Attachment]) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(attachments)?;
        self.fs
            .write_file(&path, &json)
            .map_err(|source| SyllabusError::FileWrite { path, source })
    }

    /// Raw bytes of a stored attachment
    pub fn read(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        let path = self
            .chapter_dir(&attachment.course_id, attachment.chapter)
            .join(&attachment.filename);
        self.fs
            .read_binary(&path)
            .map_err(|source| SyllabusError::FileRead { path, source })
    }
}

impl<FS: FileSystem> AttachmentStore for FolderAttachmentStore<FS> {
    fn list(&self, course_id: &str, chapter: FolderIndex) -> Result<Vec<Attachment>> {
        self.read_manifest(&self.chapter_dir(course_id, chapter))
    }

    fn upload(
        &self,
        course_id: &str,
        chapter: FolderIndex,
        upload: AttachmentUpload,
    ) -> Result<Attachment> {
        let mime_type = upload.validate()?;
        let id = Uuid::new_v4().to_string();
        let ext = Path::new(&upload.original_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let filename = format!("{}{}", id, ext);

        let dir = self.chapter_dir(course_id, chapter);
        let path = dir.join(&filename);
        self.fs
            .write_binary(&path, &upload.data)
            .map_err(|source| SyllabusError::FileWrite { path, source })?;

        let attachment = Attachment {
            id,
            course_id: course_id.to_string(),
            chapter,
            filename,
            original_name: upload.original_name,
            mime_type,
            size: upload.data.len() as u64,
            uploaded_at: Utc::now(),
        };
        let mut manifest = self.read_manifest(&dir)?;
        manifest.push(attachment.clone());
        self.write_manifest(&dir, &manifest)?;
        log::debug!(
            "Attached '{}' to chapter {} of '{}'",
            attachment.original_name,
            chapter,
            course_id
        );
        Ok(attachment)
    }

    fn delete(&self, course_id: &str, attachment_id: &str) -> Result<()> {
        let course_dir = self.root.join(course_id);
        let chapters = if self.fs.is_dir(&course_dir) {
            self.fs
                .list_dirs(&course_dir)
                .map_err(|source| SyllabusError::FileRead {
                    path: course_dir.clone(),
                    source,
                })?
        } else {
            Vec::new()
        };
        for dir in chapters {
            let mut manifest = self.read_manifest(&dir)?;
            let Some(position) = manifest.iter().position(|a| a.id == attachment_id) else {
                continue;
            };
            let removed = manifest.remove(position);
            let path = dir.join(&removed.filename);
            if let Err(e) = self.fs.delete_file(&path) {
                log::warn!("Attachment file {} already gone: {}", path.display(), e);
            }
            return self.write_manifest(&dir, &manifest);
        }
        Err(SyllabusError::AttachmentNotFound(attachment_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;

    fn pdf(name: &str) -> AttachmentUpload {
        AttachmentUpload::new(name, b"%PDF-1.4 test".to_vec())
    }

    #[test]
    fn test_upload_then_list_per_chapter() {
        let store = FolderAttachmentStore::new(InMemoryFileSystem::new(), "attachments");
        let uploaded = store.upload("rust", FolderIndex(3), pdf("slides.pdf")).unwrap();
        store.upload("rust", FolderIndex(4), pdf("other.pdf")).unwrap();

        let listed = store.list("rust", FolderIndex(3)).unwrap();
        assert_eq!(listed, vec![uploaded.clone()]);
        assert!(uploaded.filename.ends_with(".pdf"));
        assert_eq!(uploaded.mime_type, "application/pdf");
        assert_eq!(store.read(&uploaded).unwrap(), b"%PDF-1.4 test".to_vec());
        assert!(store.list("rust", FolderIndex(9)).unwrap().is_empty());
    }

    #[test]
    fn test_upload_rejects_invalid_file() {
        let store = FolderAttachmentStore::new(InMemoryFileSystem::new(), "attachments");
        let bogus = AttachmentUpload::new("slides.pdf", b"not a pdf".to_vec());
        assert!(matches!(
            store.upload("rust", FolderIndex(0), bogus),
            Err(SyllabusError::InvalidAttachment(_))
        ));
        assert!(store.list("rust", FolderIndex(0)).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_file_and_entry() {
        let fs = InMemoryFileSystem::new();
        let store = FolderAttachmentStore::new(&fs, "attachments");
        let a = store.upload("rust", FolderIndex(1), pdf("a.pdf")).unwrap();
        let b = store.upload("rust", FolderIndex(1), pdf("b.pdf")).unwrap();

        store.delete("rust", &a.id).unwrap();

        assert_eq!(store.list("rust", FolderIndex(1)).unwrap(), vec![b]);
        assert!(!fs.exists(Path::new(&format!("attachments/rust/1/{}", a.filename))));
        assert!(matches!(
            store.delete("rust", &a.id),
            Err(SyllabusError::AttachmentNotFound(_))
        ));
    }
}
