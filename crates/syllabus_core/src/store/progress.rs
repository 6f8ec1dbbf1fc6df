use std::path::PathBuf;

use crate::error::{Result, SyllabusError};
use crate::fs::FileSystem;
use crate::progress::{Bookmark, ProgressRecord};

use super::ProgressStore;

/// One `<course_id>.progress.json` per course in a data directory.
pub struct FileProgressStore<FS: FileSystem> {
    fs: FS,
    dir: PathBuf,
}

impl<FS: FileSystem> FileProgressStore<FS> {
    /// Store writing one JSON file per course under `dir`
    pub fn new(fs: FS, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    fn path_for(&self, course_id: &str) -> PathBuf {
        self.dir.join(format!("{}.progress.json", course_id))
    }

    fn save(&self, record: &ProgressRecord) -> Result<()> {
        let path = self.path_for(&record.course_id);
        let json = serde_json::to_string_pretty(record)?;
        self.fs
            .write_file(&path, &json)
            .map_err(|source| SyllabusError::FileWrite { path, source })
    }

    fn modify<R>(&self, course_id: &str, f: impl FnOnce(&mut ProgressRecord) -> R) -> Result<R> {
        let mut record = self.load(course_id)?;
        let out = f(&mut record);
        self.save(&record)?;
        Ok(out)
    }
}

impl<FS: FileSystem> ProgressStore for FileProgressStore<FS> {
    fn load(&self, course_id: &str) -> Result<ProgressRecord> {
        let path = self.path_for(course_id);
        if !self.fs.exists(&path) {
            return Ok(ProgressRecord::new(course_id));
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

    fn set_current_lesson(&self, course_id: &str, flat_index: usize) -> Result<()> {
        self.modify(course_id, |record| record.set_current_lesson(flat_index))
    }

    fn set_completed(
        &self,
        course_id: &str,
        flat_index: usize,
        completed: bool,
        total: usize,
    ) -> Result<ProgressRecord> {
        self.modify(course_id, |record| {
            record.set_completed(flat_index, completed, total);
            record.clone()
        })
    }

    fn add_bookmark(&self, course_id: &str, lesson_index: usize, note: &str) -> Result<Bookmark> {
        self.modify(course_id, |record| record.add_bookmark(lesson_index, note).clone())
    }

    fn remove_bookmark(&self, course_id: &str, lesson_index: usize) -> Result<bool> {
        self.modify(course_id, |record| record.remove_bookmark(lesson_index))
    }
}
