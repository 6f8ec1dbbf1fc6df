use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};

/// Abstraction over filesystem operations
/// Lets the folder stores run against the real disk or an in-memory tree (tests, WASM).
pub trait FileSystem {
    /// Reads a text file
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Creates or overwrites a text file, creating parent directories
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Deletes a file
    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Checks if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Creates a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Checks if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `dir`, sorted by name
    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Files directly inside `dir` (not recursive), sorted by name
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Removes a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Renames a file or directory. Errors if `to` already exists.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    // ==================== Binary File Methods ====================

    /// Read binary file content
    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        self.read_to_string(path).map(|s| s.into_bytes())
    }

    /// Write binary content to a file
    fn write_binary(&self, _path: &Path, _content: &[u8]) -> Result<()> {
        Err(Error::new(
            ErrorKind::Unsupported,
            "Binary write not supported",
        ))
    }
}

// Blanket implementation for references to FileSystem
impl<T: FileSystem> FileSystem for &T {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        (*self).read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        (*self).write_file(path, content)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        (*self).delete_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (*self).exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        (*self).create_dir_all(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (*self).is_dir(path)
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        (*self).list_dirs(dir)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        (*self).list_files(dir)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        (*self).remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        (*self).rename(from, to)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        (*self).read_binary(path)
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        (*self).write_binary(path, content)
    }
}

// ============================================================================
// RealFileSystem - native targets only
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
use std::fs;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Default)]
/// Maps straight onto std::fs
pub struct RealFileSystem;

#[cfg(not(target_arch = "wasm32"))]
impl RealFileSystem {
    fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        if dir.is_dir() {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_dir() == want_dirs {
                    entries.push(path);
                }
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Self::list_entries(dir, true)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Self::list_entries(dir, false)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Source not found: {:?}", from),
            ));
        }
        if to.exists() {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("Destination already exists: {:?}", to),
            ));
        }
        fs::rename(from, to)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }
}

// ============================================================================
// InMemoryFileSystem - available on all targets
// ============================================================================

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// An in-memory filesystem implementation
/// Used by tests and by front ends without disk access
#[derive(Clone, Default)]
pub struct InMemoryFileSystem {
    /// Text files
    files: Arc<RwLock<BTreeMap<PathBuf, String>>>,
    /// Binary files (attachments)
    binary_files: Arc<RwLock<BTreeMap<PathBuf, Vec<u8>>>>,
    /// Directories that exist (implicitly created when files are added)
    directories: Arc<RwLock<BTreeSet<PathBuf>>>,
}

impl InMemoryFileSystem {
    /// Create a new empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem pre-populated with text files
    pub fn with_files(entries: Vec<(&str, &str)>) -> Self {
        let fs = Self::new();
        for (path, content) in entries {
            // in-memory writes are infallible
            let _ = fs.write_file(Path::new(path), content);
        }
        fs
    }

    /// All text and binary file paths, sorted
    pub fn list_all_files(&self) -> Vec<PathBuf> {
        let files = self.files.read().unwrap();
        let binary_files = self.binary_files.read().unwrap();
        let mut all: Vec<PathBuf> = files.keys().chain(binary_files.keys()).cloned().collect();
        all.sort();
        all
    }

    /// Remove . and .. components where possible
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            use std::path::Component;
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                c => components.push(c),
            }
        }
        components.iter().collect()
    }

    fn children_of<'a>(
        paths: impl Iterator<Item = &'a PathBuf>,
        dir: &Path,
    ) -> Vec<PathBuf> {
        paths
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect()
    }

    fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
        path.strip_prefix(from).ok().map(|rest| to.join(rest))
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let normalized = Self::normalize_path(path);
        if let Some(text) = self.files.read().unwrap().get(&normalized) {
            return Ok(text.clone());
        }
        // binary files written by a copy may still be text
        match self.binary_files.read().unwrap().get(&normalized) {
            Some(data) => String::from_utf8(data.clone())
                .map_err(|e| Error::new(ErrorKind::InvalidData, e)),
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("File not found: {:?}", path),
            )),
        }
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let normalized = Self::normalize_path(path);
        if let Some(parent) = normalized.parent() {
            self.create_dir_all(parent)?;
        }
        let mut files = self.files.write().unwrap();
        files.insert(normalized, content.to_string());
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        let normalized = Self::normalize_path(path);
        if self.files.write().unwrap().remove(&normalized).is_some() {
            return Ok(());
        }
        if self.binary_files.write().unwrap().remove(&normalized).is_some() {
            return Ok(());
        }
        Err(Error::new(
            ErrorKind::NotFound,
            format!("File not found: {:?}", path),
        ))
    }

    fn exists(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        self.files.read().unwrap().contains_key(&normalized)
            || self.binary_files.read().unwrap().contains_key(&normalized)
            || self.directories.read().unwrap().contains(&normalized)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let normalized = Self::normalize_path(path);
        let mut dirs = self.directories.write().unwrap();
        for ancestor in normalized.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        self.directories.read().unwrap().contains(&normalized)
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let normalized = Self::normalize_path(dir);
        let dirs = self.directories.read().unwrap();
        Ok(Self::children_of(dirs.iter(), &normalized))
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let normalized = Self::normalize_path(dir);
        let files = self.files.read().unwrap();
        let binary_files = self.binary_files.read().unwrap();
        let mut result = Self::children_of(files.keys(), &normalized);
        result.extend(Self::children_of(binary_files.keys(), &normalized));
        result.sort();
        Ok(result)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let normalized = Self::normalize_path(path);
        if !self.is_dir(&normalized) {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Directory not found: {:?}", path),
            ));
        }
        self.files
            .write()
            .unwrap()
            .retain(|p, _| !p.starts_with(&normalized));
        self.binary_files
            .write()
            .unwrap()
            .retain(|p, _| !p.starts_with(&normalized));
        self.directories
            .write()
            .unwrap()
            .retain(|p| !p.starts_with(&normalized));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from_norm = Self::normalize_path(from);
        let to_norm = Self::normalize_path(to);
        if !self.exists(&from_norm) {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Source not found: {:?}", from),
            ));
        }
        if self.exists(&to_norm) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("Destination already exists: {:?}", to),
            ));
        }
        if let Some(parent) = to_norm.parent() {
            self.create_dir_all(parent)?;
        }

        {
            let mut files = self.files.write().unwrap();
            let moved: Vec<PathBuf> = files
                .keys()
                .filter(|p| p.starts_with(&from_norm))
                .cloned()
                .collect();
            for old in moved {
                if let (Some(content), Some(new)) =
                    (files.remove(&old), Self::rebase(&old, &from_norm, &to_norm))
                {
                    files.insert(new, content);
                }
            }
        }
        {
            let mut binary_files = self.binary_files.write().unwrap();
            let moved: Vec<PathBuf> = binary_files
                .keys()
                .filter(|p| p.starts_with(&from_norm))
                .cloned()
                .collect();
            for old in moved {
                if let (Some(content), Some(new)) =
                    (binary_files.remove(&old), Self::rebase(&old, &from_norm, &to_norm))
                {
                    binary_files.insert(new, content);
                }
            }
        }
        let mut dirs = self.directories.write().unwrap();
        let moved: Vec<PathBuf> = dirs
            .iter()
            .filter(|p| p.starts_with(&from_norm))
            .cloned()
            .collect();
        for old in moved {
            dirs.remove(&old);
            if let Some(new) = Self::rebase(&old, &from_norm, &to_norm) {
                dirs.insert(new);
            }
        }
        Ok(())
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        let normalized = Self::normalize_path(path);
        if let Some(data) = self.binary_files.read().unwrap().get(&normalized) {
            return Ok(data.clone());
        }
        self.files
            .read()
            .unwrap()
            .get(&normalized)
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("File not found: {:?}", path)))
    }

    fn write_binary(&self, path: &Path, content: &[u8]) -> Result<()> {
        let normalized = Self::normalize_path(path);
        if let Some(parent) = normalized.parent() {
            self.create_dir_all(parent)?;
        }
        self.binary_files
            .write()
            .unwrap()
            .insert(normalized, content.to_vec());
        Ok(())
    }
}
