use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::outline::{FolderIndex, FolderPath, OutlinePath};

/// Unified error type for syllabus operations
#[derive(Debug, Error)]
pub enum SyllabusError {
    // IO errors
    /// Unattributed IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading a file failed
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Writing a file failed
    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        /// File that was written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    // Serialization errors
    /// Unattributed JSON failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON file could not be parsed
    #[error("Invalid JSON in '{path}': {source}")]
    JsonFile {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    // Config errors
    /// Config file is not valid TOML
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be encoded
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// No platform config directory
    #[error("Could not determine config directory")]
    NoConfigDir,

    // Outline errors
    /// Positional path does not resolve
    #[error("No lesson at path {0}")]
    NodeNotFound(OutlinePath),

    /// Folder path does not resolve
    #[error("No lesson with folder path {0}")]
    FolderPathNotFound(FolderPath),

    /// Parent is already at maximum depth
    #[error("Cannot add a sub-item under {0}: maximum depth reached")]
    MaxDepthReached(OutlinePath),

    /// A stored lesson is nested too deep
    #[error("Lesson '{title}' is nested deeper than the outline allows")]
    DepthExceeded {
        /// Title of the offending lesson
        title: String,
    },

    /// Two siblings share a folder index
    #[error("Folder index {0} is used by more than one lesson")]
    DuplicateFolderIndex(FolderIndex),

    // Session errors
    /// An edit is already open
    #[error("Another lesson is being edited; save or cancel it first")]
    EditInProgress,

    /// No edit is open
    #[error("No lesson is being edited")]
    NotEditing,

    // Storage errors
    /// Unknown course id
    #[error("Course not found: '{0}'")]
    CourseNotFound(String),

    /// Unknown attachment id
    #[error("Attachment not found: '{0}'")]
    AttachmentNotFound(String),

    /// Upload failed validation
    #[error("Attachment rejected: {0}")]
    InvalidAttachment(String),
}

/// Result type alias for syllabus operations
pub type Result<T> = std::result::Result<T, SyllabusError>;

/// A serializable representation of SyllabusError for IPC
#[derive(Debug, Clone, Serialize)]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
    /// Associated path (if applicable)
    pub path: Option<PathBuf>,
}

impl From<&SyllabusError> for SerializableError {
    fn from(err: &SyllabusError) -> Self {
        let kind = match err {
            SyllabusError::Io(_) => "Io",
            SyllabusError::FileRead { .. } => "FileRead",
            SyllabusError::FileWrite { .. } => "FileWrite",
            SyllabusError::Json(_) => "Json",
            SyllabusError::JsonFile { .. } => "JsonFile",
            SyllabusError::ConfigParse(_) => "ConfigParse",
            SyllabusError::ConfigSerialize(_) => "ConfigSerialize",
            SyllabusError::NoConfigDir => "NoConfigDir",
            SyllabusError::NodeNotFound(_) => "NodeNotFound",
            SyllabusError::FolderPathNotFound(_) => "FolderPathNotFound",
            SyllabusError::MaxDepthReached(_) => "MaxDepthReached",
            SyllabusError::DepthExceeded { .. } => "DepthExceeded",
            SyllabusError::DuplicateFolderIndex(_) => "DuplicateFolderIndex",
            SyllabusError::EditInProgress => "EditInProgress",
            SyllabusError::NotEditing => "NotEditing",
            SyllabusError::CourseNotFound(_) => "CourseNotFound",
            SyllabusError::AttachmentNotFound(_) => "AttachmentNotFound",
            SyllabusError::InvalidAttachment(_) => "InvalidAttachment",
        }
        .to_string();

        let path = match err {
            SyllabusError::FileRead { path, .. } => Some(path.clone()),
            SyllabusError::FileWrite { path, .. } => Some(path.clone()),
            SyllabusError::JsonFile { path, .. } => Some(path.clone()),
            _ => None,
        };

        Self {
            kind,
            message: err.to_string(),
            path,
        }
    }
}

impl From<SyllabusError> for SerializableError {
    fn from(err: SyllabusError) -> Self {
        SerializableError::from(&err)
    }
}

impl SyllabusError {
    /// Convert to a serializable representation for IPC
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }
}
