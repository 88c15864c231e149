//! Error type returned by project parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Why a project file could not be parsed. Every variant is fatal to the
/// parse call; there is no partial result.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The project path does not exist.
    #[error("Project file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The path has no extension, so it cannot be a project file.
    #[error("Project file has no extension, cannot determine file type: {}", path.display())]
    UnknownFileType { path: PathBuf },

    /// The file could not be read, or is not well-formed XML.
    #[error("Failed to load project file {}: {message}", path.display())]
    MalformedXml { path: PathBuf, message: String },

    /// The XML loaded but the requested configuration could not be resolved.
    #[error("{message} ({})", path.display())]
    PropertyExtractionFailed { path: PathBuf, message: String },
}

impl ParseError {
    /// The project path the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::FileNotFound { path }
            | ParseError::UnknownFileType { path }
            | ParseError::MalformedXml { path, .. }
            | ParseError::PropertyExtractionFailed { path, .. } => path,
        }
    }
}

/// Result type alias for project parsing.
pub type ParseResult<T> = Result<T, ParseError>;
