//! Structured error types shared by the configuration, logging, video and pose modules.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Missing or unreadable inputs
    NotFound,
    ConfigNotFound,

    // Malformed inputs
    FormatError,
    ConfigParseError,

    // Media opened but reported unusable properties
    StreamError,

    // External collaborators
    ModelError,
    IoError,
}

impl ErrorCode {
    /// True for the codes that describe something missing.
    pub fn is_not_found(self) -> bool {
        matches!(self, ErrorCode::NotFound | ErrorCode::ConfigNotFound)
    }

    /// True for the codes that describe malformed input.
    pub fn is_format(self) -> bool {
        matches!(self, ErrorCode::FormatError | ErrorCode::ConfigParseError)
    }
}

/// Structured error carrying a code, a message and the offending path.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    // Convenience constructors

    pub fn config_not_found(dir: &Path, range: &str) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!(
                "No project configuration files found ({} range) in {}",
                range,
                dir.display()
            ),
        )
        .with_path(dir)
    }

    pub fn config_parse(file: &Path, err: impl std::fmt::Display) -> Self {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        Self::new(
            ErrorCode::ConfigParseError,
            format!("Invalid YAML in {}: {}", name, err),
        )
        .with_path(file)
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("File not found: {}", path.display()),
        )
        .with_path(path)
    }

    pub fn unsupported_format(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self::new(
            ErrorCode::FormatError,
            format!("Unsupported video format: '{}'", ext),
        )
        .with_path(path)
    }

    pub fn invalid_frame(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::FormatError, reason)
    }

    pub fn stream(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::StreamError,
            format!("{} in video: {}", reason, path.display()),
        )
        .with_path(path)
    }

    pub fn model(err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModelError,
            format!("Pose model processing failed: {}", err),
        )
    }

    pub fn io(path: &Path, err: std::io::Error) -> Self {
        let code = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorCode::NotFound
        } else {
            ErrorCode::IoError
        };
        Self::new(code, format!("{}: {}", path.display(), err)).with_path(path)
    }
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
