//! File-system and extension checks that run before a video is opened.

use crate::config::{
    ConfigKind, ConfigStore, DEFAULT_SUPPORTED_FORMATS, VideoSettings, normalize_extension,
};
use crate::error::{Error, ErrorCode, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Check that `path` is an existing, non-empty regular file.
///
/// Returns the specific reason on failure.
pub fn check_file(path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::file_not_found(path));
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Error::new(
                ErrorCode::NotFound,
                format!("Permission denied accessing file: {}", path.display()),
            )
            .with_path(path));
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    if !metadata.is_file() {
        return Err(Error::new(
            ErrorCode::NotFound,
            format!("Path exists but is not a file: {}", path.display()),
        )
        .with_path(path));
    }

    if metadata.len() == 0 {
        return Err(Error::new(
            ErrorCode::NotFound,
            format!("File exists but is empty: {}", path.display()),
        )
        .with_path(path));
    }

    Ok(())
}

/// Boolean form of [`check_file`], logging the reason for a rejection.
pub fn check_file_exists(path: &Path) -> bool {
    match check_file(path) {
        Ok(()) => {
            debug!("File validation passed: {}", path.display());
            true
        }
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// Whether the extension of `path`, ignoring case, is one of `formats`.
///
/// `formats` entries are compared after normalisation, so `MP4` and `.mp4`
/// are equivalent. Paths without an extension are rejected.
pub fn validate_video_format(path: &Path, formats: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if ext.is_empty() {
        return false;
    }
    let ext = normalize_extension(ext);
    formats.iter().any(|f| normalize_extension(f) == ext)
}

/// Supported extensions from the project config, or the built-in set.
pub fn supported_video_formats(store: Option<&ConfigStore>) -> Vec<String> {
    match store.map(|s| s.load(ConfigKind::Project)) {
        Some(Ok(tree)) => VideoSettings::from_project(&tree).supported_formats,
        Some(Err(e)) => {
            warn!("Using default video formats, project config unavailable: {}", e);
            default_formats()
        }
        None => default_formats(),
    }
}

fn default_formats() -> Vec<String> {
    DEFAULT_SUPPORTED_FORMATS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
