//! Video file loading and validation.
//!
//! A [`VideoLoader`] holds at most one open video at a time. Loading never
//! fails loudly: every rejection is logged with its cause and reported as
//! `false`, leaving the loader empty.

use super::backend::{StreamProperties, VideoBackend, VideoHandle};
use super::ffprobe::FfprobeBackend;
use super::utils::{check_file, validate_video_format};
use crate::config::{ConfigStore, VideoSettings};
use crate::error::{Error, ErrorCode, Result};
use crate::logging::{ComponentLogger, LogLevel, LoggerFactory, emit};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Component name used for the loader's logger.
pub const COMPONENT: &str = "video_input";

/// Properties of the currently loaded video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub file_path: String,
    pub fps: f64,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
    /// `WIDTHxHEIGHT`
    pub resolution: String,
}

impl VideoMetadata {
    /// The metadata as a JSON object with exactly the seven documented keys.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

struct LoadedVideo<H> {
    handle: H,
    path: PathBuf,
    metadata: VideoMetadata,
}

/// Loads one video at a time through a [`VideoBackend`].
pub struct VideoLoader<B: VideoBackend = FfprobeBackend> {
    backend: B,
    settings: VideoSettings,
    logger: Option<Arc<ComponentLogger>>,
    current: Option<LoadedVideo<B::Handle>>,
}

impl VideoLoader<FfprobeBackend> {
    /// Loader using ffprobe, as configured in `settings`.
    pub fn new(settings: VideoSettings, logger: Option<Arc<ComponentLogger>>) -> Self {
        let backend = FfprobeBackend::new(settings.ffprobe_path.clone());
        Self::with_backend(backend, settings, logger)
    }

    /// Loader wired to the project config and the `video_input` logger.
    ///
    /// Either dependency may be absent: without a store the default formats
    /// apply and no resolution limit is enforced; without a factory messages
    /// go to the global `tracing` subscriber.
    pub fn from_config(store: Option<&ConfigStore>, loggers: Option<&LoggerFactory>) -> Self {
        let settings = resolve_settings(store);
        let logger = loggers.and_then(|factory| match factory.get_logger(COMPONENT) {
            Ok(logger) => Some(logger),
            Err(e) => {
                tracing::warn!("video_input logger unavailable: {}", e);
                None
            }
        });
        Self::new(settings, logger)
    }
}

impl<B: VideoBackend> VideoLoader<B> {
    pub fn with_backend(
        backend: B,
        settings: VideoSettings,
        logger: Option<Arc<ComponentLogger>>,
    ) -> Self {
        let loader = Self {
            backend,
            settings,
            logger,
            current: None,
        };
        loader.log(LogLevel::Debug, "VideoLoader initialized");
        loader
    }

    pub fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    /// Load `path`, replacing any video already loaded.
    ///
    /// Returns `false` when the file is missing, empty, of an unsupported
    /// type, cannot be opened, or reports invalid stream properties. A
    /// resolution above the configured maximum only logs a warning.
    pub fn load(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.log(
            LogLevel::Info,
            &format!("Attempting to load video: {}", path.display()),
        );

        if let Err(e) = check_file(path) {
            self.log(LogLevel::Warning, &format!("File validation failed: {}", e));
            return false;
        }

        if !validate_video_format(path, &self.settings.supported_formats) {
            self.log(
                LogLevel::Warning,
                &Error::unsupported_format(path).to_string(),
            );
            return false;
        }

        self.release_current();

        match self.open_validated(path) {
            Ok(loaded) => {
                self.log(
                    LogLevel::Info,
                    &format!("Video loaded successfully: {}", path.display()),
                );
                self.log(
                    LogLevel::Debug,
                    &format!("Video properties: {:?}", loaded.metadata),
                );
                self.current = Some(loaded);
                true
            }
            Err(e) => {
                self.log(LogLevel::Error, &e.to_string());
                false
            }
        }
    }

    /// True while a handle is stored and the backend reports it open.
    pub fn is_loaded(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|loaded| loaded.handle.is_opened())
    }

    /// Copy of the current metadata, `None` when nothing is loaded.
    pub fn metadata(&self) -> Option<VideoMetadata> {
        self.current.as_ref().map(|loaded| loaded.metadata.clone())
    }

    /// Copy of the current metadata as a JSON object, empty when nothing is loaded.
    pub fn metadata_map(&self) -> Map<String, Value> {
        self.current
            .as_ref()
            .map(|loaded| loaded.metadata.to_map())
            .unwrap_or_default()
    }

    /// Path of the loaded video.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|loaded| loaded.path.as_path())
    }

    /// Release the loaded video, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.release_current();
        self.log(LogLevel::Debug, "Video closed by user request");
    }

    /// Open `path` and check its stream, releasing the handle on any failure.
    fn open_validated(&self, path: &Path) -> Result<LoadedVideo<B::Handle>> {
        let mut handle = self.backend.open(path).map_err(|e| {
            Error::new(
                e.code,
                format!(
                    "{} could not open video file {}: {}",
                    self.backend.name(),
                    path.display(),
                    e
                ),
            )
            .with_path(path)
        })?;

        let inspected = if handle.is_opened() {
            handle
                .properties()
                .and_then(|props| self.validate_properties(path, props))
        } else {
            Err(Error::new(
                ErrorCode::FormatError,
                format!(
                    "{} could not open video file: {}",
                    self.backend.name(),
                    path.display()
                ),
            )
            .with_path(path))
        };

        match inspected {
            Ok(metadata) => Ok(LoadedVideo {
                handle,
                path: path.to_path_buf(),
                metadata,
            }),
            Err(e) => {
                if let Err(release_err) = handle.release() {
                    self.log(
                        LogLevel::Warning,
                        &format!("Error releasing video capture: {}", release_err),
                    );
                }
                Err(e)
            }
        }
    }

    fn validate_properties(&self, path: &Path, props: StreamProperties) -> Result<VideoMetadata> {
        let StreamProperties {
            fps,
            frame_count,
            width,
            height,
        } = props;

        if !(fps.is_finite() && fps > 0.0) {
            return Err(Error::stream(path, format!("Invalid fps ({})", fps)));
        }
        if frame_count <= 0 {
            return Err(Error::stream(
                path,
                format!("Invalid frame count ({})", frame_count),
            ));
        }
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(Error::stream(
                path,
                format!("Invalid resolution ({}x{})", width, height),
            ));
        };
        if width == 0 || height == 0 {
            return Err(Error::stream(
                path,
                format!("Invalid resolution ({}x{})", width, height),
            ));
        }

        if let Some(max) = self.settings.max_resolution {
            if width > max.width || height > max.height {
                self.log(
                    LogLevel::Warning,
                    &format!(
                        "Video resolution ({}x{}) exceeds maximum ({}). May impact performance.",
                        width, height, max
                    ),
                );
            }
        } else {
            self.log(LogLevel::Debug, "No resolution limits configured");
        }

        let frame_count = frame_count as u64;
        self.log(
            LogLevel::Debug,
            &format!(
                "Video validation passed: {:.1}fps, {} frames, {}x{}",
                fps, frame_count, width, height
            ),
        );

        Ok(VideoMetadata {
            file_path: path.display().to_string(),
            fps,
            frame_count,
            width,
            height,
            duration_seconds: frame_count as f64 / fps,
            resolution: format!("{}x{}", width, height),
        })
    }

    fn release_current(&mut self) {
        let Some(mut loaded) = self.current.take() else {
            return;
        };
        match loaded.handle.release() {
            Ok(()) => self.log(
                LogLevel::Debug,
                &format!("Released video capture for: {}", loaded.path.display()),
            ),
            Err(e) => self.log(
                LogLevel::Warning,
                &format!("Error releasing video capture: {}", e),
            ),
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        emit(self.logger.as_deref(), level, message);
    }
}

impl<B: VideoBackend> Drop for VideoLoader<B> {
    fn drop(&mut self) {
        self.release_current();
    }
}

fn resolve_settings(store: Option<&ConfigStore>) -> VideoSettings {
    let Some(store) = store else {
        return VideoSettings::default();
    };
    match store.load(crate::config::ConfigKind::Project) {
        Ok(tree) => VideoSettings::from_project(&tree),
        Err(e) => {
            tracing::warn!("Project config unavailable, using default video settings: {}", e);
            VideoSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            file_path: "lesson.mp4".to_string(),
            fps: 30.0,
            frame_count: 90,
            width: 1280,
            height: 720,
            duration_seconds: 3.0,
            resolution: "1280x720".to_string(),
        }
    }

    #[test]
    fn test_metadata_map_has_seven_keys() {
        let map = metadata().to_map();
        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "duration_seconds",
                "file_path",
                "fps",
                "frame_count",
                "height",
                "resolution",
                "width"
            ]
        );
        assert_eq!(map["resolution"], "1280x720");
    }

    #[test]
    fn test_new_loader_is_empty() {
        let loader = VideoLoader::new(VideoSettings::default(), None);
        assert!(!loader.is_loaded());
        assert!(loader.metadata().is_none());
        assert!(loader.metadata_map().is_empty());
        assert!(loader.current_path().is_none());
    }
}
