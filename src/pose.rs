//! Pose detection front end.
//!
//! The model itself is an external collaborator behind [`PoseModel`]; this
//! module owns frame validation, BGR to RGB conversion, configuration and
//! logging around each call.

use crate::config::{ConfigKind, ConfigStore, PoseSettings};
use crate::error::{Error, ErrorCode, Result};
use crate::logging::{ComponentLogger, LogLevel, emit};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Component name used for the detector's logger.
pub const COMPONENT: &str = "pose_detection";

/// An 8-bit interleaved image, BGR order as delivered by video decoders.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Check the frame is a non-empty 3-channel image whose buffer matches its shape.
    pub fn validate(&self) -> Result<()> {
        if self.channels != 3 {
            return Err(Error::invalid_frame(format!(
                "Input frame must be 3-channel (height, width, 3), got {} channels",
                self.channels
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_frame(format!(
                "Input frame has empty shape ({}x{})",
                self.width, self.height
            )));
        }
        let expected = self.width as usize * self.height as usize * 3;
        if self.data.len() != expected {
            return Err(Error::invalid_frame(format!(
                "Input frame buffer holds {} bytes, expected {}",
                self.data.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Copy with the first and third channel swapped (BGR <-> RGB).
    pub fn to_rgb(&self) -> Frame {
        let mut data = self.data.clone();
        for pixel in data.chunks_exact_mut(3) {
            pixel.swap(0, 2);
        }
        Frame { data, ..*self }
    }
}

/// One body landmark in normalised image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

/// Output of one model call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoseResult {
    /// `None` when no person was found.
    pub landmarks: Option<Vec<Landmark>>,
}

impl PoseResult {
    pub fn landmark_count(&self) -> usize {
        self.landmarks.as_ref().map_or(0, Vec::len)
    }
}

/// A pose estimation model. Receives RGB frames.
pub trait PoseModel {
    fn process(&mut self, rgb: &Frame) -> anyhow::Result<PoseResult>;
}

/// Runs frames through a [`PoseModel`] with validation and logging.
pub struct PoseDetector<M: PoseModel> {
    model: M,
    settings: PoseSettings,
    logger: Option<Arc<ComponentLogger>>,
}

impl<M: PoseModel> PoseDetector<M> {
    pub fn new(model: M, settings: PoseSettings, logger: Option<Arc<ComponentLogger>>) -> Self {
        Self {
            model,
            settings,
            logger,
        }
    }

    /// Build the model from configured settings.
    ///
    /// Settings come from `pose_detection.core` in the project config, or the
    /// fallback values when no store is given or the section is unusable.
    pub fn initialize<F>(
        store: Option<&ConfigStore>,
        logger: Option<Arc<ComponentLogger>>,
        init: F,
    ) -> Result<Self>
    where
        F: FnOnce(&PoseSettings) -> anyhow::Result<M>,
    {
        emit(
            logger.as_deref(),
            LogLevel::Debug,
            "Starting pose model initialization",
        );

        let settings = match store.map(|s| s.load(ConfigKind::Project)) {
            Some(Ok(tree)) => PoseSettings::from_project(&tree),
            Some(Err(e)) => {
                emit(
                    logger.as_deref(),
                    LogLevel::Warning,
                    &format!("Config not available ({}), using fallback values", e),
                );
                PoseSettings::default()
            }
            None => {
                emit(
                    logger.as_deref(),
                    LogLevel::Warning,
                    "Config not available, using fallback values",
                );
                PoseSettings::default()
            }
        };

        emit(
            logger.as_deref(),
            LogLevel::Debug,
            &format!(
                "Using config: complexity={}, detection_conf={}",
                settings.model_complexity, settings.min_detection_confidence
            ),
        );

        let model = init(&settings).map_err(|e| {
            let err = Error::new(
                ErrorCode::ModelError,
                format!("Failed to initialize pose model: {:#}", e),
            );
            emit(logger.as_deref(), LogLevel::Error, &err.message);
            err
        })?;

        emit(
            logger.as_deref(),
            LogLevel::Info,
            &format!(
                "Pose model initialized successfully with complexity={}",
                settings.model_complexity
            ),
        );
        Ok(Self::new(model, settings, logger))
    }

    pub fn settings(&self) -> &PoseSettings {
        &self.settings
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Validate a BGR frame, convert it to RGB and run the model on it.
    pub fn process_single_frame(&mut self, frame: &Frame) -> Result<PoseResult> {
        self.log(
            LogLevel::Debug,
            &format!(
                "Starting frame processing: shape=({}, {}, {})",
                frame.height, frame.width, frame.channels
            ),
        );

        if let Err(e) = frame.validate() {
            self.log(LogLevel::Error, &e.message);
            return Err(e);
        }

        let rgb = frame.to_rgb();
        let start = Instant::now();
        let result = self.model.process(&rgb).map_err(|e| {
            let err = Error::model(format!("{:#}", e));
            self.log(LogLevel::Error, &err.message);
            err
        })?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result.landmarks.as_ref() {
            Some(landmarks) if !landmarks.is_empty() => self.log(
                LogLevel::Info,
                &format!(
                    "Pose detection successful: {} landmarks detected in {:.1}ms",
                    landmarks.len(),
                    elapsed_ms
                ),
            ),
            _ => self.log(
                LogLevel::Warning,
                &format!(
                    "No pose detected in frame (processing time: {:.1}ms)",
                    elapsed_ms
                ),
            ),
        }
        Ok(result)
    }

    fn log(&self, level: LogLevel, message: &str) {
        emit(self.logger.as_deref(), level, message);
    }
}
