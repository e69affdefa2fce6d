//! Configuration types and typed views over the merged trees.

use super::tree::lookup;
use crate::logging::{LogLevel, Rotation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// Extensions accepted when no `video.core.supported_formats` is configured.
pub const DEFAULT_SUPPORTED_FORMATS: [&str; 4] = [".mp4", ".avi", ".mov", ".mkv"];

fn section(tree: &Value, name: &str) -> Value {
    match tree.get(name) {
        Some(value @ Value::Object(_)) => value.clone(),
        _ => Value::Object(Map::new()),
    }
}

/// Consolidated project configuration (files 10-19).
///
/// Each section is an object; sections missing from every file are empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectConfig {
    pub video: Value,
    pub pose_detection: Value,
    pub gui: Value,
    pub analysis: Value,
    pub machine_learning: Value,
    pub application: Value,
}

impl ProjectConfig {
    pub const SECTIONS: [&'static str; 6] = [
        "video",
        "pose_detection",
        "gui",
        "analysis",
        "machine_learning",
        "application",
    ];

    pub fn from_tree(tree: &Value) -> Self {
        Self {
            video: section(tree, "video"),
            pose_detection: section(tree, "pose_detection"),
            gui: section(tree, "gui"),
            analysis: section(tree, "analysis"),
            machine_learning: section(tree, "machine_learning"),
            application: section(tree, "application"),
        }
    }
}

/// Consolidated infrastructure configuration (files 20-29).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfrastructureConfig {
    pub logging: Value,
}

impl InfrastructureConfig {
    pub fn from_tree(tree: &Value) -> Self {
        Self {
            logging: section(tree, "logging"),
        }
    }
}

/// Logging settings, read from the `logging` section of the infrastructure tree.
///
/// Keys absent from the configuration take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level used by components without an override.
    #[serde(default = "default_level")]
    pub default_level: LogLevel,

    /// Per-component level overrides.
    #[serde(default = "default_component_levels")]
    pub component_levels: BTreeMap<String, LogLevel>,

    /// Minimum level echoed to the console.
    #[serde(default = "default_level")]
    pub console_level: LogLevel,

    /// Whether component loggers also write to stderr.
    #[serde(default = "default_enable_console")]
    pub enable_console: bool,

    /// Rotation boundary: `midnight`, `hourly`, `minutely` or `never`.
    #[serde(default = "default_rotation_when")]
    pub rotation_when: String,

    /// Rotated files kept per component.
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            component_levels: default_component_levels(),
            console_level: default_level(),
            enable_console: default_enable_console(),
            rotation_when: default_rotation_when(),
            backup_count: default_backup_count(),
        }
    }
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

fn default_component_levels() -> BTreeMap<String, LogLevel> {
    [
        ("video_input", LogLevel::Debug),
        ("pose_detection", LogLevel::Info),
        ("gui", LogLevel::Info),
        ("analysis", LogLevel::Info),
        ("main", LogLevel::Info),
    ]
    .into_iter()
    .map(|(name, level)| (name.to_string(), level))
    .collect()
}

fn default_enable_console() -> bool {
    true
}

fn default_rotation_when() -> String {
    "midnight".to_string()
}

fn default_backup_count() -> usize {
    30 // a month of daily files
}

impl LoggingSettings {
    /// Build settings from the `logging` section.
    ///
    /// An empty section or one that fails to deserialize yields the defaults;
    /// the error, if any, is returned alongside for the caller to report.
    pub fn from_section(section: &Value) -> (Self, Option<String>) {
        match section {
            Value::Object(map) if map.is_empty() => (
                Self::default(),
                Some("No logging configuration found in infrastructure config".to_string()),
            ),
            Value::Object(_) => match serde_json::from_value(section.clone()) {
                Ok(settings) => (settings, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("Invalid logging configuration: {}", e)),
                ),
            },
            _ => (
                Self::default(),
                Some("Logging configuration is not a mapping".to_string()),
            ),
        }
    }

    /// Effective level for `component`.
    pub fn level_for(&self, component: &str) -> LogLevel {
        self.component_levels
            .get(component)
            .copied()
            .unwrap_or(self.default_level)
    }

    /// Parsed rotation boundary; unknown values fall back to daily.
    pub fn rotation(&self) -> (Rotation, bool) {
        match self.rotation_when.parse::<Rotation>() {
            Ok(rotation) => (rotation, true),
            Err(_) => (Rotation::Daily, false),
        }
    }
}

/// Maximum frame size, `[width, height]` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Resolution {
    /// Parse a two-element sequence of positive integers.
    pub fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        if items.len() != 2 {
            return None;
        }
        let width = u32::try_from(items[0].as_u64()?).ok()?;
        let height = u32::try_from(items[1].as_u64()?).ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }
}

/// Video loader settings from `video.core`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    /// Lower-case extensions with a leading dot.
    pub supported_formats: Vec<String>,
    /// Advisory ceiling; exceeding it only logs a warning.
    pub max_resolution: Option<Resolution>,
    /// Program used by the ffprobe backend.
    pub ffprobe_path: PathBuf,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            supported_formats: DEFAULT_SUPPORTED_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_resolution: None,
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}

/// Normalise an extension to `.ext` in lower case.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

impl VideoSettings {
    /// Read settings from the project tree, keeping defaults for absent keys.
    ///
    /// Malformed values are reported and ignored rather than half-applied.
    pub fn from_project(tree: &Value) -> Self {
        let mut settings = Self::default();

        if let Some(value) = lookup(tree, "video.core.supported_formats") {
            match serde_json::from_value::<Vec<String>>(value.clone()) {
                Ok(formats) if !formats.is_empty() => {
                    settings.supported_formats =
                        formats.iter().map(|f| normalize_extension(f)).collect();
                }
                _ => warn!(
                    "video.core.supported_formats must be a non-empty list of extensions, \
                     using defaults"
                ),
            }
        }

        match lookup(tree, "video.core.max_resolution") {
            None | Some(Value::Null) => {}
            Some(value) => match Resolution::from_value(value) {
                Some(resolution) => settings.max_resolution = Some(resolution),
                None => warn!(
                    "video.core.max_resolution must be [width, height] with positive integers, \
                     got {}; ignoring resolution limit",
                    value
                ),
            },
        }

        if let Some(path) = lookup(tree, "video.core.ffprobe_path").and_then(Value::as_str) {
            settings.ffprobe_path = PathBuf::from(path);
        }

        settings
    }

    /// Whether `ext` (any casing, with or without dot) is accepted.
    pub fn supports(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.supported_formats.iter().any(|f| *f == ext)
    }
}

/// Pose model parameters from `pose_detection.core`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSettings {
    #[serde(default)]
    pub static_image_mode: bool,

    /// 0 = lite, 1 = full, 2 = heavy.
    #[serde(default = "default_model_complexity")]
    pub model_complexity: u8,

    #[serde(default = "default_detection_confidence")]
    pub min_detection_confidence: f32,

    #[serde(default = "default_tracking_confidence")]
    pub min_tracking_confidence: f32,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            model_complexity: default_model_complexity(),
            min_detection_confidence: default_detection_confidence(),
            min_tracking_confidence: default_tracking_confidence(),
        }
    }
}

fn default_model_complexity() -> u8 {
    1
}

fn default_detection_confidence() -> f32 {
    0.6
}

fn default_tracking_confidence() -> f32 {
    0.5
}

impl PoseSettings {
    /// Read `pose_detection.core`, falling back to defaults when absent or invalid.
    pub fn from_project(tree: &Value) -> Self {
        let Some(core) = lookup(tree, "pose_detection.core") else {
            warn!("pose_detection.core not configured, using fallback values");
            return Self::default();
        };
        match serde_json::from_value::<Self>(core.clone()) {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(reason) => {
                    warn!("Invalid pose_detection.core ({}), using fallback values", reason);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Invalid pose_detection.core ({}), using fallback values", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.model_complexity > 2 {
            return Err(format!(
                "model_complexity must be 0, 1 or 2, got {}",
                self.model_complexity
            ));
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        Ok(())
    }
}
