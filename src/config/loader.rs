//! Configuration loader with numbered-file consolidation.
//!
//! Each kind owns a two-digit prefix range. All files in that range are
//! merged in file-name order and the result is cached until reloaded.

use super::merge::deep_merge_all;
use super::types::{InfrastructureConfig, ProjectConfig};
use crate::error::{Error, Result};
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, warn};

/// Configuration category, each sourced from its own file-name range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKind {
    /// Business-domain settings, files `10_*.yaml` through `19_*.yaml`
    Project,
    /// Operational settings (logging), files `20_*.yaml` through `29_*.yaml`
    Infrastructure,
}

impl ConfigKind {
    /// Human-readable prefix range, e.g. `10-19`.
    pub fn range(self) -> &'static str {
        match self {
            ConfigKind::Project => "10-19",
            ConfigKind::Infrastructure => "20-29",
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            ConfigKind::Project => r"^1[0-9]_.*\.yaml$",
            ConfigKind::Infrastructure => r"^2[0-9]_.*\.yaml$",
        }
    }

    /// Whether the kind must match at least one file.
    pub fn is_mandatory(self) -> bool {
        matches!(self, ConfigKind::Project)
    }
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigKind::Project => write!(f, "project"),
            ConfigKind::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

impl std::str::FromStr for ConfigKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(ConfigKind::Project),
            "infrastructure" | "infra" => Ok(ConfigKind::Infrastructure),
            other => Err(format!("unknown config kind '{}'", other)),
        }
    }
}

/// Directories the application reads configuration from and writes logs to.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Directory holding the numbered YAML files
    pub config_dir: PathBuf,
    /// Directory receiving one rotating log file per component
    pub logs_dir: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover paths from the environment, defaulting to `./config` and `./logs`.
    pub fn discover() -> Self {
        let config_dir = std::env::var("GUITAR_TRAINER_CONFIG_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config"));

        let logs_dir = std::env::var("GUITAR_TRAINER_LOG_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        Self {
            config_dir,
            logs_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(config_dir: impl Into<PathBuf>, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            logs_dir: logs_dir.into(),
        }
    }
}

/// Consolidated configuration for both kinds, cached per kind.
#[derive(Debug)]
pub struct ConfigStore {
    config_dir: PathBuf,
    cache: Mutex<HashMap<ConfigKind, Arc<Value>>>,
}

impl ConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Store rooted at the discovered configuration directory.
    pub fn from_paths(paths: &ConfigPaths) -> Self {
        Self::new(paths.config_dir.clone())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the merged tree for `kind`, building it on first use.
    ///
    /// Repeated calls return the same `Arc` until [`ConfigStore::reload`].
    pub fn load(&self, kind: ConfigKind) -> Result<Arc<Value>> {
        let mut cache = self.lock_cache();
        if let Some(tree) = cache.get(&kind) {
            return Ok(Arc::clone(tree));
        }
        let tree = Arc::new(self.build(kind)?);
        cache.insert(kind, Arc::clone(&tree));
        Ok(tree)
    }

    /// Drop the cached tree for `kind` and merge the files again.
    pub fn reload(&self, kind: ConfigKind) -> Result<Arc<Value>> {
        let mut cache = self.lock_cache();
        cache.remove(&kind);
        let tree = Arc::new(self.build(kind)?);
        cache.insert(kind, Arc::clone(&tree));
        Ok(tree)
    }

    /// Typed view of the project tree.
    pub fn project(&self) -> Result<ProjectConfig> {
        let tree = self.load(ConfigKind::Project)?;
        Ok(ProjectConfig::from_tree(&tree))
    }

    /// Typed view of the infrastructure tree.
    pub fn infrastructure(&self) -> Result<InfrastructureConfig> {
        let tree = self.load(ConfigKind::Infrastructure)?;
        Ok(InfrastructureConfig::from_tree(&tree))
    }

    /// Files that belong to `kind`, in merge order.
    pub fn source_files(&self, kind: ConfigKind) -> Result<Vec<PathBuf>> {
        let pattern = Regex::new(kind.pattern()).map_err(|e| {
            Error::new(crate::error::ErrorCode::IoError, e.to_string())
        })?;

        let entries = match std::fs::read_dir(&self.config_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.config_dir, e)),
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| pattern.is_match(n))
            })
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn build(&self, kind: ConfigKind) -> Result<Value> {
        let files = self.source_files(kind)?;

        if files.is_empty() {
            if kind.is_mandatory() {
                return Err(Error::config_not_found(&self.config_dir, kind.range()));
            }
            warn!(
                "No {} configuration files found ({} range) in {}",
                kind,
                kind.range(),
                self.config_dir.display()
            );
            return Ok(Value::Object(Map::new()));
        }

        let mut documents = Vec::with_capacity(files.len());
        for file in &files {
            debug!("Loading {} config: {}", kind, file.display());
            if let Some(doc) = read_document(file)? {
                documents.push(doc);
            }
        }
        Ok(deep_merge_all(documents))
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<ConfigKind, Arc<Value>>> {
        // A panic while holding the lock leaves at worst a missing entry.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parse one YAML document. Empty documents yield `None`.
fn read_document(file: &Path) -> Result<Option<Value>> {
    let content = std::fs::read_to_string(file).map_err(|e| {
        error!("Error loading {}: {}", file.display(), e);
        Error::io(file, e)
    })?;

    if is_blank_document(&content) {
        return Ok(None);
    }

    let value: Value = serde_yaml::from_str(&content).map_err(|e| {
        error!("Error parsing {}: {}", file.display(), e);
        Error::config_parse(file, e)
    })?;

    match value {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(Some(value)),
        _ => Err(Error::config_parse(
            file,
            "top level must be a mapping of keys to values",
        )),
    }
}

/// True when the document holds only comments, blank lines and markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}
