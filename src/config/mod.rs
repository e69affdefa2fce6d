//! Hierarchical configuration.
//!
//! Configuration lives in one directory of numbered YAML files:
//! - **Project** (`10_*.yaml` .. `19_*.yaml`) - video, pose detection, GUI,
//!   analysis, machine learning and application settings
//! - **Infrastructure** (`20_*.yaml` .. `29_*.yaml`) - logging
//!
//! ## Merge Strategy
//! Files of one kind are deep-merged in file-name order; later files win on
//! conflicting leaves, nested mappings are unioned.
//!
//! ## Environment Variables
//! - `GUITAR_TRAINER_CONFIG_DIR` - Configuration directory (default: `./config`)
//! - `GUITAR_TRAINER_LOG_DIR` - Log directory (default: `./logs`)

mod loader;
mod merge;
mod tree;
mod types;

pub use loader::{ConfigKind, ConfigPaths, ConfigStore};
pub use merge::{deep_merge, deep_merge_all};
pub use tree::{get_as, get_nested, lookup};
pub use types::*;
