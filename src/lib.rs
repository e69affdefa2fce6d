//! GuitarTrainer core library
//!
//! Layered YAML configuration, per-component rotating logs, validated video
//! loading and the pose detection front end.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pose;
pub mod video;
