//! CLI command definitions for guitar-trainer
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::ConfigKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Configuration category selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KindArg {
    /// Files 10-19 (video, pose detection, gui, analysis...)
    #[default]
    Project,
    /// Files 20-29 (logging)
    #[value(alias = "infra")]
    Infrastructure,
}

impl From<KindArg> for ConfigKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Project => ConfigKind::Project,
            KindArg::Infrastructure => ConfigKind::Infrastructure,
        }
    }
}

/// Guitar technique video tooling: configuration, logging and video probing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the numbered YAML files (overrides GUITAR_TRAINER_CONFIG_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for component log files (overrides GUITAR_TRAINER_LOG_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the consolidated configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Load a video and print its metadata as JSON
    Probe(ProbeArgs),

    /// Write the startup banner to the main log
    Banner,
}

/// `config` subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the merged tree as JSON
    Show(KindOpt),

    /// Print the value at a dotted path, e.g. `video.core.max_resolution`
    Get {
        /// Dotted key path
        path: String,

        #[command(flatten)]
        kind: KindOpt,
    },

    /// List the files merged for a kind, in merge order
    Files(KindOpt),
}

/// Shared `--kind` option.
#[derive(Args, Debug, Clone, Copy)]
pub struct KindOpt {
    /// Which configuration tree to read
    #[arg(long, value_enum, default_value_t = KindArg::Project)]
    pub kind: KindArg,
}

/// Arguments for the probe subcommand
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file to load
    pub video: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_get() {
        let cli = Cli::try_parse_from([
            "guitar-trainer",
            "--config-dir",
            "cfg",
            "config",
            "get",
            "video.core.supported_formats",
            "--kind",
            "infra",
        ])
        .unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("cfg")));
        match cli.command {
            Command::Config(ConfigCommand::Get { path, kind }) => {
                assert_eq!(path, "video.core.supported_formats");
                assert_eq!(ConfigKind::from(kind.kind), ConfigKind::Infrastructure);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_kind_defaults_to_project() {
        let cli = Cli::try_parse_from(["guitar-trainer", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show(KindOpt {
                kind: KindArg::Project
            }))
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["guitar-trainer", "probe", "clip.mp4", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Probe(_)));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
