//! GuitarTrainer command line
//!
//! Thin front end over the library: inspects the layered configuration,
//! probes video files through the loader and writes the startup banner.

use anyhow::{Context, Result};
use clap::Parser;
use guitar_trainer::cli::{Cli, Command, ConfigCommand, KindOpt, ProbeArgs};
use guitar_trainer::config::{ConfigKind, ConfigPaths, ConfigStore, lookup};
use guitar_trainer::logging::LoggerFactory;
use guitar_trainer::video::{self, VideoLoader};
use std::process::ExitCode;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Command line overrides environment, environment overrides ./config and ./logs
    let mut paths = ConfigPaths::discover();
    if let Some(dir) = cli.config_dir {
        paths.config_dir = dir;
    }
    if let Some(dir) = cli.log_dir {
        paths.logs_dir = dir;
    }
    debug!(
        config_dir = %paths.config_dir.display(),
        logs_dir = %paths.logs_dir.display(),
        "Resolved paths"
    );

    let store = ConfigStore::from_paths(&paths);

    match cli.command {
        Command::Config(command) => run_config(&store, command),
        Command::Probe(args) => run_probe(&paths, &store, args),
        Command::Banner => run_banner(&paths, &store),
    }
}

fn run_config(store: &ConfigStore, command: ConfigCommand) -> Result<ExitCode> {
    match command {
        ConfigCommand::Show(KindOpt { kind }) => {
            let kind = ConfigKind::from(kind);
            let tree = store.load(kind)?;
            println!("{}", serde_json::to_string_pretty(&*tree)?);
        }
        ConfigCommand::Get { path, kind } => {
            let kind = ConfigKind::from(kind.kind);
            let tree = store.load(kind)?;
            let Some(value) = lookup(&tree, &path) else {
                eprintln!("No value at '{}' in {} configuration", path, kind);
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Files(KindOpt { kind }) => {
            let kind = ConfigKind::from(kind);
            let files = store.source_files(kind)?;
            if files.is_empty() {
                eprintln!(
                    "No {} configuration files ({} range) in {}",
                    kind,
                    kind.range(),
                    store.config_dir().display()
                );
            }
            for file in files {
                println!("{}", file.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_probe(paths: &ConfigPaths, store: &ConfigStore, args: ProbeArgs) -> Result<ExitCode> {
    let loggers = LoggerFactory::global(&paths.logs_dir, Some(store))
        .context("Failed to initialize component loggers")?;

    let video_log = loggers.get_logger(video::COMPONENT)?.log_file();
    let mut loader = VideoLoader::from_config(Some(store), Some(loggers.as_ref()));
    if !loader.load(&args.video) {
        eprintln!(
            "Could not load {} (see {} for details)",
            args.video.display(),
            video_log.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    let metadata = loader.metadata_map();
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    loader.close();
    Ok(ExitCode::SUCCESS)
}

fn run_banner(paths: &ConfigPaths, store: &ConfigStore) -> Result<ExitCode> {
    let loggers = LoggerFactory::global(&paths.logs_dir, Some(store))
        .context("Failed to initialize component loggers")?;
    loggers.log_startup_banner();

    let main = loggers.get_logger("main")?;
    println!("{}", main.log_file().display());
    Ok(ExitCode::SUCCESS)
}
