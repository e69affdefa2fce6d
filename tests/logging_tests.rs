//! Integration tests for per-component logging.
//!
//! Uses `rotation_when: never` so each component writes to a fixed
//! `<component>.log` file that can be read back.

use guitar_trainer::config::{ConfigStore, LoggingSettings};
use guitar_trainer::logging::{LogLevel, LoggerFactory};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// File-only settings with a fixed file name per component.
fn quiet_settings() -> LoggingSettings {
    LoggingSettings {
        enable_console: false,
        rotation_when: "never".to_string(),
        ..LoggingSettings::default()
    }
}

fn read_log(dir: &TempDir, component: &str) -> String {
    fs::read_to_string(dir.path().join(format!("{}.log", component))).unwrap_or_default()
}

#[test]
fn test_creates_logs_directory() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("nested").join("logs");
    let factory = LoggerFactory::with_settings(&logs, quiet_settings()).unwrap();
    assert!(logs.is_dir());
    assert_eq!(factory.logs_dir(), logs.as_path());
}

#[test]
fn test_same_component_same_logger() {
    let temp = TempDir::new().unwrap();
    let factory = LoggerFactory::with_settings(temp.path(), quiet_settings()).unwrap();

    let a = factory.get_logger("video_input").unwrap();
    let b = factory.get_logger("video_input").unwrap();
    let c = factory.get_logger("gui").unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(factory.components(), vec!["gui", "video_input"]);
}

#[test]
fn test_component_writes_own_file() {
    let temp = TempDir::new().unwrap();
    let factory = LoggerFactory::with_settings(temp.path(), quiet_settings()).unwrap();

    let video = factory.get_logger("video_input").unwrap();
    let pose = factory.get_logger("pose_detection").unwrap();
    video.info("opening lesson.mp4");
    pose.warning("no person in frame");

    assert_eq!(video.log_file(), temp.path().join("video_input.log"));

    let video_log = read_log(&temp, "video_input");
    let pose_log = read_log(&temp, "pose_detection");
    assert!(video_log.contains("opening lesson.mp4"));
    assert!(video_log.contains("Logger initialized for component 'video_input' with level 'DEBUG'"));
    assert!(!video_log.contains("no person in frame"));
    assert!(pose_log.contains("no person in frame"));
    assert!(pose_log.contains("WARN"));
}

#[test]
fn test_component_level_filters_file() {
    let temp = TempDir::new().unwrap();
    let factory = LoggerFactory::with_settings(temp.path(), quiet_settings()).unwrap();

    // analysis defaults to INFO, video_input to DEBUG
    let analysis = factory.get_logger("analysis").unwrap();
    let video = factory.get_logger("video_input").unwrap();
    assert_eq!(analysis.level(), LogLevel::Info);
    assert_eq!(video.level(), LogLevel::Debug);

    analysis.debug("hidden detail");
    analysis.critical("disk full");
    video.debug("frame 12 decoded");

    let analysis_log = read_log(&temp, "analysis");
    assert!(!analysis_log.contains("hidden detail"));
    assert!(analysis_log.contains("disk full"));
    assert!(read_log(&temp, "video_input").contains("frame 12 decoded"));
}

#[test]
fn test_unknown_component_uses_default_level() {
    let temp = TempDir::new().unwrap();
    let settings = LoggingSettings {
        default_level: LogLevel::Warning,
        ..quiet_settings()
    };
    let factory = LoggerFactory::with_settings(temp.path(), settings).unwrap();
    let logger = factory.get_logger("plugin").unwrap();
    assert_eq!(logger.level(), LogLevel::Warning);

    logger.info("not recorded");
    logger.error("recorded");
    let log = read_log(&temp, "plugin");
    assert!(!log.contains("not recorded"));
    assert!(log.contains("recorded"));
}

#[test]
fn test_settings_from_config_store() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    fs::create_dir(&config).unwrap();
    fs::write(
        config.join("20_logging.yaml"),
        "logging:\n  default_level: ERROR\n  component_levels:\n    gui: DEBUG\n  \
         enable_console: false\n  rotation_when: never\n",
    )
    .unwrap();

    let store = ConfigStore::new(&config);
    let factory = LoggerFactory::init(temp.path().join("logs"), Some(&store)).unwrap();

    assert_eq!(factory.settings().default_level, LogLevel::Error);
    // keys absent from the file keep their defaults
    assert_eq!(factory.settings().console_level, LogLevel::Info);
    assert_eq!(factory.settings().backup_count, 30);
    assert_eq!(factory.get_logger("gui").unwrap().level(), LogLevel::Debug);
    // the override map replaces the default one
    assert_eq!(factory.get_logger("main").unwrap().level(), LogLevel::Error);
}

#[test]
fn test_invalid_logging_section_uses_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("20_logging.yaml"),
        "logging:\n  default_level: LOUD\n",
    )
    .unwrap();

    let store = ConfigStore::new(temp.path());
    let factory = LoggerFactory::init(temp.path().join("logs"), Some(&store)).unwrap();
    assert_eq!(factory.settings(), &LoggingSettings::default());
}

#[test]
fn test_startup_banner_goes_to_main_log() {
    let temp = TempDir::new().unwrap();
    let factory = LoggerFactory::with_settings(temp.path(), quiet_settings()).unwrap();
    factory.log_startup_banner();

    let log = read_log(&temp, "main");
    assert!(log.contains(&"=".repeat(60)));
    assert!(log.contains("GuitarTrainer Application Started"));
    assert!(log.contains("Timestamp: "));
    assert!(log.contains(&format!("Logs directory: {}", temp.path().display())));
    assert!(log.contains("Logging config: "));
    assert!(log.contains("\"rotation_when\":\"never\""));
}

#[test]
fn test_daily_rotation_names_file_by_date() {
    let temp = TempDir::new().unwrap();
    let settings = LoggingSettings {
        enable_console: false,
        ..LoggingSettings::default()
    };
    let factory = LoggerFactory::with_settings(temp.path(), settings).unwrap();
    let logger = factory.get_logger("gui").unwrap();
    logger.info("window opened");

    let file = logger.log_file();
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    assert_eq!(file, temp.path().join(format!("gui.{}.log", today)));
    assert!(fs::read_to_string(&file).unwrap().contains("window opened"));
    assert!(!temp.path().join("gui.log").exists());
}
