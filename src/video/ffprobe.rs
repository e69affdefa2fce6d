//! FFprobe-backed video backend.
//!
//! Opening a file runs `ffprobe` once and keeps the parsed stream
//! properties; the handle holds no OS resources beyond that snapshot.

use super::backend::{StreamProperties, VideoBackend, VideoHandle};
use crate::error::{Error, ErrorCode, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

// =============================================================================
// FFprobe JSON Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
}

// =============================================================================
// Backend
// =============================================================================

/// Backend that probes files with the `ffprobe` program.
#[derive(Debug, Clone)]
pub struct FfprobeBackend {
    program: PathBuf,
}

impl Default for FfprobeBackend {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl VideoBackend for FfprobeBackend {
    type Handle = FfprobeHandle;

    fn name(&self) -> &str {
        "ffprobe"
    }

    fn open(&self, path: &Path) -> Result<FfprobeHandle> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                Error::new(
                    ErrorCode::IoError,
                    format!("Failed to run {}: {}", self.program.display(), e),
                )
                .with_path(path)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::new(
                ErrorCode::FormatError,
                format!("ffprobe could not open video file: {}", stderr.trim()),
            )
            .with_path(path));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let properties = parse_probe_output(&json).map_err(|e| e.with_path(path))?;
        Ok(FfprobeHandle {
            path: path.to_path_buf(),
            properties,
            opened: true,
        })
    }
}

/// Probe result for one file.
#[derive(Debug, Clone)]
pub struct FfprobeHandle {
    path: PathBuf,
    properties: StreamProperties,
    opened: bool,
}

impl FfprobeHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoHandle for FfprobeHandle {
    fn is_opened(&self) -> bool {
        self.opened
    }

    fn properties(&self) -> Result<StreamProperties> {
        if !self.opened {
            return Err(Error::new(
                ErrorCode::StreamError,
                format!("Handle already released: {}", self.path.display()),
            ));
        }
        Ok(self.properties)
    }

    fn release(&mut self) -> Result<()> {
        self.opened = false;
        Ok(())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Extract the first video stream's properties from ffprobe JSON.
fn parse_probe_output(json: &str) -> Result<StreamProperties> {
    let output: FFprobeOutput = serde_json::from_str(json).map_err(|e| {
        Error::new(
            ErrorCode::FormatError,
            format!("Failed to parse ffprobe output: {}", e),
        )
    })?;

    let stream = output
        .streams
        .unwrap_or_default()
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| Error::new(ErrorCode::FormatError, "No video stream found"))?;

    let fps = [&stream.r_frame_rate, &stream.avg_frame_rate]
        .into_iter()
        .flatten()
        .map(|rate| parse_frame_rate(rate))
        .find(|fps| *fps > 0.0)
        .unwrap_or(0.0);

    let frame_count = match stream.nb_frames.as_deref().and_then(|n| n.parse::<i64>().ok()) {
        Some(count) => count,
        None => {
            let duration = stream
                .duration
                .as_deref()
                .or(output.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0);
            (duration * fps).round() as i64
        }
    };

    Ok(StreamProperties {
        fps,
        frame_count,
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}

/// Parse a frame rate such as `30/1`, `30000/1001` or `25`. Invalid input is 0.
fn parse_frame_rate(rate: &str) -> f64 {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().unwrap_or(0.0);
            let den: f64 = den.trim().parse().unwrap_or(0.0);
            if den > 0.0 { num / den } else { 0.0 }
        }
        None => rate.trim().parse().unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "audio", "sample_rate": "48000"},
            {
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30000/1001",
                "avg_frame_rate": "30000/1001",
                "nb_frames": "300"
            }
        ],
        "format": {"duration": "10.010000"}
    }"#;

    #[test]
    fn test_parse_first_video_stream() {
        let props = parse_probe_output(SAMPLE).unwrap();
        assert_eq!(props.width, 1920);
        assert_eq!(props.height, 1080);
        assert_eq!(props.frame_count, 300);
        assert!((props.fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_frame_count_from_duration() {
        // Matroska streams usually lack nb_frames
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480,
                         "r_frame_rate": "0/0", "avg_frame_rate": "25/1"}],
            "format": {"duration": "4.0"}
        }"#;
        let props = parse_probe_output(json).unwrap();
        assert_eq!(props.fps, 25.0);
        assert_eq!(props.frame_count, 100);
    }

    #[test]
    fn test_no_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert_eq!(err.code, ErrorCode::FormatError);
    }

    #[test]
    fn test_parse_frame_rate_forms() {
        assert_eq!(parse_frame_rate("30/1"), 30.0);
        assert_eq!(parse_frame_rate("24"), 24.0);
        assert_eq!(parse_frame_rate("0/0"), 0.0);
        assert_eq!(parse_frame_rate("garbage"), 0.0);
    }

    #[test]
    fn test_missing_program_fails_open() {
        let backend = FfprobeBackend::new("/nonexistent/ffprobe-binary");
        let err = backend.open(Path::new("clip.mp4")).unwrap_err();
        assert_eq!(err.code, ErrorCode::IoError);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut handle = FfprobeHandle {
            path: PathBuf::from("clip.mp4"),
            properties: parse_probe_output(SAMPLE).unwrap(),
            opened: true,
        };
        handle.release().unwrap();
        handle.release().unwrap();
        assert!(!handle.is_opened());
        assert!(handle.properties().is_err());
    }
}
