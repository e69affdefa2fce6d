//! Video input: path and format checks, pluggable decoding backends, and the
//! loader that ties them together.

mod backend;
mod ffprobe;
mod loader;
mod utils;

pub use backend::{StreamProperties, VideoBackend, VideoHandle};
pub use ffprobe::{FfprobeBackend, FfprobeHandle};
pub use loader::{COMPONENT, VideoLoader, VideoMetadata};
pub use utils::{check_file, check_file_exists, supported_video_formats, validate_video_format};
