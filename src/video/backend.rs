//! Seam between the loader and whatever actually opens video files.

use crate::error::Result;
use std::path::Path;

/// Raw stream properties as reported by a backend.
///
/// Signed so that corrupt streams reporting negative values can be rejected
/// by the loader instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamProperties {
    pub fps: f64,
    pub frame_count: i64,
    pub width: i64,
    pub height: i64,
}

/// An open video resource, exclusively owned by one loader.
pub trait VideoHandle {
    /// Whether the resource is still open.
    fn is_opened(&self) -> bool;

    /// Frame rate, frame count and dimensions of the primary video stream.
    fn properties(&self) -> Result<StreamProperties>;

    /// Release the resource. Calling it on a released handle is a no-op.
    fn release(&mut self) -> Result<()>;
}

/// Something that can open a path into a [`VideoHandle`].
pub trait VideoBackend {
    type Handle: VideoHandle;

    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Open `path`. A returned handle may still report `is_opened() == false`.
    fn open(&self, path: &Path) -> Result<Self::Handle>;
}
