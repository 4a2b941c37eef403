//! Run request and device selection types

use std::path::{Path, PathBuf};

/// Video container extensions the source picker accepts
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi"];

/// Check whether a path looks like a video the transcoder is offered
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_VIDEO_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// What the caller asked for: build an image only, or burn it too
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BurnRequest {
    pub image_only: bool,
}

/// A request once the source video has been chosen
///
/// Immutable for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub source_video: PathBuf,
    pub image_only: bool,
}

impl PipelineRequest {
    /// File name of the source, for user-facing messages
    pub fn source_name(&self) -> String {
        self.source_video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_video.display().to_string())
    }
}

/// Outcome of drive resolution, computed once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveSelection {
    /// Burn to this device
    Device(String),
    /// No usable burner: fall back to saving the image
    NoDevice,
}

impl DriveSelection {
    pub fn device(&self) -> Option<&str> {
        match self {
            DriveSelection::Device(d) => Some(d),
            DriveSelection::NoDevice => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_video(Path::new("/movies/movie.mp4")));
        assert!(is_supported_video(Path::new("clip.MOV")));
        assert!(is_supported_video(Path::new("a.b.mkv")));
        assert!(!is_supported_video(Path::new("notes.txt")));
        assert!(!is_supported_video(Path::new("noextension")));
    }

    #[test]
    fn test_source_name_is_file_name() {
        let request = PipelineRequest {
            source_video: PathBuf::from("/Users/me/Movies/movie.mp4"),
            image_only: false,
        };
        assert_eq!(request.source_name(), "movie.mp4");
    }

    #[test]
    fn test_drive_selection_device() {
        assert_eq!(
            DriveSelection::Device("/dev/disk2".into()).device(),
            Some("/dev/disk2")
        );
        assert_eq!(DriveSelection::NoDevice.device(), None);
    }
}
