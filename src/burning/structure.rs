//! DVD-Video structure validation
//!
//! dvdauthor can exit 0 and still leave a titleset without the top-level
//! `VIDEO_TS.IFO`. mkisofs `-dvd-video` then fails in confusing ways, so
//! the marker is checked before the image is built.

use std::path::{Path, PathBuf};

use crate::core::PipelineError;

/// Location of the required index file inside a content directory
pub fn marker_path(content_dir: &Path) -> PathBuf {
    content_dir.join("VIDEO_TS").join("VIDEO_TS.IFO")
}

/// True when the content directory carries the video manager index
pub fn is_structurally_complete(content_dir: &Path) -> bool {
    marker_path(content_dir).is_file()
}

/// Gate for the build-image stage
pub fn validate_structure(content_dir: &Path) -> Result<(), PipelineError> {
    let marker = marker_path(content_dir);
    if is_structurally_complete(content_dir) {
        log::info!("DVD structure verified: {}", marker.display());
        Ok(())
    } else {
        log::error!("DVD structure incomplete, missing {}", marker.display());
        Err(PipelineError::Validation { missing: marker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_complete_structure_passes() {
        let temp_dir = TempDir::new().unwrap();
        let video_ts = temp_dir.path().join("VIDEO_TS");
        fs::create_dir(&video_ts).unwrap();
        fs::write(video_ts.join("VIDEO_TS.IFO"), b"DVDVIDEO-VMG").unwrap();

        assert!(is_structurally_complete(temp_dir.path()));
        assert!(validate_structure(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_titleset_only_fails() {
        let temp_dir = TempDir::new().unwrap();
        let video_ts = temp_dir.path().join("VIDEO_TS");
        fs::create_dir(&video_ts).unwrap();
        fs::write(video_ts.join("VTS_01_0.IFO"), b"DVDVIDEO-VTS").unwrap();

        assert!(!is_structurally_complete(temp_dir.path()));
        match validate_structure(temp_dir.path()) {
            Err(PipelineError::Validation { missing }) => {
                assert_eq!(missing, marker_path(temp_dir.path()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_directory_fails() {
        assert!(!is_structurally_complete(Path::new("/nonexistent/dvd_content")));
    }

    #[test]
    fn test_marker_must_be_a_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("VIDEO_TS").join("VIDEO_TS.IFO")).unwrap();

        assert!(!is_structurally_complete(temp_dir.path()));
    }
}
