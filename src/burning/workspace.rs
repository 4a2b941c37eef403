//! Per-run scratch workspace
//!
//! Layout: `<scratch>/dvd-<uuid>/{video.mpg, dvd_content/, output.iso}`.
//! Each run owns its own uniquely named root, so concurrent runs never
//! share intermediate files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::PipelineError;

const WORKSPACE_PREFIX: &str = "dvd-";
const TRANSCODED_MEDIA: &str = "video.mpg";
const AUTHORED_CONTENT: &str = "dvd_content";
const IMAGE_FILE: &str = "output.iso";

/// Scratch directory for one run
///
/// Removed on `release()`, or on drop if the run is abandoned (panic,
/// dropped future) before it gets there.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create a fresh, uniquely named workspace under `parent`
    pub fn acquire(parent: &Path) -> Result<Self, PipelineError> {
        fs::create_dir_all(parent).map_err(|e| {
            PipelineError::resource(
                format!("Failed to prepare scratch directory {}", parent.display()),
                e,
            )
        })?;

        let root = parent.join(format!("{}{}", WORKSPACE_PREFIX, uuid::Uuid::new_v4()));

        // create_dir (not create_dir_all) fails if the name is somehow taken
        fs::create_dir(&root).map_err(|e| {
            PipelineError::resource(
                format!("Failed to create workspace {}", root.display()),
                e,
            )
        })?;

        log::info!("Created workspace at {}", root.display());
        Ok(Self {
            root,
            released: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output of the transcode stage
    pub fn transcoded_media(&self) -> PathBuf {
        self.root.join(TRANSCODED_MEDIA)
    }

    /// Directory populated by the authoring stages
    pub fn authored_content(&self) -> PathBuf {
        self.root.join(AUTHORED_CONTENT)
    }

    /// Output of the build-image stage
    pub fn image(&self) -> PathBuf {
        self.root.join(IMAGE_FILE)
    }

    /// Recursively delete the workspace
    ///
    /// Idempotent: a missing root is not an error.
    pub fn release(&mut self) -> Result<(), PipelineError> {
        self.released = true;
        remove_tree(&self.root).map_err(|e| {
            PipelineError::resource(
                format!("Failed to remove workspace {}", self.root.display()),
                e,
            )
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = remove_tree(&self.root)
        {
            log::warn!("Failed to remove workspace {}: {}", self.root.display(), e);
        }
    }
}

fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            log::debug!("Removed workspace {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Total size in bytes of all files under `dir`
pub fn tree_size(dir: &Path) -> u64 {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_unique_roots() {
        let temp_dir = TempDir::new().unwrap();

        let first = Workspace::acquire(temp_dir.path()).unwrap();
        let second = Workspace::acquire(temp_dir.path()).unwrap();

        assert!(first.root().is_dir());
        assert!(second.root().is_dir());
        assert_ne!(first.root(), second.root());
        assert!(
            first
                .root()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("dvd-")
        );
    }

    #[test]
    fn test_derived_paths_are_children_of_root() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::acquire(temp_dir.path()).unwrap();

        assert_eq!(workspace.transcoded_media(), workspace.root().join("video.mpg"));
        assert_eq!(workspace.authored_content(), workspace.root().join("dvd_content"));
        assert_eq!(workspace.image(), workspace.root().join("output.iso"));
    }

    #[test]
    fn test_release_removes_tree() {
        let temp_dir = TempDir::new().unwrap();
        let mut workspace = Workspace::acquire(temp_dir.path()).unwrap();
        let root = workspace.root().to_path_buf();

        fs::create_dir_all(workspace.authored_content().join("VIDEO_TS")).unwrap();
        fs::write(workspace.image(), b"iso").unwrap();

        workspace.release().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_release_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut workspace = Workspace::acquire(temp_dir.path()).unwrap();
        let root = workspace.root().to_path_buf();

        workspace.release().unwrap();
        workspace.release().unwrap();
        assert!(!root.exists());

        // Removed out from under us before the first release
        let mut other = Workspace::acquire(temp_dir.path()).unwrap();
        fs::remove_dir_all(other.root()).unwrap();
        assert!(other.release().is_ok());
    }

    #[test]
    fn test_drop_removes_unreleased_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let root = {
            let workspace = Workspace::acquire(temp_dir.path()).unwrap();
            workspace.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn test_acquire_fails_with_resource_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = Workspace::acquire(&blocker).unwrap_err();
        assert!(matches!(err, PipelineError::Resource { .. }));
    }

    #[test]
    fn test_tree_size() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("a"), vec![0u8; 10]).unwrap();
        fs::write(temp_dir.path().join("sub").join("b"), vec![0u8; 5]).unwrap();

        assert_eq!(tree_size(temp_dir.path()), 15);
    }
}
