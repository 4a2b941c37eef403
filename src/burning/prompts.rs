//! Interactive collaborators the pipeline asks for decisions
//!
//! Every method returns `None` when the user backs out.

use std::path::{Path, PathBuf};

const DEFAULT_IMAGE_NAME: &str = "output.iso";

pub trait Prompter {
    /// Pick the source video
    fn select_source(&self) -> Option<PathBuf>;

    /// Pick one of `drives` by index
    fn choose_drive(&self, drives: &[String]) -> Option<usize>;

    /// Pick where the finished image goes, starting from `default`
    fn choose_save_path(&self, default: &Path) -> Option<PathBuf>;
}

/// `~/Documents/output.iso`, falling back to home, then the current dir
pub fn default_save_path() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_IMAGE_NAME)
}

/// Turn the user's answer into the file the image is copied to
///
/// An existing directory receives `output.iso`; an extension-less file
/// name gets an `.iso` suffix.
pub fn resolve_save_path(path: PathBuf) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_IMAGE_NAME)
    } else if path.extension().is_some() {
        path
    } else {
        path.with_extension("iso")
    }
}
