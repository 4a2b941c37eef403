//! Burning module - video to DVD image, and image to disc
//!
//! This module is UI-agnostic. Decisions come in through the `Prompter`
//! trait, drives through `DriveEnumerator`, and every external tool runs
//! through a `StageExecutor`.

mod drives;
mod orchestrator;
mod prompts;
mod runner;
mod stages;
mod structure;
mod workspace;

pub use drives::PlatformDrives;
pub use orchestrator::Pipeline;
pub use prompts::Prompter;
pub use runner::{LogSink, ProcessRunner};

#[cfg(test)]
pub use drives::DriveEnumerator;
#[cfg(test)]
pub use runner::{OutputSink, StageExecutor, StageOutcome, StreamKind};
#[cfg(test)]
pub use stages::StageInvocation;
