//! Core run types
//!
//! This module contains:
//! - The run request and drive selection values
//! - Stage and run-state enums
//! - The error taxonomy
//! - Mapping of a finished run to the caller-visible result
//! - Persisted settings (tool paths, video standard, timeouts)

mod error;
mod request;
mod result;
mod settings;
mod stage;

pub use error::{CancelPoint, PipelineError};
pub use request::{BurnRequest, DriveSelection, PipelineRequest, is_supported_video};
pub use result::{Completion, PipelineResult, report};
pub use settings::{BurnBackend, Settings};
pub use stage::{PipelineState, Stage};

#[cfg(test)]
pub use settings::VideoStandard;
