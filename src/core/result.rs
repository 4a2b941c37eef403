//! Result reporting
//!
//! Maps the terminal state of a run onto the single value handed back to
//! the caller. Exactly one of `log`/`error` is populated.

use serde::Serialize;
use std::path::PathBuf;

use super::PipelineError;

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The image was copied to a user-chosen destination
    ImageSaved { destination: PathBuf },
    /// The image was written to a disc
    Burned { source_name: String, device: String },
}

/// Externally visible outcome of `burn_disc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the run stopped at a picker rather than on an error
    #[serde(skip)]
    pub canceled: bool,
}

impl PipelineResult {
    fn succeeded(log: String) -> Self {
        Self {
            success: true,
            log: Some(log),
            error: None,
            canceled: false,
        }
    }

    fn failed(error: String, canceled: bool) -> Self {
        Self {
            success: false,
            log: None,
            error: Some(error),
            canceled,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }
}

/// Render a finished run
pub fn report(outcome: Result<Completion, PipelineError>) -> PipelineResult {
    match outcome {
        Ok(Completion::ImageSaved { destination }) => {
            PipelineResult::succeeded(format!("ISO file saved to {}", destination.display()))
        }
        Ok(Completion::Burned {
            source_name,
            device,
        }) => PipelineResult::succeeded(format!(
            "Successfully burned {} to {}.",
            source_name, device
        )),
        Err(e) if e.is_cancellation() => PipelineResult::failed(e.to_string(), true),
        Err(e) => PipelineResult::failed(
            format!("An error occurred during the process: {}", e),
            false,
        ),
    }
}
