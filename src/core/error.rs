//! Error taxonomy for a pipeline run
//!
//! Cancellations are carried as errors so that every early exit travels
//! through the same `?` path (and the same workspace release), but they
//! are reported as soft non-successes rather than failures.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::Stage;

/// Interactive point at which the user can back out of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPoint {
    /// The source video picker
    SourceFile,
    /// The burner drive picker
    Drive,
    /// The ISO save-as picker
    SaveDestination,
}

impl fmt::Display for CancelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            CancelPoint::SourceFile => "File selection was canceled.",
            CancelPoint::Drive => "Drive selection was canceled.",
            CancelPoint::SaveDestination => "ISO save was canceled.",
        };
        f.write_str(message)
    }
}

/// Everything that can end a run early
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The user backed out at one of the selection points.
    #[error("{0}")]
    SelectionCanceled(CancelPoint),

    /// The tool binary could not be started (missing, not executable).
    #[error("could not launch {stage} tool {program}: {source}")]
    Launch {
        stage: Stage,
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{stage} step ({tool}) {}", describe_exit(.exit_code))]
    StageFailed {
        stage: Stage,
        tool: String,
        exit_code: Option<i32>,
    },

    /// The tool ran past the configured per-stage limit and was killed.
    #[error("{stage} step ({tool}) did not finish within {}s and was stopped", .limit.as_secs())]
    StageTimedOut {
        stage: Stage,
        tool: String,
        limit: Duration,
    },

    /// The authored content is missing its required marker file.
    #[error(
        "DVD structure incomplete: {} not found. dvdauthor may have failed. Check the logs above for errors.",
        .missing.display()
    )]
    Validation { missing: PathBuf },

    /// Scratch workspace or output file handling failed.
    #[error("{context}: {source}")]
    Resource {
        context: String,
        #[source]
        source: io::Error,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl PipelineError {
    pub fn canceled(point: CancelPoint) -> Self {
        Self::SelectionCanceled(point)
    }

    pub fn resource(context: impl Into<String>, source: io::Error) -> Self {
        Self::Resource {
            context: context.into(),
            source,
        }
    }

    /// True for user-initiated exits, which are not failures
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::SelectionCanceled(_))
    }
}
