//! Pipeline stages and run states

use std::fmt;

/// One external-tool step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Source video to DVD-compliant MPEG-2 program stream
    Transcode,
    /// MPEG stream to a titleset under the content directory
    Author,
    /// Second authoring pass that writes the top-level VIDEO_TS index
    FinalizeStructure,
    /// Content directory to a DVD-Video ISO image
    BuildImage,
    /// ISO image to physical media
    Burn,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Transcode => "transcode",
            Stage::Author => "author",
            Stage::FinalizeStructure => "finalize-structure",
            Stage::BuildImage => "build-image",
            Stage::Burn => "burn",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a run currently is
///
/// Linear apart from the drive branch and the final save/burn branch.
/// `Failed` can follow any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    SourceSelected,
    DriveResolved,
    DriveSkipped,
    Transcoded,
    Authored,
    StructureFinalized,
    StructureValidated,
    ImageBuilt,
    ImageSaved,
    Burned,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}
