//! Pipeline orchestrator - source video to saved ISO or burned disc
//!
//! Sequence:
//! 1. Pick the source video
//! 2. Resolve a burner (skipped for image-only runs)
//! 3. Transcode, author, finalize the DVD structure
//! 4. Validate the structure, build the ISO
//! 5. Save the ISO, or burn it
//!
//! Stages run strictly one after another since each consumes the files
//! the previous one wrote. Any failure ends the run; nothing is retried.
//! The workspace is released on every exit path once it exists.

use std::path::Path;

use super::drives::{DriveEnumerator, resolve_drive};
use super::prompts::{Prompter, default_save_path, resolve_save_path};
use super::runner::StageExecutor;
use super::stages::{self, StageInvocation};
use super::structure::validate_structure;
use super::workspace::{Workspace, tree_size};
use crate::core::{
    BurnRequest, CancelPoint, Completion, DriveSelection, PipelineError, PipelineRequest,
    PipelineResult, PipelineState, Settings, report,
};

/// Callback invoked on every state transition
pub type StateObserver = Box<dyn Fn(PipelineState) + Send + Sync>;

pub struct Pipeline<E, D, P> {
    settings: Settings,
    executor: E,
    drives: D,
    prompter: P,
    observer: Option<StateObserver>,
}

impl<E, D, P> Pipeline<E, D, P>
where
    E: StageExecutor,
    D: DriveEnumerator,
    P: Prompter,
{
    pub fn new(settings: Settings, executor: E, drives: D, prompter: P) -> Self {
        Self {
            settings,
            executor,
            drives,
            prompter,
            observer: None,
        }
    }

    #[cfg(test)]
    pub fn with_observer(mut self, observer: StateObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    #[cfg(test)]
    pub fn drives(&self) -> &D {
        &self.drives
    }

    #[cfg(test)]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Run the whole pipeline and report its outcome
    pub async fn burn_disc(&self, request: BurnRequest) -> PipelineResult {
        let outcome = self.run(request).await;

        match &outcome {
            Ok(_) => self.enter(PipelineState::Done),
            Err(e) if e.is_cancellation() => {
                log::info!("{}", e);
                self.enter(PipelineState::Done);
            }
            Err(e) => {
                log::error!("Pipeline failed: {}", e);
                self.enter(PipelineState::Failed);
            }
        }

        report(outcome)
    }

    async fn run(&self, request: BurnRequest) -> Result<Completion, PipelineError> {
        self.enter(PipelineState::Idle);

        let source = self
            .prompter
            .select_source()
            .ok_or_else(|| PipelineError::canceled(CancelPoint::SourceFile))?;
        let request = PipelineRequest {
            source_video: source,
            image_only: request.image_only,
        };
        log::info!(
            "Source: {} ({})",
            request.source_video.display(),
            if request.image_only { "image only" } else { "burn" }
        );
        self.enter(PipelineState::SourceSelected);

        let drive = if request.image_only {
            self.enter(PipelineState::DriveSkipped);
            DriveSelection::NoDevice
        } else {
            let drive = resolve_drive(&self.drives, &self.prompter).await?;
            self.enter(PipelineState::DriveResolved);
            drive
        };

        let mut workspace = Workspace::acquire(&self.settings.scratch_root())?;
        log::debug!("Intermediate files go to {}", workspace.root().display());
        let outcome = self.run_stages(&request, &drive, &workspace).await;

        // Release failures are logged only; the run outcome stands.
        if let Err(e) = workspace.release() {
            log::warn!("{}", e);
        }

        outcome
    }

    async fn run_stages(
        &self,
        request: &PipelineRequest,
        drive: &DriveSelection,
        workspace: &Workspace,
    ) -> Result<Completion, PipelineError> {
        let media = workspace.transcoded_media();
        let content = workspace.authored_content();
        let image = workspace.image();

        self.execute(stages::transcode(&self.settings, &request.source_video, &media))
            .await?;
        self.enter(PipelineState::Transcoded);

        self.execute(stages::author(&self.settings, &media, &content))
            .await?;
        self.enter(PipelineState::Authored);

        self.execute(stages::finalize_structure(&self.settings, &content))
            .await?;
        self.enter(PipelineState::StructureFinalized);

        validate_structure(&content)?;
        log::debug!("DVD content size: {} bytes", tree_size(&content));
        self.enter(PipelineState::StructureValidated);

        self.execute(stages::build_image(&self.settings, &content, &image))
            .await?;
        self.enter(PipelineState::ImageBuilt);

        match drive.device() {
            Some(device) if !request.image_only => {
                self.execute(stages::burn(&self.settings, device, &image))
                    .await?;
                self.enter(PipelineState::Burned);
                Ok(Completion::Burned {
                    source_name: request.source_name(),
                    device: device.to_string(),
                })
            }
            _ => {
                let completion = self.save_image(&image).await?;
                self.enter(PipelineState::ImageSaved);
                Ok(completion)
            }
        }
    }

    /// Run one stage; a non-zero exit becomes `StageFailed`
    async fn execute(&self, invocation: StageInvocation) -> Result<(), PipelineError> {
        let outcome = self.executor.run(&invocation).await?;
        if outcome.succeeded {
            Ok(())
        } else {
            Err(PipelineError::StageFailed {
                stage: invocation.stage,
                tool: invocation.tool_name(),
                exit_code: outcome.exit_code,
            })
        }
    }

    async fn save_image(&self, image: &Path) -> Result<Completion, PipelineError> {
        let destination = self
            .prompter
            .choose_save_path(&default_save_path())
            .map(resolve_save_path)
            .ok_or_else(|| PipelineError::canceled(CancelPoint::SaveDestination))?;

        tokio::fs::copy(image, &destination).await.map_err(|e| {
            PipelineError::resource(
                format!("Failed to copy ISO to {}", destination.display()),
                e,
            )
        })?;

        log::info!("ISO saved to {}", destination.display());
        Ok(Completion::ImageSaved { destination })
    }

    fn enter(&self, state: PipelineState) {
        if state.is_terminal() {
            log::info!("Pipeline finished: {:?}", state);
        } else {
            log::info!("Pipeline state: {:?}", state);
        }
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }
}
