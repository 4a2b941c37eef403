//! Test doubles for the pipeline collaborators
//!
//! The scripted executor never spawns anything: it records each
//! invocation and writes the files the real tool would have written, so
//! the orchestrator's filesystem checks see a realistic workspace.

#![cfg(test)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::burning::{
    DriveEnumerator, OutputSink, Prompter, StageExecutor, StageInvocation, StageOutcome,
    StreamKind,
};
use crate::core::{PipelineError, Stage};

/// Sink that keeps every line it receives
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(Stage, StreamKind, String)>>,
    tools: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn lines(&self) -> Vec<(Stage, StreamKind, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Distinct tool names seen, in first-seen order
    pub fn tools(&self) -> Vec<String> {
        self.tools.lock().unwrap().clone()
    }
}

impl OutputSink for CollectingSink {
    fn line(&self, stage: Stage, tool: &str, stream: StreamKind, line: &str) {
        let mut tools = self.tools.lock().unwrap();
        if !tools.iter().any(|t| t == tool) {
            tools.push(tool.to_string());
        }
        drop(tools);

        self.lines
            .lock()
            .unwrap()
            .push((stage, stream, line.to_string()));
    }
}

/// Stage executor that simulates the DVD tools
#[derive(Default)]
pub struct ScriptedExecutor {
    /// Exit with this code at this stage
    pub fail: Option<(Stage, i32)>,
    /// Report a launch failure at this stage
    pub unlaunchable: Option<Stage>,
    /// Finalize without writing VIDEO_TS.IFO
    pub skip_marker: bool,
    pub invocations: Mutex<Vec<StageInvocation>>,
}

impl ScriptedExecutor {
    pub fn invocations(&self) -> Vec<StageInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.invocations().iter().map(|i| i.stage).collect()
    }

    fn simulate(&self, invocation: &StageInvocation) {
        let arg = |i: usize| PathBuf::from(&invocation.args[i]);
        match invocation.stage {
            Stage::Transcode => {
                let output = PathBuf::from(invocation.args.last().unwrap());
                std::fs::write(output, b"mpeg-ps").unwrap();
            }
            Stage::Author => {
                let video_ts = arg(1).join("VIDEO_TS");
                std::fs::create_dir_all(&video_ts).unwrap();
                std::fs::write(video_ts.join("VTS_01_0.IFO"), b"DVDVIDEO-VTS").unwrap();
                std::fs::write(video_ts.join("VTS_01_1.VOB"), b"vob").unwrap();
            }
            Stage::FinalizeStructure => {
                if !self.skip_marker {
                    let video_ts = arg(1).join("VIDEO_TS");
                    std::fs::create_dir_all(&video_ts).unwrap();
                    std::fs::write(video_ts.join("VIDEO_TS.IFO"), b"DVDVIDEO-VMG").unwrap();
                }
            }
            Stage::BuildImage => {
                std::fs::write(arg(2), b"iso9660").unwrap();
            }
            Stage::Burn => {}
        }
    }
}

impl StageExecutor for ScriptedExecutor {
    async fn run(&self, invocation: &StageInvocation) -> Result<StageOutcome, PipelineError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if self.unlaunchable == Some(invocation.stage) {
            return Err(PipelineError::Launch {
                stage: invocation.stage,
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            });
        }

        if let Some((stage, code)) = self.fail
            && stage == invocation.stage
        {
            return Ok(StageOutcome {
                exit_code: Some(code),
                succeeded: false,
            });
        }

        self.simulate(invocation);
        Ok(StageOutcome {
            exit_code: Some(0),
            succeeded: true,
        })
    }
}

/// Drive enumerator with a canned answer
pub struct FakeDrives {
    answer: Result<Vec<String>, String>,
    queries: AtomicUsize,
}

impl FakeDrives {
    pub fn with(drives: &[&str]) -> Self {
        Self {
            answer: Ok(drives.iter().map(|d| d.to_string()).collect()),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err("No DVD drive found.".to_string()),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl DriveEnumerator for FakeDrives {
    async fn list_drives(&self) -> Result<Vec<String>, String> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Prompter with fixed answers; `None` means the user canceled
pub struct ScriptedPrompter {
    pub source: Option<PathBuf>,
    pub drive_choice: Option<usize>,
    pub save_path: Option<PathBuf>,
    pub drive_prompt_count: AtomicUsize,
    pub save_prompt_count: AtomicUsize,
}

impl Default for ScriptedPrompter {
    fn default() -> Self {
        Self {
            source: Some(PathBuf::from("/movies/movie.mp4")),
            drive_choice: Some(0),
            save_path: None,
            drive_prompt_count: AtomicUsize::new(0),
            save_prompt_count: AtomicUsize::new(0),
        }
    }
}

impl ScriptedPrompter {
    pub fn drive_prompts(&self) -> usize {
        self.drive_prompt_count.load(Ordering::SeqCst)
    }

    pub fn save_prompts(&self) -> usize {
        self.save_prompt_count.load(Ordering::SeqCst)
    }
}

impl Prompter for ScriptedPrompter {
    fn select_source(&self) -> Option<PathBuf> {
        self.source.clone()
    }

    fn choose_drive(&self, _drives: &[String]) -> Option<usize> {
        self.drive_prompt_count.fetch_add(1, Ordering::SeqCst);
        self.drive_choice
    }

    fn choose_save_path(&self, _default: &Path) -> Option<PathBuf> {
        self.save_prompt_count.fetch_add(1, Ordering::SeqCst);
        self.save_path.clone()
    }
}
