//! Stage runner - spawns one external tool and streams its output
//!
//! stdout and stderr are drained concurrently with each other and with the
//! process wait, and forwarded to an `OutputSink` chunk by chunk. A long
//! ffmpeg transcode therefore shows progress as it happens instead of
//! after the process exits.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use super::stages::StageInvocation;
use crate::core::{PipelineError, Stage};

/// Which pipe a chunk of tool output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Receives tool output as it arrives
pub trait OutputSink: Send + Sync {
    /// `tool` is the executable name of the stage's program
    fn line(&self, stage: Stage, tool: &str, stream: StreamKind, line: &str);
}

/// Forwards tool output to the application log
pub struct LogSink;

fn tagged(tool: &str, line: &str) -> String {
    format!("[{}] {}", tool, line)
}

impl OutputSink for LogSink {
    fn line(&self, _stage: Stage, tool: &str, stream: StreamKind, line: &str) {
        match stream {
            StreamKind::Stdout => log::info!("{}", tagged(tool, line)),
            StreamKind::Stderr => log::warn!("{}", tagged(tool, line)),
        }
    }
}

/// Exit information of a stage that ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageOutcome {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub succeeded: bool,
}

impl From<ExitStatus> for StageOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            exit_code: status.code(),
            succeeded: status.success(),
        }
    }
}

/// Something that can execute a stage
///
/// `Err` is reserved for the process never starting (`Launch`) or being
/// stopped by the runner (`StageTimedOut`). A tool that runs and fails is
/// an `Ok` outcome with `succeeded == false`.
pub trait StageExecutor {
    async fn run(&self, invocation: &StageInvocation) -> Result<StageOutcome, PipelineError>;
}

/// Runs stages as real child processes
pub struct ProcessRunner {
    sink: Arc<dyn OutputSink>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            timeout: None,
        }
    }

    /// Kill any stage still running after `limit`
    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }
}

impl StageExecutor for ProcessRunner {
    async fn run(&self, invocation: &StageInvocation) -> Result<StageOutcome, PipelineError> {
        log::info!("Running command: {}", invocation);

        let launch_error = |source: std::io::Error| PipelineError::Launch {
            stage: invocation.stage,
            program: invocation.program.clone(),
            source,
        };

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(launch_error)?;

        let tool = invocation.tool_name();
        let origin = Origin {
            stage: invocation.stage,
            tool: &tool,
            sink: self.sink.as_ref(),
        };

        let status = match self.timeout {
            None => wait_streaming(&mut child, origin).await,
            Some(limit) => {
                let waited = tokio::time::timeout(
                    limit,
                    wait_streaming(&mut child, origin),
                )
                .await;
                match waited {
                    Ok(status) => status,
                    Err(_) => {
                        log::error!(
                            "{} did not finish within {}s, stopping it",
                            invocation.tool_name(),
                            limit.as_secs()
                        );
                        if let Err(e) = child.kill().await {
                            log::warn!("Failed to kill {}: {}", invocation.tool_name(), e);
                        }
                        return Err(PipelineError::StageTimedOut {
                            stage: invocation.stage,
                            tool: invocation.tool_name(),
                            limit,
                        });
                    }
                }
            }
        }
        .map_err(launch_error)?;

        let outcome = StageOutcome::from(status);
        if outcome.succeeded {
            log::info!("{} finished successfully", invocation.tool_name());
        } else {
            log::error!("{} exited with {}", invocation.tool_name(), status);
        }
        Ok(outcome)
    }
}

/// Where a running stage's output is delivered
#[derive(Clone, Copy)]
struct Origin<'a> {
    stage: Stage,
    tool: &'a str,
    sink: &'a dyn OutputSink,
}

/// Drain both pipes while waiting for the child to exit
async fn wait_streaming(child: &mut Child, origin: Origin<'_>) -> std::io::Result<ExitStatus> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let drain_out = async {
        if let Some(out) = stdout {
            drain(out, StreamKind::Stdout, origin).await;
        }
    };
    let drain_err = async {
        if let Some(err) = stderr {
            drain(err, StreamKind::Stderr, origin).await;
        }
    };

    let ((), (), status) = futures::join!(drain_out, drain_err, child.wait());
    status
}

/// Forward a pipe to the sink, splitting on `\n` and `\r`
///
/// ffmpeg redraws its progress line with carriage returns, so splitting
/// on newlines alone would hold progress back until the end.
async fn drain<R>(mut reader: R, stream: StreamKind, origin: Origin<'_>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                log::debug!("Stopped reading {} {:?}: {}", origin.tool, stream, e);
                break;
            }
        };

        for &byte in &buf[..n] {
            if byte == b'\n' || byte == b'\r' {
                emit(&mut pending, stream, origin);
            } else {
                pending.push(byte);
            }
        }
    }

    emit(&mut pending, stream, origin);
}

fn emit(pending: &mut Vec<u8>, stream: StreamKind, origin: Origin<'_>) {
    if pending.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(pending);
    let trimmed = line.trim_end();
    if !trimmed.is_empty() {
        origin.sink.line(origin.stage, origin.tool, stream, trimmed);
    }
    pending.clear();
}
