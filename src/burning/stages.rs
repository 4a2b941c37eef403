//! Command lines for each external tool
//!
//! Every stage gets a fresh `StageInvocation`; nothing here touches the
//! filesystem or spawns anything.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{BurnBackend, Settings, Stage};

/// One external process call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    pub stage: Stage,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
}

impl StageInvocation {
    fn new(stage: Stage, program: &Path) -> Self {
        Self {
            stage,
            program: program.to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Short tool name for messages (`ffmpeg`, not `/opt/bin/ffmpeg`)
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl fmt::Display for StageInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Drop any trailing separator; mkisofs reports bogus errors otherwise
pub fn strip_trailing_separator(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Source video to a DVD-compliant MPEG-2 program stream
///
/// `ffmpeg -i <src> -target ntsc-dvd -aspect 16:9 -y <out.mpg>`
pub fn transcode(settings: &Settings, source: &Path, output: &Path) -> StageInvocation {
    StageInvocation::new(Stage::Transcode, &settings.tools.ffmpeg)
        .arg("-i")
        .arg(source)
        .arg("-target")
        .arg(settings.video_standard.ffmpeg_target())
        .arg("-aspect")
        .arg(&settings.aspect_ratio)
        .arg("-y")
        .arg(output)
}

/// Author a titleset from the MPEG stream
///
/// `dvdauthor -o <content> -t <in.mpg>`
pub fn author(settings: &Settings, media: &Path, content_dir: &Path) -> StageInvocation {
    StageInvocation::new(Stage::Author, &settings.tools.dvdauthor)
        .env("VIDEO_FORMAT", settings.video_standard.dvdauthor_format())
        .arg("-o")
        .arg(content_dir)
        .arg("-t")
        .arg(media)
}

/// Write the table of contents (`VIDEO_TS.IFO`) for existing titlesets
///
/// `dvdauthor -o <content> -T`
pub fn finalize_structure(settings: &Settings, content_dir: &Path) -> StageInvocation {
    StageInvocation::new(Stage::FinalizeStructure, &settings.tools.dvdauthor)
        .env("VIDEO_FORMAT", settings.video_standard.dvdauthor_format())
        .arg("-o")
        .arg(content_dir)
        .arg("-T")
}

/// Build a DVD-Video ISO image from the content directory
///
/// `mkisofs -dvd-video -o <out.iso> <content>`
pub fn build_image(settings: &Settings, content_dir: &Path, image: &Path) -> StageInvocation {
    StageInvocation::new(Stage::BuildImage, &settings.tools.mkisofs)
        .arg("-dvd-video")
        .arg("-o")
        .arg(image)
        .arg(strip_trailing_separator(content_dir))
}

/// Write the image to the chosen device
pub fn burn(settings: &Settings, device: &str, image: &Path) -> StageInvocation {
    let invocation = StageInvocation::new(Stage::Burn, &settings.burner_program());
    match settings.burn_backend {
        BurnBackend::Hdiutil => invocation
            .arg("burn")
            .arg("-device")
            .arg(device)
            .arg(image),
        BurnBackend::Growisofs => {
            let mut target = OsString::from(device);
            target.push("=");
            target.push(image);
            invocation.arg("-dvd-compat").arg("-Z").arg(target)
        }
    }
}
