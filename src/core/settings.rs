//! Application settings
//!
//! Persisted to `<config dir>/DVD Burner/settings.json`. Tool locations
//! are injected from here rather than discovered by the pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location of each external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub dvdauthor: PathBuf,
    pub mkisofs: PathBuf,
    /// Burn tool; `None` uses the configured backend's own program
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burner: Option<PathBuf>,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            dvdauthor: PathBuf::from("dvdauthor"),
            mkisofs: PathBuf::from("mkisofs"),
            burner: None,
        }
    }
}

/// Television standard the disc is authored for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStandard {
    #[default]
    Ntsc,
    Pal,
}

impl VideoStandard {
    /// ffmpeg `-target` profile
    pub fn ffmpeg_target(&self) -> &'static str {
        match self {
            VideoStandard::Ntsc => "ntsc-dvd",
            VideoStandard::Pal => "pal-dvd",
        }
    }

    /// Value of the `VIDEO_FORMAT` variable dvdauthor reads
    pub fn dvdauthor_format(&self) -> &'static str {
        match self {
            VideoStandard::Ntsc => "NTSC",
            VideoStandard::Pal => "PAL",
        }
    }
}

/// Which burning tool (and matching drive enumeration) to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnBackend {
    /// macOS `hdiutil burn`, drives listed by `drutil`
    Hdiutil,
    /// `growisofs`, drives listed from `/dev/sr*`
    Growisofs,
}

impl Default for BurnBackend {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            BurnBackend::Hdiutil
        } else {
            BurnBackend::Growisofs
        }
    }
}

impl BurnBackend {
    pub fn default_program(&self) -> &'static str {
        match self {
            BurnBackend::Hdiutil => "hdiutil",
            BurnBackend::Growisofs => "growisofs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolPaths,
    pub video_standard: VideoStandard,
    /// Display aspect ratio passed to the transcoder
    pub aspect_ratio: String,
    pub burn_backend: BurnBackend,
    /// Per-stage limit; `None` lets every tool run to completion
    pub stage_timeout_secs: Option<u64>,
    /// Parent for per-run workspaces; `None` means the system temp dir
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            video_standard: VideoStandard::default(),
            aspect_ratio: "16:9".to_string(),
            burn_backend: BurnBackend::default(),
            stage_timeout_secs: None,
            scratch_dir: None,
        }
    }
}

impl Settings {
    const SETTINGS_FILE: &'static str = "settings.json";

    /// `<config dir>/DVD Burner/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("DVD Burner").join(Self::SETTINGS_FILE))
    }

    /// Load settings from the default location, or defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::debug!("No config directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a file, or defaults if it is missing or invalid
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::debug!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err(format!("{} not found", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;

        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Write settings as pretty JSON, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Program the burn stage runs
    pub fn burner_program(&self) -> PathBuf {
        self.tools
            .burner
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.burn_backend.default_program()))
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_secs.map(Duration::from_secs)
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
