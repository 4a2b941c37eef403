//! Burner drive discovery and selection
//!
//! "No device" and "user canceled" are different answers: the first
//! quietly turns a burn into an image save, the second stops the run.

use std::path::PathBuf;

use tokio::process::Command;

use super::prompts::Prompter;
use crate::core::{BurnBackend, CancelPoint, DriveSelection, PipelineError};

/// Lists candidate optical drives
pub trait DriveEnumerator {
    async fn list_drives(&self) -> Result<Vec<String>, String>;
}

/// macOS: parse `/dev/disk<N>` identifiers out of `drutil list`
pub struct DrutilDrives;

impl DriveEnumerator for DrutilDrives {
    async fn list_drives(&self) -> Result<Vec<String>, String> {
        let output = Command::new("drutil")
            .arg("list")
            .output()
            .await
            .map_err(|e| format!("Failed to execute drutil: {}", e))?;

        if !output.status.success() {
            return Err(format!("drutil list exited with {}", output.status));
        }

        Ok(parse_drutil_devices(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Every `/dev/disk` token (plus trailing digits) in output order
pub fn parse_drutil_devices(output: &str) -> Vec<String> {
    const PREFIX: &str = "/dev/disk";
    let mut devices = Vec::new();
    let mut rest = output;

    while let Some(start) = rest.find(PREFIX) {
        let after = &rest[start + PREFIX.len()..];
        let digits = after.bytes().take_while(|b| b.is_ascii_digit()).count();
        devices.push(format!("{}{}", PREFIX, &after[..digits]));
        rest = &after[digits..];
    }

    devices
}

/// Linux and friends: `/dev/sr<N>` block devices
pub struct SrDeviceDrives {
    dev_dir: PathBuf,
}

impl Default for SrDeviceDrives {
    fn default() -> Self {
        Self {
            dev_dir: PathBuf::from("/dev"),
        }
    }
}

impl SrDeviceDrives {
    #[cfg(test)]
    pub fn in_dir(dir: &std::path::Path) -> Self {
        Self {
            dev_dir: dir.to_path_buf(),
        }
    }
}

impl DriveEnumerator for SrDeviceDrives {
    async fn list_drives(&self) -> Result<Vec<String>, String> {
        let mut entries = tokio::fs::read_dir(&self.dev_dir)
            .await
            .map_err(|e| format!("Failed to read {}: {}", self.dev_dir.display(), e))?;

        let mut drives = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read {}: {}", self.dev_dir.display(), e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_sr_device(&name) {
                drives.push(entry.path().display().to_string());
            }
        }

        drives.sort();
        Ok(drives)
    }
}

fn is_sr_device(name: &str) -> bool {
    name.strip_prefix("sr")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// The enumerator that matches a burn backend
pub enum PlatformDrives {
    Drutil(DrutilDrives),
    SrDevices(SrDeviceDrives),
}

impl PlatformDrives {
    pub fn for_backend(backend: BurnBackend) -> Self {
        match backend {
            BurnBackend::Hdiutil => PlatformDrives::Drutil(DrutilDrives),
            BurnBackend::Growisofs => PlatformDrives::SrDevices(SrDeviceDrives::default()),
        }
    }
}

impl DriveEnumerator for PlatformDrives {
    async fn list_drives(&self) -> Result<Vec<String>, String> {
        match self {
            PlatformDrives::Drutil(d) => d.list_drives().await,
            PlatformDrives::SrDevices(d) => d.list_drives().await,
        }
    }
}

/// Resolve the drive for this run
///
/// A failed or empty query degrades to `NoDevice`. A cancel from the
/// picker is returned as `SelectionCanceled`, never as `NoDevice`.
pub async fn resolve_drive<D, P>(drives: &D, prompter: &P) -> Result<DriveSelection, PipelineError>
where
    D: DriveEnumerator,
    P: Prompter,
{
    let candidates = match drives.list_drives().await {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Drive query failed, will save the image instead: {}", e);
            return Ok(DriveSelection::NoDevice);
        }
    };

    if candidates.is_empty() {
        log::info!("No DVD drive found, will save the image instead");
        return Ok(DriveSelection::NoDevice);
    }

    log::info!("Found drives: {}", candidates.join(", "));

    match prompter.choose_drive(&candidates) {
        Some(index) if index < candidates.len() => {
            let device = candidates[index].clone();
            log::info!("Selected drive {}", device);
            Ok(DriveSelection::Device(device))
        }
        Some(index) => {
            log::warn!("Drive choice {} out of range, treating as cancel", index);
            Err(PipelineError::canceled(CancelPoint::Drive))
        }
        None => {
            log::info!("Drive selection canceled");
            Err(PipelineError::canceled(CancelPoint::Drive))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{FakeDrives, ScriptedPrompter};
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_parse_drutil_single_drive() {
        let output = "   Vendor   Product           Rev   Bus       SupportLevel\n\
                      1  HL-DT-ST DVDRW  GX40N        RQ00  USB       Unsupported\n\
                      /dev/disk2\n";
        assert_eq!(parse_drutil_devices(output), vec!["/dev/disk2"]);
    }

    #[test]
    fn test_parse_drutil_multiple_and_empty() {
        assert_eq!(
            parse_drutil_devices("a /dev/disk2 b /dev/disk10\n/dev/disk3s1"),
            vec!["/dev/disk2", "/dev/disk10", "/dev/disk3"]
        );
        assert!(parse_drutil_devices("").is_empty());
        assert!(parse_drutil_devices("No drives").is_empty());
    }

    #[test]
    fn test_is_sr_device() {
        assert!(is_sr_device("sr0"));
        assert!(is_sr_device("sr12"));
        assert!(!is_sr_device("sr"));
        assert!(!is_sr_device("sda"));
        assert!(!is_sr_device("sr0p1"));
    }

    #[tokio::test]
    async fn test_sr_device_listing() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["sr1", "sda", "sr0", "tty0"] {
            std::fs::write(temp_dir.path().join(name), b"").unwrap();
        }

        let drives = SrDeviceDrives::in_dir(temp_dir.path()).list_drives().await.unwrap();
        assert_eq!(
            drives,
            vec![
                temp_dir.path().join("sr0").display().to_string(),
                temp_dir.path().join("sr1").display().to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_sr_device_listing_missing_dir_fails() {
        let drives = SrDeviceDrives::in_dir(Path::new("/nonexistent/dev"));
        assert!(drives.list_drives().await.is_err());
    }

    #[tokio::test]
    async fn test_query_failure_is_no_device() {
        let prompter = ScriptedPrompter::default();
        let selection = resolve_drive(&FakeDrives::failing(), &prompter).await.unwrap();

        assert_eq!(selection, DriveSelection::NoDevice);
        assert_eq!(prompter.drive_prompts(), 0);
    }

    #[tokio::test]
    async fn test_empty_list_is_no_device() {
        let prompter = ScriptedPrompter::default();
        let selection = resolve_drive(&FakeDrives::with(&[]), &prompter).await.unwrap();

        assert_eq!(selection, DriveSelection::NoDevice);
        assert_eq!(prompter.drive_prompts(), 0);
    }

    #[tokio::test]
    async fn test_user_choice_is_returned() {
        let prompter = ScriptedPrompter {
            drive_choice: Some(1),
            ..Default::default()
        };
        let drives = FakeDrives::with(&["/dev/disk2", "/dev/disk3"]);

        let selection = resolve_drive(&drives, &prompter).await.unwrap();
        assert_eq!(selection, DriveSelection::Device("/dev/disk3".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_is_not_no_device() {
        let prompter = ScriptedPrompter {
            drive_choice: None,
            ..Default::default()
        };
        let drives = FakeDrives::with(&["/dev/disk2"]);

        let err = resolve_drive(&drives, &prompter).await.unwrap_err();
        assert!(matches!(err, PipelineError::SelectionCanceled(CancelPoint::Drive)));
    }
}
