//! Logging configuration for DVD Burner
//!
//! Logs are written to both the terminal and a file at:
//! `~/Library/Logs/DVD-Burner/dvd-burner.log` (macOS), or
//! `<local data dir>/DVD-Burner/logs/dvd-burner.log` elsewhere.
//!
//! Stage output from ffmpeg/dvdauthor/mkisofs lands here too, which is
//! usually what is needed to diagnose a failed run.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "dvd-burner.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Get the log directory path
pub fn get_log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join("DVD-Burner"))
    } else {
        dirs::data_local_dir().map(|d| d.join("DVD-Burner").join("logs"))
    }
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

/// Move an oversized log aside so the next session starts fresh
fn rotate_if_large(log_path: &Path) {
    if let Ok(metadata) = fs::metadata(log_path)
        && metadata.len() > MAX_LOG_BYTES
    {
        let _ = fs::rename(log_path, log_path.with_extension("log.old"));
    }
}

/// Initialize the logging system
///
/// Terminal gets info and above, the file gets debug and above. Returns
/// the log file path when file logging could be set up.
pub fn init_logging() -> Option<PathBuf> {
    let log_dir = match get_log_directory() {
        Some(d) => d,
        None => {
            eprintln!("Warning: Could not determine log directory");
            init_terminal_only();
            return None;
        }
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only();
        return None;
    }

    let log_path = log_dir.join(LOG_FILE);
    rotate_if_large(&log_path);

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only();
            return None;
        }
    };

    let config = log_config();
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(LevelFilter::Info, config.clone(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, config, log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("=== DVD Burner session started ===");
    log::info!("Log file: {}", log_path.display());

    Some(log_path)
}

/// Terminal-only logging, used when the log file is unavailable
fn init_terminal_only() {
    let term_logger = TermLogger::new(
        LevelFilter::Info,
        log_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    let _ = CombinedLogger::init(vec![term_logger]);
}
