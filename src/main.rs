//! DVD Burner
//!
//! Turns a video file into a DVD-Video ISO image with ffmpeg, dvdauthor
//! and mkisofs, then either saves the image or burns it to a drive.

mod burning;
mod core;
mod logging;
mod ui;

#[cfg(test)]
mod test_fixtures;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::burning::{LogSink, Pipeline, PlatformDrives, ProcessRunner};
use crate::core::{BurnRequest, PipelineResult, Settings};
use crate::ui::ConsolePrompter;

const HELP: &str = "\
DVD Burner - turn a video into a DVD image or disc

USAGE:
  DVD-Burner [OPTIONS] [VIDEO]

OPTIONS:
  --iso-only          Only build the ISO image, do not burn
  --settings <FILE>   Read settings from FILE instead of the default location
  --timeout <SECS>    Stop any single tool that runs longer than SECS
  --write-settings    Save the effective settings and exit
  -h, --help          Print this help

ARGS:
  <VIDEO>             Source video (mp4, mov, mkv, avi); asked for if omitted
";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    iso_only: bool,
    settings: Option<PathBuf>,
    timeout_secs: Option<u64>,
    write_settings: bool,
    source: Option<PathBuf>,
}

fn parse_args(mut args: pico_args::Arguments) -> Result<Option<CliArgs>, pico_args::Error> {
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let parsed = CliArgs {
        iso_only: args.contains("--iso-only"),
        settings: args.opt_value_from_str("--settings")?,
        timeout_secs: args.opt_value_from_str("--timeout")?,
        write_settings: args.contains("--write-settings"),
        source: args.opt_free_from_str()?,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {:?}", remaining),
        });
    }

    Ok(Some(parsed))
}

fn exit_code(result: &PipelineResult) -> ExitCode {
    if result.success {
        ExitCode::SUCCESS
    } else if result.is_canceled() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn write_settings(settings: &Settings, path: Option<PathBuf>) -> ExitCode {
    let Some(path) = path else {
        log::error!("Could not determine where to save settings");
        return ExitCode::FAILURE;
    };

    match settings.save_to(&path) {
        Ok(()) => {
            println!("Settings written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match parse_args(pico_args::Arguments::from_env()) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            print!("{}", HELP);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, HELP);
            return ExitCode::FAILURE;
        }
    };

    let log_path = logging::init_logging();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if cli.timeout_secs.is_some() {
        settings.stage_timeout_secs = cli.timeout_secs;
    }

    if cli.write_settings {
        return write_settings(&settings, cli.settings.or_else(Settings::default_path));
    }

    let runner = ProcessRunner::new(Arc::new(LogSink)).with_timeout(settings.stage_timeout());
    let drives = PlatformDrives::for_backend(settings.burn_backend);
    let prompter = ConsolePrompter::stdio().with_source(cli.source);

    let pipeline = Pipeline::new(settings, runner, drives, prompter);
    let result = pipeline
        .burn_disc(BurnRequest {
            image_only: cli.iso_only,
        })
        .await;

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize result: {}", e);
            println!("{:?}", result);
        }
    }

    if !result.success
        && !result.is_canceled()
        && let Some(path) = &log_path
    {
        eprintln!("Tool output for this run is in {}", path.display());
    }

    exit_code(&result)
}
