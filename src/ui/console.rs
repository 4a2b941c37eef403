//! Line-oriented prompts on stdin/stdout

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::burning::Prompter;
use crate::core::is_supported_video;

/// Answers the pipeline's questions by asking on the terminal
///
/// Typing `c` or `cancel` (or closing stdin) backs out of any prompt.
pub struct ConsolePrompter {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
    preset_source: Option<PathBuf>,
}

impl ConsolePrompter {
    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
            preset_source: None,
        }
    }

    /// Use this source instead of asking, if it is an acceptable video
    pub fn with_source(mut self, source: Option<PathBuf>) -> Self {
        self.preset_source = source;
        self
    }

    fn say(&self, message: &str) {
        if let Ok(mut out) = self.output.lock() {
            let _ = writeln!(out, "{}", message);
            let _ = out.flush();
        }
    }

    /// Show `prompt` and read one trimmed line; `None` on EOF or cancel
    fn ask(&self, prompt: &str) -> Option<String> {
        if let Ok(mut out) = self.output.lock() {
            let _ = write!(out, "{}", prompt);
            let _ = out.flush();
        }

        let mut line = String::new();
        let read = match self.input.lock() {
            Ok(mut input) => input.read_line(&mut line),
            Err(_) => return None,
        };

        match read {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim().to_string();
                if answer.eq_ignore_ascii_case("c") || answer.eq_ignore_ascii_case("cancel") {
                    None
                } else {
                    Some(answer)
                }
            }
            Err(e) => {
                log::warn!("Failed to read from terminal: {}", e);
                None
            }
        }
    }

    fn check_source(&self, path: &Path) -> bool {
        if !path.is_file() {
            self.say(&format!("No such file: {}", path.display()));
            false
        } else if !is_supported_video(path) {
            self.say("Please choose a movie file (mp4, mov, mkv, avi).");
            false
        } else {
            true
        }
    }
}

impl Prompter for ConsolePrompter {
    fn select_source(&self) -> Option<PathBuf> {
        if let Some(preset) = &self.preset_source
            && self.check_source(preset)
        {
            return Some(preset.clone());
        }

        loop {
            let answer = self.ask("Select a video file (mp4, mov, mkv, avi): ")?;
            if answer.is_empty() {
                return None;
            }
            let path = PathBuf::from(answer);
            if self.check_source(&path) {
                return Some(path);
            }
        }
    }

    fn choose_drive(&self, drives: &[String]) -> Option<usize> {
        self.say("Please select your DVD burner:");
        for (index, drive) in drives.iter().enumerate() {
            self.say(&format!("  {}) {}", index + 1, drive));
        }
        self.say("  c) Cancel");

        loop {
            let answer = self.ask("Drive [1]: ")?;
            if answer.is_empty() {
                return Some(0);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=drives.len()).contains(&n) => return Some(n - 1),
                _ => self.say(&format!("Enter a number from 1 to {}, or c to cancel.", drives.len())),
            }
        }
    }

    fn choose_save_path(&self, default: &Path) -> Option<PathBuf> {
        let answer = self.ask(&format!("Save ISO file as [{}]: ", default.display()))?;
        if answer.is_empty() {
            Some(default.to_path_buf())
        } else {
            Some(PathBuf::from(answer))
        }
    }
}
