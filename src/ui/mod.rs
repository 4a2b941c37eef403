//! Terminal front end
//!
//! The pipeline only sees the `Prompter` trait; this is the one
//! implementation shipped with the binary.

mod console;

pub use console::ConsolePrompter;
