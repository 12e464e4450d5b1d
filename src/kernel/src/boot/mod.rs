//! Boot logging with colored status indicators.
//!
//! Linux-style `[ OK ]` lines on the console while the kernel comes up.
//! Each line is mirrored to the `log` facade for the serial log.

pub mod banner;

use crate::console::{self, Color};
use crate::{print, println};

/// Boot status indicators.
#[derive(Debug, Clone, Copy)]
pub enum Status {
    /// Success - `[ OK ]` in green
    Ok,
    /// Failure - `[FAIL]` in red
    Fail,
    /// Warning - `[WARN]` in yellow
    Warn,
    /// Informational - `[INFO]` in cyan
    Info,
}

impl Status {
    fn label(self) -> (&'static str, Color) {
        match self {
            Status::Ok => ("[ OK ]", Color::LightGreen),
            Status::Fail => ("[FAIL]", Color::LightRed),
            Status::Warn => ("[WARN]", Color::Yellow),
            Status::Info => ("[INFO]", Color::LightCyan),
        }
    }

    fn level(self) -> log::Level {
        match self {
            Status::Ok | Status::Info => log::Level::Info,
            Status::Warn => log::Level::Warn,
            Status::Fail => log::Level::Error,
        }
    }
}

/// Log a boot stage with status.
///
/// Format: `[ OK ] Message text`
pub fn log(status: Status, message: &str) {
    let (text, color) = status.label();
    console::set_color(color, Color::Black);
    print!("{}", text);
    console::reset_color();
    println!(" {}", message);
    log::log!(status.level(), "{}", message);
}

/// Log an indented detail line (for sub-items).
pub fn log_detail(message: &str) {
    println!("       {}", message);
    log::debug!("  {}", message);
}
