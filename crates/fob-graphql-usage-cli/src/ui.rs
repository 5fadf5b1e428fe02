//! Status messages on stderr.

use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

static COLOR_DISABLED: AtomicBool = AtomicBool::new(false);

/// Apply `--no-color` for the rest of the process.
pub fn init_colors(no_color: bool) {
    COLOR_DISABLED.store(no_color, Ordering::Relaxed);
}

/// Colors are used unless disabled by flag or `NO_COLOR`, or stderr is not a
/// terminal. `FORCE_COLOR` overrides terminal detection.
pub fn should_use_color() -> bool {
    if COLOR_DISABLED.load(Ordering::Relaxed) || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

pub fn success(message: &str) {
    if should_use_color() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {message}");
    }
}

pub fn info(message: &str) {
    if should_use_color() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {message}");
    }
}

pub fn warning(message: &str) {
    if should_use_color() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {message}");
    }
}
