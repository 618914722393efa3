//! Terminal colors for CLI output.
//!
//! Everything goes through `owo-colors`' `if_supports_color()`, so `NO_COLOR`,
//! `FORCE_COLOR` and TTY detection are honored. `--no-color` flips an
//! in-process flag that skips styling entirely.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::{self, Stderr, Stdout};

static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const ACCENT: Rgb = Rgb::from_hex(0x7CB4C8); // Workspace paths
const ADDED: Rgb = Rgb::from_hex(0x6B8F5E); // Additions, added files
const CHANGED: Rgb = Rgb::from_hex(0xC49A5C); // Modified, renamed, loading
const REMOVED: Rgb = Rgb::from_hex(0xB87060); // Deletions, errors
const DIM: Rgb = Rgb::from_hex(0x5C6370); // Secondary info

fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

fn paint(stream: Stream, text: &str, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(stream, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

/// Workspace paths and headings.
pub fn accent(text: &str) -> String {
    paint(Stdout, text, ACCENT)
}

pub fn added(text: &str) -> String {
    paint(Stdout, text, ADDED)
}

pub fn changed(text: &str) -> String {
    paint(Stdout, text, CHANGED)
}

pub fn removed(text: &str) -> String {
    paint(Stdout, text, REMOVED)
}

pub fn muted(text: &str) -> String {
    paint(Stdout, text, DIM)
}

pub fn bold(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Color-code a change kind label.
pub fn change_kind(kind: &str) -> String {
    match kind {
        "added" | "untracked" => added(kind),
        "deleted" => removed(kind),
        "conflicted" => bold(&removed(kind)),
        "modified" | "renamed" | "copied" | "typechange" => changed(kind),
        _ => kind.to_string(),
    }
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    paint(Stderr, text, REMOVED)
}

/// Warning styling for stderr messages.
pub fn warning(text: &str) -> String {
    paint(Stderr, text, CHANGED)
}

/// Secondary info on stderr.
pub fn hint(text: &str) -> String {
    paint(Stderr, text, DIM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        let c = Rgb::from_hex(0x7CB4C8);
        assert_eq!((c.r, c.g, c.b), (124, 180, 200));
    }

    #[test]
    fn test_rgb_from_hex_extremes() {
        let black = Rgb::from_hex(0x000000);
        assert_eq!((black.r, black.g, black.b), (0, 0, 0));
        let white = Rgb::from_hex(0xFFFFFF);
        assert_eq!((white.r, white.g, white.b), (255, 255, 255));
    }

    #[test]
    fn test_no_color_flag_disables_all_formatting() {
        NO_COLOR_FLAG.store(true, Ordering::Relaxed);

        assert_eq!(accent("test"), "test");
        assert_eq!(added("test"), "test");
        assert_eq!(changed("test"), "test");
        assert_eq!(removed("test"), "test");
        assert_eq!(muted("test"), "test");
        assert_eq!(bold("test"), "test");
        assert_eq!(change_kind("conflicted"), "conflicted");
        assert_eq!(error("test"), "test");
        assert_eq!(warning("test"), "test");
        assert_eq!(hint("test"), "test");

        // Reset for other tests
        NO_COLOR_FLAG.store(false, Ordering::Relaxed);
    }

    #[test]
    fn test_unknown_change_kind_is_plain() {
        assert_eq!(change_kind("mystery"), "mystery");
    }
}
