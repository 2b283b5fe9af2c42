//! Badge tokens and the few colors the CLI uses.

use owo_colors::{OwoColorize, Style};

/// Marker at the start of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
    Info,
}

impl Badge {
    /// Key used for the line in plain output (`info=...`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Err => "error",
            Self::Info => "info",
        }
    }

    /// Bracketed marker, a symbol unless restricted to ASCII.
    pub fn marker(self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Self::Ok, true) => "[\u{2713}]",
            (Self::Warn, true) => "[!]",
            (Self::Err, true) => "[\u{2717}]",
            (Self::Info, true) => "[\u{2192}]",
            (Self::Ok, false) => "[OK]",
            (Self::Warn, false) => "[WARN]",
            (Self::Err, false) => "[ERR]",
            (Self::Info, false) => "[INFO]",
        }
    }

    /// The marker, colored when `color` is set.
    pub fn render(self, unicode: bool, color: bool) -> String {
        let style = match self {
            Self::Ok => Style::new().green().bold(),
            Self::Warn => Style::new().yellow().bold(),
            Self::Err => Style::new().red().bold(),
            Self::Info => Style::new().cyan(),
        };
        paint(self.marker(unicode), style, color)
    }
}

pub fn title_style() -> Style {
    Style::new().bold()
}

pub fn label_style() -> Style {
    Style::new().dimmed()
}

/// Apply `style` to `text` when color is enabled.
pub fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(Badge::Ok.key(), "ok");
        assert_eq!(Badge::Err.key(), "error");
    }

    #[test]
    fn test_ascii_markers() {
        assert_eq!(Badge::Ok.marker(false), "[OK]");
        assert_eq!(Badge::Warn.marker(false), "[WARN]");
        assert_eq!(Badge::Err.marker(false), "[ERR]");
        assert_eq!(Badge::Info.marker(false), "[INFO]");
    }

    #[test]
    fn test_render_without_color_is_marker() {
        assert_eq!(Badge::Err.render(true, false), "[\u{2717}]");
    }

    #[test]
    fn test_paint_with_color_adds_escapes() {
        let out = paint("sealed", title_style(), true);
        assert!(out.contains("sealed"));
        assert!(out.contains("\x1b["));
    }
}
