//! Presentation settings, resolved once from flags and the terminal.

use std::io::IsTerminal;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One JSON object, nothing else
    Json,
    /// `key=value` lines for logs and scripts
    #[default]
    Plain,
    /// Badges, colors and a banner for people at a terminal
    Pretty,
}

impl OutputMode {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}

/// Command-line switches that affect presentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiFlags {
    pub json: bool,
    pub no_color: bool,
    pub ascii: bool,
    pub quiet: bool,
}

/// What the process can observe about where its output goes.
#[derive(Debug, Clone, Default)]
pub struct Terminal {
    pub stdout_is_tty: bool,
    pub dumb: bool,
    pub no_color_env: bool,
    pub columns: Option<usize>,
}

impl Terminal {
    /// Inspect stdout, `TERM`, `NO_COLOR` and the window size.
    pub fn probe() -> Self {
        Self {
            stdout_is_tty: std::io::stdout().is_terminal(),
            dumb: std::env::var("TERM").is_ok_and(|term| term == "dumb"),
            no_color_env: std::env::var_os("NO_COLOR").is_some(),
            columns: columns_from_env().or_else(window_columns),
        }
    }
}

/// Resolved output settings shared by every renderer.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
    /// Only errors and the output directory are printed
    pub quiet: bool,
}

impl UiContext {
    const DEFAULT_WIDTH: usize = 80;

    /// Resolve against the real terminal.
    pub fn from_env(flags: UiFlags) -> Self {
        Self::resolve(flags, &Terminal::probe())
    }

    /// `--json` wins outright; pretty output needs a real, non-dumb terminal;
    /// color additionally needs neither `--no-color` nor `NO_COLOR`.
    pub fn resolve(flags: UiFlags, terminal: &Terminal) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else if terminal.stdout_is_tty && !terminal.dumb {
            OutputMode::Pretty
        } else {
            OutputMode::Plain
        };

        Self {
            color: mode.is_pretty() && !flags.no_color && !terminal.no_color_env,
            unicode: !flags.ascii && !terminal.dumb,
            width: terminal.columns.unwrap_or(Self::DEFAULT_WIDTH),
            mode,
            quiet: flags.quiet,
        }
    }
}

fn columns_from_env() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width > 0)
}

#[cfg(unix)]
fn window_columns() -> Option<usize> {
    use std::mem::MaybeUninit;

    let mut winsize = MaybeUninit::<libc::winsize>::uninit();
    // SAFETY: TIOCGWINSZ only writes into the provided winsize.
    let result =
        unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, winsize.as_mut_ptr()) };
    if result != 0 {
        return None;
    }
    let winsize = unsafe { winsize.assume_init() };
    (winsize.ws_col > 0).then_some(winsize.ws_col as usize)
}

#[cfg(not(unix))]
fn window_columns() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty() -> Terminal {
        Terminal {
            stdout_is_tty: true,
            columns: Some(120),
            ..Terminal::default()
        }
    }

    #[test]
    fn test_json_flag_wins_on_tty() {
        let flags = UiFlags {
            json: true,
            ..UiFlags::default()
        };
        let ctx = UiContext::resolve(flags, &tty());
        assert_eq!(ctx.mode, OutputMode::Json);
        assert!(!ctx.color);
    }

    #[test]
    fn test_tty_is_pretty_and_colored() {
        let ctx = UiContext::resolve(UiFlags::default(), &tty());
        assert_eq!(ctx.mode, OutputMode::Pretty);
        assert!(ctx.color);
        assert!(ctx.unicode);
        assert_eq!(ctx.width, 120);
    }

    #[test]
    fn test_pipe_is_plain() {
        let ctx = UiContext::resolve(UiFlags::default(), &Terminal::default());
        assert_eq!(ctx.mode, OutputMode::Plain);
        assert!(!ctx.color);
        assert_eq!(ctx.width, 80);
    }

    #[test]
    fn test_dumb_terminal_is_plain_ascii() {
        let terminal = Terminal {
            dumb: true,
            ..tty()
        };
        let ctx = UiContext::resolve(UiFlags::default(), &terminal);
        assert_eq!(ctx.mode, OutputMode::Plain);
        assert!(!ctx.unicode);
    }

    #[test]
    fn test_no_color_sources() {
        let by_flag = UiFlags {
            no_color: true,
            ..UiFlags::default()
        };
        assert!(!UiContext::resolve(by_flag, &tty()).color);

        let by_env = Terminal {
            no_color_env: true,
            ..tty()
        };
        let ctx = UiContext::resolve(UiFlags::default(), &by_env);
        assert!(!ctx.color);
        assert_eq!(ctx.mode, OutputMode::Pretty);
    }

    #[test]
    fn test_ascii_and_quiet_flags() {
        let flags = UiFlags {
            ascii: true,
            quiet: true,
            ..UiFlags::default()
        };
        let ctx = UiContext::resolve(flags, &tty());
        assert!(!ctx.unicode);
        assert!(ctx.quiet);
    }
}
