//! Terminal output: context resolution, badges and line renderers.

mod context;
pub mod render;
pub mod theme;

pub use context::{OutputMode, Terminal, UiContext, UiFlags};
pub use theme::Badge;

pub use render::{banner, hint, print, print_error, receipt, status};
