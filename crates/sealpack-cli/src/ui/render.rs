//! Line renderers. Each returns the text; [`print`] decides whether it is shown.

use super::context::{OutputMode, UiContext};
use super::theme::{label_style, paint, title_style, Badge};

const RULE_MAX_WIDTH: usize = 60;

/// Package name, version and payload fingerprint, shown before anything else.
pub fn banner(ctx: &UiContext, package: &str, version: &str, fingerprint: &str) -> String {
    match ctx.mode {
        OutputMode::Json => String::new(),
        OutputMode::Plain => format!(
            "sealpack package={} version={} fingerprint={}",
            package, version, fingerprint
        ),
        OutputMode::Pretty => {
            let title = paint("Sealpack", title_style(), ctx.color);
            [
                format!("{} \u{00B7} {} (v{})", title, package, version),
                field(ctx, "Payload", fingerprint),
                rule(ctx),
            ]
            .join("\n")
        }
    }
}

fn rule(ctx: &UiContext) -> String {
    let glyph = if ctx.unicode { "\u{2500}" } else { "-" };
    glyph.repeat(ctx.width.clamp(1, RULE_MAX_WIDTH))
}

/// `Label: value` when pretty, `label=value` otherwise.
fn field(ctx: &UiContext, label: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        let label = paint(&format!("{}:", label), label_style(), ctx.color);
        format!("{} {}", label, value)
    } else {
        format!("{}={}", label.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn status(ctx: &UiContext, badge: Badge, message: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", badge.render(ctx.unicode, ctx.color), message)
    } else {
        format!("{}={}", badge.key(), message)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    field(ctx, "Hint", text)
}

/// Success line followed by the facts worth keeping.
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, &str)]) -> String {
    let (head, indent) = if ctx.mode.is_pretty() {
        (status(ctx, Badge::Ok, title), "  ")
    } else {
        ("status=ok".to_string(), "")
    };

    let mut lines = vec![head];
    lines.extend(
        items
            .iter()
            .map(|(label, value)| format!("{}{}", indent, field(ctx, label, value))),
    );
    lines.join("\n")
}

/// Write to stdout unless in JSON or quiet mode.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.mode.is_json() && !ctx.quiet && !message.is_empty() {
        println!("{}", message);
    }
}

pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let mut lines = vec![status(ctx, Badge::Err, message)];
    lines.extend(error_hint.map(|text| hint(ctx, text)));
    lines.join("\n")
}

/// Errors always go to stderr, even when quiet.
pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}
