//! Output functions for consistent CLI formatting
//!
//! Every function has two renderings: cliclack logs on a terminal, and
//! tagged plain lines (`[OK]`, `[WARN]`, ...) when piped or in CI.

use super::context::UiContext;
use crate::worker::{FetchSource, WriteReport};
use console::{style, Style};

/// Plain-mode line tags
#[derive(Clone, Copy)]
enum Tag {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Tag {
    fn render(self) -> String {
        match self {
            Tag::Ok => style("[OK]").green().to_string(),
            Tag::Warn => style("[WARN]").yellow().to_string(),
            Tag::Fail => style("[FAIL]").red().to_string(),
            Tag::Info => style("[INFO]").cyan().to_string(),
        }
    }
}

/// One indented step line in either rendering
fn step(ctx: &UiContext, tag: Tag, message: &str) {
    if ctx.use_fancy_output() {
        let _ = match tag {
            Tag::Ok => cliclack::log::success(message),
            Tag::Warn => cliclack::log::warning(message),
            Tag::Fail => cliclack::log::error(message),
            Tag::Info => cliclack::log::info(message),
        };
    } else {
        println!("  {} {}", tag.render(), message);
    }
}

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    let title = style(title).blue().bold();
    if ctx.use_fancy_output() {
        cliclack::intro(title).ok();
    } else {
        println!("{}\n", title);
    }
}

/// Closing line after a successful lifecycle change
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!("\n{} {}", Tag::Ok.render(), message);
    }
}

/// Closing line when something is left for the user to do
pub fn outro_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).yellow().bold()).ok();
    } else {
        println!("\n{} {}", Tag::Warn.render(), message);
    }
}

/// Boxed note; notifications are shown this way
pub fn note(ctx: &UiContext, title: &str, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::note(title, message).ok();
    } else {
        println!("{}: {}", style(title).bold(), message);
    }
}

pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Tag::Ok, message);
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Tag::Warn, message);
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    let hint = if ctx.use_fancy_output() {
        style(hint).dim().to_string()
    } else {
        hint.to_string()
    };
    step(ctx, Tag::Warn, &format!("{} - {}", message, hint));
}

pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.use_fancy_output() {
        style(detail).red().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, Tag::Fail, &format!("{}: {}", message, detail));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Tag::Info, message);
}

/// Dim secondary line
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Key-value line colored green when `ok`, yellow otherwise
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let value_style = if ok { Style::new().green() } else { Style::new().yellow() };
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let tag = if ok { Tag::Ok } else { Tag::Warn };
        println!("  {} {}: {}", tag.render(), key, value);
    }
}

/// Print where a fetched response came from, colored by outcome
pub fn fetch_source(ctx: &UiContext, url: &str, source: &FetchSource) {
    let source_style = match source {
        FetchSource::Cache => Style::new().green(),
        FetchSource::Network { .. } => Style::new().cyan(),
        FetchSource::OfflineFallback => Style::new().yellow(),
        FetchSource::Miss => Style::new().red(),
    };

    if ctx.use_fancy_output() {
        println!("  {} {}", source_style.apply_to(format!("[{}]", source)), url);
    } else {
        println!("  [{}] {}", source, url);
    }
}

/// Report background cache writes, failures first-class
pub fn write_report(ctx: &UiContext, report: &WriteReport) {
    for key in &report.completed {
        remark(ctx, &format!("stored {}", key));
    }
    for failure in &report.failed {
        step_warn_hint(ctx, &format!("Not cached: {}", failure.key), &failure.reason);
    }
}
