//! Spinner for long-running steps, with CI fallback

use super::context::UiContext;
use console::style;
use std::time::Instant;

/// Spinner that appends how long the step took when it finishes
///
/// Without a terminal it prints one `...` line on start and one tagged line
/// on finish.
pub struct TaskSpinner {
    bar: Option<cliclack::ProgressBar>,
    started: Option<Instant>,
    fancy: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            bar: None,
            started: None,
            fancy: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        self.started = Some(Instant::now());
        if !self.fancy {
            println!("{} {}", style("...").dim(), message);
            return;
        }
        let bar = cliclack::spinner();
        bar.start(message);
        self.bar = Some(bar);
    }

    pub fn stop(&mut self, message: &str) {
        self.finish(message, true);
    }

    pub fn stop_error(&mut self, message: &str) {
        self.finish(message, false);
    }

    fn finish(&mut self, message: &str, ok: bool) {
        let message = self.with_elapsed(message);
        match (self.bar.take(), ok) {
            (Some(bar), true) => bar.stop(message),
            (Some(bar), false) => bar.error(message),
            (None, true) => println!("{} {}", style("[OK]").green(), message),
            (None, false) => println!("{} {}", style("[FAIL]").red(), message),
        }
    }

    fn with_elapsed(&mut self, message: &str) -> String {
        match self.started.take() {
            Some(started) => format!("{} ({:.1}s)", message, started.elapsed().as_secs_f64()),
            None => message.to_string(),
        }
    }
}
