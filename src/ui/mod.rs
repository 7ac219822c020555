//! Terminal output for the swcache CLI
//!
//! Uses `cliclack` for spinners and prompts when attached to a terminal and
//! falls back to plain `[OK]`/`[WARN]` lines in CI or when piped.
//!
//! ```rust,ignore
//! use swcache::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Pre-caching 6 paths...");
//! spinner.stop("Installed portafolio-v1.0.0");
//! ui::fetch_source(&ctx, "/", &result.source);
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    fetch_source, intro, key_value, key_value_status, note, outro_success, outro_warn, remark,
    section, step_error_detail, step_info, step_ok, step_warn, step_warn_hint, write_report,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
pub use theme::{init_theme, SwTheme};
