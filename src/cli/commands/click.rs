//! Click command - react to a notification click

use crate::cli::args::ClickArgs;
use crate::cli::ConsoleSurface;
use crate::config::Config;
use crate::error::SwResult;
use crate::host::Host;
use crate::ui::{self, UiContext};
use crate::worker::ClickOutcome;
use std::sync::Arc;

/// Execute the click command
pub async fn execute(args: ClickArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open(config)?;
    let worker = host
        .configured_worker(Arc::new(ConsoleSurface::new(ctx.clone())))
        .await?;

    match worker
        .handle_notification_click(&args.tag, args.action.as_deref())
        .await?
    {
        ClickOutcome::Opened(_) => {}
        ClickOutcome::Dismissed => ui::step_info(&ctx, "Notification dismissed"),
    }
    Ok(())
}
