//! Message command - post a control message to the worker

use super::activate::promote_waiting;
use crate::cli::args::MessageArgs;
use crate::cli::ConsoleSurface;
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::host::Host;
use crate::ui::{self, UiContext};
use crate::worker::MessageOutcome;
use std::sync::Arc;

/// Execute the message command
///
/// The message goes to the waiting version if there is one, otherwise to
/// the active version.
pub async fn execute(args: MessageArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open(config)?;
    let registration = host.registration.load().await?;

    let target = registration
        .waiting
        .as_ref()
        .or(registration.active.as_ref())
        .ok_or(SwError::NotInstalled)?;
    let worker = host
        .worker_for(&target.cache_name, Arc::new(ConsoleSurface::new(ctx.clone())))
        .await?;

    match worker.handle_message(&args.data) {
        MessageOutcome::SkipWaiting if registration.waiting.is_some() => {
            ui::step_info(&ctx, &format!("{} skips waiting", target.cache_name));
            promote_waiting(&host, &ctx).await?;
        }
        MessageOutcome::SkipWaiting => {
            ui::step_info(&ctx, &format!("{} is already active", target.cache_name));
        }
        MessageOutcome::Ignored => {
            ui::remark(&ctx, &format!("message ignored: {}", args.data));
        }
    }

    Ok(())
}
