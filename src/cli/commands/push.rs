//! Push command - deliver a push message

use crate::cli::args::PushArgs;
use crate::cli::ConsoleSurface;
use crate::config::Config;
use crate::error::SwResult;
use crate::host::Host;
use crate::ui::UiContext;
use serde_json::json;
use std::sync::Arc;

/// Execute the push command
pub async fn execute(args: PushArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open(config)?;
    let worker = host
        .configured_worker(Arc::new(ConsoleSurface::new(ctx)))
        .await?;

    let notification = worker.handle_push(args.payload.as_deref()).await?;
    host.journal
        .record(
            "push",
            &json!({ "tag": notification.tag, "body": notification.body }),
        )
        .await;
    Ok(())
}
