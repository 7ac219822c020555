//! Fetch command - answer a request the way the active worker would

use crate::cli::args::FetchArgs;
use crate::cli::ConsoleSurface;
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::host::Host;
use crate::http::Request;
use crate::ui::{self, UiContext};
use crate::worker::FetchSource;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open_with(config, args.offline)?;
    let worker = host
        .active_worker(Arc::new(ConsoleSurface::new(ctx.clone())))
        .await?;

    let request = Request::get(&args.url)
        .with_method(&args.method)
        .with_destination(args.destination());
    let result = worker.handle_fetch(request).await;

    // Background writes finish before the process exits
    let writes = worker.settle().await;
    ui::write_report(&ctx, &writes);
    for failure in &writes.failed {
        host.journal
            .record(
                "cache_write_failed",
                &json!({
                    "cache_name": failure.cache_name,
                    "url": failure.key.url,
                    "reason": failure.reason,
                }),
            )
            .await;
    }

    ui::fetch_source(&ctx, &args.url, &result.source);
    let Some(response) = result.response else {
        return Err(SwError::User(format!(
            "{} is not cached and the network is unavailable",
            args.url
        )));
    };

    ui::key_value(
        &ctx,
        "Status",
        &format!("{} {}", response.status, response.status_text),
    );
    if let Some(content_type) = response.header("content-type") {
        ui::key_value(&ctx, "Content-Type", content_type);
    }
    ui::key_value(&ctx, "Bytes", &response.body.len().to_string());

    if args.body {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(&response.body)
            .and_then(|_| stdout.flush())
            .map_err(|e| SwError::io("writing response body", e))?;
    }

    if result.source == FetchSource::OfflineFallback {
        ui::step_warn(&ctx, "Served the offline page");
    }
    Ok(())
}
