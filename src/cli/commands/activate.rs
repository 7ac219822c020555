//! Activate command - promote the waiting version

use crate::cli::ConsoleSurface;
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::host::Host;
use crate::ui::{self, UiContext};
use crate::worker::ActivationReport;
use serde_json::json;
use std::sync::Arc;

/// Execute the activate command
pub async fn execute(config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open(config)?;
    let registration = host.registration.load().await?;

    if registration.waiting.is_some() {
        promote_waiting(&host, &ctx).await?;
        return Ok(());
    }

    // Re-activating the current version only purges leftovers again
    let Some(active) = registration.active else {
        return Err(SwError::NothingWaiting);
    };
    let worker = host
        .worker_for(&active.cache_name, Arc::new(ConsoleSurface::new(ctx.clone())))
        .await?;
    let report = worker.activate().await?;
    print_report(&ctx, &report);
    ui::outro_success(&ctx, &format!("{} is active", report.cache_name));
    Ok(())
}

/// Activate the waiting version, purge every other store and record it as active
pub(crate) async fn promote_waiting(host: &Host, ctx: &UiContext) -> SwResult<ActivationReport> {
    let worker = host
        .waiting_worker(Arc::new(ConsoleSurface::new(ctx.clone())))
        .await?;
    let report = worker.activate().await?;
    let record = host.registration.promote().await?;

    host.journal
        .record(
            "activate",
            &json!({
                "cache_name": report.cache_name,
                "version": record.version,
                "purged": report.purged,
                "failed": report.failed.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            }),
        )
        .await;

    print_report(ctx, &report);
    ui::outro_success(
        ctx,
        &format!("{} now controls {}", report.cache_name, host.config.origin),
    );
    Ok(report)
}

fn print_report(ctx: &UiContext, report: &ActivationReport) {
    for name in &report.purged {
        ui::step_ok(ctx, &format!("Purged {}", name));
    }
    for (name, reason) in &report.failed {
        ui::step_error_detail(ctx, &format!("Failed to purge {}", name), reason);
    }
    if report.purged.is_empty() && report.failed.is_empty() {
        ui::remark(ctx, "no old caches to purge");
    }
}
