//! Install command - pre-cache the configured version

use super::activate::promote_waiting;
use crate::cli::ConsoleSurface;
use crate::config::Config;
use crate::error::SwResult;
use crate::host::Host;
use crate::registration::{Placement, VersionRecord};
use crate::ui::{self, TaskSpinner, UiContext};
use crate::worker::WorkerState;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Execute the install command
pub async fn execute(config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open(config)?;
    let worker = host
        .configured_worker(Arc::new(ConsoleSurface::new(ctx.clone())))
        .await?;
    let cache_name = worker.config().cache_name();

    match worker.state() {
        WorkerState::Activated => {
            ui::step_info(&ctx, &format!("{} is already active", cache_name));
            return Ok(());
        }
        WorkerState::Installed => {
            ui::step_warn_hint(
                &ctx,
                &format!("{} is already installed and waiting", cache_name),
                "Run: swcache activate",
            );
            return Ok(());
        }
        _ => {}
    }

    ui::intro(&ctx, &format!("Installing {}", cache_name));
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!(
        "Pre-caching {} paths from {}",
        worker.config().precache.len(),
        host.network.describe()
    ));

    let report = match worker.install().await {
        Ok(report) => report,
        Err(e) => {
            spinner.stop_error(&format!("Install of {} failed", cache_name));
            host.journal
                .record(
                    "install_failed",
                    &json!({ "cache_name": cache_name, "error": e.to_string() }),
                )
                .await;
            return Err(e);
        }
    };
    spinner.stop(&format!("Cached {} paths", report.cached.len()));
    for url in &report.cached {
        ui::remark(&ctx, url);
    }

    let version = worker.config().cache_name.version().to_string();
    host.journal
        .record(
            "install",
            &json!({
                "cache_name": report.cache_name,
                "version": version,
                "cached": report.cached.len(),
            }),
        )
        .await;

    let placement = host
        .registration
        .record_install(VersionRecord::new(&report.cache_name, version))
        .await?;
    debug!("{} placed as {:?}", report.cache_name, placement);

    match placement {
        Placement::ActivateNow => {
            promote_waiting(&host, &ctx).await?;
        }
        Placement::Waiting => ui::outro_warn(
            &ctx,
            &format!(
                "{} installed and waiting. Run: swcache activate (or send {{\"type\":\"{}\"}})",
                report.cache_name, host.config.skip_waiting_message
            ),
        ),
        Placement::AlreadyActive => {
            ui::step_info(&ctx, &format!("{} is already active", report.cache_name))
        }
    }

    Ok(())
}
