//! Status command - show registration and cache state

use crate::cache::CacheStorage;
use crate::config::Config;
use crate::error::SwResult;
use crate::host::Host;
use crate::registration::VersionRecord;
use crate::ui::{self, UiContext};
use crate::worker::WorkerState;

/// Execute the status command
pub async fn execute(config: &Config) -> SwResult<()> {
    let ctx = UiContext::detect();
    let host = Host::open(config)?;
    let registration = host.registration.load().await?;
    let configured = host.config.cache_name();

    ui::section(&ctx, "Worker");
    ui::key_value(&ctx, "Origin", &host.config.origin.to_string());
    ui::key_value(&ctx, "Network", &host.network.describe());
    let state = host.registration.state_of(&configured).await?;
    ui::key_value_status(
        &ctx,
        "Configured",
        &format!("{} ({})", configured, state),
        state == WorkerState::Activated,
    );
    if let Some(record) = registration.find(&configured) {
        ui::key_value(
            &ctx,
            "Installed",
            &record.installed_at.format("%Y-%m-%d %H:%M").to_string(),
        );
    }

    ui::section(&ctx, "Registration");
    print_record(&ctx, "Active", registration.active.as_ref());
    print_record(&ctx, "Waiting", registration.waiting.as_ref());

    ui::section(&ctx, "Caches");
    let names = host.storage.keys().await?;
    if names.is_empty() {
        ui::remark(&ctx, "none");
    }
    for name in &names {
        let entries = host.storage.entries(name).await?.len();
        let current = registration
            .active
            .as_ref()
            .is_some_and(|r| &r.cache_name == name);
        ui::key_value_status(&ctx, name, &format!("{} entries", entries), current);
    }

    if names.len() > 1 {
        ui::step_warn_hint(
            &ctx,
            &format!("{} caches on disk", names.len()),
            "Run: swcache activate",
        );
    }
    if config.general.journal {
        ui::remark(&ctx, &format!("journal: {}", host.journal.path().display()));
    }
    Ok(())
}

fn print_record(ctx: &UiContext, label: &str, record: Option<&VersionRecord>) {
    match record {
        Some(r) => ui::key_value(ctx, label, &format!("{} (v{})", r.cache_name, r.version)),
        None => ui::key_value(ctx, label, "-"),
    }
}
