//! Cache command - inspect and clear cache stores

use crate::cache::{CacheName, CacheStorage};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::SwResult;
use crate::host::Host;
use crate::registration::{Registration, VersionRecord};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use serde_json::json;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SwResult<()> {
    let host = Host::open(config)?;

    match args.action {
        CacheAction::List { format } => list_stores(&host, format).await,
        CacheAction::Show { name, format } => {
            let name = name.unwrap_or_else(|| host.config.cache_name());
            show_store(&host, &name, format).await
        }
        CacheAction::Clear { yes } => clear_stores(&host, yes).await,
    }
}

/// One store as shown by `cache list`
#[derive(Debug, Serialize)]
struct StoreSummary {
    name: String,
    entries: usize,
    role: &'static str,
}

/// How the registration uses a store
///
/// Stores of another site (different prefix) are `foreign`; they are still
/// purged on the next activation.
fn role_of(registration: &Registration, configured: &CacheName, name: &str) -> &'static str {
    let is = |r: &Option<VersionRecord>| {
        r.as_ref().is_some_and(|r| r.cache_name == name)
    };
    if is(&registration.active) {
        "active"
    } else if is(&registration.waiting) {
        "waiting"
    } else if configured.same_family(name) {
        "stale"
    } else {
        "foreign"
    }
}

async fn list_stores(host: &Host, format: OutputFormat) -> SwResult<()> {
    let registration = host.registration.load().await?;
    let mut stores = vec![];
    for name in host.storage.keys().await? {
        let entries = host.storage.entries(&name).await?.len();
        stores.push(StoreSummary {
            role: role_of(&registration, &host.config.cache_name, &name),
            name,
            entries,
        });
    }

    if stores.is_empty() && !matches!(format, OutputFormat::Json) {
        println!("No caches found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => {
            println!("{:<32} {:<8} {:<8}", "CACHE", "ENTRIES", "ROLE");
            println!("{}", "-".repeat(50));
            for store in &stores {
                let role = match store.role {
                    "active" => style(store.role).green().to_string(),
                    "waiting" => style(store.role).yellow().to_string(),
                    _ => style(store.role).dim().to_string(),
                };
                println!("{:<32} {:<8} {:<8}", store.name, store.entries, role);
            }
            println!();
            println!("Total: {} cache(s)", stores.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stores)?),
        OutputFormat::Plain => {
            for store in &stores {
                println!("{}", store.name);
            }
        }
    }
    Ok(())
}

async fn show_store(host: &Host, name: &str, format: OutputFormat) -> SwResult<()> {
    let entries = host.storage.stored_entries(name).await?;

    match format {
        OutputFormat::Table => {
            println!("{}", style(name).bold());
            println!(
                "{:<6} {:<48} {:<6} {:<24} {:<16}",
                "METHOD", "URL", "STATUS", "CONTENT-TYPE", "CACHED"
            );
            println!("{}", "-".repeat(104));
            for entry in &entries {
                println!(
                    "{:<6} {:<48} {:<6} {:<24} {:<16}",
                    entry.key.method,
                    entry.key.url,
                    entry.response.status,
                    entry.response.header("content-type").unwrap_or("-"),
                    entry.cached_at.format("%Y-%m-%d %H:%M"),
                );
            }
            println!();
            println!("Total: {} entries", entries.len());
        }
        OutputFormat::Json => {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "method": e.key.method,
                        "url": e.key.url,
                        "status": e.response.status,
                        "type": e.response.response_type,
                        "cached_at": e.cached_at.to_rfc3339(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.key.url);
            }
        }
    }
    Ok(())
}

/// Delete every store and forget the registration
async fn clear_stores(host: &Host, skip_confirm: bool) -> SwResult<()> {
    let ctx = UiContext::detect().with_auto_yes(skip_confirm);
    let names = host.storage.keys().await?;

    if names.is_empty() {
        println!("No caches to clear.");
        return Ok(());
    }

    println!("This will remove {} cache(s):", names.len());
    for name in &names {
        println!("  {} {}", style("•").red(), name);
    }
    println!();

    if !ui::confirm(&ctx, "Remove every cache and the registration?", false).await? {
        println!("Aborted.");
        return Ok(());
    }

    let mut removed = vec![];
    for name in names {
        if host.storage.delete(&name).await? {
            removed.push(name);
        }
    }
    host.registration.clear().await?;
    host.journal
        .record("clear", &json!({ "removed": removed }))
        .await;

    ui::step_ok(&ctx, &format!("Cleared {} cache(s)", removed.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_roles() {
        let mut registration = Registration::new("http://localhost:4173");
        registration.active = Some(VersionRecord::new("portafolio-v1.0.0", "1.0.0"));
        registration.waiting = Some(VersionRecord::new("portafolio-v1.1.0", "1.1.0"));

        let configured = CacheName::new("portafolio", "1.1.0").unwrap();

        assert_eq!(role_of(&registration, &configured, "portafolio-v1.0.0"), "active");
        assert_eq!(role_of(&registration, &configured, "portafolio-v1.1.0"), "waiting");
        assert_eq!(role_of(&registration, &configured, "portafolio-v0.9.0"), "stale");
        assert_eq!(role_of(&registration, &configured, "images"), "foreign");
    }
}
