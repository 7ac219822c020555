//! CLI argument definitions using clap derive

use crate::http::Destination;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// swcache - Offline cache worker
///
/// Pre-caches a site's must-have files, serves requests cache-first and
/// keeps exactly one versioned cache per deployed release.
#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SWCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the configured version: pre-cache every manifest path
    Install,

    /// Activate the waiting version and purge caches of other versions
    Activate,

    /// Fetch a URL or path through the active worker
    Fetch(FetchArgs),

    /// Post a control message to the waiting or active worker
    Message(MessageArgs),

    /// Deliver a push and show its notification
    Push(PushArgs),

    /// Click a notification
    Click(ClickArgs),

    /// Show registration and cache status
    Status,

    /// Inspect or clear cache stores
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Request destination as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DestinationArg {
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    Empty,
}

impl From<DestinationArg> for Destination {
    fn from(arg: DestinationArg) -> Self {
        match arg {
            DestinationArg::Document => Destination::Document,
            DestinationArg::Image => Destination::Image,
            DestinationArg::Script => Destination::Script,
            DestinationArg::Style => Destination::Style,
            DestinationArg::Font => Destination::Font,
            DestinationArg::Manifest => Destination::Manifest,
            DestinationArg::Empty => Destination::Empty,
        }
    }
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL or root-relative path (e.g. /index.html)
    pub url: String,

    /// Treat the request as a full-page navigation
    #[arg(long, conflicts_with = "destination")]
    pub navigate: bool,

    /// Request destination
    #[arg(short, long, value_enum)]
    pub destination: Option<DestinationArg>,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Simulate a network outage
    #[arg(long)]
    pub offline: bool,

    /// Print the response body
    #[arg(short, long)]
    pub body: bool,
}

impl FetchArgs {
    pub fn destination(&self) -> Destination {
        if self.navigate {
            return Destination::Document;
        }
        self.destination.map(Destination::from).unwrap_or_default()
    }
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    /// JSON message, e.g. '{"type":"SKIP_WAITING"}'
    #[arg(value_parser = parse_json)]
    pub data: serde_json::Value,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Push payload text (default notification body if omitted)
    pub payload: Option<String>,
}

/// Arguments for the click command
#[derive(Parser, Debug)]
pub struct ClickArgs {
    /// Tag of the notification being clicked
    #[arg(long, default_value = "swcache")]
    pub tag: String,

    /// Action button that was clicked (explore, close); none for the body
    #[arg(short, long)]
    pub action: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., worker.version)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List all cache stores
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List the entries of one store
    Show {
        /// Store name (defaults to the configured version's store)
        name: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete every store and forget the registration
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Parse a JSON argument
fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_valid() {
        let v = parse_json(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(v["type"], "SKIP_WAITING");
    }

    #[test]
    fn parse_json_invalid() {
        assert!(parse_json("{type:").is_err());
    }

    #[test]
    fn cli_parses_fetch_navigate() {
        let cli = Cli::parse_from(["swcache", "fetch", "/", "--navigate", "--offline"]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "/");
                assert!(args.offline);
                assert_eq!(args.destination(), Destination::Document);
                assert_eq!(args.method, "GET");
            }
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_fetch_destination() {
        let cli = Cli::parse_from(["swcache", "fetch", "/hero.png", "-d", "image"]);
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.destination(), Destination::Image),
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_fetch_defaults_to_empty_destination() {
        let cli = Cli::parse_from(["swcache", "fetch", "/api"]);
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.destination(), Destination::Empty),
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_rejects_navigate_with_destination() {
        assert!(Cli::try_parse_from(["swcache", "fetch", "/", "--navigate", "-d", "image"]).is_err());
    }

    #[test]
    fn cli_parses_message() {
        let cli = Cli::parse_from(["swcache", "message", r#"{"type":"SKIP_WAITING"}"#]);
        match cli.command {
            Commands::Message(args) => assert_eq!(args.data["type"], "SKIP_WAITING"),
            _ => panic!("expected Message command"),
        }
    }

    #[test]
    fn cli_parses_click() {
        let cli = Cli::parse_from(["swcache", "click", "--action", "close"]);
        match cli.command {
            Commands::Click(args) => {
                assert_eq!(args.action.as_deref(), Some("close"));
                assert_eq!(args.tag, "swcache");
            }
            _ => panic!("expected Click command"),
        }
    }

    #[test]
    fn cli_parses_cache_show() {
        let cli = Cli::parse_from(["swcache", "cache", "show", "portafolio-v1.0.0"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Show { name, .. },
            }) => assert_eq!(name.as_deref(), Some("portafolio-v1.0.0")),
            _ => panic!("expected cache show"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["swcache", "status"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["swcache", "-v", "status"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["swcache", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
    }
}
