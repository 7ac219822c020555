//! Configuration management for swcache

pub mod schema;

pub use schema::Config;

use crate::error::{SwError, SwResult};
use crate::worker::WorkerConfig;
use std::path::{Path, PathBuf};
use tokio::fs;
use toml_edit::{value, DocumentMut, Item, Table};
use tracing::{debug, info};

/// Reads and edits the config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config dir>/swcache/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("swcache")
            .join("config.toml")
    }

    /// Where caches and the registration live unless `storage.dir` is set
    pub fn default_state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("swcache")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> SwResult<Config> {
        if !self.config_path.exists() {
            debug!("No config at {}, using defaults", self.config_path.display());
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Parse a config file; a file that does not deserialize is `ConfigInvalid`
    pub async fn load_from_file(&self, path: &Path) -> SwResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SwError::io(format!("reading config from {}", path.display()), e))?;
        parse_config(path, &content)
    }

    /// Overwrite the config file with `config`
    pub async fn save(&self, config: &Config) -> SwResult<()> {
        self.write_file(toml::to_string_pretty(config)?).await?;
        info!("Wrote {}", self.config_path.display());
        Ok(())
    }

    /// Set one dotted key in the config file, keeping the rest of the file as written
    ///
    /// The edited document must still parse as a valid [`Config`] with a
    /// usable cache version and origin; otherwise the file is left untouched.
    pub async fn set_value(&self, key: &str, raw: &str) -> SwResult<Config> {
        let existing = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(SwError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        let edited = set_in_document(&existing, key, raw)?;
        let config = parse_config(&self.config_path, &edited)?;
        WorkerConfig::from_config(&config)?;

        self.write_file(edited).await?;
        info!("Set {} in {}", key, self.config_path.display());
        Ok(config)
    }

    async fn write_file(&self, content: String) -> SwResult<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| SwError::ConfigDirCreate {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }
        fs::write(&self.config_path, content)
            .await
            .map_err(|e| SwError::io(format!("writing config to {}", self.config_path.display()), e))
    }

    /// Create the state and caches directories
    pub async fn ensure_state_dirs(config: &Config) -> SwResult<()> {
        for dir in [config.state_dir(), config.caches_dir()] {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| SwError::io(format!("creating directory {}", dir.display()), e))?;
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_config(path: &Path, content: &str) -> SwResult<Config> {
    toml::from_str(content).map_err(|e| SwError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Set `section.key` (or `section.sub.key`) in a TOML document
///
/// Values are parsed as TOML when possible (`true`, `3`, `["/", "/a"]`) and
/// stored as strings otherwise.
fn set_in_document(content: &str, key: &str, raw: &str) -> SwResult<String> {
    let mut doc: DocumentMut = content.parse()?;

    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, tables)) = parts.split_last() else {
        return Err(SwError::User(format!("invalid config key '{}'", key)));
    };
    if tables.is_empty() || leaf.is_empty() {
        return Err(SwError::User(format!(
            "invalid config key '{}', expected section.key",
            key
        )));
    }

    let mut table: &mut Table = doc.as_table_mut();
    for name in tables {
        let entry = table
            .entry(name)
            .or_insert(Item::Table(Table::new()));
        table = entry
            .as_table_mut()
            .ok_or_else(|| SwError::User(format!("'{}' is not a table", name)))?;
    }

    let parsed = format!("v = {}", raw)
        .parse::<DocumentMut>()
        .ok()
        .and_then(|d| d.get("v").and_then(|i| i.as_value()).cloned());
    table[*leaf] = match parsed {
        Some(v) => Item::Value(v),
        None => value(raw),
    };

    Ok(doc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Manager for `config.toml` in a fresh directory, optionally pre-written
    fn manager_with(content: Option<&str>) -> (TempDir, ConfigManager) {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.toml");
        if let Some(content) = content {
            std::fs::write(&file, content).unwrap();
        }
        (temp, ConfigManager::with_path(file))
    }

    fn file_text(manager: &ConfigManager) -> String {
        std::fs::read_to_string(manager.path()).unwrap()
    }

    #[tokio::test]
    async fn missing_file_means_defaults() {
        let (_temp, manager) = manager_with(None);
        let config = manager.load().await.unwrap();
        assert_eq!(config.worker.cache_prefix, "portafolio");
        assert!(!manager.path().exists());
    }

    #[tokio::test]
    async fn saved_version_is_loaded_back() {
        let (_temp, manager) = manager_with(None);
        let mut config = Config::default();
        config.worker.version = "2.0.0".to_string();

        manager.save(&config).await.unwrap();
        assert_eq!(manager.load().await.unwrap().worker.version, "2.0.0");
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let (_temp, manager) = manager_with(Some("[worker]\nversion = 3\n"));
        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, SwError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn set_value_preserves_comments() {
        let (_temp, manager) =
            manager_with(Some("# deployed site\n[worker]\nversion = \"1.0.0\"\n"));

        let config = manager.set_value("worker.version", "1.1.0").await.unwrap();

        assert_eq!(config.worker.version, "1.1.0");
        let content = file_text(&manager);
        assert!(content.contains("# deployed site"));
        assert!(content.contains("version = \"1.1.0\""));
    }

    #[tokio::test]
    async fn set_value_parses_toml_values() {
        let (_temp, manager) = manager_with(None);

        manager.set_value("general.journal", "false").await.unwrap();
        let config = manager
            .set_value("worker.precache", r#"["/", "/index.html"]"#)
            .await
            .unwrap();

        assert!(!config.general.journal);
        assert_eq!(config.worker.precache, vec!["/", "/index.html"]);
    }

    #[tokio::test]
    async fn set_value_rejects_wrong_type() {
        let (_temp, manager) = manager_with(None);
        assert!(manager.set_value("general.journal", "maybe").await.is_err());
        assert!(manager.set_value("journal", "true").await.is_err());
    }

    #[tokio::test]
    async fn set_value_rejects_bad_version_without_writing() {
        let (_temp, manager) = manager_with(Some("[worker]\nversion = \"1.0.0\"\n"));

        let err = manager.set_value("worker.version", "latest").await.unwrap_err();
        assert!(matches!(err, SwError::InvalidVersion { .. }));
        assert!(file_text(&manager).contains("1.0.0"));
    }
}
