use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::compiler::is_valid_table_name;
use crate::domain::search::ResultCacheSettings;
use crate::utils::file::{expand_path, resolve_relative};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CATALOG_TTL_SECS, DEFAULT_DATABASE_PATH,
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_QUERY_CACHE_MAX_ENTRIES, DEFAULT_QUERY_CACHE_TTL_SECS,
    DEFAULT_TABLE,
};

// =============================================================================
// File Config Structs (JSON config file, every field optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Route store configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// SQLite file; relative paths resolve against the config file's directory
    pub path: Option<String>,
    pub table: Option<String>,
}

/// Cache configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CacheFileConfig {
    pub catalog_ttl_secs: Option<u64>,
    pub query_ttl_secs: Option<u64>,
    pub query_max_entries: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub cache: Option<CacheFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Pin relative store paths to the file that named them
        if let Some(database) = config.database.as_mut()
            && let Some(db_path) = database.path.take()
        {
            let resolved = resolve_relative(&db_path, path.parent());
            database.path = Some(resolved.to_string_lossy().into_owned());
        }

        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        // Database
        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                tracing::trace!(path = ?database.path, "Merging database.path");
                current.path = database.path;
            }
            if database.table.is_some() {
                tracing::trace!(table = ?database.table, "Merging database.table");
                current.table = database.table;
            }
        }

        // Cache
        if let Some(cache) = other.cache {
            let current = self.cache.get_or_insert_with(CacheFileConfig::default);
            if cache.catalog_ttl_secs.is_some() {
                tracing::trace!(ttl = ?cache.catalog_ttl_secs, "Merging cache.catalog_ttl_secs");
                current.catalog_ttl_secs = cache.catalog_ttl_secs;
            }
            if cache.query_ttl_secs.is_some() {
                tracing::trace!(ttl = ?cache.query_ttl_secs, "Merging cache.query_ttl_secs");
                current.query_ttl_secs = cache.query_ttl_secs;
            }
            if cache.query_max_entries.is_some() {
                tracing::trace!(
                    max_entries = ?cache.query_max_entries,
                    "Merging cache.query_max_entries"
                );
                current.query_max_entries = cache.query_max_entries;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Route store configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub table: String,
}

/// Catalog and search result cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// 0 keeps the catalog until a manual refresh
    pub catalog_ttl_secs: u64,
    /// 0 keeps results until the catalog is refreshed
    pub query_ttl_secs: u64,
    pub query_max_entries: u64,
}

impl CacheConfig {
    pub fn result_cache(&self) -> ResultCacheSettings {
        ResultCacheSettings {
            ttl_secs: self.query_ttl_secs,
            max_entries: self.query_max_entries,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.busline/busline.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.busline/busline.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::layer(cli, file_config)
    }

    /// Layer defaults, merged file config, then CLI/env overrides
    fn layer(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_cache = file_config.cache.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let database_path = cli
            .database
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .or(file_database.path)
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        if database_path.trim().is_empty() {
            anyhow::bail!("Configuration error: database.path must not be empty");
        }

        let database = DatabaseConfig {
            path: expand_path(&database_path),
            table: cli
                .table
                .clone()
                .or(file_database.table)
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        };

        let cache = CacheConfig {
            catalog_ttl_secs: cli
                .catalog_ttl
                .or(file_cache.catalog_ttl_secs)
                .unwrap_or(DEFAULT_CATALOG_TTL_SECS),
            query_ttl_secs: cli
                .query_cache_ttl
                .or(file_cache.query_ttl_secs)
                .unwrap_or(DEFAULT_QUERY_CACHE_TTL_SECS),
            query_max_entries: cli
                .query_cache_max_entries
                .or(file_cache.query_max_entries)
                .unwrap_or(DEFAULT_QUERY_CACHE_MAX_ENTRIES),
        };

        let config = Self {
            server,
            database,
            cache,
        };
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            database = %config.database.path.display(),
            table = %config.database.table,
            catalog_ttl_secs = config.cache.catalog_ttl_secs,
            query_ttl_secs = config.cache.query_ttl_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        // Host must not be empty
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port must be non-zero (port 0 would cause bind failure)
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        // The table name is spliced into SQL, so it must be a bare identifier
        if !is_valid_table_name(&self.database.table) {
            anyhow::bail!(
                "Configuration error: database.table '{}' is not a valid identifier",
                self.database.table
            );
        }

        if self.cache.query_max_entries == 0 {
            anyhow::bail!("Configuration error: cache.query_max_entries must be greater than 0");
        }

        if self.cache.catalog_ttl_secs == 0 {
            tracing::debug!("cache.catalog_ttl_secs is 0, catalog is kept until refreshed");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.busline/busline.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "database": { "path": "/srv/redbus.db", "table": "routes_2024" },
            "cache": { "catalog_ttl_secs": 0, "query_ttl_secs": 60, "query_max_entries": 50 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("0.0.0.0".to_string()));
        assert_eq!(server.port, Some(8080));

        let database = config.database.as_ref().unwrap();
        assert_eq!(database.path, Some("/srv/redbus.db".to_string()));
        assert_eq!(database.table, Some("routes_2024".to_string()));

        let cache = config.cache.as_ref().unwrap();
        assert_eq!(cache.catalog_ttl_secs, Some(0));
        assert_eq!(cache.query_ttl_secs, Some(60));
        assert_eq!(cache.query_max_entries, Some(50));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.database.is_none());
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 9000 }, "databse": { "path": "x.db" } }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.server.as_ref().unwrap().port, Some(9000));
        assert!(config.database.is_none());
        let extra = config.extra.as_object().unwrap();
        assert!(extra.contains_key("databse"));
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
            }),
            database: Some(DatabaseFileConfig {
                path: Some("/base/redbus.db".to_string()),
                table: Some("bus_routes".to_string()),
            }),
            cache: Some(CacheFileConfig {
                catalog_ttl_secs: Some(60),
                query_ttl_secs: None,
                query_max_entries: Some(10),
            }),
            extra: serde_json::Value::Null,
        };

        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
            }),
            database: Some(DatabaseFileConfig {
                path: None,
                table: Some("routes_2025".to_string()),
            }),
            cache: Some(CacheFileConfig {
                catalog_ttl_secs: Some(0),
                query_ttl_secs: Some(30),
                query_max_entries: None,
            }),
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host, Some("base.host".to_string()));
        assert_eq!(server.port, Some(2000));

        let database = base.database.as_ref().unwrap();
        assert_eq!(database.path, Some("/base/redbus.db".to_string()));
        assert_eq!(database.table, Some("routes_2025".to_string()));

        let cache = base.cache.as_ref().unwrap();
        assert_eq!(cache.catalog_ttl_secs, Some(0));
        assert_eq!(cache.query_ttl_secs, Some(30));
        assert_eq!(cache.query_max_entries, Some(10));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::layer(&CliConfig::default(), FileConfig::default()).unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.database.path.is_absolute());
        assert!(config.database.path.ends_with(DEFAULT_DATABASE_PATH));
        assert_eq!(config.database.table, DEFAULT_TABLE);
        assert_eq!(config.cache.catalog_ttl_secs, DEFAULT_CATALOG_TTL_SECS);
        assert_eq!(config.cache.query_ttl_secs, DEFAULT_QUERY_CACHE_TTL_SECS);
        assert_eq!(
            config.cache.query_max_entries,
            DEFAULT_QUERY_CACHE_MAX_ENTRIES
        );
    }

    #[test]
    fn test_app_config_cli_override() {
        let file = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("file.host".to_string()),
                port: Some(4000),
            }),
            database: Some(DatabaseFileConfig {
                path: Some("/file/redbus.db".to_string()),
                table: Some("file_routes".to_string()),
            }),
            cache: Some(CacheFileConfig {
                catalog_ttl_secs: Some(10),
                query_ttl_secs: Some(20),
                query_max_entries: Some(30),
            }),
            extra: serde_json::Value::Null,
        };
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            config: None,
            database: Some(PathBuf::from("/cli/redbus.db")),
            table: None,
            catalog_ttl: Some(0),
            query_cache_ttl: None,
            query_cache_max_entries: Some(5),
        };

        let config = AppConfig::layer(&cli, file).unwrap();

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, PathBuf::from("/cli/redbus.db"));
        assert_eq!(config.database.table, "file_routes");
        assert_eq!(config.cache.catalog_ttl_secs, 0);
        assert_eq!(config.cache.query_ttl_secs, 20);
        assert_eq!(config.cache.query_max_entries, 5);
    }

    #[test]
    fn test_relative_database_path_follows_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, r#"{ "database": { "path": "data/redbus.db" } }"#).unwrap();

        let cli = CliConfig {
            config: Some(config_path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.database.path, dir.path().join("data/redbus.db"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/busline.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let result = AppConfig::layer(&cli, FileConfig::default());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.port must be greater than 0")
        );
    }

    #[test]
    fn test_app_config_validation_table_name() {
        let cli = CliConfig {
            table: Some("bus_routes; DROP TABLE bus_routes".to_string()),
            ..Default::default()
        };
        let result = AppConfig::layer(&cli, FileConfig::default());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("is not a valid identifier")
        );
    }

    #[test]
    fn test_app_config_validation_zero_cache_capacity() {
        let cli = CliConfig {
            query_cache_max_entries: Some(0),
            ..Default::default()
        };
        let result = AppConfig::layer(&cli, FileConfig::default());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("cache.query_max_entries must be greater than 0")
        );
    }

    #[test]
    fn test_app_config_validation_empty_database_path() {
        let cli = CliConfig {
            database: Some(PathBuf::new()),
            ..Default::default()
        };
        let result = AppConfig::layer(&cli, FileConfig::default());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("database.path must not be empty")
        );
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let result = AppConfig::layer(&cli, FileConfig::default());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.host must not be empty")
        );
    }
}
