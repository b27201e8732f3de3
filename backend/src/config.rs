//! Dashboard configuration file support.
//!
//! Settings are read from `top50.toml` when present and fall back to
//! defaults otherwise. A handful of environment variables override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::RepositoryError;

pub const CONFIG_FILE_NAME: &str = "top50.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub playlist: PlaylistSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Locations of the flat files loaded at startup. File names are resolved
/// relative to `dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_chart_file")]
    pub chart_file: String,
    #[serde(default = "default_genre_file")]
    pub genre_file: String,
    #[serde(default = "default_boundary_file")]
    pub boundary_file: String,
    #[serde(default = "default_overview_file")]
    pub overview_file: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            chart_file: default_chart_file(),
            genre_file: default_genre_file(),
            boundary_file: default_boundary_file(),
            overview_file: default_overview_file(),
        }
    }
}

impl DataSettings {
    pub fn chart_path(&self) -> PathBuf {
        self.dir.join(&self.chart_file)
    }

    pub fn genre_path(&self) -> PathBuf {
        self.dir.join(&self.genre_file)
    }

    pub fn boundary_path(&self) -> PathBuf {
        self.dir.join(&self.boundary_file)
    }

    pub fn overview_path(&self) -> PathBuf {
        self.dir.join(&self.overview_file)
    }
}

/// Credentials and endpoints for the playlist resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: default_api_base(),
            auth_url: default_auth_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PlaylistSettings {
    /// Both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum memoized outputs; 0 disables memoization.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_chart_file() -> String {
    "universal_top_spotify_songs.csv".to_string()
}

fn default_genre_file() -> String {
    "genres.csv".to_string()
}

fn default_boundary_file() -> String {
    "genre_boundary.json".to_string()
}

fn default_overview_file() -> String {
    "genre_overview.json".to_string()
}

fn default_api_base() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_timeout_secs() -> u64 {
    40
}

fn default_cache_capacity() -> usize {
    256
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location, or defaults when no
    /// file exists.
    ///
    /// Searches for `top50.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths.iter() {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(path);
            }
        }

        log::info!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Apply `HOST`, `PORT`, `TOP50_DATA_DIR`, `SPOTIFY_CLIENT_ID` and
    /// `SPOTIFY_CLIENT_SECRET` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, RepositoryError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; used by `with_env_overrides`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, RepositoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| {
                RepositoryError::configuration(format!("PORT must be a port number, got '{}'", port))
            })?;
        }
        if let Some(dir) = lookup("TOP50_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }
        if let Some(id) = lookup("SPOTIFY_CLIENT_ID") {
            self.playlist.client_id = id;
        }
        if let Some(secret) = lookup("SPOTIFY_CLIENT_SECRET") {
            self.playlist.client_secret = secret;
        }
        Ok(self)
    }

    /// Listener address as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.capacity, 256);
        assert!(!config.playlist.is_configured());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 9000

[data]
dir = "/srv/top50"
chart_file = "charts.csv"

[playlist]
client_id = "id"
client_secret = "secret"
timeout_secs = 5
"#;
        let config = DashboardConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.data.chart_path(), PathBuf::from("/srv/top50/charts.csv"));
        assert_eq!(config.data.genre_path(), PathBuf::from("/srv/top50/genres.csv"));
        assert!(config.playlist.is_configured());
        assert_eq!(config.playlist.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = DashboardConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("TOP50_DATA_DIR", "/tmp/data"),
            ("SPOTIFY_CLIENT_ID", "abc"),
        ]
        .into_iter()
        .collect();

        let config = DashboardConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.data.dir, PathBuf::from("/tmp/data"));
        assert_eq!(config.playlist.client_id, "abc");
        assert!(!config.playlist.is_configured());

        let bad = DashboardConfig::default()
            .with_overrides(|k| (k == "PORT").then(|| "http".to_string()));
        assert!(bad.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[cache]\ncapacity = 0\n").unwrap();
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.capacity, 0);

        assert!(DashboardConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
