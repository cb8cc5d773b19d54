use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    pub database_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_avatar_upload_dir")]
    pub avatar_upload_dir: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Upper bound for request bodies on upload routes, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    database_url: Option<String>,
    db_max_connections: Option<u32>,
    avatar_upload_dir: Option<String>,
    log_dir: Option<String>,
    max_upload_size: Option<usize>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_avatar_upload_dir() -> String {
    "uploads/avatars".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_max_upload_size() -> usize {
    5 * 1024 * 1024
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let path = Path::new(path_str);
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Result<Self, String> {
        let final_config = ServerConfig {
            listen_addr: env_config.listen_addr.or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            database_url: env_config.database_url.or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            db_max_connections: env_config.db_max_connections.or(file_config.db_max_connections)
                .unwrap_or_else(default_db_max_connections),
            avatar_upload_dir: env_config.avatar_upload_dir.or(file_config.avatar_upload_dir)
                .unwrap_or_else(default_avatar_upload_dir),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            max_upload_size: env_config.max_upload_size.or(file_config.max_upload_size)
                .unwrap_or_else(default_max_upload_size),
        };

        if final_config.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }

        Ok(final_config)
    }
}
