use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// Brevo transactional email. An empty `api_key` switches delivery to the
/// console fallback used in development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_sender_email")]
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_media_folder")]
    pub folder: String,
    #[serde(default = "default_media_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_media_folder(),
            timeout_secs: default_media_timeout_secs(),
        }
    }
}

fn default_sender_email() -> String {
    "no-reply@aulaclick.local".to_string()
}

fn default_sender_name() -> String {
    "Aula Click".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_media_folder() -> String {
    "aula_click".to_string()
}

fn default_media_timeout_secs() -> u64 {
    120
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Without a config file everything comes from the environment.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| AppError::ConfigError(format!("Failed to parse {config_path}: {e}")))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    AppError::ConfigError(
                        "DATABASE_URL is not set and no config.toml was found".to_string(),
                    )
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8000u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 3600i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            604_800i64,
                        ),
                    },
                    email: EmailConfig::default(),
                    media: MediaConfig::default(),
                }
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Cannot read config file {config_path}: {e}"
                )));
            }
        };

        // Environment always wins over the file.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }

        // Brevo
        if let Ok(v) = env::var("BREVO_API_KEY") {
            config.email.api_key = v;
        }
        if let Ok(v) = env::var("BREVO_SENDER_EMAIL") {
            config.email.sender_email = v;
        }
        if let Ok(v) = env::var("BREVO_SENDER_NAME") {
            config.email.sender_name = v;
        }
        if let Ok(v) = env::var("EMAIL_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.email.timeout_secs = n;
        }

        // Cloudinary
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            config.media.cloud_name = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            config.media.api_key = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            config.media.api_secret = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_FOLDER") {
            config.media.folder = v;
        }
        if let Ok(v) = env::var("MEDIA_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.media.timeout_secs = n;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_sections_default() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/aula"
            max_connections = 5

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.email.api_key.is_empty());
        assert_eq!(config.email.timeout_secs, 10);
        assert_eq!(config.media.folder, "aula_click");
    }
}
