use crate::error::ConfigError;
use std::env;
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_PORT: u16 = 8501;
const DEFAULT_MAX_UPLOAD_MB: usize = 200;

/// Process configuration. Loaded once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    /// Reads the process environment. Call [`load_dotenv`] first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(&lookup)?;

        let model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = lookup("GEMINI_API_BASE")
            .filter(|b| !b.trim().is_empty())
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_mb = match lookup("MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|mb| *mb > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "MAX_UPLOAD_MB",
                    value: raw,
                })?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            api_key,
            model,
            api_base,
            port,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

/// Merge `.env` into the process environment. Returns whether a file was found.
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

fn resolve_api_key<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
        return Ok(key.trim().to_string());
    }

    // Secret-store fallback (docker/k8s style mounted file)
    if let Some(path) = lookup("GEMINI_API_KEY_FILE") {
        let key = std::fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
            path: path.clone(),
            source,
        })?;
        let key = key.trim();
        if !key.is_empty() {
            return Ok(key.to_string());
        }
        warn!("Secret file {} is empty", path);
    }

    Err(ConfigError::MissingCredential)
}
