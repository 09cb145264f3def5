use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Maximum upload size in bytes (whole multipart body)
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Hosted,
    Local,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for local storage backend
    pub local_storage_path: String,
    /// Base URL of the hosted storage API (required when backend is hosted)
    pub hosted_url: Option<String>,
    /// Service key for the hosted storage API (required when backend is hosted)
    pub hosted_key: Option<String>,
    /// Bucket name in the hosted storage API (required when backend is hosted)
    pub hosted_bucket: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_storage_path: "./media".to_string(),
            hosted_url: None,
            hosted_key: None,
            hosted_bucket: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "hosted" => StorageBackend::Hosted,
            _ => StorageBackend::Local,
        };

        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./media".to_string());

        let hosted_url = std::env::var("HOSTED_STORAGE_URL").ok();
        let hosted_key = std::env::var("HOSTED_STORAGE_KEY").ok();
        let hosted_bucket = std::env::var("HOSTED_STORAGE_BUCKET").ok();

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
            },
            storage: StorageConfig {
                backend,
                local_storage_path,
                hosted_url,
                hosted_key,
                hosted_bucket,
            },
            test_mode,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if matches!(self.storage.backend, StorageBackend::Hosted) {
            for (var, value) in [
                ("HOSTED_STORAGE_URL", &self.storage.hosted_url),
                ("HOSTED_STORAGE_KEY", &self.storage.hosted_key),
                ("HOSTED_STORAGE_BUCKET", &self.storage.hosted_bucket),
            ] {
                if value.is_none() {
                    return Err(ConfigError::ValidationError(format!(
                        "{var} is required when STORAGE_BACKEND=hosted"
                    )));
                }
            }
        }

        Ok(())
    }
}
