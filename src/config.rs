use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::download::DEFAULT_DICTIONARY_URL;
use crate::error::{JrpError, Result};

/// Environment variable naming an extra configuration file
pub const CONFIG_FILE_ENV: &str = "JRP_CONFIG";

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub generate: GenerateConfig,
    pub interactive: InteractiveConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub default_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveConfig {
    pub timeout_secs: u64,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "warn".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            generate: GenerateConfig { default_number: 1 },
            interactive: InteractiveConfig {
                timeout_secs: 30,
                batch_size: 1,
            },
            download: DownloadConfig {
                url: DEFAULT_DICTIONARY_URL.to_string(),
                timeout_secs: 300,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let user_file = BaseDirs::new().map(|dirs| dirs.config_dir().join("jrp").join("config"));
        let extra_file = std::env::var(CONFIG_FILE_ENV).ok().filter(|s| !s.is_empty()).map(PathBuf::from);
        Self::load_from(user_file, extra_file)
    }

    /// Load configuration from explicit file locations plus `JRP__*` variables
    pub fn load_from(user_file: Option<PathBuf>, extra_file: Option<PathBuf>) -> Result<Self> {
        // Start with default values
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        // Add config files if they exist
        if let Some(path) = user_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Add environment variables with prefix
        let config = builder
            .add_source(Environment::with_prefix("JRP").prefix_separator("__").separator("__"))
            .build()?;

        let app_config: Self = config.try_deserialize()?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(JrpError::Config(config::ConfigError::Message(msg)));

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return invalid(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            ));
        }

        if self.generate.default_number == 0 {
            return invalid("default_number must be greater than 0".to_string());
        }

        // Validate interactive config
        if self.interactive.timeout_secs == 0 {
            return invalid("timeout_secs must be greater than 0".to_string());
        }
        if self.interactive.batch_size == 0 {
            return invalid("batch_size must be greater than 0".to_string());
        }

        // Validate download config
        if self.download.url.trim().is_empty() {
            return invalid("download url must not be empty".to_string());
        }
        if self.download.timeout_secs == 0 {
            return invalid("download timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
