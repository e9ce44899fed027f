//! Configuração do serviço em camadas:
//!
//! 1. `config/default.toml` (opcional)
//! 2. `config/{ambiente}.toml` (opcional)
//! 3. variáveis `ADDRESS__SECAO__CAMPO`, ex.: `ADDRESS__CLASSIFIER__URL`

use address_core::{ClassifierConfig, DatasetPaths};
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub classifier: ClassifierConfig,
    /// Caminhos ausentes deixam só as listas fixas no gazetteer.
    pub datasets: DatasetPaths,
    /// Filtro do `tracing-subscriber`; `RUST_LOG` tem precedência.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            classifier: ClassifierConfig::default(),
            datasets: DatasetPaths::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "port must be non-zero"));
        }
        if self.classifier.url.trim().is_empty() {
            return Err(invalid("classifier.url", "url must not be empty"));
        }
        if self.classifier.timeout_ms == 0 {
            return Err(invalid("classifier.timeout_ms", "timeout must be non-zero"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Carrega as três camadas e valida o resultado.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("ADDRESS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    finish(builder)
}

fn finish(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Settings, ConfigError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
        assert!(settings.datasets.registry.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = from_toml(
            r#"
            log_filter = "debug"

            [classifier]
            url = "http://model:8000/predict"

            [datasets]
            registry = "data/registry.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(settings.log_filter, "debug");
        assert_eq!(settings.classifier.url, "http://model:8000/predict");
        assert_eq!(settings.classifier.timeout_ms, ClassifierConfig::default().timeout_ms);
        assert_eq!(
            settings.datasets.registry.as_deref(),
            Some(std::path::Path::new("data/registry.jsonl"))
        );
        assert!(settings.datasets.streets_cities.is_none());
        assert_eq!(settings.server, ServerConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.classifier.url = "  ".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "classifier.url"
        ));

        let mut settings = Settings::default();
        settings.classifier.timeout_ms = 0;
        assert!(settings.validate().is_err());

        let err = from_toml("[server]\nport = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_wrong_type_is_load_error() {
        let err = from_toml("[server]\nport = \"muitas\"").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
