//! # Classificador Estatístico Externo
//!
//! O terceiro detector do ensemble roda fora do processo. Ele recebe as janelas de
//! [`crate::features`] e devolve uma predição inteira por janela:
//!
//! - `0`: fora de endereço
//! - `1`: início de endereço
//! - `2`: fim de endereço
//! - outro valor positivo: interior
//!
//! A chamada é o único ponto de suspensão de uma extração. O trait
//! [`AddressClassifier`] isola essa fronteira; [`HttpClassifier`] é a implementação
//! real, e os testes usam stubs determinísticos.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifierError;

/// Fronteira com o classificador: um lote de janelas entra, um lote de predições sai.
#[async_trait]
pub trait AddressClassifier: Send + Sync {
    /// Uma predição por janela, na mesma ordem.
    async fn predict(&self, windows: &[Vec<u8>]) -> Result<Vec<i64>, ClassifierError>;
}

/// Configuração do cliente HTTP do classificador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// URL que recebe o `POST` com as janelas.
    pub url: String,
    /// Tempo máximo da chamada inteira, em milissegundos.
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9999".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    features: &'a [Vec<u8>],
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: Vec<i64>,
}

/// Classificador acessado por HTTP (`{"features": [...]}` → `{"prediction": [...]}`).
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

#[async_trait]
impl AddressClassifier for HttpClassifier {
    async fn predict(&self, windows: &[Vec<u8>]) -> Result<Vec<i64>, ClassifierError> {
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.config.url)
            .json(&PredictionRequest { features: windows })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body: PredictionResponse = response.json().await?;
        debug!(windows = windows.len(), "classificador respondeu");
        Ok(body.prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert_eq!(config.url, "http://127.0.0.1:9999");
        assert!(config.timeout_ms > 0);
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let config: ClassifierConfig = serde_json::from_str(r#"{"url": "http://model:8000"}"#).unwrap();
        assert_eq!(config.url, "http://model:8000");
        assert_eq!(config.timeout_ms, ClassifierConfig::default().timeout_ms);
    }

    #[test]
    fn test_request_body_shape() {
        let windows = vec![vec![0u8; 50], vec![1u8; 50]];
        let json = serde_json::to_value(PredictionRequest { features: &windows }).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 2);
        assert_eq!(json["features"][1][49], 1);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_call() {
        let classifier = HttpClassifier::new(ClassifierConfig {
            url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 200,
        })
        .unwrap();
        assert!(classifier.predict(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let classifier = HttpClassifier::new(ClassifierConfig {
            url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 500,
        })
        .unwrap();
        let err = classifier.predict(&[vec![0; 50]]).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Transport(_)));
    }
}
