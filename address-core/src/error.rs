//! Erros tipados do crate.

use std::path::PathBuf;

use thiserror::Error;

/// Falhas da chamada ao classificador estatístico externo.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Conexão recusada, timeout, corpo inválido...
    #[error("classifier transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned status {0}")]
    Status(u16),

    #[error("classifier returned {got} predictions for {expected} windows")]
    LengthMismatch { expected: usize, got: usize },
}

/// Único erro possível de [`crate::pipeline::AddressPipeline::extract`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Falha fatal ao ler um dataset do gazetteer.
///
/// Registros malformados não geram erro: são descartados e contados.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Falha ao montar o modelo na inicialização.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("invalid context pattern: {0}")]
    Pattern(#[from] regex::Error),
}
