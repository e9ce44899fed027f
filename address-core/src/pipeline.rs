//! # Pipeline de Endereços — Orquestrador com Eventos Observáveis
//!
//! O pipeline coordena os três detectores e o combinador, emitindo um evento a cada
//! etapa via um canal Rust (`mpsc`). O servidor WebSocket usa esses eventos para
//! mostrar o progresso de uma extração.
//!
//! ```text
//! texto → normalização → regex ─────────────┐
//!                      → gazetteers ────────┤
//!                      → janelas → classificador ─┴→ varredura → decomposição → detecções
//! ```
//!
//! A chamada ao classificador é o único `await`. Todo o resto é síncrono, local e
//! determinístico sobre o modelo compartilhado (somente leitura).

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::AddressClassifier;
use crate::ensemble::{classifier_spans, finalize, merge_spans, MergedInterval};
use crate::error::{ClassifierError, ExtractError};
use crate::features::FeatureMatrix;
use crate::model::AddressModel;
use crate::normalize::remove_diacritics;
use crate::span::{CandidateSpan, Detection};
use crate::tokenizer::Token;

/// Eventos emitidos pelo pipeline durante uma extração.
///
/// Cada variante carrega apenas dados da requisição corrente.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: diacríticos removidos. Os offsets de todos os eventos seguintes
    /// se referem a este texto.
    Normalized { text: String, chars: usize },
    /// **Passo 2**: trechos do detector por padrões de contexto.
    PatternSpans { spans: Vec<CandidateSpan> },
    /// **Passo 3**: trechos aceitos pelo classificador de gazetteers.
    GazetteerSpans { spans: Vec<CandidateSpan> },
    /// **Passo 4**: tokens do modo janela e quantas janelas serão enviadas.
    FeaturesBuilt { tokens: Vec<Token>, windows: usize },
    /// **Passo 5**: resposta do classificador e os trechos montados a partir dela.
    Predictions {
        predictions: Vec<i64>,
        spans: Vec<CandidateSpan>,
    },
    /// **Passo 6**: intervalos da varredura, antes do filtro de aceitação.
    Merged { intervals: Vec<MergedInterval> },
    /// **Conclusão**: detecções publicadas.
    Done {
        detections: Vec<Detection>,
        processing_ms: u64,
    },
    /// **Falha**: a extração inteira foi abortada.
    Error { message: String },
}

/// O pipeline de detecção de endereços.
///
/// Barato de clonar: o modelo compartilha a loja de gazetteers via `Arc` e o
/// classificador também fica atrás de um `Arc`.
#[derive(Clone)]
pub struct AddressPipeline {
    model: AddressModel,
    classifier: Arc<dyn AddressClassifier>,
}

impl AddressPipeline {
    pub fn new(model: AddressModel, classifier: Arc<dyn AddressClassifier>) -> Self {
        Self { model, classifier }
    }

    pub fn model(&self) -> &AddressModel {
        &self.model
    }

    /// Detecta os endereços de `text`.
    ///
    /// Os offsets das detecções são posições de caractere no texto sem diacríticos,
    /// que tem o mesmo comprimento do original.
    pub async fn extract(&self, text: &str) -> Result<Vec<Detection>, ExtractError> {
        // sem receptor: os envios falham em silêncio
        let (tx, _) = mpsc::channel();
        self.extract_streaming(text, tx).await
    }

    /// Como [`extract`](Self::extract), emitindo um [`PipelineEvent`] por etapa.
    ///
    /// A sequência termina sempre com `Done` ou `Error`.
    pub async fn extract_streaming(
        &self,
        text: &str,
        tx: mpsc::Sender<PipelineEvent>,
    ) -> Result<Vec<Detection>, ExtractError> {
        let start = Instant::now();

        // === Passo 1: Normalização ===
        let normalized = remove_diacritics(text);
        let _ = tx.send(PipelineEvent::Normalized {
            text: normalized.clone(),
            chars: normalized.chars().count(),
        });

        if normalized.trim().is_empty() {
            let _ = tx.send(PipelineEvent::Done {
                detections: Vec::new(),
                processing_ms: start.elapsed().as_millis() as u64,
            });
            return Ok(Vec::new());
        }

        // === Passos 2 e 3: Detectores determinísticos ===
        let pattern_spans = self.model.context.extract(&normalized);
        let _ = tx.send(PipelineEvent::PatternSpans {
            spans: pattern_spans.clone(),
        });

        let gazetteer_spans = self.model.gazetteer.extract(&normalized);
        let _ = tx.send(PipelineEvent::GazetteerSpans {
            spans: gazetteer_spans.clone(),
        });

        // === Passo 4: Janelas ===
        let matrix = FeatureMatrix::build(&normalized, &pattern_spans, &gazetteer_spans);
        let _ = tx.send(PipelineEvent::FeaturesBuilt {
            tokens: matrix.tokens.clone(),
            windows: matrix.windows.len(),
        });

        if matrix.is_empty() {
            let _ = tx.send(PipelineEvent::Done {
                detections: Vec::new(),
                processing_ms: start.elapsed().as_millis() as u64,
            });
            return Ok(Vec::new());
        }

        // === Passo 5: Classificador externo ===
        let predictions = match self.predict(&matrix.windows).await {
            Ok(predictions) => predictions,
            Err(err) => {
                warn!(error = %err, "classificador falhou; extração abortada");
                let _ = tx.send(PipelineEvent::Error {
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };
        let model_spans = classifier_spans(&matrix.tokens, &predictions);
        let _ = tx.send(PipelineEvent::Predictions {
            predictions,
            spans: model_spans.clone(),
        });

        // === Passo 6: Varredura ===
        let mut spans = pattern_spans;
        spans.extend(gazetteer_spans);
        spans.extend(model_spans);
        let intervals = merge_spans(&spans);
        let _ = tx.send(PipelineEvent::Merged {
            intervals: intervals.clone(),
        });

        // === Passo 7: Aceitação e decomposição ===
        let detections = finalize(&normalized, &intervals, &self.model.gazetteer);
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            candidates = spans.len(),
            detections = detections.len(),
            elapsed_ms = elapsed,
            "extração concluída"
        );

        let _ = tx.send(PipelineEvent::Done {
            detections: detections.clone(),
            processing_ms: elapsed,
        });
        Ok(detections)
    }

    /// Uma predição por janela, ou erro.
    async fn predict(&self, windows: &[Vec<u8>]) -> Result<Vec<i64>, ClassifierError> {
        let predictions = self.classifier.predict(windows).await?;
        if predictions.len() != windows.len() {
            return Err(ClassifierError::LengthMismatch {
                expected: windows.len(),
                got: predictions.len(),
            });
        }
        Ok(predictions)
    }
}
