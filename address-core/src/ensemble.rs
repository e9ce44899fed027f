//! # Combinador do Ensemble
//!
//! Junta os trechos dos três detectores em detecções finais:
//!
//! 1. **Trechos do classificador**: as predições por token passam pela mesma montagem
//!    de sequências do classificador de gazetteers ([`assemble_runs`]) e cada trecho
//!    recebe um score a partir dos marcadores de início/fim ([`span_score`]).
//! 2. **Eventos de fronteira**: cada trecho vira um evento `Start` e um `End`,
//!    ordenados por posição (`Start` antes de `End` na mesma posição).
//! 3. **Varredura**: um autômato de dois estados (`Idle`/`Inside`) funde trechos que
//!    se sobrepõem ou se tocam, seja qual for o detector de origem.
//! 4. **Aceitação**: um intervalo fundido só vale com pelo menos dois `Start` ou com
//!    algum trecho do classificador, e só é publicado com score ≥ 0.5.
//! 5. **Decomposição**: o classificador de gazetteers rotula os componentes do trecho.
//!
//! ## Score de um intervalo
//!
//! Média, sobre todos os eventos do intervalo, de:
//!
//! - o score do próprio evento, quando o trecho tem um (classificador);
//! - senão, um decaimento linear: `1 - (pos - início) / n` para `Start` e
//!   `1 - (fim - pos) / n` para `End`, com `n = fim - início`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dictionary::GazetteerClassifier;
use crate::grammar::ASSEMBLY_GAP;
use crate::normalize::CharIndex;
use crate::span::{assemble_runs, CandidateSpan, Detection, SpanOrigin, MIN_POSITIVES};
use crate::tokenizer::Token;

/// Score mínimo de uma detecção publicada.
pub const MIN_DETECTION_SCORE: f64 = 0.5;

const BEGIN_MARKER: i64 = 1;
const END_MARKER: i64 = 2;

/// Trechos do classificador, em offsets de caractere dos tokens do modo janela.
pub fn classifier_spans(tokens: &[Token], predictions: &[i64]) -> Vec<CandidateSpan> {
    let positive: Vec<bool> = predictions.iter().map(|&p| p > 0).collect();
    assemble_runs(&positive, ASSEMBLY_GAP, MIN_POSITIVES)
        .into_iter()
        .filter_map(|run| {
            let first = tokens.get(run.start)?;
            let last = tokens.get(run.end)?;
            Some(CandidateSpan {
                start: first.start,
                end: last.end,
                origin: SpanOrigin::Classifier,
                score: Some(span_score(&predictions[run.start..=run.end])),
            })
        })
        .collect()
}

/// Score de um trecho montado a partir das predições, em [0, 1].
///
/// O nível base depende de onde estão o primeiro marcador de início e o último de
/// fim (só contam se estiverem a no máximo uma posição da borda); a densidade de
/// positivos entre eles soma até 0.2.
pub fn span_score(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let begin = values.iter().position(|&v| v == BEGIN_MARKER).filter(|&i| i <= 1);
    let end = values.iter().rev().position(|&v| v == END_MARKER).filter(|&i| i <= 1);

    let base = match (begin, end) {
        (Some(0), Some(0)) => 0.8,
        (Some(0), Some(1)) | (Some(1), Some(0)) => 0.6,
        (Some(0), None) | (None, Some(0)) => 0.4,
        (Some(1), None) | (None, Some(1)) => 0.2,
        _ => 0.0,
    };

    let last = values.len() - 1;
    let from = begin.map(|i| i + 1).unwrap_or(0);
    let to = match end {
        Some(j) => last.checked_sub(j + 1),
        None => Some(last),
    };
    let density = match to {
        Some(to) if to >= from => {
            let inner = &values[from..=to];
            inner.iter().filter(|&&v| v > 0).count() as f64 / inner.len() as f64
        }
        _ => 0.0,
    };

    base + 0.2 * density
}

/// Tipo de fronteira; `Start` ordena antes de `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEvent {
    pub index: usize,
    pub kind: BoundaryKind,
    pub origin: SpanOrigin,
    pub score: Option<f64>,
}

/// Eventos de todos os trechos, ordenados por posição, tipo, origem e score.
pub fn boundary_events(spans: &[CandidateSpan]) -> Vec<BoundaryEvent> {
    let mut events: Vec<BoundaryEvent> = spans
        .iter()
        .flat_map(|span| {
            [
                BoundaryEvent {
                    index: span.start,
                    kind: BoundaryKind::Start,
                    origin: span.origin,
                    score: span.score,
                },
                BoundaryEvent {
                    index: span.end,
                    kind: BoundaryKind::End,
                    origin: span.origin,
                    score: span.score,
                },
            ]
        })
        .collect();
    events.sort_by(|a, b| {
        a.index
            .cmp(&b.index)
            .then(a.kind.cmp(&b.kind))
            .then(a.origin.cmp(&b.origin))
            .then(a.score.unwrap_or(-1.0).total_cmp(&b.score.unwrap_or(-1.0)))
    });
    events
}

/// Um intervalo fundido pela varredura, com os eventos que o formaram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedInterval {
    pub start: usize,
    /// Inclusivo.
    pub end: usize,
    pub events: Vec<BoundaryEvent>,
}

impl MergedInterval {
    pub fn start_count(&self) -> usize {
        self.events.iter().filter(|e| e.kind == BoundaryKind::Start).count()
    }

    /// Dois trechos concordam, ou o classificador sozinho propôs o trecho.
    pub fn is_corroborated(&self) -> bool {
        self.start_count() >= 2 || self.events.iter().any(|e| e.origin == SpanOrigin::Classifier)
    }

    pub fn score(&self) -> f64 {
        if self.events.is_empty() {
            return 0.0;
        }
        let width = (self.end - self.start) as f64;
        let total: f64 = self
            .events
            .iter()
            .map(|event| match event.score {
                Some(score) => score,
                None if width == 0.0 => 1.0,
                None => match event.kind {
                    BoundaryKind::Start => 1.0 - (event.index - self.start) as f64 / width,
                    BoundaryKind::End => 1.0 - (self.end - event.index) as f64 / width,
                },
            })
            .sum();
        total / self.events.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepState {
    Idle,
    /// Quantos trechos continuam abertos.
    Inside { open: usize },
}

/// Funde eventos ordenados em intervalos; trechos que se sobrepõem ou se tocam
/// (fim + 1 == início) caem no mesmo intervalo.
pub fn sweep(events: Vec<BoundaryEvent>) -> Vec<MergedInterval> {
    let mut intervals = Vec::new();
    let mut current: Option<MergedInterval> = None;
    let mut state = SweepState::Idle;

    for event in events {
        state = match (state, event.kind) {
            (SweepState::Idle, BoundaryKind::Start) => {
                let touches = current.as_ref().is_some_and(|c| event.index <= c.end + 1);
                if !touches {
                    intervals.extend(current.take());
                    current = Some(MergedInterval {
                        start: event.index,
                        end: event.index,
                        events: Vec::new(),
                    });
                }
                SweepState::Inside { open: 1 }
            }
            (SweepState::Idle, BoundaryKind::End) => SweepState::Idle,
            (SweepState::Inside { open }, BoundaryKind::Start) => SweepState::Inside { open: open + 1 },
            (SweepState::Inside { open }, BoundaryKind::End) if open > 1 => {
                SweepState::Inside { open: open - 1 }
            }
            (SweepState::Inside { .. }, BoundaryKind::End) => SweepState::Idle,
        };
        if let Some(interval) = current.as_mut() {
            interval.end = interval.end.max(event.index);
            interval.events.push(event);
        }
    }
    intervals.extend(current);
    intervals
}

/// Eventos + varredura sobre os trechos dos três detectores.
pub fn merge_spans(spans: &[CandidateSpan]) -> Vec<MergedInterval> {
    sweep(boundary_events(spans))
}

/// Intervalos aceitos e com score suficiente, decompostos em componentes.
pub fn finalize(text: &str, intervals: &[MergedInterval], gazetteer: &GazetteerClassifier) -> Vec<Detection> {
    let index = CharIndex::new(text);
    let detections: Vec<Detection> = intervals
        .iter()
        .filter(|interval| interval.is_corroborated())
        .filter_map(|interval| {
            let score = interval.score();
            if score < MIN_DETECTION_SCORE {
                return None;
            }
            let slice = index.slice(text, interval.start, interval.end);
            Some(Detection {
                start: interval.start,
                end: interval.end,
                score,
                components: gazetteer.decompose(slice, interval.start),
            })
        })
        .collect();

    debug!(
        intervals = intervals.len(),
        detections = detections.len(),
        "ensemble: intervalos fundidos"
    );
    detections
}
