//! # Spans — Candidatos, Detecções e Montagem de Sequências
//!
//! Os três detectores (padrões, gazetteers, classificador) produzem [`CandidateSpan`]s
//! em offsets de caractere com fim inclusivo. O combinador os funde em [`Detection`]s,
//! cada uma decomposta em [`Component`]s.
//!
//! ## Montagem de sequências
//!
//! Gazetteers e classificador usam a mesma política para transformar uma sequência de
//! posições positivas/negativas em trechos ([`assemble_runs`]):
//!
//! - um trecho abre no primeiro item positivo;
//! - até `max_gap` itens negativos consecutivos são tolerados; o seguinte fecha o trecho;
//! - o fim da sequência também fecha o trecho aberto;
//! - o trecho só vale com pelo menos `min_positives` itens positivos;
//! - negativos finais são descartados (o trecho termina no último positivo).

use serde::{Deserialize, Serialize};

use crate::tagger::ComponentTag;

/// Quantos itens positivos um trecho precisa ter.
pub const MIN_POSITIVES: usize = 3;

/// Qual detector produziu um candidato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanOrigin {
    /// Padrões de contexto (regex).
    Regex,
    Gazetteer,
    /// Classificador estatístico externo.
    Classifier,
}

impl SpanOrigin {
    pub fn name(&self) -> &'static str {
        match self {
            SpanOrigin::Regex => "regex",
            SpanOrigin::Gazetteer => "gazetteer",
            SpanOrigin::Classifier => "classifier",
        }
    }
}

/// Um trecho proposto por um dos detectores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateSpan {
    pub start: usize,
    /// Inclusivo.
    pub end: usize,
    pub origin: SpanOrigin,
    /// Só o classificador atribui score próprio.
    pub score: Option<f64>,
}

impl CandidateSpan {
    pub fn unscored(start: usize, end: usize, origin: SpanOrigin) -> Self {
        Self {
            start,
            end,
            origin,
            score: None,
        }
    }
}

/// Um componente rotulado dentro de uma detecção.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub start: usize,
    pub end: usize,
    pub tag: ComponentTag,
    pub score: f64,
}

/// Um endereço detectado, com score em [0.5, 1] e seus componentes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub components: Vec<Component>,
}

/// Um trecho montado: índices (inclusivos) na sequência de entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembledRun {
    pub start: usize,
    pub end: usize,
    pub positives: usize,
}

/// Agrupa posições positivas em trechos, tolerando até `max_gap` negativos seguidos.
pub fn assemble_runs(positive: &[bool], max_gap: usize, min_positives: usize) -> Vec<AssembledRun> {
    let mut runs = Vec::new();
    let mut open: Option<AssembledRun> = None;
    let mut gap = 0;

    for (i, &is_positive) in positive.iter().enumerate() {
        if is_positive {
            let run = open.get_or_insert(AssembledRun {
                start: i,
                end: i,
                positives: 0,
            });
            run.end = i;
            run.positives += 1;
            gap = 0;
        } else if open.is_some() {
            gap += 1;
            if gap > max_gap {
                if let Some(run) = open.take().filter(|r| r.positives >= min_positives) {
                    runs.push(run);
                }
                gap = 0;
            }
        }
    }
    if let Some(run) = open.filter(|r| r.positives >= min_positives) {
        runs.push(run);
    }
    runs
}
