//! # Classificador de Gazetteers
//!
//! Encadeia as etapas puras sobre o texto normalizado:
//!
//! ```text
//! tokenize → characterize → propagate → assemble   (extract)
//! tokenize → characterize → propagate → filtra tipos publicáveis   (decompose)
//! ```
//!
//! Um trecho montado só é aceito se contiver pelo menos três grupos positivos e se os
//! tipos encontrados nele, contados com o orçamento de ocorrências, cobrirem cidade,
//! rua e número.

use std::sync::Arc;

use tracing::debug;

use crate::characterize::{characterize, next_typed_run, TypedRun, TypedSequence};
use crate::gazetteer::GazetteerStore;
use crate::grammar::{ASSEMBLY_GAP, MANDATORY_SPAN_TYPES};
use crate::propagation::propagate;
use crate::span::{assemble_runs, CandidateSpan, Component, SpanOrigin, MIN_POSITIVES};
use crate::tagger::{TypeSet, TypeTag};
use crate::tokenizer::tokenize;

/// Classificador de tokens por gazetteers + gramática de sucessão.
#[derive(Debug, Clone)]
pub struct GazetteerClassifier {
    store: Arc<GazetteerStore>,
}

impl GazetteerClassifier {
    pub fn new(store: Arc<GazetteerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &GazetteerStore {
        &self.store
    }

    /// Tokeniza, caracteriza e propaga as restrições.
    pub fn analyze(&self, text: &str) -> TypedSequence {
        propagate(characterize(&self.store, tokenize(text)))
    }

    /// Trechos de endereço encontrados no texto (offsets de caractere, fim inclusivo).
    pub fn extract(&self, text: &str) -> Vec<CandidateSpan> {
        let seq = self.analyze(text);
        let positive: Vec<bool> = seq.runs.iter().map(TypedRun::is_positive).collect();

        let spans: Vec<CandidateSpan> = assemble_runs(&positive, ASSEMBLY_GAP, MIN_POSITIVES)
            .into_iter()
            .filter(|window| {
                let covered = occurrence_coverage(&seq.runs[window.start..=window.end], ASSEMBLY_GAP);
                MANDATORY_SPAN_TYPES.iter().all(|t| covered.contains(*t))
            })
            .map(|window| {
                let first = &seq.tokens[seq.runs[window.start].start];
                let last = &seq.tokens[seq.runs[window.end].end];
                CandidateSpan::unscored(first.start, last.end, SpanOrigin::Gazetteer)
            })
            .collect();

        debug!(spans = spans.len(), "gazetteer: trechos aceitos");
        spans
    }

    /// Componentes publicáveis de um trecho; `offset` é somado às posições.
    ///
    /// Cada grupo sobrevivente gera um componente por tipo publicável que ainda carrega.
    pub fn decompose(&self, text: &str, offset: usize) -> Vec<Component> {
        let seq = self.analyze(text);
        let mut components = Vec::new();
        for run in &seq.runs {
            let start = seq.tokens[run.start].start + offset;
            let end = seq.tokens[run.end].end + offset;
            for tag in run.types.meaningful().iter() {
                if let Some(component) = tag.component() {
                    components.push(Component {
                        start,
                        end,
                        tag: component,
                        score: 1.0,
                    });
                }
            }
        }
        components
    }
}

#[derive(Debug, Clone, Copy)]
struct Occurrence {
    allowed: usize,
    count: usize,
}

/// Tipos presentes num trecho segundo o orçamento de ocorrências.
///
/// Percorre os grupos tipados saltando até `gap` grupos sem tipo. A primeira
/// ocorrência de um tipo lhe dá um orçamento igual ao número de tipos empatados no
/// grupo; cada nova ocorrência consome uma unidade e acrescenta os empates do grupo
/// atual. Um tipo sem orçamento interrompe a contagem dos tipos restantes do grupo.
/// Grupos de início permitido são ignorados; um grupo sem tipo fora do alcance encerra.
pub fn occurrence_coverage(runs: &[TypedRun], gap: usize) -> TypeSet {
    let mut slots: [Option<Occurrence>; TypeTag::ALL.len()] = [None; TypeTag::ALL.len()];

    let mut i = 0;
    while i < runs.len() {
        let run = &runs[i];
        if run.permitted_start {
            i += 1;
            continue;
        }
        if !run.is_typed() {
            break;
        }
        let tied = run.types.len();
        for tag in run.types.iter() {
            let slot = &mut slots[tag.index()];
            match slot {
                None => {
                    *slot = Some(Occurrence {
                        allowed: tied,
                        count: 1,
                    })
                }
                Some(o) if o.count < o.allowed => {
                    o.count += 1;
                    o.allowed += tied - 1;
                }
                Some(_) => break,
            }
        }
        i = next_typed_run(runs, i, gap).unwrap_or(i + 1);
    }

    TypeTag::ALL
        .into_iter()
        .filter(|t| slots[t.index()].is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::GazetteerBuilder;
    use crate::tagger::ComponentTag;

    const SCENARIO: &str =
        "Domiciliul la adresa Str. Plopilor nr. 5, bl. 2, sc. A, ap. 10, Cluj-Napoca, jud. Cluj";

    fn classifier() -> GazetteerClassifier {
        let mut builder = GazetteerBuilder::new();
        builder.add_city("Cluj-Napoca");
        builder.add_street("Plopilor");
        GazetteerClassifier::new(Arc::new(builder.build()))
    }

    fn run(types: &[TypeTag]) -> TypedRun {
        TypedRun {
            start: 0,
            end: 0,
            types: types.iter().copied().collect(),
            permitted_start: false,
        }
    }

    #[test]
    fn test_extract_full_address_without_prefix() {
        let spans = classifier().extract(SCENARIO);
        assert_eq!(spans.len(), 1);
        let span = spans[0];
        assert_eq!(span.origin, SpanOrigin::Gazetteer);
        assert_eq!(span.start, SCENARIO.find("Str.").unwrap());
        assert_eq!(span.end, SCENARIO.chars().count() - 1);
    }

    #[test]
    fn test_extract_requires_city_street_and_number() {
        // sem cidade conhecida
        let spans = classifier().extract("Str. Plopilor nr. 5, bl. 2, sc. A, ap. 10");
        assert!(spans.is_empty());
    }

    #[test]
    fn test_isolated_keyword_yields_nothing() {
        assert!(classifier().extract("a fost vazut pe bulevardul principal ieri").is_empty());
    }

    #[test]
    fn test_decompose_scenario_components() {
        let start = SCENARIO.find("Str.").unwrap();
        let body = &SCENARIO[start..];
        let components = classifier().decompose(body, start);

        let text_of = |tag: ComponentTag| -> Vec<&str> {
            components
                .iter()
                .filter(|c| c.tag == tag)
                .map(|c| &SCENARIO[c.start..=c.end])
                .collect()
        };
        assert_eq!(text_of(ComponentTag::StreetType), vec!["Str"]);
        assert_eq!(text_of(ComponentTag::Street), vec!["Plopilor"]);
        assert_eq!(text_of(ComponentTag::StreetNumber), vec!["5"]);
        assert_eq!(text_of(ComponentTag::Block), vec!["2"]);
        assert_eq!(text_of(ComponentTag::Staircase), vec!["A"]);
        assert_eq!(text_of(ComponentTag::Apartment), vec!["10"]);
        assert_eq!(text_of(ComponentTag::City), vec!["Cluj-Napoca"]);
        assert_eq!(text_of(ComponentTag::County), vec!["Cluj"]);
        assert!(components.iter().all(|c| c.score == 1.0));
    }

    #[test]
    fn test_decompose_postal_code_after_label() {
        let components = classifier().decompose("cod postal 400117", 0);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].tag, ComponentTag::PostalCode);
        assert_eq!((components[0].start, components[0].end), (11, 16));
    }

    #[test]
    fn test_coverage_counts_distinct_types() {
        let runs = [run(&[TypeTag::Street]), run(&[TypeTag::StreetNumber]), run(&[TypeTag::City])];
        let covered = occurrence_coverage(&runs, 2);
        assert_eq!(covered.len(), 3);
    }

    #[test]
    fn test_coverage_stops_at_unreachable_untyped_run() {
        let runs = [
            run(&[TypeTag::Street]),
            run(&[]),
            run(&[]),
            run(&[]),
            run(&[TypeTag::City]),
        ];
        let covered = occurrence_coverage(&runs, 2);
        assert!(covered.contains(TypeTag::Street));
        assert!(!covered.contains(TypeTag::City));
    }

    #[test]
    fn test_coverage_skips_permitted_start() {
        let mut first = run(&[TypeTag::City]);
        first.permitted_start = true;
        let runs = [first, run(&[TypeTag::Street])];
        let covered = occurrence_coverage(&runs, 2);
        assert!(!covered.contains(TypeTag::City));
        assert!(covered.contains(TypeTag::Street));
    }

    #[test]
    fn test_coverage_budget_exhaustion_hides_remaining_ties() {
        // City aparece sozinho (orçamento 1); na segunda vez, esgotado, interrompe o grupo
        // antes de Street ser contado.
        let runs = [run(&[TypeTag::City]), run(&[TypeTag::City, TypeTag::Street])];
        let covered = occurrence_coverage(&runs, 2);
        assert!(covered.contains(TypeTag::City));
        assert!(!covered.contains(TypeTag::Street));
    }

    #[test]
    fn test_coverage_ties_extend_budget() {
        let runs = [
            run(&[TypeTag::Block, TypeTag::Staircase]),
            run(&[TypeTag::Block, TypeTag::Staircase]),
            run(&[TypeTag::City]),
        ];
        let covered = occurrence_coverage(&runs, 2);
        assert_eq!(covered.len(), 3);
    }
}
