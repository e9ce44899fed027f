//! # Propagação de Restrições
//!
//! Depois da caracterização, muitos grupos têm vários tipos candidatos ("5" pode ser
//! número de rua, bloco, escada, apartamento, interfone ou andar). A gramática de
//! [`crate::grammar`] elimina os candidatos incoerentes em três passagens, cada uma
//! tolerando até [`GAP_TOLERANCE`] grupo sem tipo entre dois grupos tipados:
//!
//! 1. **Estreitamento para frente**: se o vizinho seguinte tem um sucessor esperado
//!    entre seus tipos, fica só com ele ("nr 5" → "5" é número de rua).
//! 2. **Poda para frente**: um tipo cujo sucessor obrigatório não aparece adiante cai.
//! 3. **Poda para trás**: o mesmo, com os predecessores obrigatórios.
//!
//! Em seguida a frase introdutória perde seu tipo e marca o grupo seguinte como
//! início permitido, e grupos que ficaram sem tipo são quebrados em tokens avulsos.
//!
//! Cada passagem consome um [`TypedSequence`] e devolve o próximo; os conjuntos de
//! tipos só diminuem.

use tracing::debug;

use crate::characterize::{TypedRun, TypedSequence};
use crate::grammar::{mandatory_predecessors, mandatory_successors, successors, GAP_TOLERANCE};
use crate::tagger::{TypeSet, TypeTag};

/// Executa todas as passagens, na ordem.
pub fn propagate(seq: TypedSequence) -> TypedSequence {
    let seq = narrow_forward(seq);
    let seq = prune_forward(seq);
    let seq = prune_backward(seq);
    let seq = strip_prefixes(seq);
    let seq = reatomize(seq);
    debug!(
        runs = seq.runs.len(),
        typed = seq.runs.iter().filter(|r| r.is_typed()).count(),
        "propagação concluída"
    );
    seq
}

/// Passagem 1: restringe o próximo grupo tipado aos sucessores esperados.
pub fn narrow_forward(mut seq: TypedSequence) -> TypedSequence {
    let mut i = 0;
    while i < seq.runs.len() {
        if !seq.runs[i].is_typed() {
            i += 1;
            continue;
        }
        let Some(next) = seq.next_typed_within(i, GAP_TOLERANCE) else {
            i += 1;
            continue;
        };
        for tag in seq.runs[i].types.iter() {
            let remaining = successors(tag).intersection(seq.runs[next].types);
            if !remaining.is_empty() {
                seq.set_run_types(next, remaining);
            }
        }
        i = next;
    }
    seq
}

/// Passagem 2: remove tipos cujos sucessores obrigatórios não aparecem no próximo grupo tipado.
pub fn prune_forward(mut seq: TypedSequence) -> TypedSequence {
    let mut i = 0;
    while i < seq.runs.len() {
        if !seq.runs[i].is_typed() {
            i += 1;
            continue;
        }
        let next = seq.next_typed_within(i, GAP_TOLERANCE);
        let neighbour = next.map(|j| seq.runs[j].types).unwrap_or(TypeSet::EMPTY);
        prune_run(&mut seq, i, neighbour, mandatory_successors);
        i = next.unwrap_or(i + 1);
    }
    seq
}

/// Passagem 3: remove tipos cujos predecessores obrigatórios não aparecem no grupo tipado anterior.
pub fn prune_backward(mut seq: TypedSequence) -> TypedSequence {
    let mut i = seq.runs.len();
    while i > 0 {
        let idx = i - 1;
        if !seq.runs[idx].is_typed() {
            i = idx;
            continue;
        }
        let prev = seq.prev_typed_within(idx, GAP_TOLERANCE);
        let neighbour = prev.map(|j| seq.runs[j].types).unwrap_or(TypeSet::EMPTY);
        prune_run(&mut seq, idx, neighbour, mandatory_predecessors);
        i = prev.map(|p| p + 1).unwrap_or(idx);
    }
    seq
}

fn prune_run(seq: &mut TypedSequence, run_idx: usize, neighbour: TypeSet, required: fn(TypeTag) -> Option<TypeSet>) {
    let current = seq.runs[run_idx].types;
    let kept: TypeSet = current
        .iter()
        .filter(|tag| match required(*tag) {
            Some(needed) => needed.intersects(neighbour),
            None => true,
        })
        .collect();
    if kept != current {
        seq.set_run_types(run_idx, kept);
    }
}

/// Tira o tipo de frase introdutória e marca o grupo seguinte como início permitido.
pub fn strip_prefixes(mut seq: TypedSequence) -> TypedSequence {
    for i in 0..seq.runs.len() {
        let types = seq.runs[i].types;
        if types.contains(TypeTag::AddressPrefix) {
            seq.set_run_types(i, types.without(TypeTag::AddressPrefix));
            if let Some(next) = seq.runs.get_mut(i + 1) {
                next.permitted_start = true;
            }
        }
    }
    seq
}

/// Quebra grupos de vários tokens que ficaram sem tipo em grupos de um token.
pub fn reatomize(mut seq: TypedSequence) -> TypedSequence {
    let mut runs = Vec::with_capacity(seq.runs.len());
    for run in seq.runs.drain(..) {
        if run.is_typed() || run.start == run.end {
            runs.push(run);
            continue;
        }
        for j in run.start..=run.end {
            runs.push(TypedRun {
                permitted_start: run.permitted_start && j == run.start,
                ..TypedRun::untyped(j)
            });
        }
    }
    seq.runs = runs;
    seq
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characterize::characterize;
    use crate::gazetteer::{GazetteerBuilder, GazetteerStore};
    use crate::tokenizer::tokenize;

    fn store() -> GazetteerStore {
        let mut builder = GazetteerBuilder::new();
        builder.add_city("Cluj-Napoca");
        builder.add_street("Plopilor");
        builder.build()
    }

    fn run_types(seq: &TypedSequence, token: usize) -> TypeSet {
        seq.runs
            .iter()
            .find(|r| r.start <= token && token <= r.end)
            .map(|r| r.types)
            .unwrap_or_default()
    }

    #[test]
    fn test_narrowing_resolves_number_after_label() {
        let seq = narrow_forward(characterize(&store(), tokenize("nr 5 bl 2 sc a ap 10")));
        assert_eq!(run_types(&seq, 1), TypeSet::single(TypeTag::StreetNumber));
        assert_eq!(run_types(&seq, 3), TypeSet::single(TypeTag::Block));
        assert_eq!(run_types(&seq, 5), TypeSet::single(TypeTag::Staircase));
        assert_eq!(run_types(&seq, 7), TypeSet::single(TypeTag::Apartment));
        // estados dos tokens acompanham o grupo
        assert_eq!(seq.states[1].types, TypeSet::single(TypeTag::StreetNumber));
    }

    #[test]
    fn test_narrowing_tolerates_one_untyped_gap() {
        let seq = narrow_forward(characterize(&store(), tokenize("bl xyz 2")));
        assert_eq!(run_types(&seq, 2), TypeSet::single(TypeTag::Block));
    }

    #[test]
    fn test_isolated_label_is_pruned() {
        let seq = propagate(characterize(&store(), tokenize("am vazut blocul ieri seara tarziu")));
        assert!(run_types(&seq, 2).is_empty());
        assert_eq!(seq.states[2].part_of_address, Some(false));
    }

    #[test]
    fn test_isolated_street_type_is_pruned() {
        let seq = propagate(characterize(&store(), tokenize("bulevardul")));
        assert!(seq.runs.iter().all(|r| !r.is_typed()));
    }

    #[test]
    fn test_value_without_label_is_pruned() {
        let seq = propagate(characterize(&store(), tokenize("ceva 7 altceva")));
        // sem rótulo nem rua antes, nenhum dos tipos numéricos sobrevive
        assert!(run_types(&seq, 1).is_empty());
        assert_eq!(seq.states[1].part_of_address, Some(false));
    }

    #[test]
    fn test_street_keeps_street_number() {
        let seq = propagate(characterize(&store(), tokenize("str plopilor 5")));
        assert!(run_types(&seq, 0).contains(TypeTag::StreetType));
        assert_eq!(run_types(&seq, 1), TypeSet::single(TypeTag::Street));
        assert!(run_types(&seq, 2).contains(TypeTag::StreetNumber));
    }

    #[test]
    fn test_prefix_is_stripped_and_marks_next_run() {
        let seq = propagate(characterize(&store(), tokenize("domiciliul la adresa str plopilor nr 5")));
        // o prefixo de 3 tokens vira 3 grupos avulsos sem tipo
        assert_eq!(seq.runs[0], TypedRun::untyped(0));
        assert_eq!(seq.runs[1], TypedRun::untyped(1));
        assert_eq!(seq.runs[2], TypedRun::untyped(2));
        assert!(seq.runs[3].permitted_start);
        assert_eq!(seq.runs[3].start, 3);
        assert!(seq.runs.iter().all(|r| !r.types.contains(TypeTag::AddressPrefix)));
    }

    #[test]
    fn test_type_sets_only_shrink() {
        let text = "str plopilor nr 5 bl 2 sc a ap 10 cluj-napoca jud cluj";
        let before = characterize(&store(), tokenize(text));
        let after = propagate(before.clone());
        for (b, a) in before.states.iter().zip(after.states.iter()) {
            assert_eq!(a.types.intersection(b.types), a.types);
        }
    }

    #[test]
    fn test_reatomize_keeps_permitted_start_on_first_token() {
        let seq = TypedSequence {
            tokens: tokenize("a b c"),
            states: vec![Default::default(); 3],
            runs: vec![TypedRun {
                start: 0,
                end: 2,
                types: TypeSet::EMPTY,
                permitted_start: true,
            }],
        };
        let seq = reatomize(seq);
        assert_eq!(seq.runs.len(), 3);
        assert!(seq.runs[0].permitted_start);
        assert!(!seq.runs[1].permitted_start);
    }
}
