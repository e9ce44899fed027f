//! # Caracterização — Tipos Candidatos por Posição
//!
//! Para cada posição da sequência de tokens, testa as 24 categorias de [`TypeTag`]
//! e fica com as de **maior número de tokens consumidos**; entre essas, as de
//! **menor distância de edição**. Empates restantes viram tipos simultâneos do mesmo
//! grupo de tokens (um [`TypedRun`]).
//!
//! Cada categoria é uma entrada `(tipo, matcher, orçamento)` de [`TYPE_TESTS`]:
//! listas de frases consultam o [`GazetteerStore`]; categorias numéricas usam
//! predicados de formato.

use serde::{Deserialize, Serialize};

use crate::gazetteer::{GazetteerStore, Lexicon};
use crate::tagger::{TypeSet, TypeTag};
use crate::tokenizer::Token;

/// Como uma categoria reconhece tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Consulta a uma lista de frases.
    Phrases(Lexicon),
    PostalCode,
    StreetNumber,
    /// Blocos e escadas compartilham o formato.
    BlockLike,
    /// Número até 999 (apartamento, interfone).
    SmallNumber,
    Floor,
}

/// Uma entrada da tabela de testes.
#[derive(Debug, Clone, Copy)]
pub struct TypeTest {
    pub tag: TypeTag,
    pub matcher: Matcher,
    /// Distância de edição máxima por palavra.
    pub budget: usize,
}

const fn type_test(tag: TypeTag, matcher: Matcher, budget: usize) -> TypeTest {
    TypeTest { tag, matcher, budget }
}

/// Tabela de testes, na ordem de prioridade dos tipos.
pub const TYPE_TESTS: [TypeTest; 24] = [
    type_test(TypeTag::AddressPrefix, Matcher::Phrases(Lexicon::AddressPrefix), 1),
    type_test(TypeTag::PostalCodeText, Matcher::Phrases(Lexicon::PostalCodeText), 0),
    type_test(TypeTag::PostalCode, Matcher::PostalCode, 0),
    type_test(TypeTag::CountryText, Matcher::Phrases(Lexicon::CountryText), 0),
    type_test(TypeTag::Country, Matcher::Phrases(Lexicon::Country), 0),
    type_test(TypeTag::CountyText, Matcher::Phrases(Lexicon::CountyText), 0),
    type_test(TypeTag::County, Matcher::Phrases(Lexicon::County), 1),
    type_test(TypeTag::CityText, Matcher::Phrases(Lexicon::CityText), 0),
    type_test(TypeTag::City, Matcher::Phrases(Lexicon::City), 0),
    type_test(TypeTag::StreetText, Matcher::Phrases(Lexicon::StreetText), 0),
    type_test(TypeTag::StreetType, Matcher::Phrases(Lexicon::StreetType), 0),
    type_test(TypeTag::Street, Matcher::Phrases(Lexicon::Street), 0),
    type_test(TypeTag::StreetNumberText, Matcher::Phrases(Lexicon::StreetNumberText), 0),
    type_test(TypeTag::StreetNumber, Matcher::StreetNumber, 0),
    type_test(TypeTag::BlockText, Matcher::Phrases(Lexicon::BlockText), 0),
    type_test(TypeTag::Block, Matcher::BlockLike, 0),
    type_test(TypeTag::StaircaseText, Matcher::Phrases(Lexicon::StaircaseText), 0),
    type_test(TypeTag::Staircase, Matcher::BlockLike, 0),
    type_test(TypeTag::ApartmentText, Matcher::Phrases(Lexicon::ApartmentText), 0),
    type_test(TypeTag::Apartment, Matcher::SmallNumber, 0),
    type_test(TypeTag::IntercomText, Matcher::Phrases(Lexicon::IntercomText), 0),
    type_test(TypeTag::Intercom, Matcher::SmallNumber, 0),
    type_test(TypeTag::FloorText, Matcher::Phrases(Lexicon::FloorText), 0),
    type_test(TypeTag::Floor, Matcher::Floor, 0),
];

/// Correspondência vencedora numa posição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedMatch {
    /// Tokens consumidos.
    pub len: usize,
    pub distance: usize,
    /// Todos os tipos empatados.
    pub types: TypeSet,
}

/// Estado de um token ao longo das passagens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenState {
    pub types: TypeSet,
    /// `Some(true)` se caracterizado, `Some(false)` se perdeu todos os tipos, `None` se nunca teve.
    pub part_of_address: Option<bool>,
}

/// Um grupo contíguo de tokens (índices inclusivos) com os mesmos tipos candidatos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRun {
    pub start: usize,
    pub end: usize,
    pub types: TypeSet,
    /// Segue uma frase introdutória: pode abrir um span mesmo sem tipo.
    pub permitted_start: bool,
}

impl TypedRun {
    pub fn untyped(index: usize) -> Self {
        Self {
            start: index,
            end: index,
            types: TypeSet::EMPTY,
            permitted_start: false,
        }
    }

    pub fn is_typed(&self) -> bool {
        !self.types.is_empty()
    }

    /// Conta como positivo na montagem de spans.
    pub fn is_positive(&self) -> bool {
        self.is_typed() || self.permitted_start
    }
}

/// Tokens, estados e grupos de uma requisição. Cada passagem consome e devolve um novo valor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedSequence {
    pub tokens: Vec<Token>,
    pub states: Vec<TokenState>,
    pub runs: Vec<TypedRun>,
}

impl TypedSequence {
    /// Próximo grupo tipado depois de `run_idx`, desde que no máximo `gap` grupos sem tipo o separem.
    pub fn next_typed_within(&self, run_idx: usize, gap: usize) -> Option<usize> {
        next_typed_run(&self.runs, run_idx, gap)
    }

    /// Grupo tipado anterior a `run_idx`, com a mesma tolerância.
    pub fn prev_typed_within(&self, run_idx: usize, gap: usize) -> Option<usize> {
        let from = run_idx.saturating_sub(gap + 1);
        (from..run_idx).rev().find(|&i| self.runs[i].is_typed())
    }

    /// Redefine os tipos de um grupo e de seus tokens.
    pub fn set_run_types(&mut self, run_idx: usize, types: TypeSet) {
        let run = &mut self.runs[run_idx];
        run.types = types;
        let (start, end) = (run.start, run.end);
        for state in &mut self.states[start..=end] {
            state.types = types;
            if types.is_empty() {
                state.part_of_address = Some(false);
            }
        }
    }
}

/// Índice do próximo grupo tipado depois de `run_idx` em `runs`, com no máximo `gap`
/// grupos sem tipo no caminho.
pub fn next_typed_run(runs: &[TypedRun], run_idx: usize, gap: usize) -> Option<usize> {
    runs.iter()
        .enumerate()
        .skip(run_idx + 1)
        .take(gap + 1)
        .find(|(_, r)| r.is_typed())
        .map(|(i, _)| i)
}

impl Matcher {
    /// Avalia o matcher no início de `tokens`, devolvendo (tokens consumidos, distância).
    pub fn evaluate(&self, store: &GazetteerStore, tokens: &[Token], budget: usize) -> Option<(usize, usize)> {
        let first = tokens.first()?;
        match self {
            Matcher::Phrases(lexicon) => store
                .lexicon(*lexicon)
                .best_match(tokens, budget)
                .map(|m| (m.len, m.distance)),
            Matcher::PostalCode => is_postal_code(store, &first.text).then_some((1, 0)),
            Matcher::StreetNumber => street_number_len(tokens).map(|len| (len, 0)),
            Matcher::BlockLike => is_block_like(&first.text).then_some((1, 0)),
            Matcher::SmallNumber => parse_unsigned(&first.text).filter(|n| *n <= 999).map(|_| (1, 0)),
            Matcher::Floor => is_floor(&first.text).then_some((1, 0)),
        }
    }
}

/// Melhor conjunto de tipos no início de `tokens`.
pub fn rank_matches(store: &GazetteerStore, tokens: &[Token]) -> Option<RankedMatch> {
    let mut best: Option<RankedMatch> = None;
    for entry in &TYPE_TESTS {
        let Some((len, distance)) = entry.matcher.evaluate(store, tokens, entry.budget) else {
            continue;
        };
        best = match best {
            Some(b) if len < b.len || (len == b.len && distance > b.distance) => Some(b),
            Some(mut b) if len == b.len && distance == b.distance => {
                b.types.insert(entry.tag);
                Some(b)
            }
            _ => Some(RankedMatch {
                len,
                distance,
                types: TypeSet::single(entry.tag),
            }),
        };
    }
    best
}

/// Caracteriza a sequência inteira, da esquerda para a direita.
///
/// Um casamento consome seus tokens num único grupo; uma posição sem casamento vira
/// um grupo sem tipo de um token.
pub fn characterize(store: &GazetteerStore, tokens: Vec<Token>) -> TypedSequence {
    let mut states = vec![TokenState::default(); tokens.len()];
    let mut runs = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        match rank_matches(store, &tokens[i..]) {
            Some(m) => {
                let end = i + m.len - 1;
                for state in &mut states[i..=end] {
                    state.types = m.types;
                    state.part_of_address = Some(true);
                }
                runs.push(TypedRun {
                    start: i,
                    end,
                    types: m.types,
                    permitted_start: false,
                });
                i = end + 1;
            }
            None => {
                runs.push(TypedRun::untyped(i));
                i += 1;
            }
        }
    }

    TypedSequence { tokens, states, runs }
}

// === Predicados de formato ===

fn parse_unsigned(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn is_single_letter(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Seis dígitos, cadastrado ou no formato romeno (`0[1-8]dddd` ou `[1-9][0-5]dddd`).
fn is_postal_code(store: &GazetteerStore, text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    if store.is_registered_postal_code(text) {
        return true;
    }
    match (bytes[0], bytes[1]) {
        (b'0', d) => (b'1'..=b'8').contains(&d),
        (_, d) => (b'0'..=b'5').contains(&d),
    }
}

/// "12", "12 bis", "12 a", "12bis", "12a" (número até 999).
fn street_number_len(tokens: &[Token]) -> Option<usize> {
    let text = tokens.first()?.text.as_str();
    if let Some(n) = parse_unsigned(text) {
        if n > 999 {
            return None;
        }
        let suffixed = tokens
            .get(1)
            .map(|next| next.text == "bis" || is_single_letter(&next.text))
            .unwrap_or(false);
        return Some(if suffixed { 2 } else { 1 });
    }

    let number = match text.strip_suffix("bis") {
        Some(rest) => rest,
        None => {
            let last = text.chars().last()?;
            if !last.is_alphabetic() {
                return None;
            }
            &text[..text.len() - last.len_utf8()]
        }
    };
    parse_unsigned(number).filter(|n| *n <= 999).map(|_| 1)
}

/// Número até 10, uma letra, ou letra+número / número+letra com número até 10.
fn is_block_like(text: &str) -> bool {
    let small = |s: &str| parse_unsigned(s).map(|n| n <= 10).unwrap_or(false);
    if small(text) || is_single_letter(text) {
        return true;
    }
    let mut chars = text.chars();
    let first = chars.next();
    let last = text.chars().last();
    match (first, last) {
        (Some(f), _) if f.is_alphabetic() && small(&text[f.len_utf8()..]) => true,
        (_, Some(l)) if l.is_alphabetic() && small(&text[..text.len() - l.len_utf8()]) => true,
        _ => false,
    }
}

/// "subsol", "parter", "p" ou um andar entre -2 e 15.
fn is_floor(text: &str) -> bool {
    matches!(text, "subsol" | "parter" | "p")
        || text.parse::<i32>().map(|n| (-2..=15).contains(&n)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::GazetteerBuilder;
    use crate::tokenizer::tokenize;

    fn store() -> GazetteerStore {
        let mut builder = GazetteerBuilder::new();
        builder.add_city("Cluj-Napoca");
        builder.add_street("Plopilor");
        builder.build()
    }

    fn types_of(store: &GazetteerStore, text: &str) -> Option<RankedMatch> {
        rank_matches(store, &tokenize(text))
    }

    #[test]
    fn test_type_tests_follow_canonical_order() {
        for (i, entry) in TYPE_TESTS.iter().enumerate() {
            assert_eq!(entry.tag.index(), i);
        }
    }

    #[test]
    fn test_str_is_both_street_text_and_street_type() {
        let m = types_of(&store(), "str plopilor").unwrap();
        assert_eq!(m.len, 1);
        assert!(m.types.contains(TypeTag::StreetText));
        assert!(m.types.contains(TypeTag::StreetType));
        assert_eq!(m.types.len(), 2);
    }

    #[test]
    fn test_longest_match_wins() {
        // "cod postal" (2 tokens) vence "cod" sozinho
        let m = types_of(&store(), "cod postal 400001").unwrap();
        assert_eq!(m.len, 2);
        assert_eq!(m.types, TypeSet::single(TypeTag::PostalCodeText));
    }

    #[test]
    fn test_small_number_ties_keep_all_candidates() {
        let m = types_of(&store(), "5").unwrap();
        for tag in [
            TypeTag::StreetNumber,
            TypeTag::Block,
            TypeTag::Staircase,
            TypeTag::Apartment,
            TypeTag::Intercom,
            TypeTag::Floor,
        ] {
            assert!(m.types.contains(tag), "faltou {tag}");
        }
    }

    #[test]
    fn test_exact_beats_fuzzy_at_same_length() {
        // "cluj" casa exatamente como condado; nenhum empate com distância maior sobrevive
        let m = types_of(&store(), "cluj").unwrap();
        assert_eq!(m.distance, 0);
        assert!(m.types.contains(TypeTag::County));
    }

    #[test]
    fn test_postal_code_predicate() {
        let s = store();
        assert!(is_postal_code(&s, "400001"));
        assert!(is_postal_code(&s, "012345"));
        assert!(!is_postal_code(&s, "090000"));
        assert!(!is_postal_code(&s, "460000"));
        assert!(!is_postal_code(&s, "40000"));
    }

    #[test]
    fn test_street_number_forms() {
        assert_eq!(street_number_len(&tokenize("12 bis")), Some(2));
        assert_eq!(street_number_len(&tokenize("12 a")), Some(2));
        assert_eq!(street_number_len(&tokenize("12 bl")), Some(1));
        assert_eq!(street_number_len(&tokenize("12bis")), Some(1));
        assert_eq!(street_number_len(&tokenize("7c")), Some(1));
        assert_eq!(street_number_len(&tokenize("bis")), None);
        assert_eq!(street_number_len(&tokenize("1000")), None);
    }

    #[test]
    fn test_block_like_forms() {
        for ok in ["3", "10", "a", "a4", "4b"] {
            assert!(is_block_like(ok), "{ok}");
        }
        for bad in ["11", "ab", "a11", "m12"] {
            assert!(!is_block_like(bad), "{bad}");
        }
    }

    #[test]
    fn test_floor_forms() {
        assert!(is_floor("parter"));
        assert!(is_floor("-2"));
        assert!(is_floor("15"));
        assert!(!is_floor("-3"));
        assert!(!is_floor("16"));
    }

    #[test]
    fn test_characterize_groups_multi_token_matches() {
        let seq = characterize(&store(), tokenize("judetul satu mare oras"));
        assert_eq!(seq.runs.len(), 3);
        assert_eq!((seq.runs[1].start, seq.runs[1].end), (1, 2));
        assert!(seq.runs[1].types.contains(TypeTag::County));
        assert_eq!(seq.states[2].types, seq.runs[1].types);
        assert_eq!(seq.states[1].part_of_address, Some(true));
    }

    #[test]
    fn test_characterize_unknown_words_are_untyped_singletons() {
        let seq = characterize(&store(), tokenize("ceva fara legatura"));
        assert_eq!(seq.runs.len(), 3);
        assert!(seq.runs.iter().all(|r| !r.is_typed() && r.start == r.end));
        assert!(seq.states.iter().all(|s| s.part_of_address.is_none()));
    }

    #[test]
    fn test_typed_neighbour_lookup_respects_gap() {
        let seq = characterize(&store(), tokenize("bl foo bar 2"));
        assert_eq!(seq.next_typed_within(0, 1), None);
        assert_eq!(seq.next_typed_within(0, 2), Some(3));
        assert_eq!(seq.prev_typed_within(3, 2), Some(0));
    }
}
