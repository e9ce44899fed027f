//! # Padrões de Contexto — Detector por Expressão Regular
//!
//! O detector mais simples do ensemble. Um único padrão composto procura, no texto já
//! normalizado, a forma geral de um endereço:
//!
//! ```text
//! abertura  →  20..200 caracteres quaisquer  →  terminador
//! ```
//!
//! - **Abertura**: frase introdutória ("domiciliul la adresa"), tipo de rua seguido de um
//!   nome ("str. Plopilor"), nome de județ ou tipo de localidade seguido de um nome.
//! - **Terminador**: número de rua, andar, apartamento, país, județ ou código postal.
//!
//! Quatro modelos combinam aberturas e terminadores diferentes; o padrão composto é a
//! alternância dos quatro. O preenchimento limitado garante custo linear no tamanho do
//! texto mesmo para entradas patológicas.
//!
//! Quando o trecho encontrado começa com uma frase introdutória, ela é removida e o
//! início do trecho avança. Todos os trechos saem sem score próprio.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::gazetteer::{address_prefix_phrases, CITY_LABELS, COUNTIES, STREET_TYPES};
use crate::normalize::CharIndex;
use crate::span::{CandidateSpan, SpanOrigin};

const FILLER_MIN: usize = 20;
const FILLER_MAX: usize = 200;

/// O preenchimento `.{20,200}` em modo Unicode excede o limite padrão do `regex`.
const PATTERN_SIZE_LIMIT: usize = 64 << 20;

/// Primeiras palavras de frases introdutórias que aceitam um "cu " antes.
const ACCEPTS_CU: &[&str] = &["domiciliul", "domiciliu", "resedinta", "sediul", "sediu"];

const STREET_NUMBER: &str = r"\b(?:(?:numarul|numar|nr)(?:\s|\.|:)+(?:[0-9]+))(?:(?:\s)*(?:bis|[a-zA-Z])\b)?";
const FLOOR: &str = r"\b(?:(?:etajul|etaj|etj|et)(?:\s|\.|:)+(?:-[1-9]|-10|[0-9]|1[0-5]|p|m)|parter|demisol|mansarda)\b";
const APARTMENT: &str = r"\b(?:(?:apartamentul|apartament|ap)(?:\s|\.|:)+(?:[1-9]|[1-9][0-9]{1,2}))\b";
const COUNTRY: &str = r"\b(?:romania)\b";
const POSTAL_CODE_TEXT: &str = r"\b(?:cod postal|codul postal)\b";
const POSTAL_CODE: &str = r"\b(?:(?:0?[1-8]|[1-9][0-5])[0-9]{4})\b";

/// Peças do padrão composto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Prefix,
    PostalCodeText,
    StreetType,
    County,
    CityType,
    StreetNumber,
    Floor,
    Apartment,
    Country,
    PostalCode,
}

/// Um modelo: alguma abertura, preenchimento, algum terminador.
struct Template {
    openers: &'static [Part],
    closers: &'static [Part],
}

const TEMPLATES: [Template; 4] = [
    Template {
        openers: &[Part::Prefix, Part::StreetType, Part::County, Part::CityType],
        closers: &[Part::StreetNumber, Part::Floor, Part::Apartment, Part::Country, Part::PostalCode],
    },
    Template {
        openers: &[Part::Prefix, Part::PostalCodeText, Part::StreetType, Part::County, Part::CityType],
        closers: &[Part::StreetNumber, Part::Floor, Part::Apartment, Part::Country],
    },
    Template {
        openers: &[Part::Prefix, Part::StreetType, Part::CityType],
        closers: &[
            Part::StreetNumber,
            Part::Floor,
            Part::Apartment,
            Part::Country,
            Part::County,
            Part::PostalCode,
        ],
    },
    Template {
        openers: &[Part::Prefix, Part::PostalCodeText, Part::StreetType, Part::CityType],
        closers: &[Part::StreetNumber, Part::Floor, Part::Apartment, Part::Country, Part::County],
    },
];

/// Fontes das peças que dependem das listas de palavras.
struct PartSources {
    prefix: String,
    street_type: String,
    county: String,
    city_type: String,
}

impl PartSources {
    fn new() -> Self {
        Self {
            prefix: prefix_source(),
            street_type: format!(
                r"\b(?:(?:{})(?:\s|\.|:)+(?:[a-zA-Z0-9]{{2,}}))",
                alternation(STREET_TYPES)
            ),
            county: format!(
                r"\b(?:(?:(?:judetul|judet|jud)(?:\s|\.|:)*)?(?:{}))",
                alternation(COUNTIES)
            ),
            city_type: format!(
                r"\b(?:(?:{})(?:\s|\.|:)+(?:[a-zA-Z0-9]{{2,}}))",
                alternation(CITY_LABELS)
            ),
        }
    }

    fn source(&self, part: Part) -> &str {
        match part {
            Part::Prefix => &self.prefix,
            Part::PostalCodeText => POSTAL_CODE_TEXT,
            Part::StreetType => &self.street_type,
            Part::County => &self.county,
            Part::CityType => &self.city_type,
            Part::StreetNumber => STREET_NUMBER,
            Part::Floor => FLOOR,
            Part::Apartment => APARTMENT,
            Part::Country => COUNTRY,
            Part::PostalCode => POSTAL_CODE,
        }
    }

    fn group(&self, parts: &[Part]) -> String {
        let body: Vec<&str> = parts.iter().map(|p| self.source(*p)).collect();
        format!("(?:{})", body.join("|"))
    }

    fn composite(&self) -> String {
        let templates: Vec<String> = TEMPLATES
            .iter()
            .map(|t| {
                format!(
                    "(?:{}.{{{FILLER_MIN},{FILLER_MAX}}}{})",
                    self.group(t.openers),
                    self.group(t.closers)
                )
            })
            .collect();
        format!("(?:{})", templates.join("|"))
    }
}

fn alternation(words: &[&str]) -> String {
    words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|")
}

/// Frases introdutórias, as mais longas primeiro, seguidas de `:` opcional e de um espaço.
fn prefix_source() -> String {
    let mut phrases = address_prefix_phrases();
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternatives: Vec<String> = phrases
        .iter()
        .map(|phrase| {
            let escaped = regex::escape(phrase);
            let first_word = phrase.split(' ').next().unwrap_or_default();
            if ACCEPTS_CU.contains(&first_word) {
                format!(r"(?:cu )?{escaped}\b:?")
            } else {
                format!(r"{escaped}\b:?")
            }
        })
        .collect();
    format!(r"\b(?:{})\s", alternatives.join("|"))
}

/// Detector de endereços por padrão de contexto.
#[derive(Debug, Clone)]
pub struct ContextMatcher {
    pattern: Regex,
    prefix: Regex,
}

impl ContextMatcher {
    /// Compila o padrão composto e o padrão das frases introdutórias.
    pub fn new() -> Result<Self, regex::Error> {
        let sources = PartSources::new();
        let pattern = RegexBuilder::new(&sources.composite())
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .dfa_size_limit(PATTERN_SIZE_LIMIT)
            .build()?;
        let prefix = RegexBuilder::new(&sources.prefix).case_insensitive(true).build()?;
        Ok(Self { pattern, prefix })
    }

    /// Trechos encontrados no texto normalizado (offsets de caractere, fim inclusivo).
    pub fn extract(&self, text: &str) -> Vec<CandidateSpan> {
        let index = CharIndex::new(text);
        let spans: Vec<CandidateSpan> = self
            .pattern
            .find_iter(text)
            .filter_map(|m| {
                let start = index.char_at_byte(m.start()) + self.leading_prefix_len(m.as_str());
                let end = index.char_at_byte(m.end()).checked_sub(1)?;
                (start <= end).then(|| CandidateSpan::unscored(start, end, SpanOrigin::Regex))
            })
            .collect();

        debug!(spans = spans.len(), "regex: trechos encontrados");
        spans
    }

    /// Comprimento, em caracteres, da frase introdutória no início de `text` (0 se não houver).
    pub fn leading_prefix_len(&self, text: &str) -> usize {
        self.prefix
            .find(text)
            .filter(|p| p.start() == 0)
            .map(|p| p.as_str().chars().count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str =
        "Domiciliul la adresa Str. Plopilor nr. 5, bl. 2, sc. A, ap. 10, Cluj-Napoca, jud. Cluj";

    fn matcher() -> ContextMatcher {
        ContextMatcher::new().unwrap()
    }

    #[test]
    fn test_scenario_strips_prefix_and_ends_at_last_terminator() {
        let spans = matcher().extract(SCENARIO);
        assert_eq!(spans.len(), 1);
        let span = spans[0];
        assert_eq!(span.origin, SpanOrigin::Regex);
        assert_eq!(span.score, None);
        assert_eq!(span.start, SCENARIO.find("Str.").unwrap());
        // "ap. 10" é o último terminador aceito pelo primeiro modelo
        assert_eq!(span.end, SCENARIO.find("ap. 10").unwrap() + 5);
    }

    #[test]
    fn test_county_opener_without_prefix() {
        let text = "Locuieste in judetul Cluj, undeva pe langa centru, nr. 12";
        let spans = matcher().extract(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, text.find("judetul").unwrap());
        assert_eq!(spans[0].end, text.chars().count() - 1);
    }

    #[test]
    fn test_filler_too_short_yields_nothing() {
        assert!(matcher().extract("str. Plopilor nr. 5").is_empty());
    }

    #[test]
    fn test_plain_text_yields_nothing() {
        assert!(matcher().extract("Raportul a fost trimis ieri catre conducere.").is_empty());
        assert!(matcher().extract("").is_empty());
    }

    #[test]
    fn test_offsets_are_characters_not_bytes() {
        let text = "«» Str. Plopilor, langa parcul central, nr. 5";
        let spans = matcher().extract(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 3);
        assert_eq!(spans[0].end, text.chars().count() - 1);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let text = "STRADA PLOPILOR, in apropiere de gara veche, NR. 7";
        let spans = matcher().extract(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 0);
    }

    #[test]
    fn test_leading_prefix_prefers_longest_phrase() {
        let m = matcher();
        assert_eq!(m.leading_prefix_len("Domiciliul la adresa Str. X"), "Domiciliul la adresa ".len());
        assert_eq!(m.leading_prefix_len("cu domiciliul in Cluj"), "cu domiciliul in ".len());
        assert_eq!(m.leading_prefix_len("locuiesc la: Cluj"), "locuiesc la: ".len());
        assert_eq!(m.leading_prefix_len("Str. Plopilor"), 0);
    }

    #[test]
    fn test_long_input_without_terminator_is_bounded() {
        let text = "str. Plopilor ".repeat(300);
        assert!(matcher().extract(&text).is_empty());
    }
}
