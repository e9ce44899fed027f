//! # Features por Token e Janelas Deslizantes
//!
//! O classificador estatístico externo não vê texto: vê, para cada token do modo
//! [`TokenizerMode::Window`], um vetor fixo de 10 inteiros, agrupado em janelas de 5 tokens.
//!
//! ## Features de um token (na ordem do vetor)
//!
//! | # | Feature            | Valor                                                   |
//! |---|--------------------|---------------------------------------------------------|
//! | 0 | `no_digits`        | 1 se não há dígitos                                     |
//! | 1 | `no_letters`       | 1 se não há letras ASCII                                |
//! | 2 | `has_hyphen`       | 1 se contém `-`                                         |
//! | 3 | `one_char`         | 1 se tem um único caractere                             |
//! | 4 | `no_lowercase`     | 1 se não há minúsculas ASCII                            |
//! | 5 | `no_uppercase`     | 1 se não há maiúsculas ASCII                            |
//! | 6 | `first_uppercase`  | 1 se o primeiro caractere é uma letra maiúscula         |
//! | 7 | `geo`              | categoria geográfica (0 = nenhuma, senão 1..=15)        |
//! | 8 | `regex_overlap`    | relação com os trechos do detector de padrões (0..=3)   |
//! | 9 | `gazetteer_overlap`| relação com os trechos do classificador de gazetteers   |
//!
//! ## Janelas
//!
//! Cada token é o centro (3ª posição) de uma janela de 5; vizinhos que caem fora da
//! sequência são tokens "vazios" (todas as features 0). A janela vira um vetor de 50
//! valores e o classificador devolve uma predição por janela, alinhada ao centro.

use serde::{Deserialize, Serialize};

use crate::gazetteer::{CITY_LABELS, COUNTIES, STREET_TYPES};
use crate::span::CandidateSpan;
use crate::tokenizer::{tokenize_with_mode, Token, TokenizerMode};

pub const FEATURES_PER_TOKEN: usize = 10;
pub const WINDOW_SIZE: usize = 5;
pub const WINDOW_FEATURES: usize = FEATURES_PER_TOKEN * WINDOW_SIZE;

/// Siglas dos județe (matrículas), incluindo "b" de București.
const COUNTY_CODES: &[&str] = &[
    "ab", "ar", "ag", "bc", "bh", "bn", "bt", "bv", "br", "b", "bz", "cs", "cl", "cj", "ct", "cv",
    "db", "dj", "gl", "gr", "gj", "hr", "hd", "il", "is", "if", "mm", "mh", "ms", "nt", "ot", "ph",
    "sm", "sj", "sb", "sv", "tr", "tm", "tl", "vs", "vl", "vn",
];

/// Rótulos de rua que também funcionam como tipo de rua.
const STREET_LABELS: &[&str] = &["str", "strd", "strada"];

/// Categorias de palavras-chave geográficas, em ordem de prioridade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoCategory {
    PostalCodeLabel,
    PostalCodeLabelSuffix,
    CountryLabel,
    Country,
    CountyLabel,
    County,
    CityLabel,
    StreetLabel,
    StreetType,
    StreetNumberLabel,
    BlockLabel,
    StaircaseLabel,
    ApartmentLabel,
    IntercomLabel,
    FloorLabel,
}

impl GeoCategory {
    pub const ALL: [GeoCategory; 15] = [
        GeoCategory::PostalCodeLabel,
        GeoCategory::PostalCodeLabelSuffix,
        GeoCategory::CountryLabel,
        GeoCategory::Country,
        GeoCategory::CountyLabel,
        GeoCategory::County,
        GeoCategory::CityLabel,
        GeoCategory::StreetLabel,
        GeoCategory::StreetType,
        GeoCategory::StreetNumberLabel,
        GeoCategory::BlockLabel,
        GeoCategory::StaircaseLabel,
        GeoCategory::ApartmentLabel,
        GeoCategory::IntercomLabel,
        GeoCategory::FloorLabel,
    ];

    /// Valor da feature: posição 1-based na ordem de prioridade.
    pub fn code(&self) -> u8 {
        *self as u8 + 1
    }

    /// Testa uma palavra já em minúsculas.
    pub fn matches(&self, word: &str) -> bool {
        match self {
            GeoCategory::PostalCodeLabel => matches!(word, "cod" | "codul"),
            GeoCategory::PostalCodeLabelSuffix => word == "postal",
            GeoCategory::CountryLabel => word == "tara",
            GeoCategory::Country => matches!(word, "romania" | "ro"),
            GeoCategory::CountyLabel => matches!(word, "judetul" | "judet" | "jud"),
            GeoCategory::County => COUNTY_CODES.contains(&word) || COUNTIES.contains(&word),
            GeoCategory::CityLabel => CITY_LABELS.contains(&word),
            GeoCategory::StreetLabel => STREET_LABELS.contains(&word),
            GeoCategory::StreetType => !STREET_LABELS.contains(&word) && STREET_TYPES.contains(&word),
            GeoCategory::StreetNumberLabel => matches!(word, "numarul" | "numar" | "nr"),
            GeoCategory::BlockLabel => matches!(word, "blocul" | "bloc" | "bl"),
            GeoCategory::StaircaseLabel => matches!(word, "scara" | "sc"),
            GeoCategory::ApartmentLabel => {
                matches!(word, "apartamentul" | "apartament" | "ap" | "camera" | "cam")
            }
            GeoCategory::IntercomLabel => matches!(word, "interfonul" | "interfon" | "int"),
            GeoCategory::FloorLabel => matches!(word, "etajul" | "etaj" | "et"),
        }
    }

    /// Primeira categoria que aceita a palavra (comparada em minúsculas).
    pub fn classify(word: &str) -> Option<GeoCategory> {
        let lower = word.to_lowercase();
        GeoCategory::ALL.into_iter().find(|c| c.matches(&lower))
    }
}

/// Relação de um token com os trechos de outro detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlap {
    #[default]
    None,
    /// O token contém o início de um trecho.
    Starts,
    /// O token contém o fim de um trecho.
    Ends,
    /// O token começa estritamente dentro de um trecho.
    Inside,
}

impl Overlap {
    pub fn code(&self) -> u8 {
        match self {
            Overlap::None => 0,
            Overlap::Starts => 1,
            Overlap::Ends => 2,
            Overlap::Inside => 3,
        }
    }

    /// Relação com o primeiro trecho (na ordem dada) que o token toca.
    pub fn of(token: &Token, spans: &[CandidateSpan]) -> Overlap {
        for span in spans {
            let (s0, s1) = (span.start, span.end);
            if token.start == s0 || (token.start < s0 && token.end >= s0) {
                return Overlap::Starts;
            }
            if token.end == s1 || (token.start <= s1 && token.end > s1) {
                return Overlap::Ends;
            }
            if token.start > s0 && token.start < s1 {
                return Overlap::Inside;
            }
        }
        Overlap::None
    }
}

/// As 10 features de um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenFeatures {
    pub no_digits: bool,
    pub no_letters: bool,
    pub has_hyphen: bool,
    pub one_char: bool,
    pub no_lowercase: bool,
    pub no_uppercase: bool,
    pub first_uppercase: bool,
    pub geo: Option<GeoCategory>,
    pub regex_overlap: Overlap,
    pub gazetteer_overlap: Overlap,
}

impl TokenFeatures {
    /// Features ortográficas e geográficas; as de sobreposição ficam em `None`.
    pub fn of_word(word: &str) -> Self {
        Self {
            no_digits: !word.chars().any(|c| c.is_ascii_digit()),
            no_letters: !word.chars().any(|c| c.is_ascii_alphabetic()),
            has_hyphen: word.contains('-'),
            one_char: word.chars().count() == 1,
            no_lowercase: !word.chars().any(|c| c.is_ascii_lowercase()),
            no_uppercase: !word.chars().any(|c| c.is_ascii_uppercase()),
            first_uppercase: word.chars().next().is_some_and(char::is_uppercase),
            geo: GeoCategory::classify(word),
            regex_overlap: Overlap::None,
            gazetteer_overlap: Overlap::None,
        }
    }

    pub fn to_array(&self) -> [u8; FEATURES_PER_TOKEN] {
        [
            self.no_digits as u8,
            self.no_letters as u8,
            self.has_hyphen as u8,
            self.one_char as u8,
            self.no_lowercase as u8,
            self.no_uppercase as u8,
            self.first_uppercase as u8,
            self.geo.map(|g| g.code()).unwrap_or(0),
            self.regex_overlap.code(),
            self.gazetteer_overlap.code(),
        ]
    }
}

/// Tokens do modo janela, suas features e as janelas prontas para o classificador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub tokens: Vec<Token>,
    pub features: Vec<TokenFeatures>,
    /// Uma linha de [`WINDOW_FEATURES`] valores por token.
    pub windows: Vec<Vec<u8>>,
}

impl FeatureMatrix {
    /// Tokeniza `text` preservando a caixa e monta a matriz com as sobreposições dos
    /// trechos dos dois detectores determinísticos.
    pub fn build(text: &str, regex_spans: &[CandidateSpan], gazetteer_spans: &[CandidateSpan]) -> Self {
        let tokens = tokenize_with_mode(text, TokenizerMode::Window);
        let features: Vec<TokenFeatures> = tokens
            .iter()
            .map(|token| TokenFeatures {
                regex_overlap: Overlap::of(token, regex_spans),
                gazetteer_overlap: Overlap::of(token, gazetteer_spans),
                ..TokenFeatures::of_word(&token.text)
            })
            .collect();
        let windows = sliding_windows(&features);
        Self {
            tokens,
            features,
            windows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Uma janela centrada em cada token, achatada em 50 valores.
pub fn sliding_windows(features: &[TokenFeatures]) -> Vec<Vec<u8>> {
    let half = WINDOW_SIZE / 2;
    (0..features.len())
        .map(|center| {
            let mut row = Vec::with_capacity(WINDOW_FEATURES);
            for offset in 0..WINDOW_SIZE {
                let slot = (center + offset)
                    .checked_sub(half)
                    .and_then(|i| features.get(i))
                    .map(TokenFeatures::to_array)
                    .unwrap_or([0; FEATURES_PER_TOKEN]);
                row.extend_from_slice(&slot);
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanOrigin;

    fn token(start: usize, end: usize) -> Token {
        Token {
            text: "x".repeat(end - start + 1),
            start,
            end,
            index: 0,
        }
    }

    fn span(start: usize, end: usize) -> CandidateSpan {
        CandidateSpan::unscored(start, end, SpanOrigin::Regex)
    }

    #[test]
    fn test_orthographic_features() {
        let f = TokenFeatures::of_word("Cluj-Napoca");
        assert!(f.no_digits && f.has_hyphen && f.first_uppercase);
        assert!(!f.no_letters && !f.one_char && !f.no_lowercase && !f.no_uppercase);

        let f = TokenFeatures::of_word("5");
        assert!(f.no_letters && f.one_char && f.no_lowercase && f.no_uppercase);
        assert!(!f.no_digits && !f.first_uppercase);

        let f = TokenFeatures::of_word("A");
        assert!(f.no_lowercase && !f.no_uppercase && f.first_uppercase);
    }

    #[test]
    fn test_punctuation_token_has_no_letters_or_digits() {
        let f = TokenFeatures::of_word(",");
        assert_eq!(f.to_array()[..7], [1, 1, 0, 1, 1, 1, 0]);
        assert_eq!(f.geo, None);
    }

    #[test]
    fn test_geo_categories_follow_priority() {
        assert_eq!(GeoCategory::classify("Cod").map(|g| g.code()), Some(1));
        assert_eq!(GeoCategory::classify("postal").map(|g| g.code()), Some(2));
        assert_eq!(GeoCategory::classify("JUD"), Some(GeoCategory::CountyLabel));
        assert_eq!(GeoCategory::classify("CJ"), Some(GeoCategory::County));
        assert_eq!(GeoCategory::classify("Iasi"), Some(GeoCategory::County));
        assert_eq!(GeoCategory::classify("str"), Some(GeoCategory::StreetLabel));
        assert_eq!(GeoCategory::classify("bd"), Some(GeoCategory::StreetType));
        // "int" é tipo de rua antes de ser rótulo de interfone
        assert_eq!(GeoCategory::classify("int"), Some(GeoCategory::StreetType));
        assert_eq!(GeoCategory::classify("etaj").map(|g| g.code()), Some(15));
        assert_eq!(GeoCategory::classify("Plopilor"), None);
    }

    #[test]
    fn test_overlap_codes() {
        let spans = [span(10, 20)];
        assert_eq!(Overlap::of(&token(10, 12), &spans), Overlap::Starts);
        assert_eq!(Overlap::of(&token(8, 11), &spans), Overlap::Starts);
        assert_eq!(Overlap::of(&token(18, 20), &spans), Overlap::Ends);
        assert_eq!(Overlap::of(&token(19, 23), &spans), Overlap::Ends);
        assert_eq!(Overlap::of(&token(14, 15), &spans), Overlap::Inside);
        assert_eq!(Overlap::of(&token(0, 5), &spans), Overlap::None);
        assert_eq!(Overlap::of(&token(22, 25), &spans), Overlap::None);
    }

    #[test]
    fn test_first_touched_span_wins() {
        let spans = [span(0, 5), span(5, 9)];
        // termina o primeiro trecho antes de ser testado como início do segundo
        assert_eq!(Overlap::of(&token(5, 6), &spans), Overlap::Ends);
    }

    #[test]
    fn test_windows_are_centered_and_padded() {
        let features: Vec<TokenFeatures> = ["Str", ".", "Mare"]
            .iter()
            .map(|w| TokenFeatures::of_word(w))
            .collect();
        let windows = sliding_windows(&features);
        assert_eq!(windows.len(), 3);
        assert!(windows.iter().all(|w| w.len() == WINDOW_FEATURES));

        // primeira janela: dois vazios, depois os três tokens
        assert!(windows[0][..20].iter().all(|&v| v == 0));
        assert_eq!(windows[0][20..30], features[0].to_array());
        assert_eq!(windows[0][40..50], features[2].to_array());
        // última janela: centro é "Mare", depois dois vazios
        assert_eq!(windows[2][20..30], features[2].to_array());
        assert!(windows[2][30..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_matrix_marks_detector_overlaps() {
        let text = "la Str. Mare nr 5";
        let regex = [span(3, 16)];
        let matrix = FeatureMatrix::build(text, &regex, &[]);
        let texts: Vec<&str> = matrix.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["la", "Str", ".", "Mare", "nr", "5"]);
        assert_eq!(matrix.features[1].regex_overlap, Overlap::Starts);
        assert_eq!(matrix.features[3].regex_overlap, Overlap::Inside);
        assert_eq!(matrix.features[5].regex_overlap, Overlap::Ends);
        assert!(matrix.features.iter().all(|f| f.gazetteer_overlap == Overlap::None));
        assert_eq!(matrix.windows.len(), matrix.tokens.len());
    }

    #[test]
    fn test_empty_text_builds_empty_matrix() {
        let matrix = FeatureMatrix::build("", &[], &[]);
        assert!(matrix.is_empty());
        assert!(matrix.windows.is_empty());
    }
}
