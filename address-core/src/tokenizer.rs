//! # Tokenizador para Endereços Romenos
//!
//! Divide o texto (já normalizado, ver [`crate::normalize`]) em tokens que preservam
//! sua posição original. As posições são **offsets de caractere** com fim
//! **inclusivo**, o mesmo sistema de coordenadas das detecções publicadas.
//!
//! ## Esquemas de Tokenização
//!
//! - **Lexicon**: palavras em minúsculas, separadores descartados. É a visão usada
//!   pelo classificador de gazetteers (consulta aos dicionários).
//! - **Window**: preserva maiúsculas e emite cada sinal de pontuação relevante como
//!   token próprio. É a visão usada pelas janelas de features do classificador
//!   estatístico, que foi treinado assim.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use address_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let text = "Str. Plopilor nr. 5";
//!
//! // Lexicon: "str", "plopilor", "nr", "5"
//! let words = tokenize_with_mode(text, TokenizerMode::Lexicon);
//! assert_eq!(words.len(), 4);
//!
//! // Window: "Str", ".", "Plopilor", "nr", ".", "5"
//! let window = tokenize_with_mode(text, TokenizerMode::Window);
//! assert_eq!(window.len(), 6);
//! ```

use serde::{Deserialize, Serialize};

/// Um token extraído do texto normalizado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (em minúsculas no modo `Lexicon`).
    pub text: String,
    /// Offset de caractere inicial (inclusivo).
    pub start: usize,
    /// Offset de caractere final (inclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Estratégias de tokenização disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// **Léxico**: palavras em minúsculas, todos os separadores descartados.
    #[default]
    Lexicon,
    /// **Janela**: preserva a caixa e transforma a pontuação em tokens de um caractere.
    Window,
}

/// Caracteres que separam palavras.
///
/// O espaço sem quebra (`\u{a0}`) e as quebras de linha também separam palavras.
pub const SEPARATORS: &[char] = &[
    ' ', ',', '.', ':', '(', ')', '[', ']', '{', '}', '«', '»', '‹', '›', '<', '>', '"', '\'',
    ';', '‘', '“', '„', '¸', '”', 'ˮ', '|', '`', '΄', '´', 'ˈ', '˙', '=', '½', '¹', '\t',
    '\u{a0}', '\n', '\r',
];

/// Subconjunto dos separadores que, no modo `Window`, vira um token próprio.
const PUNCTUATION_TOKENS: &[char] = &[
    ',', '.', ':', ';', '(', ')', '[', ']', '{', '}', '"', '\'', '‘', '“', '„', '¸', '”', 'ˮ',
];

pub fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c)
}

/// Tokeniza no modo padrão (`Lexicon`).
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_mode(text, TokenizerMode::Lexicon)
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    let mut tokens = match mode {
        TokenizerMode::Lexicon => tokenize_lexicon(text),
        TokenizerMode::Window => tokenize_window(text),
    };

    // Re-indexa os tokens
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

fn tokenize_lexicon(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;

    for (pos, ch) in text.chars().enumerate() {
        if is_separator(ch) {
            flush_token(&mut tokens, &mut current, current_start, pos);
        } else {
            if current.is_empty() {
                current_start = pos;
            }
            current.extend(ch.to_lowercase());
        }
    }
    let len = text.chars().count();
    flush_token(&mut tokens, &mut current, current_start, len);

    tokens
}

fn tokenize_window(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;

    for (pos, ch) in text.chars().enumerate() {
        if PUNCTUATION_TOKENS.contains(&ch) {
            flush_token(&mut tokens, &mut current, current_start, pos);
            push_token(&mut tokens, ch.to_string(), pos, pos);
        } else if is_separator(ch) {
            flush_token(&mut tokens, &mut current, current_start, pos);
        } else {
            if current.is_empty() {
                current_start = pos;
            }
            current.push(ch);
        }
    }
    let len = text.chars().count();
    flush_token(&mut tokens, &mut current, current_start, len);

    tokens
}

/// Fecha o token acumulado (que termina antes de `next_pos`) e adiciona à lista
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize, next_pos: usize) {
    if !text.is_empty() {
        tokens.push(Token {
            text: std::mem::take(text),
            start,
            end: next_pos - 1,
            index: 0, // será atribuído depois
        });
    }
}

/// Adiciona um token de pontuação diretamente
fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lexicon_basic() {
        let tokens = tokenize("Str. Plopilor nr. 5, bl. 2");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["str", "plopilor", "nr", "5", "bl", "2"]);
    }

    #[test]
    fn test_lexicon_offsets_are_inclusive_chars() {
        let tokens = tokenize("«Iasi» jud");
        assert_eq!(tokens[0].text, "iasi");
        assert_eq!((tokens[0].start, tokens[0].end), (1, 4));
        assert_eq!((tokens[1].start, tokens[1].end), (7, 9));
    }

    #[test]
    fn test_hyphen_is_not_a_separator() {
        let tokens = tokenize("Cluj-Napoca");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "cluj-napoca");
    }

    #[test]
    fn test_tokenize_window_keeps_punctuation_and_case() {
        let tokens = tokenize_with_mode("Str. Mare, nr 5", TokenizerMode::Window);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Str", ".", "Mare", ",", "nr", "5"]);
        assert_eq!(tokens[1].start, 3);
        assert_eq!(tokens[1].end, 3);
    }

    #[test]
    fn test_window_skips_other_separators() {
        let tokens = tokenize_with_mode("a | b = c", TokenizerMode::Window);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_tokens_are_sorted_and_disjoint() {
        let tokens = tokenize_with_mode("Bd. Unirii nr.10, ap.3; Bucuresti", TokenizerMode::Window);
        for pair in tokens.windows(2) {
            assert!(pair[0].end < pair[1].start);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
    }

    #[test]
    fn test_empty_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize_with_mode(" ,.; ", TokenizerMode::Lexicon).is_empty());
    }
}
