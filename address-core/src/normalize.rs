//! # Normalização de Diacríticos
//!
//! O romeno usa cinco letras com diacríticos (ă, â, î, ș, ț), e as duas variantes
//! históricas com cedilha (ş, ţ) ainda aparecem em documentos antigos. Todos os
//! módulos de detecção trabalham sobre o texto já "dobrado" para ASCII.
//!
//! A substituição é **1:1 por caractere**: cada caractere é trocado por exatamente
//! um caractere. Por isso os offsets (em caracteres) do texto normalizado coincidem
//! com os do texto original.

/// Tabela fixa de substituição (caractere com diacrítico → caractere base).
const DIACRITICS: &[(char, char)] = &[
    ('ș', 's'),
    ('ş', 's'),
    ('Ș', 'S'),
    ('Ş', 'S'),
    ('ț', 't'),
    ('ţ', 't'),
    ('Ț', 'T'),
    ('Ţ', 'T'),
    ('ă', 'a'),
    ('â', 'a'),
    ('Ă', 'A'),
    ('Â', 'A'),
    ('î', 'i'),
    ('Î', 'I'),
];

/// Dobra um único caractere segundo a tabela fixa.
pub fn fold_char(c: char) -> char {
    DIACRITICS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Remove os diacríticos romenos de um texto, preservando o número de caracteres.
///
/// ```rust
/// use address_core::normalize::remove_diacritics;
///
/// assert_eq!(remove_diacritics("Strada Ștefan cel Mare, Iași"), "Strada Stefan cel Mare, Iasi");
/// ```
pub fn remove_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Índice de conversão entre offsets em bytes (usados pelo `regex`) e offsets em
/// caracteres (usados em toda a API pública).
#[derive(Debug, Clone)]
pub struct CharIndex {
    /// Offset em bytes do início de cada caractere, mais o comprimento total no final.
    byte_starts: Vec<usize>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let mut byte_starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_starts.push(text.len());
        Self { byte_starts }
    }

    /// Número de caracteres do texto indexado.
    pub fn char_len(&self) -> usize {
        self.byte_starts.len() - 1
    }

    /// Converte um offset em bytes (fronteira de caractere) em offset de caractere.
    pub fn char_at_byte(&self, byte: usize) -> usize {
        match self.byte_starts.binary_search(&byte) {
            Ok(i) => i,
            // Fora de fronteira: arredonda para o caractere que contém o byte
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Offset em bytes do caractere `char_pos` (ou do fim do texto).
    pub fn byte_at_char(&self, char_pos: usize) -> usize {
        let last = self.byte_starts.len() - 1;
        self.byte_starts[char_pos.min(last)]
    }

    /// Recorta `text[start..=end]` usando coordenadas de caractere com fim inclusivo.
    pub fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        let from = self.byte_at_char(start);
        let to = self.byte_at_char(end.saturating_add(1));
        if from >= to {
            return "";
        }
        &text[from..to]
    }
}
