//! # Datasets de Referência (JSON Lines)
//!
//! Os gazetteers de cidades, ruas e códigos postais vêm de listas administrativas
//! externas. Cada arquivo tem **um objeto JSON por linha**:
//!
//! ```text
//! registry.jsonl      {"postal_code": "400001", "siruta": "54975", "type": "municipiu", "name": "Cluj-Napoca"}
//! streets_*.jsonl     {"name": "Plopilor", "siruta": "54975", "type": "strada"}
//! ```
//!
//! Linhas em branco são ignoradas. Uma linha que não desserializa é descartada com
//! um `warn!` e contada; só uma falha de I/O do arquivo aborta a carga.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::DatasetError;

/// Registro do cadastro administrativo de localidades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    #[serde(deserialize_with = "text_or_number")]
    pub postal_code: String,
    #[serde(rename = "siruta", default, deserialize_with = "text_or_number")]
    pub registry_id: String,
    #[serde(rename = "type", default)]
    pub settlement_type: String,
    pub name: String,
}

/// Registro de uma lista de ruas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetRecord {
    pub name: String,
    #[serde(rename = "siruta", default, deserialize_with = "text_or_number")]
    pub registry_id: String,
    #[serde(rename = "type", default)]
    pub settlement_type: String,
}

/// Escopo administrativo de uma lista de ruas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetScope {
    City,
    Commune,
    Village,
}

impl StreetScope {
    pub fn name(&self) -> &'static str {
        match self {
            StreetScope::City => "streets_cities",
            StreetScope::Commune => "streets_communes",
            StreetScope::Village => "streets_villages",
        }
    }

    pub fn all() -> [StreetScope; 3] {
        [StreetScope::City, StreetScope::Commune, StreetScope::Village]
    }
}

/// Caminhos opcionais dos quatro datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub registry: Option<PathBuf>,
    pub streets_cities: Option<PathBuf>,
    pub streets_communes: Option<PathBuf>,
    pub streets_villages: Option<PathBuf>,
}

impl DatasetPaths {
    pub fn streets(&self, scope: StreetScope) -> Option<&Path> {
        match scope {
            StreetScope::City => self.streets_cities.as_deref(),
            StreetScope::Commune => self.streets_communes.as_deref(),
            StreetScope::Village => self.streets_villages.as_deref(),
        }
    }
}

/// Contagem de linhas lidas de um arquivo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineStats {
    pub parsed: usize,
    pub malformed: usize,
}

/// Lê um arquivo JSON Lines, entregando cada registro válido a `on_record`.
pub fn read_json_lines<T, F>(path: &Path, mut on_record: F) -> Result<LineStats, DatasetError>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let mut stats = LineStats::default();

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => {
                stats.parsed += 1;
                on_record(record);
            }
            Err(e) => {
                stats.malformed += 1;
                warn!(path = %path.display(), line = line_no + 1, error = %e, "registro malformado descartado");
            }
        }
    }
    Ok(stats)
}

/// Aceita `"400001"` ou `400001` (exportações de planilha trazem números).
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(u64),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    })
}
