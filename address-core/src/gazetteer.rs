//! # Gazetteers — Dicionários de Frases Geográficas
//!
//! O [`GazetteerStore`] reúne todas as listas consultadas pelo classificador de
//! gazetteers: frases introdutórias, rótulos ("jud", "bl", "ap"...), condados,
//! cidades, ruas e o conjunto de códigos postais cadastrados.
//!
//! Cada entrada é uma **frase pré-tokenizada** (sequência de palavras em minúsculas,
//! sem diacríticos). A loja é construída uma única vez pelo [`GazetteerBuilder`] e
//! depois só é lida, compartilhada entre requisições via `Arc`, sem locks.
//!
//! ## Correspondência aproximada
//!
//! Uma frase casa com o início de uma sequência de tokens se cada palavra for igual
//! ao token correspondente ou estiver a uma distância de Levenshtein dentro do
//! orçamento da categoria. Entre as frases que casam vence a **mais longa**, depois a
//! de **menor distância total**, depois a inserida primeiro.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::{read_json_lines, DatasetPaths, RegistryRecord, StreetRecord, StreetScope};
use crate::error::DatasetError;
use crate::normalize::remove_diacritics;
use crate::tokenizer::{tokenize, Token};

/// Listas de frases mantidas pela loja.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexicon {
    AddressPrefix,
    PostalCodeText,
    CountryText,
    Country,
    CountyText,
    County,
    CityText,
    City,
    StreetText,
    StreetType,
    Street,
    StreetNumberText,
    BlockText,
    StaircaseText,
    ApartmentText,
    IntercomText,
    FloorText,
}

impl Lexicon {
    pub const ALL: [Lexicon; 17] = [
        Lexicon::AddressPrefix,
        Lexicon::PostalCodeText,
        Lexicon::CountryText,
        Lexicon::Country,
        Lexicon::CountyText,
        Lexicon::County,
        Lexicon::CityText,
        Lexicon::City,
        Lexicon::StreetText,
        Lexicon::StreetType,
        Lexicon::Street,
        Lexicon::StreetNumberText,
        Lexicon::BlockText,
        Lexicon::StaircaseText,
        Lexicon::ApartmentText,
        Lexicon::IntercomText,
        Lexicon::FloorText,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Frases fixas da lista (cidades e ruas vêm também dos datasets).
    pub fn builtin_phrases(&self) -> &'static [&'static str] {
        match self {
            Lexicon::AddressPrefix => ADDRESS_PREFIXES,
            Lexicon::PostalCodeText => &["cod postal", "codul postal"],
            Lexicon::CountryText => &["tara"],
            Lexicon::Country => &["romania"],
            Lexicon::CountyText => &["judetul", "judet", "jud"],
            Lexicon::County => COUNTIES,
            Lexicon::CityText => CITY_LABELS,
            Lexicon::City => &["bucuresti"],
            Lexicon::StreetText => &["str", "strd", "strada"],
            Lexicon::StreetType => STREET_TYPES,
            Lexicon::Street => &[],
            Lexicon::StreetNumberText => &["numarul", "numar", "nr"],
            Lexicon::BlockText => &["blocul", "bloc", "bl"],
            Lexicon::StaircaseText => &["scara", "sc"],
            Lexicon::ApartmentText => &["apartamentul", "apartament", "ap", "camera", "cam"],
            Lexicon::IntercomText => &["interfonul", "interfon", "int"],
            Lexicon::FloorText => &["etajul", "etaj", "et"],
        }
    }
}

/// Os 41 județe e a capital.
pub const COUNTIES: &[&str] = &[
    "bucuresti", "timis", "dolj", "prahova", "iasi", "cluj", "braila", "constanta", "sibiu",
    "bihor", "arad", "hunedoara", "bacau", "mures", "galati", "brasov", "mehedinti", "neamt",
    "vaslui", "botosani", "arges", "buzau", "satu mare", "giurgiu", "maramures", "valcea",
    "suceava", "vrancea", "tulcea", "olt", "caras-severin", "calarasi", "dambovita",
    "bistrita-nasaud", "alba", "gorj", "covasna", "harghita", "teleorman", "ialomita", "salaj",
    "ilfov",
];

pub const CITY_LABELS: &[&str] = &[
    "localitatea", "localitate", "localit", "loc", "satul", "sat", "comuna", "orasul", "oras",
    "ors", "or", "municipiul", "municipiu", "mun", "sectorul", "sector", "sec",
];

pub const STREET_TYPES: &[&str] = &[
    "strada", "strd", "str", "alee", "aleea", "intrare", "intrarea", "intr", "int", "fundatura",
    "piata", "pta", "bulevard", "bulevardul", "blvrd", "blvd", "bul", "blv", "bd", "drum",
    "drumul", "sosea", "soseaua", "sos", "cale", "calea", "cal", "cartier", "cartierul", "cart",
    "stradela", "pasaj", "pasajul", "prelungire", "prelungirea", "fundac", "fundacul", "parc",
    "parcul", "splai", "splaiul", "spl", "trecere", "trecerea", "ulicioara", "ulita", "hotar",
    "hotarul", "canton", "cantonul", "cvartal", "cvartalul", "trecatoare", "trecatoarea",
    "magistrala", "curte", "curtea", "complex", "complexul", "sir", "sirul", "scuar", "scuarul",
    "pietonal", "pietonalul",
];

/// Verbos "a sta" e "a locui" que introduzem um endereço ("locuiesc in ...").
pub const RESIDE_VERBS: &[&str] = &[
    "stau", "stai", "sta", "stam", "stati", "stea", "stateam", "stateai", "statea", "stateati",
    "stateau", "statusem", "statusesi", "statuse", "statuseram", "statuserati", "statusera",
    "statui", "statusi", "statu", "staturam", "staturati", "statura", "stat", "locuiesc",
    "locuiesti", "locuim", "locuiti", "locuiasca", "locuiam", "locuiai", "locuia", "locuiati",
    "locuiau", "locuii", "locuisi", "locui", "locuiaram", "locuiarati", "locuiara", "locuisem",
    "locuisesi", "locuise", "locuiseram", "locuiserati", "locuisera", "locuit",
];

pub const ADDRESS_PREFIXES: &[&str] = &[
    "pe domiciliul la adresa",
    "pe domiciliul de la adresa",
    "pe domiciliul din adresa",
    "din domiciliul la adresa",
    "din domiciliul de la adresa",
    "din domiciliul din adresa",
    "in domiciliul la adresa",
    "in domiciliul de la adresa",
    "in domiciliul din adresa",
    "adresa in",
    "adresa la",
    "adresa pe",
    "adresa domiciliului in",
    "adresa domiciliului la",
    "adresa domiciliului pe",
    "adresa domiciliului",
    "adresa domiciliu",
    "adresa de domiciliu in",
    "adresa de domiciliu la",
    "adresa de domiciliu pe",
    "adresa de domiciliu",
    "adresa resedintei in",
    "adresa resedintei la",
    "adresa resedintei pe",
    "adresa resedintei",
    "adresa resedinta",
    "adresa sediului in",
    "adresa sediului la",
    "adresa sediului pe",
    "adresa sediului",
    "adresa sediu",
    "adresa",
    "din domiciliul",
    "din domiciliu",
    "la domiciliul",
    "domiciliul in",
    "domiciliul la",
    "domiciliul pe",
    "domiciliul la adresa",
    "domiciliul de la adresa",
    "domiciliul din adresa",
    "domiciliul",
    "domiciliu",
    "dimiciliata in",
    "dimiciliata la",
    "dimiciliata pe",
    "dimiciliat in",
    "dimiciliat la",
    "dimiciliat pe",
    "la resedinta",
    "pe resedinta",
    "din resedinta",
    "resedinta in",
    "resedinta la",
    "resedinta pe",
    "resedinta",
    "sediul",
    "sediu",
    "la sediul",
    "din sediul",
    "sediul in",
    "sediul la",
    "sediul pe",
];

/// Todas as frases introdutórias: a lista fixa mais cada verbo de residência seguido
/// de "in", "la" ou "pe".
pub fn address_prefix_phrases() -> Vec<String> {
    let mut phrases: Vec<String> = ADDRESS_PREFIXES.iter().map(|p| p.to_string()).collect();
    for preposition in ["in", "la", "pe"] {
        phrases.extend(RESIDE_VERBS.iter().map(|verb| format!("{verb} {preposition}")));
    }
    phrases
}

/// Distância de edição (Levenshtein) entre duas palavras, por caractere.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Divide um nome em palavras no formato do tokenizador (minúsculas, sem diacríticos).
pub fn split_phrase(text: &str) -> Vec<String> {
    tokenize(&remove_diacritics(text)).into_iter().map(|t| t.text).collect()
}

/// Resultado de uma consulta a uma lista de frases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseMatch {
    /// Número de tokens consumidos.
    pub len: usize,
    /// Soma das distâncias de edição das palavras.
    pub distance: usize,
}

/// Lista de frases com índice pela primeira palavra.
#[derive(Debug, Clone, Default)]
pub struct PhraseList {
    phrases: Vec<Vec<String>>,
    by_first_word: HashMap<String, Vec<usize>>,
}

impl PhraseList {
    pub fn new(phrases: Vec<Vec<String>>) -> Self {
        let mut by_first_word: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, phrase) in phrases.iter().enumerate() {
            if let Some(first) = phrase.first() {
                by_first_word.entry(first.clone()).or_default().push(i);
            }
        }
        Self {
            phrases,
            by_first_word,
        }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Melhor frase que casa com o início de `tokens` dentro do orçamento de distância.
    pub fn best_match(&self, tokens: &[Token], budget: usize) -> Option<PhraseMatch> {
        let first = tokens.first()?;
        if budget == 0 {
            let candidates = self.by_first_word.get(&first.text)?;
            self.rank(candidates.iter().copied(), tokens, 0)
        } else {
            self.rank(0..self.phrases.len(), tokens, budget)
        }
    }

    fn rank(&self, candidates: impl Iterator<Item = usize>, tokens: &[Token], budget: usize) -> Option<PhraseMatch> {
        let mut best: Option<PhraseMatch> = None;
        for i in candidates {
            let Some(distance) = phrase_distance(&self.phrases[i], tokens, budget) else {
                continue;
            };
            let candidate = PhraseMatch {
                len: self.phrases[i].len(),
                distance,
            };
            let better = match best {
                None => true,
                Some(b) => candidate.len > b.len || (candidate.len == b.len && candidate.distance < b.distance),
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Distância total entre a frase e o prefixo de `tokens`; `None` se alguma palavra
/// estourar o orçamento ou faltarem tokens.
fn phrase_distance(phrase: &[String], tokens: &[Token], budget: usize) -> Option<usize> {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return None;
    }
    let mut total = 0;
    for (word, token) in phrase.iter().zip(tokens) {
        if *word == token.text {
            continue;
        }
        if budget == 0 {
            return None;
        }
        let d = levenshtein(word, &token.text);
        if d > budget {
            return None;
        }
        total += d;
    }
    Some(total)
}

/// Tamanhos das listas, para logs e para o endpoint de saúde.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GazetteerStats {
    pub postal_codes: usize,
    pub counties: usize,
    pub cities: usize,
    pub streets: usize,
}

/// Loja imutável de gazetteers.
#[derive(Debug, Clone)]
pub struct GazetteerStore {
    lists: Vec<PhraseList>,
    postal_codes: HashSet<String>,
}

impl GazetteerStore {
    /// Loja só com as listas fixas (sem datasets).
    pub fn builtin() -> Self {
        GazetteerBuilder::new().build()
    }

    pub fn lexicon(&self, lexicon: Lexicon) -> &PhraseList {
        &self.lists[lexicon.index()]
    }

    pub fn is_registered_postal_code(&self, code: &str) -> bool {
        self.postal_codes.contains(code)
    }

    pub fn stats(&self) -> GazetteerStats {
        GazetteerStats {
            postal_codes: self.postal_codes.len(),
            counties: self.lexicon(Lexicon::County).len(),
            cities: self.lexicon(Lexicon::City).len(),
            streets: self.lexicon(Lexicon::Street).len(),
        }
    }
}

impl Default for GazetteerStore {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Resumo da construção: quantos registros entraram e quantos foram descartados.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub registry_records: usize,
    pub street_records: usize,
    /// Registros bem formados mas rejeitados pelas regras (rua numérica, nome vazio...).
    pub skipped_records: usize,
    /// Linhas que não desserializaram.
    pub malformed_lines: usize,
}

/// Coleta nomes e códigos antes de congelar a loja.
#[derive(Debug, Clone)]
pub struct GazetteerBuilder {
    postal_codes: HashSet<String>,
    counties: Vec<String>,
    cities: Vec<String>,
    streets: Vec<String>,
    seen: HashSet<(Lexicon, String)>,
    report: BuildReport,
}

impl GazetteerBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            postal_codes: HashSet::new(),
            counties: vec![],
            cities: vec![],
            streets: vec![],
            seen: HashSet::new(),
            report: BuildReport::default(),
        };
        for county in COUNTIES {
            builder.push_name(Lexicon::County, county);
        }
        for city in Lexicon::City.builtin_phrases() {
            builder.push_name(Lexicon::City, city);
        }
        builder
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    /// Adiciona uma cidade diretamente (nome livre).
    pub fn add_city(&mut self, name: &str) {
        self.push_name(Lexicon::City, name);
    }

    /// Adiciona uma rua diretamente (nome livre).
    pub fn add_street(&mut self, name: &str) {
        self.push_name(Lexicon::Street, name);
    }

    pub fn add_postal_code(&mut self, code: &str) {
        self.postal_codes.insert(code.trim().to_string());
    }

    /// Aplica as regras do cadastro administrativo:
    /// - código "0" ou vazio não é registrado; um código de 5 dígitos também entra com zero à esquerda;
    /// - registros do tipo `judet` alimentam a lista de condados;
    /// - os demais viram cidades, exceto nomes que já são condados.
    pub fn add_registry_record(&mut self, record: RegistryRecord) {
        let code = record.postal_code.trim();
        if !code.is_empty() && code != "0" {
            self.postal_codes.insert(code.to_string());
            if code.len() == 5 {
                self.postal_codes.insert(format!("0{code}"));
            }
        }

        let name = normalize_name(&record.name);
        if name.is_empty() {
            self.report.skipped_records += 1;
            return;
        }
        if record.settlement_type.trim().eq_ignore_ascii_case("judet") {
            self.push_name(Lexicon::County, &name);
        } else if !self.seen.contains(&(Lexicon::County, name.clone())) {
            self.push_name(Lexicon::City, &name);
        }
        self.report.registry_records += 1;
    }

    /// Adiciona uma rua de uma das listas; nomes vazios ou só numéricos são ignorados.
    pub fn add_street_record(&mut self, scope: StreetScope, record: StreetRecord) {
        if is_numeric_name(&record.name) {
            debug!(scope = scope.name(), name = %record.name, "rua sem nome textual descartada");
            self.report.skipped_records += 1;
            return;
        }
        let name = normalize_name(&record.name);
        self.push_name(Lexicon::Street, &name);
        self.report.street_records += 1;
    }

    /// Carrega o cadastro administrativo de um arquivo JSON Lines.
    pub fn load_registry(&mut self, path: &Path) -> Result<(), DatasetError> {
        let mut records = vec![];
        let stats = read_json_lines(path, |r: RegistryRecord| records.push(r))?;
        self.report.malformed_lines += stats.malformed;
        for record in records {
            self.add_registry_record(record);
        }
        Ok(())
    }

    /// Carrega uma lista de ruas de um arquivo JSON Lines.
    pub fn load_streets(&mut self, scope: StreetScope, path: &Path) -> Result<(), DatasetError> {
        let mut records = vec![];
        let stats = read_json_lines(path, |r: StreetRecord| records.push(r))?;
        self.report.malformed_lines += stats.malformed;
        for record in records {
            self.add_street_record(scope, record);
        }
        Ok(())
    }

    /// Carrega todos os datasets configurados; caminhos ausentes são ignorados.
    pub fn load_paths(&mut self, paths: &DatasetPaths) -> Result<(), DatasetError> {
        if let Some(path) = &paths.registry {
            self.load_registry(path)?;
        }
        for scope in StreetScope::all() {
            if let Some(path) = paths.streets(scope) {
                self.load_streets(scope, path)?;
            }
        }
        Ok(())
    }

    /// Congela a loja. A divisão dos nomes em frases roda em paralelo.
    pub fn build(self) -> GazetteerStore {
        let split_all = |names: &[String]| -> PhraseList {
            let phrases: Vec<Vec<String>> = names
                .par_iter()
                .map(|name| split_phrase(name))
                .filter(|phrase| !phrase.is_empty())
                .collect();
            PhraseList::new(phrases)
        };
        let fixed = |lexicon: Lexicon| -> PhraseList {
            PhraseList::new(lexicon.builtin_phrases().iter().map(|p| split_phrase(p)).collect())
        };

        let lists: Vec<PhraseList> = Lexicon::ALL
            .iter()
            .map(|lexicon| match lexicon {
                Lexicon::AddressPrefix => split_all(&address_prefix_phrases()),
                Lexicon::County => split_all(&self.counties),
                Lexicon::City => split_all(&self.cities),
                Lexicon::Street => split_all(&self.streets),
                other => fixed(*other),
            })
            .collect();

        let store = GazetteerStore {
            lists,
            postal_codes: self.postal_codes,
        };
        let stats = store.stats();
        info!(
            postal_codes = stats.postal_codes,
            counties = stats.counties,
            cities = stats.cities,
            streets = stats.streets,
            skipped = self.report.skipped_records,
            malformed = self.report.malformed_lines,
            "gazetteer construído"
        );
        store
    }

    fn push_name(&mut self, lexicon: Lexicon, name: &str) {
        let name = normalize_name(name);
        if name.is_empty() || !self.seen.insert((lexicon, name.clone())) {
            return;
        }
        match lexicon {
            Lexicon::County => self.counties.push(name),
            Lexicon::City => self.cities.push(name),
            Lexicon::Street => self.streets.push(name),
            _ => {}
        }
    }
}

impl Default for GazetteerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_name(name: &str) -> String {
    remove_diacritics(name.trim()).to_lowercase()
}

fn is_numeric_name(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn registry(code: &str, kind: &str, name: &str) -> RegistryRecord {
        RegistryRecord {
            postal_code: code.to_string(),
            registry_id: "1".to_string(),
            settlement_type: kind.to_string(),
            name: name.to_string(),
        }
    }

    fn street(name: &str) -> StreetRecord {
        StreetRecord {
            name: name.to_string(),
            registry_id: "1".to_string(),
            settlement_type: "strada".to_string(),
        }
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("judet", "judet"), 0);
        assert_eq!(levenshtein("cluj", "clju"), 2);
        assert_eq!(levenshtein("iasi", "iassi"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_exact_match_prefers_longest_phrase() {
        let store = GazetteerStore::builtin();
        let tokens = tokenize("adresa de domiciliu in Iasi");
        let m = store.lexicon(Lexicon::AddressPrefix).best_match(&tokens, 0).unwrap();
        assert_eq!(m, PhraseMatch { len: 4, distance: 0 });
    }

    #[test]
    fn test_reside_verbs_are_prefixes() {
        let store = GazetteerStore::builtin();
        let tokens = tokenize("locuiesc la Brasov");
        let m = store.lexicon(Lexicon::AddressPrefix).best_match(&tokens, 0).unwrap();
        assert_eq!(m.len, 2);
    }

    #[test]
    fn test_fuzzy_county_match_within_budget() {
        let store = GazetteerStore::builtin();
        let tokens = tokenize("Clujj");
        let m = store.lexicon(Lexicon::County).best_match(&tokens, 1).unwrap();
        assert_eq!(m, PhraseMatch { len: 1, distance: 1 });
        assert!(store.lexicon(Lexicon::County).best_match(&tokens, 0).is_none());
    }

    #[test]
    fn test_multi_word_county_needs_all_tokens() {
        let store = GazetteerStore::builtin();
        let full = tokenize("satu mare");
        assert_eq!(store.lexicon(Lexicon::County).best_match(&full, 0).map(|m| m.len), Some(2));
        let cut = tokenize("satu");
        assert!(store.lexicon(Lexicon::County).best_match(&cut, 0).is_none());
    }

    #[test]
    fn test_registry_rules() {
        let mut builder = GazetteerBuilder::new();
        builder.add_registry_record(registry("12345", "oras", "Abrud"));
        builder.add_registry_record(registry("0", "sat", "Ţicleni"));
        builder.add_registry_record(registry("", "judet", "Vrancea"));
        builder.add_registry_record(registry("", "municipiu", "Cluj"));
        let store = builder.build();

        assert!(store.is_registered_postal_code("12345"));
        assert!(store.is_registered_postal_code("012345"));
        assert!(!store.is_registered_postal_code("0"));

        let city = |text: &str| store.lexicon(Lexicon::City).best_match(&tokenize(text), 0).is_some();
        assert!(city("abrud"));
        assert!(city("ticleni"));
        assert!(city("bucuresti"));
        // nome de condado não vira cidade
        assert!(!city("cluj"));
    }

    #[test]
    fn test_street_records_skip_numeric_names() {
        let mut builder = GazetteerBuilder::new();
        builder.add_street_record(StreetScope::City, street("Ştefan cel Mare"));
        builder.add_street_record(StreetScope::Village, street("23"));
        builder.add_street_record(StreetScope::Village, street("  "));
        assert_eq!(builder.report().street_records, 1);
        assert_eq!(builder.report().skipped_records, 2);

        let store = builder.build();
        let tokens = tokenize("stefan cel mare nr 4");
        let m = store.lexicon(Lexicon::Street).best_match(&tokens, 0).unwrap();
        assert_eq!(m.len, 3);
        assert_eq!(store.stats().streets, 1);
    }

    #[test]
    fn test_duplicate_names_are_stored_once() {
        let mut builder = GazetteerBuilder::new();
        builder.add_street("Plopilor");
        builder.add_street("PLOPILOR");
        assert_eq!(builder.build().stats().streets, 1);
    }

    #[test]
    fn test_load_paths_from_json_lines() {
        use std::io::Write;

        let mut registry_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(registry_file, r#"{{"postal_code": "400001", "siruta": "54975", "type": "municipiu", "name": "Cluj-Napoca"}}"#).unwrap();
        writeln!(registry_file, "{{broken").unwrap();
        let mut streets_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(streets_file, r#"{{"name": "Plopilor", "siruta": "54975", "type": "strada"}}"#).unwrap();

        let paths = DatasetPaths {
            registry: Some(registry_file.path().to_path_buf()),
            streets_cities: Some(streets_file.path().to_path_buf()),
            ..Default::default()
        };
        let mut builder = GazetteerBuilder::new();
        builder.load_paths(&paths).unwrap();
        let report = builder.report();
        assert_eq!(report.registry_records, 1);
        assert_eq!(report.street_records, 1);
        assert_eq!(report.malformed_lines, 1);

        let store = builder.build();
        assert!(store.is_registered_postal_code("400001"));
        assert!(store.lexicon(Lexicon::City).best_match(&tokenize("cluj-napoca"), 0).is_some());
    }
}
