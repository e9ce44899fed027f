//! # Modelo de Detecção
//!
//! Reúne os recursos imutáveis que todas as requisições compartilham:
//!
//! - a **loja de gazetteers** (datasets + listas fixas), atrás de um `Arc`;
//! - o **classificador de gazetteers** construído sobre ela;
//! - o **detector de padrões de contexto** já compilado.
//!
//! O modelo é montado uma única vez na inicialização e depois só é lido; não há
//! nenhum estado mutável compartilhado entre extrações.

use std::sync::Arc;

use tracing::info;

use crate::dataset::DatasetPaths;
use crate::dictionary::GazetteerClassifier;
use crate::error::ModelError;
use crate::gazetteer::{BuildReport, GazetteerBuilder, GazetteerStats};
use crate::rule_based::ContextMatcher;

/// Os dois detectores determinísticos e os recursos que eles usam.
#[derive(Debug, Clone)]
pub struct AddressModel {
    /// Classificador de gazetteers (e decomposição em componentes).
    pub gazetteer: GazetteerClassifier,
    /// Detector por expressão regular.
    pub context: ContextMatcher,
    report: BuildReport,
}

impl AddressModel {
    /// Modelo só com as listas fixas: condados, rótulos, tipos de rua, "bucuresti".
    pub fn builtin() -> Result<Self, ModelError> {
        Self::from_builder(GazetteerBuilder::new())
    }

    /// Carrega os datasets configurados (caminhos ausentes são ignorados).
    pub fn from_paths(paths: &DatasetPaths) -> Result<Self, ModelError> {
        let mut builder = GazetteerBuilder::new();
        builder.load_paths(paths)?;
        Self::from_builder(builder)
    }

    /// Congela um builder já alimentado.
    pub fn from_builder(builder: GazetteerBuilder) -> Result<Self, ModelError> {
        let report = builder.report();
        let store = Arc::new(builder.build());
        let context = ContextMatcher::new()?;
        info!(
            registry = report.registry_records,
            streets = report.street_records,
            "modelo de endereços pronto"
        );
        Ok(Self {
            gazetteer: GazetteerClassifier::new(store),
            context,
            report,
        })
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn stats(&self) -> GazetteerStats {
        self.gazetteer.store().stats()
    }
}
