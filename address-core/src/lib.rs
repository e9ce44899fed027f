//! # address-core — Detecção de Endereços Postais Romenos em Texto Livre
//!
//! Este crate localiza endereços postais romenos em textos não estruturados (documentos
//! anonimizados, formulários, correspondência) e os decompõe em componentes tipados:
//! código postal, país, județ, localidade, tipo/nome/número de rua, bloco, escada,
//! apartamento, interfone e andar.
//!
//! ## Arquitetura do Sistema
//!
//! Três detectores independentes olham o mesmo texto normalizado, e um combinador
//! funde o que eles encontraram:
//!
//! 1.  **Entrada**: texto bruto, com ou sem diacríticos.
//! 2.  **Normalização** ([`normalize`]): remove diacríticos caractere a caractere; os
//!     offsets não mudam.
//! 3.  **Padrões de contexto** ([`rule_based`]): uma expressão regular composta
//!     (abertura → 20..200 caracteres → terminador).
//! 4.  **Classificador de gazetteers** ([`dictionary`]):
//!     *   **Caracterização** ([`characterize`]): cada grupo de tokens recebe os tipos
//!         das listas ([`gazetteer`]) ou dos predicados numéricos que o cobrem melhor.
//!     *   **Propagação** ([`propagation`]): a gramática de sucessão ([`grammar`])
//!         estreita e poda os tipos.
//!     *   **Montagem** ([`span`]): sequências tipadas que cobrem cidade, rua e número.
//! 5.  **Classificador estatístico** ([`features`], [`classifier`]): janelas de 5
//!     tokens × 10 features enviadas a um serviço externo.
//! 6.  **Combinação** ([`ensemble`]): varredura de eventos de fronteira, aceitação por
//!     corroboração, score e decomposição em componentes.
//! 7.  **Saída**: lista de [`Detection`].
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use address_core::{AddressModel, AddressPipeline, ClassifierConfig, HttpClassifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Monta o modelo (listas fixas; datasets via `AddressModel::from_paths`)
//!     let model = AddressModel::builtin()?;
//!
//!     // 2. Conecta o classificador externo
//!     let classifier = HttpClassifier::new(ClassifierConfig::default())?;
//!     let pipeline = AddressPipeline::new(model, Arc::new(classifier));
//!
//!     // 3. Extrai
//!     let text = "Domiciliul la adresa Str. Plopilor nr. 5, bl. 2, ap. 10, jud. Cluj";
//!     for detection in pipeline.extract(text).await? {
//!         println!("{}..={} (score {:.2})", detection.start, detection.end, detection.score);
//!         for component in &detection.components {
//!             println!("  {}: {}..={}", component.tag.name(), component.start, component.end);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta todos os estágios e emite eventos.
//! - [`model`]: recursos imutáveis compartilhados entre requisições.
//! - [`dataset`]: leitura dos datasets JSON Lines.

pub mod characterize;
pub mod classifier;
pub mod dataset;
pub mod dictionary;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod gazetteer;
pub mod grammar;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod propagation;
pub mod rule_based;
pub mod span;
pub mod tagger;
pub mod tokenizer;

pub use classifier::{AddressClassifier, ClassifierConfig, HttpClassifier};
pub use dataset::DatasetPaths;
pub use error::{ClassifierError, DatasetError, ExtractError, ModelError};
pub use gazetteer::GazetteerStats;
pub use model::AddressModel;
pub use pipeline::{AddressPipeline, PipelineEvent};
pub use span::{CandidateSpan, Component, Detection, SpanOrigin};
pub use tagger::ComponentTag;
pub use tokenizer::{Token, TokenizerMode};
