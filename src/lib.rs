pub mod codec;
pub mod config;
pub mod corpus;
pub mod error;
pub mod lang;
pub mod ledger;
pub mod memory;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod query;
pub mod rescoring;
pub mod store;
pub mod tokenizer;

pub use config::{AnalyzerConfig, MemoryConfig, RescorerConfig};
pub use error::{Result, TmError};
pub use lang::{LanguageIndex, LanguagePair, Locale};
pub use ledger::ChannelLedger;
pub use memory::TranslationMemory;
pub use models::*;
pub use rescoring::{LevenshteinRescorer, Rescorer};
pub use store::IndexStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
