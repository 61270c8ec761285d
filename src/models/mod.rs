pub mod domain;
pub mod export;
pub mod search;
pub mod sentence;
pub mod unit;

pub use domain::{Domain, DomainId, LEDGER_DOMAIN};
pub use export::DecoderBatch;
pub use search::{ContextEntry, ContextVector, ScoreEntry};
pub use sentence::Sentence;
pub use unit::{Alignment, ChannelId, DataBatch, Deletion, Position, TranslationUnit};
