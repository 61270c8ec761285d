//! Languages and translation directions.

mod index;
mod pair;

pub use index::LanguageIndex;
pub use pair::{LanguagePair, Locale};
