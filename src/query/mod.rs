//! Direction-scoped similarity queries built from tokenized sentences.

mod builder;

pub use builder::QueryBuilder;
