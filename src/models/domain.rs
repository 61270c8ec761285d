use serde::{Deserialize, Serialize};

/// Domain identifier
pub type DomainId = u64;

/// Domain id reserved for the channel ledger document
pub const LEDGER_DOMAIN: DomainId = 0;

/// An identified grouping of translation content
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub name: Option<String>,
}

impl Domain {
    pub fn new(id: DomainId) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether content may be stored under this domain
    pub fn is_content_domain(&self) -> bool {
        self.id != LEDGER_DOMAIN
    }
}
