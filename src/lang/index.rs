use std::str::FromStr;

use super::pair::LanguagePair;
use crate::error::Result;

/// The set of translation directions the memory accepts.
///
/// Mapping resolves an incoming pair to a supported one: exact matches win,
/// then a match ignoring region/script subtags. Declaration order decides
/// between several fuzzy matches.
#[derive(Clone, Debug, Default)]
pub struct LanguageIndex {
    directions: Vec<LanguagePair>,
}

impl LanguageIndex {
    pub fn new(directions: impl IntoIterator<Item = LanguagePair>) -> Self {
        let mut unique: Vec<LanguagePair> = Vec::new();
        for direction in directions {
            if !unique.contains(&direction) {
                unique.push(direction);
            }
        }
        Self { directions: unique }
    }

    /// Build an index from a comma separated list such as `en:it,it:en`
    pub fn parse_list(list: &str) -> Result<Self> {
        let directions = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(LanguagePair::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(directions))
    }

    pub fn map(&self, language: &LanguagePair) -> Option<&LanguagePair> {
        self.directions
            .iter()
            .find(|d| *d == language)
            .or_else(|| self.directions.iter().find(|d| d.equals_ignore_country(language)))
    }

    /// Map a raw direction tag; unparseable tags map to nothing
    pub fn map_tag(&self, tag: &str) -> Option<&LanguagePair> {
        tag.parse::<LanguagePair>().ok().and_then(|pair| self.map(&pair))
    }

    pub fn contains(&self, direction: &LanguagePair) -> bool {
        self.directions.contains(direction)
    }

    pub fn directions(&self) -> &[LanguagePair] {
        &self.directions
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}
