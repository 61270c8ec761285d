use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TmError;

/// A BCP-47 style locale reduced to language, script and region.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    pub script: Option<String>,
    pub region: Option<String>,
}

impl Locale {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into().to_ascii_lowercase(),
            script: None,
            region: None,
        }
    }

    /// Same locale without script and region
    pub fn language_only(&self) -> Self {
        Self::new(self.language.clone())
    }

    /// Canonical language tag, e.g. `en-US`
    pub fn to_language_tag(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Locale {
    type Err = TmError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let mut parts = tag.trim().split(['-', '_']).filter(|p| !p.is_empty());

        let language = parts
            .next()
            .filter(|l| (2..=8).contains(&l.len()) && l.chars().all(|c| c.is_ascii_alphabetic()))
            .ok_or_else(|| TmError::UnsupportedDirection(format!("invalid language tag '{}'", tag)))?;

        let mut locale = Locale::new(language);
        for part in parts {
            let is_alpha = part.chars().all(|c| c.is_ascii_alphabetic());
            let is_digit = part.chars().all(|c| c.is_ascii_digit());
            match part.len() {
                4 if is_alpha && locale.script.is_none() && locale.region.is_none() => {
                    let mut script = part.to_ascii_lowercase();
                    script[..1].make_ascii_uppercase();
                    locale.script = Some(script);
                }
                2 if is_alpha && locale.region.is_none() => {
                    locale.region = Some(part.to_ascii_uppercase());
                }
                3 if is_digit && locale.region.is_none() => {
                    locale.region = Some(part.to_string());
                }
                _ => {
                    return Err(TmError::UnsupportedDirection(format!(
                        "invalid language tag '{}'",
                        tag
                    )))
                }
            }
        }
        Ok(locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(script) = &self.script {
            write!(f, "-{}", script)?;
        }
        if let Some(region) = &self.region {
            write!(f, "-{}", region)?;
        }
        Ok(())
    }
}

/// An ordered (source, target) translation direction.
///
/// Equality is order-sensitive. The reverse pair is computed from the two
/// locales on demand, so no pair ever owns its reverse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: Locale,
    pub target: Locale,
}

impl LanguagePair {
    pub fn new(source: Locale, target: Locale) -> Self {
        Self { source, target }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }

    pub fn equals_ignore_direction(&self, other: &LanguagePair) -> bool {
        self == other || (self.source == other.target && self.target == other.source)
    }

    pub fn equals_ignore_country(&self, other: &LanguagePair) -> bool {
        self.source.language == other.source.language
            && self.target.language == other.target.language
    }

    /// Compact key used to scope indexed documents, e.g. `en-US>it`
    pub fn key(&self) -> String {
        format!("{}>{}", self.source, self.target)
    }
}

impl FromStr for LanguagePair {
    type Err = TmError;

    /// Parses `en:it`, `en>it` or `en→it` (surrounding whitespace allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s
            .split_once('→')
            .or_else(|| s.split_once('>'))
            .or_else(|| s.split_once(':'))
            .ok_or_else(|| TmError::UnsupportedDirection(format!("invalid direction '{}'", s)))?;

        Ok(Self::new(source.trim().parse()?, target.trim().parse()?))
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{2192} {}", self.source, self.target)
    }
}
