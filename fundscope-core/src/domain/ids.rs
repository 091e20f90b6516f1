use serde::{Deserialize, Serialize};
use std::fmt;

/// Fund registry number (CNPJ), digits only.
///
/// Catalogs carry the formatted form (`12.345.678/0001-90`); the fetch
/// endpoints expect the bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundId(String);

impl FundId {
    /// Build an identifier from a catalog value, stripping `.`, `/` and `-`.
    pub fn from_formatted(raw: &str) -> Self {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '.' | '/' | '-'))
            .collect();
        Self(cleaned)
    }

    /// Wrap an already-normalized identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FundId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_cnpj_separators() {
        let id = FundId::from_formatted("35.940.266/0001-07");
        assert_eq!(id.as_str(), "35940266000107");
    }

    #[test]
    fn leaves_other_characters_alone() {
        let id = FundId::from_formatted(" 12 34 ");
        assert_eq!(id.as_str(), "12 34");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = FundId::new("123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"123\"");
    }
}
