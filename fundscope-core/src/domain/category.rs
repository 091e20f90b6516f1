use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Portfolio bucket a fund was classified into by the catalog publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Antifragilidade,
    Diversificacao,
    Estabilidade,
    Valorizacao,
    Outros,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Antifragilidade,
        Category::Diversificacao,
        Category::Estabilidade,
        Category::Valorizacao,
        Category::Outros,
    ];

    /// Upper-case name, as used for catalog keys and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Antifragilidade => "ANTIFRAGILIDADE",
            Self::Diversificacao => "DIVERSIFICACAO",
            Self::Estabilidade => "ESTABILIDADE",
            Self::Valorizacao => "VALORIZACAO",
            Self::Outros => "OUTROS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
