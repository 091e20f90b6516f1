use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Look-back window over which profitability and volatility are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "12m")]
    Months12,
    #[serde(rename = "36m")]
    Months36,
    #[serde(rename = "60m")]
    Months60,
    #[serde(rename = "begin")]
    Begin,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Months12,
        Horizon::Months36,
        Horizon::Months60,
        Horizon::Begin,
    ];

    /// Column suffix (`profitability_12m`, `score_begin`, ...).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Months12 => "12m",
            Self::Months36 => "36m",
            Self::Months60 => "60m",
            Self::Begin => "begin",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.suffix() == s.trim())
            .ok_or_else(|| format!("unknown horizon '{s}' (expected 12m, 36m, 60m or begin)"))
    }
}
