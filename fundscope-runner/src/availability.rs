//! Availability join: flags scored funds that the secondary provider offers.
//!
//! Purely informational: every scored row is kept, only the flag is added.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::score::ScoredRecord;

/// How identifiers from both sides are brought to a comparable string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKeyPolicy {
    /// Compare the string forms as they are.
    #[default]
    Exact,
    /// Drop every non-digit character before comparing.
    DigitsOnly,
}

impl JoinKeyPolicy {
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            Self::Exact => raw.to_string(),
            Self::DigitsOnly => raw.chars().filter(char::is_ascii_digit).collect(),
        }
    }

    /// Normalize a whole identifier set.
    pub fn normalize_all<'a>(&self, ids: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
        ids.into_iter().map(|id| self.normalize(id)).collect()
    }
}

/// A scored fund annotated with secondary-provider availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    #[serde(flatten)]
    pub scored: ScoredRecord,
    pub available_on_secondary: bool,
}

/// Flag each record whose identifier is in `available`.
///
/// `available` is compared after applying `policy` to both sides; an empty
/// set flags every record as unavailable.
pub fn join_availability(
    records: Vec<ScoredRecord>,
    available: &HashSet<String>,
    policy: JoinKeyPolicy,
) -> Vec<JoinedRecord> {
    let keys = policy.normalize_all(available);
    records
        .into_iter()
        .map(|scored| {
            let key = policy.normalize(scored.asset.identifier.as_str());
            JoinedRecord {
                available_on_secondary: keys.contains(&key),
                scored,
            }
        })
        .collect()
}

/// Records with no availability information (secondary provider not queried).
pub fn without_availability(records: Vec<ScoredRecord>) -> Vec<JoinedRecord> {
    join_availability(records, &HashSet::new(), JoinKeyPolicy::Exact)
}
