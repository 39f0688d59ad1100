use super::{Result, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Point-in-time copy of every domain's history, newest update first.
pub type Snapshot = BTreeMap<String, Vec<StatusUpdate>>;

/// UTC instant stored in its textual RFC 3339 form.
///
/// Encoding always uses microsecond precision and a `Z` suffix, so two
/// timestamps compare the same way as text and as instants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    /// Wraps already-encoded text without checking it.
    #[cfg(test)]
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn parse(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|err| StoreError::InvalidTimestamp(self.0.clone(), err.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single reported status, stamped when it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    status: String,
    #[serde(rename = "timestamp")]
    observed_at: Timestamp,
}

impl StatusUpdate {
    pub fn new(status: impl Into<String>, observed_at: Timestamp) -> Self {
        Self {
            status: status.into(),
            observed_at,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn observed_at(&self) -> &Timestamp {
        &self.observed_at
    }
}

/// Copies a history into newest-first order.
///
/// Sorting ascending is stable and the result is then reversed, so updates
/// sharing a timestamp come out most-recently-appended first.
pub fn newest_first(history: &[StatusUpdate]) -> Vec<StatusUpdate> {
    let mut ordered = history.to_vec();
    ordered.sort_by(|a, b| a.observed_at.cmp(&b.observed_at));
    ordered.reverse();
    ordered
}
