// change.rs — Source changes folded into one migration.
//
// When several origin commits are squashed into one destination change,
// the work context carries all of them. Each keeps its own labels so
// transformations can look at per-commit metadata (e.g. the original
// author stored by a previous migration).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::author::Author;
use crate::error::WorkError;
use crate::labels;

/// One change from the origin repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SourceChangeRecord")]
pub struct SourceChange {
    /// Origin revision identifier (commit hash, changelist number, ...).
    pub reference: String,

    pub author: Author,

    /// Full change message, including any label footer.
    pub message: String,

    pub date: DateTime<Utc>,

    /// Labels attached to this change. When not given explicitly they are
    /// read from the message footer.
    pub labels: BTreeMap<String, String>,
}

/// Serialized form of [`SourceChange`]; `labels` may be left out.
#[derive(Deserialize)]
struct SourceChangeRecord {
    reference: String,
    author: Author,
    message: String,
    date: DateTime<Utc>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

impl From<SourceChangeRecord> for SourceChange {
    fn from(record: SourceChangeRecord) -> Self {
        let change = SourceChange::new(record.reference, record.author, record.message, record.date);
        match record.labels {
            Some(labels) => change.with_labels(labels),
            None => change,
        }
    }
}

impl SourceChange {
    /// Build a change, reading its labels from the message footer.
    ///
    /// If a label appears more than once the first value wins.
    pub fn new(
        reference: impl Into<String>,
        author: Author,
        message: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        let message = message.into();
        let mut parsed = BTreeMap::new();
        for (key, value) in labels::parse_labels(&message) {
            parsed.entry(key).or_insert(value);
        }
        Self {
            reference: reference.into(),
            author,
            message,
            date,
            labels: parsed,
        }
    }

    /// Replace the label set, keeping the message as is.
    pub fn with_labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// First line of the message.
    pub fn first_line(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// The changes being migrated, plus those migrated earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    /// Changes included in this migration, oldest first.
    #[serde(default)]
    pub current: Vec<SourceChange>,

    /// Changes already migrated by previous runs.
    #[serde(default)]
    pub migrated: Vec<SourceChange>,
}

impl Changes {
    pub fn new(current: Vec<SourceChange>, migrated: Vec<SourceChange>) -> Self {
        Self { current, migrated }
    }

    /// Parse `{"current": [...], "migrated": [...]}`. Both lists are optional.
    pub fn from_json(content: &str) -> Result<Self, WorkError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load changes from a JSON file.
    pub fn load(path: &Path) -> Result<Self, WorkError> {
        let content = fs::read_to_string(path).map_err(|source| WorkError::io(path, source))?;
        Self::from_json(&content)
    }

    pub fn current(&self) -> &[SourceChange] {
        &self.current
    }

    pub fn migrated(&self) -> &[SourceChange] {
        &self.migrated
    }
}
