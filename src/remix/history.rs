//! Recently used reference images, persisted across runs.

use anyhow::{Context, Result};

use crate::storage::Database;

/// Preference key the list is stored under, as a JSON array of strings.
pub const HISTORY_KEY: &str = "remix.recent_references";

/// Most-recent-first, de-duplicated, bounded list of reference names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceHistory {
    entries: Vec<String>,
    limit: usize,
}

impl ReferenceHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Read the stored list. A missing or corrupt value yields an empty history.
    pub async fn load(db: &Database, limit: usize) -> Result<Self> {
        let mut history = Self::new(limit);
        let Some(raw) = db
            .get_preference(HISTORY_KEY)
            .await
            .context("Failed to read reference history")?
        else {
            return Ok(history);
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => {
                // Re-apply the rules in case the limit shrank or the row was edited
                for entry in entries.into_iter().rev() {
                    history.push(entry);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, key = HISTORY_KEY, "Stored reference history is corrupt, starting empty");
            }
        }
        Ok(history)
    }

    pub async fn save(&self, db: &Database) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        db.set_preference(HISTORY_KEY, &json)
            .await
            .context("Failed to save reference history")
    }

    /// Forget everything, including the stored copy.
    pub async fn clear(&mut self, db: &Database) -> Result<()> {
        self.entries.clear();
        db.delete_preference(HISTORY_KEY).await?;
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `entry` to the front, dropping the oldest beyond the limit.
    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        self.entries.retain(|e| *e != entry);
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    /// Record a batch given most-recent-first.
    pub fn record<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch: Vec<String> = entries.into_iter().map(Into::into).collect();
        for entry in batch.into_iter().rev() {
            self.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_most_recent_first_and_deduped() {
        let mut history = ReferenceHistory::new(10);
        history.push("a.png");
        history.push("b.png");
        history.push("a.png");
        assert_eq!(history.entries(), ["a.png", "b.png"]);
    }

    #[test]
    fn test_bounded() {
        let mut history = ReferenceHistory::new(3);
        for name in ["1", "2", "3", "4", "5"] {
            history.push(name);
        }
        assert_eq!(history.entries(), ["5", "4", "3"]);
    }

    #[test]
    fn test_record_keeps_batch_order() {
        let mut history = ReferenceHistory::new(10);
        history.push("old.png");
        history.record(["newest.png", "older.png"]);
        assert_eq!(history.entries(), ["newest.png", "older.png", "old.png"]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = ReferenceHistory::new(0);
        history.push("a.png");
        assert!(history.is_empty());
    }
}
