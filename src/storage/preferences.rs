use anyhow::Result;

use super::schema::Database;

impl Database {
    // ========================================================================
    // User Preferences Operations
    // ========================================================================

    /// Get a single preference value by key, `None` if unset.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM user_preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Insert or replace a preference, refreshing its timestamp.
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All preferences whose key starts with `prefix`, ordered by key.
    ///
    /// `_` and `%` in the prefix are matched literally.
    pub async fn get_preferences_by_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("{}%", escaped);
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, value FROM user_preferences WHERE key LIKE ? ESCAPE '\\' ORDER BY key",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Remove a preference. Returns whether it existed.
    pub async fn delete_preference(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_preference_missing() {
        let db = test_db().await;
        assert_eq!(db.get_preference("nonexistent.key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_preference_upsert() {
        let db = test_db().await;
        db.set_preference("theme.variant", "dark").await.unwrap();
        db.set_preference("theme.variant", "light").await.unwrap();

        let value = db.get_preference("theme.variant").await.unwrap();
        assert_eq!(value, Some("light".to_string()));
    }

    #[tokio::test]
    async fn test_get_preferences_by_prefix() {
        let db = test_db().await;
        db.set_preference("remix.recent_references", "[]")
            .await
            .unwrap();
        db.set_preference("remix.last_title", "Travel Vlog")
            .await
            .unwrap();
        db.set_preference("theme.variant", "dark").await.unwrap();

        let remix = db.get_preferences_by_prefix("remix.").await.unwrap();
        assert_eq!(
            remix,
            vec![
                ("remix.last_title".to_string(), "Travel Vlog".to_string()),
                ("remix.recent_references".to_string(), "[]".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_prefix_wildcards_are_literal() {
        let db = test_db().await;
        db.set_preference("a_b.key", "1").await.unwrap();
        db.set_preference("axb.key", "2").await.unwrap();

        let prefs = db.get_preferences_by_prefix("a_b.").await.unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].0, "a_b.key");
    }

    #[tokio::test]
    async fn test_prefix_no_false_matches() {
        let db = test_db().await;
        db.set_preference("theme.variant", "dark").await.unwrap();
        db.set_preference("thematic.value", "test").await.unwrap();

        let prefs = db.get_preferences_by_prefix("theme.").await.unwrap();
        assert_eq!(prefs.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_preference() {
        let db = test_db().await;
        db.set_preference("theme.variant", "dark").await.unwrap();

        assert!(db.delete_preference("theme.variant").await.unwrap());
        assert!(!db.delete_preference("theme.variant").await.unwrap());
        assert_eq!(db.get_preference("theme.variant").await.unwrap(), None);
    }
}
