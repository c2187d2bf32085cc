//! Preference persistence.
//!
//! # Invariants
//! - A user has at most one preference row.
//! - `upsert_preference` replaces both id lists atomically.

use crate::model::ids::UserId;
use crate::model::preference::UserPreference;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const REQUIRED_TABLES: &[&str] = &[
    "user_preferences",
    "user_preference_intents",
    "user_preference_themes",
];

pub trait PreferenceStore {
    fn get_preference(&self, user_id: UserId) -> RepoResult<Option<UserPreference>>;
    /// Writes the full preference. Returns true when the row was created.
    fn upsert_preference(&self, preference: &UserPreference) -> RepoResult<bool>;
}

pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn load_ids(
        &self,
        sql: &str,
        user_id: UserId,
        column: &'static str,
    ) -> RepoResult<Vec<uuid::Uuid>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, column)?);
        }
        Ok(ids)
    }
}

impl PreferenceStore for SqlitePreferenceRepository<'_> {
    fn get_preference(&self, user_id: UserId) -> RepoResult<Option<UserPreference>> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM user_preferences WHERE user_id = ?1;",
                [user_id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }

        Ok(Some(UserPreference {
            user_id,
            intent_ids: self.load_ids(
                "SELECT intent_id FROM user_preference_intents
                 WHERE user_id = ?1
                 ORDER BY position ASC;",
                user_id,
                "user_preference_intents.intent_id",
            )?,
            theme_ids: self.load_ids(
                "SELECT theme_id FROM user_preference_themes
                 WHERE user_id = ?1
                 ORDER BY position ASC;",
                user_id,
                "user_preference_themes.theme_id",
            )?,
        }))
    }

    fn upsert_preference(&self, preference: &UserPreference) -> RepoResult<bool> {
        let user_key = preference.user_id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let created = tx.execute(
            "INSERT OR IGNORE INTO user_preferences (user_id) VALUES (?1);",
            [user_key.as_str()],
        )? == 1;
        if !created {
            tx.execute(
                "UPDATE user_preferences
                 SET updated_at = (strftime('%s', 'now') * 1000)
                 WHERE user_id = ?1;",
                [user_key.as_str()],
            )?;
        }

        tx.execute(
            "DELETE FROM user_preference_intents WHERE user_id = ?1;",
            [user_key.as_str()],
        )?;
        tx.execute(
            "DELETE FROM user_preference_themes WHERE user_id = ?1;",
            [user_key.as_str()],
        )?;
        for (position, intent_id) in preference.intent_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO user_preference_intents (user_id, intent_id, position)
                 VALUES (?1, ?2, ?3);",
                params![user_key, intent_id.to_string(), position as i64],
            )?;
        }
        for (position, theme_id) in preference.theme_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO user_preference_themes (user_id, theme_id, position)
                 VALUES (?1, ?2, ?3);",
                params![user_key, theme_id.to_string(), position as i64],
            )?;
        }

        tx.commit()?;
        Ok(created)
    }
}
