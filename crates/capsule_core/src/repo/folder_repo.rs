//! Folder collaborator contract and SQLite implementation.
//!
//! # Responsibility
//! - Answer creator-scoped membership questions for save-state.
//! - Persist folders, their participants and their capsule lists.
//!
//! # Invariants
//! - Save-state queries only ever consult `folders.creator_id`.
//! - Folder capsule lists keep insertion order (`position ASC`).

use crate::model::folder::{Folder, FolderPrivacy};
use crate::model::ids::{CapsuleId, FolderId, UserId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const REQUIRED_TABLES: &[&str] = &["folders", "folder_participants", "folder_capsules"];

/// Folder collaborator used by save-state resolution.
pub trait FolderStore {
    /// Returns true when any folder created by `user_id` holds `capsule_id`.
    fn find_by_creator_containing(
        &self,
        user_id: UserId,
        capsule_id: CapsuleId,
    ) -> RepoResult<bool>;

    /// Distinct capsule ids over all folders created by `user_id`.
    fn saved_capsule_ids(&self, user_id: UserId) -> RepoResult<Vec<CapsuleId>>;

    /// Folders where `user_id` is creator or participant.
    fn list_folders_for_user(&self, user_id: UserId) -> RepoResult<Vec<Folder>>;
}

pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    /// Persists folder row, participants and capsule list in one transaction.
    pub fn create_folder(&self, folder: &Folder) -> RepoResult<FolderId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO folders (id, name, description, privacy, creator_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                folder.id.to_string(),
                folder.name.as_str(),
                folder.description.as_deref(),
                folder.privacy.as_str(),
                folder.creator_id.to_string(),
            ],
        )?;
        for user_id in &folder.participant_ids {
            tx.execute(
                "INSERT OR IGNORE INTO folder_participants (folder_id, user_id) VALUES (?1, ?2);",
                params![folder.id.to_string(), user_id.to_string()],
            )?;
        }
        for (position, capsule_id) in folder.capsule_ids.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO folder_capsules (folder_id, capsule_id, position)
                 VALUES (?1, ?2, ?3);",
                params![
                    folder.id.to_string(),
                    capsule_id.to_string(),
                    position as i64
                ],
            )?;
        }
        tx.commit()?;
        Ok(folder.id)
    }

    /// Appends capsule to folder. Returns false when it was already present.
    pub fn add_capsule(&self, folder_id: FolderId, capsule_id: CapsuleId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO folder_capsules (folder_id, capsule_id, position)
             VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM folder_capsules WHERE folder_id = ?1)
             );",
            params![folder_id.to_string(), capsule_id.to_string()],
        )?;
        Ok(changed == 1)
    }

    pub fn add_participant(&self, folder_id: FolderId, user_id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO folder_participants (folder_id, user_id) VALUES (?1, ?2);",
            params![folder_id.to_string(), user_id.to_string()],
        )?;
        Ok(changed == 1)
    }

    pub fn get_folder(&self, folder_id: FolderId) -> RepoResult<Option<Folder>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, description, privacy, creator_id FROM folders WHERE id = ?1;",
                [folder_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;
        row.map(|raw| self.hydrate(raw)).transpose()
    }

    fn hydrate(&self, raw: RawFolder) -> RepoResult<Folder> {
        let (id, name, description, privacy, creator_id) = raw;
        let privacy = FolderPrivacy::parse(&privacy).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid privacy `{privacy}` in folders.privacy"))
        })?;
        let id = parse_uuid(&id, "folders.id")?;
        Ok(Folder {
            id,
            name,
            description,
            privacy,
            creator_id: parse_uuid(&creator_id, "folders.creator_id")?,
            participant_ids: self.uuid_column(
                "SELECT user_id FROM folder_participants WHERE folder_id = ?1 ORDER BY rowid ASC;",
                id,
                "folder_participants.user_id",
            )?,
            capsule_ids: self.uuid_column(
                "SELECT capsule_id FROM folder_capsules WHERE folder_id = ?1 ORDER BY position ASC;",
                id,
                "folder_capsules.capsule_id",
            )?,
        })
    }

    fn uuid_column(
        &self,
        sql: &str,
        key: FolderId,
        column: &'static str,
    ) -> RepoResult<Vec<uuid::Uuid>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key.to_string()])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            values.push(parse_uuid(&value, column)?);
        }
        Ok(values)
    }
}

type RawFolder = (String, String, Option<String>, String, String);

impl FolderStore for SqliteFolderRepository<'_> {
    fn find_by_creator_containing(
        &self,
        user_id: UserId,
        capsule_id: CapsuleId,
    ) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM folders f
                INNER JOIN folder_capsules fc ON fc.folder_id = f.id
                WHERE f.creator_id = ?1
                  AND fc.capsule_id = ?2
            );",
            params![user_id.to_string(), capsule_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn saved_capsule_ids(&self, user_id: UserId) -> RepoResult<Vec<CapsuleId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT fc.capsule_id
             FROM folders f
             INNER JOIN folder_capsules fc ON fc.folder_id = f.id
             WHERE f.creator_id = ?1
             ORDER BY fc.capsule_id ASC;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "folder_capsules.capsule_id")?);
        }
        Ok(ids)
    }

    fn list_folders_for_user(&self, user_id: UserId) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, privacy, creator_id
             FROM folders
             WHERE creator_id = ?1
                OR id IN (SELECT folder_id FROM folder_participants WHERE user_id = ?1)
             ORDER BY id ASC;",
        )?;
        let raw_rows = stmt
            .query_map([user_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<RawFolder>, _>>()?;
        raw_rows.into_iter().map(|raw| self.hydrate(raw)).collect()
    }
}
