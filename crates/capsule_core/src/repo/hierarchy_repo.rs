//! Hierarchy Store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide id-based fetch for every hierarchy level.
//! - Provide ordered "first child" / "next sibling after id" lookups used by
//!   the navigation cascade.
//! - Evaluate the preference predicate and save-count aggregates in SQL.
//!
//! # Invariants
//! - Cascade lookups order by id only (creation order).
//! - Parent listings order by the sibling comparator.
//! - Capsule writes call `Capsule::validate()` before SQL mutations.

use crate::model::capsule::{Capsule, CapsuleMetadata};
use crate::model::hierarchy::{CapsuleSet, Intent, Subject, Theme, TimelineEntry};
use crate::model::ids::{CapsuleId, ContentId, IntentId, SetId, SubjectId, ThemeId};
use crate::model::ordinal::sort_siblings;
use crate::repo::{
    count_to_u64, ensure_connection_ready, parse_uuid, u64_to_sql, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::collections::HashSet;

const CAPSULE_SELECT_SQL: &str = "SELECT
    id,
    title,
    theme_id,
    subject_id,
    set_id,
    slides_json,
    tags_json,
    question_json,
    author,
    estimated_read_minutes,
    save_count,
    view_count
FROM capsules";

const REQUIRED_TABLES: &[&str] = &[
    "intents",
    "themes",
    "subjects",
    "sets",
    "subject_timeline_entries",
    "capsules",
    "capsule_intents",
];

/// Preference predicate: intent tag overlap OR theme membership.
///
/// An empty filter matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapsuleFilter {
    pub intent_ids: Vec<IntentId>,
    pub theme_ids: Vec<ThemeId>,
}

impl CapsuleFilter {
    pub fn new(intent_ids: Vec<IntentId>, theme_ids: Vec<ThemeId>) -> Self {
        Self {
            intent_ids,
            theme_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.intent_ids.is_empty() && self.theme_ids.is_empty()
    }

    pub fn matches(&self, capsule: &Capsule) -> bool {
        self.theme_ids.contains(&capsule.theme_id)
            || capsule
                .intent_tags
                .iter()
                .any(|intent_id| self.intent_ids.contains(intent_id))
    }
}

/// Hierarchy level used for save-count rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankLevel {
    Theme,
    Subject,
    Set,
}

impl RankLevel {
    fn table(self) -> &'static str {
        match self {
            Self::Theme => "themes",
            Self::Subject => "subjects",
            Self::Set => "sets",
        }
    }

    fn capsule_column(self) -> &'static str {
        match self {
            Self::Theme => "theme_id",
            Self::Subject => "subject_id",
            Self::Set => "set_id",
        }
    }
}

/// One group of capsules with its summed save count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRanking {
    pub id: ContentId,
    pub name: String,
    pub description: Option<String>,
    pub total_save_count: u64,
}

/// Read contract of the Hierarchy Store.
///
/// `next_*` lookups take an optional lower bound: `None` returns the first
/// child of the parent, `Some(id)` the child with the smallest id strictly
/// greater than `id`.
pub trait HierarchyStore {
    fn get_intent(&self, id: IntentId) -> RepoResult<Option<Intent>>;
    fn get_theme(&self, id: ThemeId) -> RepoResult<Option<Theme>>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn get_set(&self, id: SetId) -> RepoResult<Option<CapsuleSet>>;
    fn get_capsule(&self, id: CapsuleId) -> RepoResult<Option<Capsule>>;
    /// Loads capsules in the order of `ids`; unknown ids are skipped.
    fn get_capsules(&self, ids: &[CapsuleId]) -> RepoResult<Vec<Capsule>>;

    fn next_capsule_in_set(
        &self,
        set_id: SetId,
        after: Option<CapsuleId>,
    ) -> RepoResult<Option<Capsule>>;
    fn next_set_in_subject(
        &self,
        subject_id: SubjectId,
        after: Option<SetId>,
    ) -> RepoResult<Option<CapsuleSet>>;
    fn next_subject_in_theme(
        &self,
        theme_id: ThemeId,
        after: Option<SubjectId>,
    ) -> RepoResult<Option<Subject>>;
    fn next_theme_in_intent(
        &self,
        intent_id: IntentId,
        after: Option<ThemeId>,
    ) -> RepoResult<Option<Theme>>;
    /// Highest `save_count` in the corpus, ties broken by smallest id.
    fn most_saved_capsule(&self) -> RepoResult<Option<Capsule>>;

    fn list_themes_by_intent(&self, intent_id: IntentId) -> RepoResult<Vec<Theme>>;
    fn list_subjects_by_theme(&self, theme_id: ThemeId) -> RepoResult<Vec<Subject>>;
    /// Sets in sibling order (`recommended_order`, then id).
    fn list_sets_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<CapsuleSet>>;
    fn list_capsules_by_set(&self, set_id: SetId) -> RepoResult<Vec<Capsule>>;

    fn count_matching_capsules(&self, filter: &CapsuleFilter) -> RepoResult<u64>;
    /// Up to `limit` matching capsule ids drawn at random.
    fn sample_matching_capsule_ids(
        &self,
        filter: &CapsuleFilter,
        limit: u64,
    ) -> RepoResult<Vec<CapsuleId>>;

    fn rank_by_save_count(
        &self,
        level: RankLevel,
        offset: u64,
        limit: u64,
    ) -> RepoResult<Vec<SaveRanking>>;
    /// Number of groups at `level` holding at least one capsule.
    fn count_ranked_groups(&self, level: RankLevel) -> RepoResult<u64>;
    /// Capsules by `save_count DESC, id ASC`, skipping `excluded`.
    fn list_most_saved_capsules(
        &self,
        excluded: &HashSet<CapsuleId>,
        limit: u64,
    ) -> RepoResult<Vec<Capsule>>;
}

/// SQLite-backed Hierarchy Store.
pub struct SqliteHierarchyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHierarchyRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    pub fn insert_intent(&self, intent: &Intent) -> RepoResult<IntentId> {
        self.conn.execute(
            "INSERT INTO intents (id, name, description) VALUES (?1, ?2, ?3);",
            params![
                intent.id.to_string(),
                intent.name.as_str(),
                intent.description.as_deref()
            ],
        )?;
        Ok(intent.id)
    }

    pub fn insert_theme(&self, theme: &Theme) -> RepoResult<ThemeId> {
        self.conn.execute(
            "INSERT INTO themes (id, name, description, intent_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                theme.id.to_string(),
                theme.name.as_str(),
                theme.description.as_deref(),
                theme.intent_id.to_string(),
            ],
        )?;
        Ok(theme.id)
    }

    pub fn insert_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO subjects (id, name, description, theme_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                subject.id.to_string(),
                subject.name.as_str(),
                subject.description.as_deref(),
                subject.theme_id.to_string(),
            ],
        )?;
        for (position, entry) in subject.default_timeline.iter().enumerate() {
            tx.execute(
                "INSERT INTO subject_timeline_entries (
                    subject_id,
                    position,
                    set_id,
                    recommended_order
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    subject.id.to_string(),
                    position as i64,
                    entry.set_id.to_string(),
                    entry.recommended_order,
                ],
            )?;
        }
        tx.commit()?;
        Ok(subject.id)
    }

    pub fn insert_set(&self, set: &CapsuleSet) -> RepoResult<SetId> {
        self.conn.execute(
            "INSERT INTO sets (id, name, description, subject_id, recommended_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                set.id.to_string(),
                set.name.as_str(),
                set.description.as_deref(),
                set.subject_id.to_string(),
                set.recommended_order,
            ],
        )?;
        Ok(set.id)
    }

    pub fn insert_capsule(&self, capsule: &Capsule) -> RepoResult<CapsuleId> {
        capsule.validate()?;
        let slides_json = serde_json::to_string(&capsule.slides)?;
        let tags_json = serde_json::to_string(&capsule.tags)?;
        let question_json = serde_json::to_string(&capsule.question_or_poll)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO capsules (
                id,
                title,
                theme_id,
                subject_id,
                set_id,
                slides_json,
                tags_json,
                question_json,
                author,
                estimated_read_minutes,
                save_count,
                view_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                capsule.id.to_string(),
                capsule.title.as_str(),
                capsule.theme_id.to_string(),
                capsule.subject_id.to_string(),
                capsule.set_id.to_string(),
                slides_json,
                tags_json,
                question_json,
                capsule.metadata.author.as_str(),
                capsule.metadata.estimated_read_minutes,
                u64_to_sql(capsule.metadata.save_count),
                u64_to_sql(capsule.metadata.view_count),
            ],
        )?;
        for (position, intent_id) in capsule.intent_tags.iter().enumerate() {
            tx.execute(
                "INSERT INTO capsule_intents (capsule_id, intent_id, position)
                 VALUES (?1, ?2, ?3);",
                params![capsule.id.to_string(), intent_id.to_string(), position as i64],
            )?;
        }
        tx.commit()?;
        Ok(capsule.id)
    }

    /// Overwrites the save counter of one capsule.
    pub fn set_save_count(&self, capsule_id: CapsuleId, save_count: u64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE capsules
             SET save_count = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![capsule_id.to_string(), u64_to_sql(save_count)],
        )?;
        Ok(changed == 1)
    }

    fn query_optional<T, P>(
        &self,
        sql: &str,
        params: P,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Option<T>>
    where
        P: Params,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let item = match rows.next()? {
            Some(row) => Some(parse(row)?),
            None => None,
        };
        Ok(item)
    }

    fn query_list<T, P>(
        &self,
        sql: &str,
        params: P,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>>
    where
        P: Params,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }

    fn query_capsule<P: Params>(&self, sql: &str, params: P) -> RepoResult<Option<Capsule>> {
        self.query_optional(sql, params, parse_capsule_row)?
            .map(|capsule| self.with_intent_tags(capsule))
            .transpose()
    }

    fn query_capsules<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Capsule>> {
        self.query_list(sql, params, parse_capsule_row)?
            .into_iter()
            .map(|capsule| self.with_intent_tags(capsule))
            .collect()
    }

    fn query_subject<P: Params>(&self, sql: &str, params: P) -> RepoResult<Option<Subject>> {
        self.query_optional(sql, params, parse_subject_row)?
            .map(|subject| self.with_timeline(subject))
            .transpose()
    }

    fn with_intent_tags(&self, mut capsule: Capsule) -> RepoResult<Capsule> {
        let mut stmt = self.conn.prepare(
            "SELECT intent_id
             FROM capsule_intents
             WHERE capsule_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([capsule.id.to_string()])?;
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            capsule
                .intent_tags
                .push(parse_uuid(&value, "capsule_intents.intent_id")?);
        }
        Ok(capsule)
    }

    fn with_timeline(&self, mut subject: Subject) -> RepoResult<Subject> {
        let mut stmt = self.conn.prepare(
            "SELECT set_id, recommended_order
             FROM subject_timeline_entries
             WHERE subject_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([subject.id.to_string()])?;
        while let Some(row) = rows.next()? {
            let set_id: String = row.get("set_id")?;
            subject.default_timeline.push(TimelineEntry {
                set_id: parse_uuid(&set_id, "subject_timeline_entries.set_id")?,
                recommended_order: row.get("recommended_order")?,
            });
        }
        Ok(subject)
    }
}

impl HierarchyStore for SqliteHierarchyRepository<'_> {
    fn get_intent(&self, id: IntentId) -> RepoResult<Option<Intent>> {
        self.query_optional(
            "SELECT id, name, description FROM intents WHERE id = ?1;",
            [id.to_string()],
            parse_intent_row,
        )
    }

    fn get_theme(&self, id: ThemeId) -> RepoResult<Option<Theme>> {
        self.query_optional(
            "SELECT id, name, description, intent_id FROM themes WHERE id = ?1;",
            [id.to_string()],
            parse_theme_row,
        )
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        self.query_subject(
            "SELECT id, name, description, theme_id FROM subjects WHERE id = ?1;",
            [id.to_string()],
        )
    }

    fn get_set(&self, id: SetId) -> RepoResult<Option<CapsuleSet>> {
        self.query_optional(
            "SELECT id, name, description, subject_id, recommended_order
             FROM sets
             WHERE id = ?1;",
            [id.to_string()],
            parse_set_row,
        )
    }

    fn get_capsule(&self, id: CapsuleId) -> RepoResult<Option<Capsule>> {
        self.query_capsule(
            &format!("{CAPSULE_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
        )
    }

    fn get_capsules(&self, ids: &[CapsuleId]) -> RepoResult<Vec<Capsule>> {
        let mut capsules = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(capsule) = self.get_capsule(*id)? {
                capsules.push(capsule);
            }
        }
        Ok(capsules)
    }

    // An absent lower bound binds the empty string, which sorts before every
    // canonical uuid text.
    fn next_capsule_in_set(
        &self,
        set_id: SetId,
        after: Option<CapsuleId>,
    ) -> RepoResult<Option<Capsule>> {
        self.query_capsule(
            &format!(
                "{CAPSULE_SELECT_SQL}
                 WHERE set_id = ?1
                   AND id > ?2
                 ORDER BY id ASC
                 LIMIT 1;"
            ),
            params![set_id.to_string(), lower_bound(after)],
        )
    }

    fn next_set_in_subject(
        &self,
        subject_id: SubjectId,
        after: Option<SetId>,
    ) -> RepoResult<Option<CapsuleSet>> {
        self.query_optional(
            "SELECT id, name, description, subject_id, recommended_order
             FROM sets
             WHERE subject_id = ?1
               AND id > ?2
             ORDER BY id ASC
             LIMIT 1;",
            params![subject_id.to_string(), lower_bound(after)],
            parse_set_row,
        )
    }

    fn next_subject_in_theme(
        &self,
        theme_id: ThemeId,
        after: Option<SubjectId>,
    ) -> RepoResult<Option<Subject>> {
        self.query_subject(
            "SELECT id, name, description, theme_id
             FROM subjects
             WHERE theme_id = ?1
               AND id > ?2
             ORDER BY id ASC
             LIMIT 1;",
            params![theme_id.to_string(), lower_bound(after)],
        )
    }

    fn next_theme_in_intent(
        &self,
        intent_id: IntentId,
        after: Option<ThemeId>,
    ) -> RepoResult<Option<Theme>> {
        self.query_optional(
            "SELECT id, name, description, intent_id
             FROM themes
             WHERE intent_id = ?1
               AND id > ?2
             ORDER BY id ASC
             LIMIT 1;",
            params![intent_id.to_string(), lower_bound(after)],
            parse_theme_row,
        )
    }

    fn most_saved_capsule(&self) -> RepoResult<Option<Capsule>> {
        self.query_capsule(
            &format!("{CAPSULE_SELECT_SQL} ORDER BY save_count DESC, id ASC LIMIT 1;"),
            [],
        )
    }

    fn list_themes_by_intent(&self, intent_id: IntentId) -> RepoResult<Vec<Theme>> {
        self.query_list(
            "SELECT id, name, description, intent_id
             FROM themes
             WHERE intent_id = ?1
             ORDER BY id ASC;",
            [intent_id.to_string()],
            parse_theme_row,
        )
    }

    fn list_subjects_by_theme(&self, theme_id: ThemeId) -> RepoResult<Vec<Subject>> {
        self.query_list(
            "SELECT id, name, description, theme_id
             FROM subjects
             WHERE theme_id = ?1
             ORDER BY id ASC;",
            [theme_id.to_string()],
            parse_subject_row,
        )?
        .into_iter()
        .map(|subject| self.with_timeline(subject))
        .collect()
    }

    fn list_sets_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<CapsuleSet>> {
        let mut sets = self.query_list(
            "SELECT id, name, description, subject_id, recommended_order
             FROM sets
             WHERE subject_id = ?1;",
            [subject_id.to_string()],
            parse_set_row,
        )?;
        sort_siblings(&mut sets);
        Ok(sets)
    }

    fn list_capsules_by_set(&self, set_id: SetId) -> RepoResult<Vec<Capsule>> {
        self.query_capsules(
            &format!("{CAPSULE_SELECT_SQL} WHERE set_id = ?1 ORDER BY id ASC;"),
            [set_id.to_string()],
        )
    }

    fn count_matching_capsules(&self, filter: &CapsuleFilter) -> RepoResult<u64> {
        let Some((clause, bind_values)) = matching_clause(filter) else {
            return Ok(0);
        };
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM capsules c WHERE {clause};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        count_to_u64(count, "COUNT(capsules)")
    }

    fn sample_matching_capsule_ids(
        &self,
        filter: &CapsuleFilter,
        limit: u64,
    ) -> RepoResult<Vec<CapsuleId>> {
        let Some((clause, mut bind_values)) = matching_clause(filter) else {
            return Ok(Vec::new());
        };
        bind_values.push(Value::Integer(u64_to_sql(limit)));
        self.query_list(
            &format!("SELECT c.id FROM capsules c WHERE {clause} ORDER BY RANDOM() LIMIT ?;"),
            params_from_iter(bind_values),
            parse_capsule_id_row,
        )
    }

    fn rank_by_save_count(
        &self,
        level: RankLevel,
        offset: u64,
        limit: u64,
    ) -> RepoResult<Vec<SaveRanking>> {
        let sql = format!(
            "SELECT
                g.id AS id,
                g.name AS name,
                g.description AS description,
                SUM(c.save_count) AS total_save_count
             FROM capsules c
             INNER JOIN {table} g ON g.id = c.{column}
             GROUP BY g.id
             ORDER BY total_save_count DESC, g.id ASC
             LIMIT ?1 OFFSET ?2;",
            table = level.table(),
            column = level.capsule_column(),
        );
        self.query_list(
            &sql,
            params![u64_to_sql(limit), u64_to_sql(offset)],
            parse_ranking_row,
        )
    }

    fn count_ranked_groups(&self, level: RankLevel) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(DISTINCT {column}) FROM capsules;",
                column = level.capsule_column()
            ),
            [],
            |row| row.get(0),
        )?;
        count_to_u64(count, "COUNT(DISTINCT capsules group)")
    }

    fn list_most_saved_capsules(
        &self,
        excluded: &HashSet<CapsuleId>,
        limit: u64,
    ) -> RepoResult<Vec<Capsule>> {
        // At most `excluded.len()` rows of the widened window are dropped.
        let window = limit.saturating_add(excluded.len() as u64);
        let capsules = self.query_capsules(
            &format!("{CAPSULE_SELECT_SQL} ORDER BY save_count DESC, id ASC LIMIT ?1;"),
            [u64_to_sql(window)],
        )?;
        Ok(capsules
            .into_iter()
            .filter(|capsule| !excluded.contains(&capsule.id))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }
}

fn lower_bound(after: Option<ContentId>) -> String {
    after.map(|id| id.to_string()).unwrap_or_default()
}

fn matching_clause(filter: &CapsuleFilter) -> Option<(String, Vec<Value>)> {
    if filter.is_empty() {
        return None;
    }

    let mut disjuncts = Vec::new();
    let mut bind_values = Vec::new();

    if !filter.theme_ids.is_empty() {
        disjuncts.push(format!(
            "c.theme_id IN ({})",
            placeholders(filter.theme_ids.len())
        ));
        bind_values.extend(
            filter
                .theme_ids
                .iter()
                .map(|id| Value::Text(id.to_string())),
        );
    }

    if !filter.intent_ids.is_empty() {
        disjuncts.push(format!(
            "EXISTS (
                SELECT 1
                FROM capsule_intents ci
                WHERE ci.capsule_id = c.id
                  AND ci.intent_id IN ({})
            )",
            placeholders(filter.intent_ids.len())
        ));
        bind_values.extend(
            filter
                .intent_ids
                .iter()
                .map(|id| Value::Text(id.to_string())),
        );
    }

    Some((format!("({})", disjuncts.join(" OR ")), bind_values))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn parse_intent_row(row: &Row<'_>) -> RepoResult<Intent> {
    let id: String = row.get("id")?;
    Ok(Intent {
        id: parse_uuid(&id, "intents.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}

fn parse_theme_row(row: &Row<'_>) -> RepoResult<Theme> {
    let id: String = row.get("id")?;
    let intent_id: String = row.get("intent_id")?;
    Ok(Theme {
        id: parse_uuid(&id, "themes.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        intent_id: parse_uuid(&intent_id, "themes.intent_id")?,
    })
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let id: String = row.get("id")?;
    let theme_id: String = row.get("theme_id")?;
    Ok(Subject {
        id: parse_uuid(&id, "subjects.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        theme_id: parse_uuid(&theme_id, "subjects.theme_id")?,
        default_timeline: Vec::new(),
    })
}

fn parse_set_row(row: &Row<'_>) -> RepoResult<CapsuleSet> {
    let id: String = row.get("id")?;
    let subject_id: String = row.get("subject_id")?;
    Ok(CapsuleSet {
        id: parse_uuid(&id, "sets.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        subject_id: parse_uuid(&subject_id, "sets.subject_id")?,
        recommended_order: row.get("recommended_order")?,
    })
}

fn parse_capsule_row(row: &Row<'_>) -> RepoResult<Capsule> {
    let id: String = row.get("id")?;
    let theme_id: String = row.get("theme_id")?;
    let subject_id: String = row.get("subject_id")?;
    let set_id: String = row.get("set_id")?;
    let slides_json: String = row.get("slides_json")?;
    let tags_json: String = row.get("tags_json")?;
    let question_json: String = row.get("question_json")?;

    Ok(Capsule {
        id: parse_uuid(&id, "capsules.id")?,
        title: row.get("title")?,
        slides: parse_json(&slides_json, "capsules.slides_json")?,
        intent_tags: Vec::new(),
        theme_id: parse_uuid(&theme_id, "capsules.theme_id")?,
        subject_id: parse_uuid(&subject_id, "capsules.subject_id")?,
        set_id: parse_uuid(&set_id, "capsules.set_id")?,
        tags: parse_json(&tags_json, "capsules.tags_json")?,
        metadata: CapsuleMetadata {
            author: row.get("author")?,
            estimated_read_minutes: row.get("estimated_read_minutes")?,
            save_count: count_to_u64(row.get("save_count")?, "capsules.save_count")?,
            view_count: count_to_u64(row.get("view_count")?, "capsules.view_count")?,
        },
        question_or_poll: parse_json(&question_json, "capsules.question_json")?,
    })
}

fn parse_capsule_id_row(row: &Row<'_>) -> RepoResult<CapsuleId> {
    let id: String = row.get(0)?;
    parse_uuid(&id, "capsules.id")
}

fn parse_ranking_row(row: &Row<'_>) -> RepoResult<SaveRanking> {
    let id: String = row.get("id")?;
    Ok(SaveRanking {
        id: parse_uuid(&id, "ranking.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        total_save_count: count_to_u64(row.get("total_save_count")?, "ranking.total_save_count")?,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(value: &str, column: &'static str) -> RepoResult<T> {
    serde_json::from_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {column}: {err}")))
}
