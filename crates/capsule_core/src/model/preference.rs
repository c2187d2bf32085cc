//! Per-user intent/theme preferences.
//!
//! # Invariants
//! - `intent_ids` and `theme_ids` never hold duplicates.
//! - Merging keeps first-seen order: existing ids first, then new ones.

use crate::model::ids::{IntentId, ThemeId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: UserId,
    pub intent_ids: Vec<IntentId>,
    pub theme_ids: Vec<ThemeId>,
}

impl UserPreference {
    pub fn new(
        user_id: UserId,
        intent_ids: impl IntoIterator<Item = IntentId>,
        theme_ids: impl IntoIterator<Item = ThemeId>,
    ) -> Self {
        Self {
            user_id,
            intent_ids: dedup_preserving_order(intent_ids),
            theme_ids: dedup_preserving_order(theme_ids),
        }
    }

    /// Adds ids not already present.
    pub fn merge(
        &mut self,
        intent_ids: impl IntoIterator<Item = IntentId>,
        theme_ids: impl IntoIterator<Item = ThemeId>,
    ) {
        let existing_intents = std::mem::take(&mut self.intent_ids);
        self.intent_ids = dedup_preserving_order(existing_intents.into_iter().chain(intent_ids));
        let existing_themes = std::mem::take(&mut self.theme_ids);
        self.theme_ids = dedup_preserving_order(existing_themes.into_iter().chain(theme_ids));
    }
}

pub(crate) fn dedup_preserving_order<T, I>(values: I) -> Vec<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .collect()
}
