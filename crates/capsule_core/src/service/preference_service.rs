//! User preference use-cases.
//!
//! # Invariants
//! - Stored id lists never hold duplicates and keep first-seen order.
//! - Saving merges into an existing preference; it never drops ids.

use crate::model::ids::{EntityKind, IntentId, ThemeId, UserId};
use crate::model::preference::{dedup_preserving_order, UserPreference};
use crate::repo::folder_repo::FolderStore;
use crate::repo::hierarchy_repo::HierarchyStore;
use crate::repo::preference_repo::PreferenceStore;
use crate::service::error::{ContentError, ContentResult};
use crate::service::recommendation_service::{RecommendationService, SamplePage};
use log::info;

/// Result of [`PreferenceService::save_preferences`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPreference {
    pub preference: UserPreference,
    pub created: bool,
}

pub struct PreferenceService<P: PreferenceStore> {
    store: P,
}

impl<P: PreferenceStore> PreferenceService<P> {
    pub fn new(store: P) -> Self {
        Self { store }
    }

    /// Creates or merges the user's preference.
    pub fn save_preferences(
        &self,
        user_id: UserId,
        intent_ids: Vec<IntentId>,
        theme_ids: Vec<ThemeId>,
    ) -> ContentResult<SavedPreference> {
        let preference = match self.store.get_preference(user_id)? {
            Some(mut existing) => {
                existing.merge(intent_ids, theme_ids);
                existing
            }
            None => UserPreference::new(user_id, intent_ids, theme_ids),
        };
        let created = self.store.upsert_preference(&preference)?;
        info!(
            "event=preference_save module=preference status=ok created={} intents={} themes={}",
            created,
            preference.intent_ids.len(),
            preference.theme_ids.len()
        );
        Ok(SavedPreference {
            preference,
            created,
        })
    }

    pub fn get_preferences(&self, user_id: UserId) -> ContentResult<UserPreference> {
        self.store
            .get_preference(user_id)?
            .ok_or_else(|| ContentError::not_found(EntityKind::UserPreference, user_id))
    }

    /// Replaces the provided lists and keeps omitted ones.
    pub fn replace_preferences(
        &self,
        user_id: UserId,
        intent_ids: Option<Vec<IntentId>>,
        theme_ids: Option<Vec<ThemeId>>,
    ) -> ContentResult<UserPreference> {
        let mut preference = self.get_preferences(user_id)?;
        if let Some(intent_ids) = intent_ids {
            preference.intent_ids = dedup_preserving_order(intent_ids);
        }
        if let Some(theme_ids) = theme_ids {
            preference.theme_ids = dedup_preserving_order(theme_ids);
        }
        self.store.upsert_preference(&preference)?;
        Ok(preference)
    }

    /// Feeds the stored preference into the sampler.
    pub fn sample_for_user<H, F>(
        &self,
        sampler: &RecommendationService<H, F>,
        user_id: UserId,
        page: u32,
        page_size: Option<u32>,
    ) -> ContentResult<SamplePage>
    where
        H: HierarchyStore,
        F: FolderStore,
    {
        let preference = self.get_preferences(user_id)?;
        sampler.sample_for_preference(&preference, page, page_size)
    }
}
