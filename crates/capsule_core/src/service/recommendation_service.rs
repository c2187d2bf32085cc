//! Preference-based capsule sampling.
//!
//! # Responsibility
//! - Draw a bounded random pool of capsules matching intents OR themes.
//! - Page through that pool and attach per-user save-state.
//!
//! # Invariants
//! - One response never repeats a capsule id.
//! - `total_items` is the exact match count, independent of pool size.
//! - Page order is random per request; the same capsule may appear on two
//!   pages across separate calls.
//! - The random draw runs in the store and returns at most
//!   `sample_pool_size` ids; the caller's page size is never clamped.

use crate::config::EngineConfig;
use crate::model::capsule::Capsule;
use crate::model::ids::{CapsuleId, IntentId, ThemeId, UserId};
use crate::model::preference::UserPreference;
use crate::repo::folder_repo::FolderStore;
use crate::repo::hierarchy_repo::{CapsuleFilter, HierarchyStore};
use crate::service::error::{ContentError, ContentResult};
use crate::service::save_state_service::SaveStateService;
use log::{error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// Sampler input. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    pub user_id: Option<UserId>,
    pub intent_ids: Vec<IntentId>,
    pub theme_ids: Vec<ThemeId>,
    pub page: u32,
    /// `None` uses the configured default page size.
    pub page_size: Option<u32>,
}

impl SampleRequest {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            intent_ids: Vec::new(),
            theme_ids: Vec::new(),
            page: 1,
            page_size: None,
        }
    }

    pub fn intents(mut self, intent_ids: Vec<IntentId>) -> Self {
        self.intent_ids = intent_ids;
        self
    }

    pub fn themes(mut self, theme_ids: Vec<ThemeId>) -> Self {
        self.theme_ids = theme_ids;
        self
    }

    pub fn page(mut self, page: u32, page_size: Option<u32>) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCapsule {
    #[serde(flatten)]
    pub capsule: Capsule,
    pub is_saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplePage {
    pub items: Vec<RecommendedCapsule>,
    pub pagination: Pagination,
}

pub struct RecommendationService<H: HierarchyStore, F: FolderStore> {
    store: H,
    save_state: SaveStateService<F>,
    config: EngineConfig,
}

impl<H: HierarchyStore, F: FolderStore> RecommendationService<H, F> {
    pub fn new(store: H, folders: F, config: EngineConfig) -> Self {
        Self {
            store,
            save_state: SaveStateService::new(folders),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn save_state(&self) -> &SaveStateService<F> {
        &self.save_state
    }

    /// Samples one page of capsules matching the request's intents or themes.
    ///
    /// # Errors
    /// - `Validation` when `user_id` is absent, `page` is 0 or `page_size`
    ///   is 0.
    /// - `Store` on any store fault; no partial page is returned.
    pub fn sample(&self, request: &SampleRequest) -> ContentResult<SamplePage> {
        let started_at = Instant::now();
        let result = self.sample_inner(request);
        match &result {
            Ok(page) => info!(
                "event=sample module=recommendation status=ok page={} items={} total_items={} duration_ms={}",
                page.pagination.current_page,
                page.items.len(),
                page.pagination.total_items,
                started_at.elapsed().as_millis()
            ),
            Err(ContentError::Store(err)) => error!(
                "event=sample module=recommendation status=error error_code=store_error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
            Err(err) => info!(
                "event=sample module=recommendation status=rejected error_code={}",
                err.code()
            ),
        }
        result
    }

    /// Samples using a stored preference as the intent/theme filter.
    pub fn sample_for_preference(
        &self,
        preference: &UserPreference,
        page: u32,
        page_size: Option<u32>,
    ) -> ContentResult<SamplePage> {
        let request = SampleRequest::for_user(preference.user_id)
            .intents(preference.intent_ids.clone())
            .themes(preference.theme_ids.clone())
            .page(page, page_size);
        self.sample(&request)
    }

    fn sample_inner(&self, request: &SampleRequest) -> ContentResult<SamplePage> {
        let user_id = request
            .user_id
            .ok_or_else(|| ContentError::Validation("userId is required".to_string()))?;
        if request.page < 1 {
            return Err(ContentError::Validation(
                "page must be at least 1".to_string(),
            ));
        }
        if request.page_size == Some(0) {
            return Err(ContentError::Validation(
                "pageSize must be at least 1".to_string(),
            ));
        }
        let page_size = self.config.page_size_or_default(request.page_size);

        let filter = CapsuleFilter::new(request.intent_ids.clone(), request.theme_ids.clone());
        if filter.is_empty() {
            return Ok(SamplePage {
                items: Vec::new(),
                pagination: pagination(request.page, page_size, 0),
            });
        }

        let total_items = self.store.count_matching_capsules(&filter)?;
        let pool_size = u64::try_from(self.config.sample_pool_size).unwrap_or(u64::MAX);
        let drawn = self.store.sample_matching_capsule_ids(&filter, pool_size)?;
        let pool = dedup_in_draw_order(drawn);

        let offset = (request.page as usize - 1).saturating_mul(page_size as usize);
        let page_ids: Vec<CapsuleId> = pool
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        let capsules = self.store.get_capsules(&page_ids)?;
        let items = self
            .save_state
            .annotate(user_id, capsules)?
            .into_iter()
            .map(|(capsule, is_saved)| RecommendedCapsule { capsule, is_saved })
            .collect();

        Ok(SamplePage {
            items,
            pagination: pagination(request.page, page_size, total_items),
        })
    }
}

fn dedup_in_draw_order(drawn: Vec<CapsuleId>) -> Vec<CapsuleId> {
    let mut seen = HashSet::with_capacity(drawn.len());
    drawn.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn pagination(page: u32, page_size: u32, total_items: u64) -> Pagination {
    Pagination {
        current_page: page,
        total_pages: total_items.div_ceil(u64::from(page_size)),
        total_items,
    }
}

#[cfg(test)]
mod tests {
    use super::{dedup_in_draw_order, pagination};
    use uuid::Uuid;

    #[test]
    fn dedup_keeps_first_occurrence_in_draw_order() {
        let drawn: Vec<Uuid> = [3u128, 1, 3, 2, 1].into_iter().map(Uuid::from_u128).collect();
        let pool = dedup_in_draw_order(drawn);
        assert_eq!(
            pool,
            [3u128, 1, 2].into_iter().map(Uuid::from_u128).collect::<Vec<_>>()
        );
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let page = pagination(1, 2, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 5);
        assert_eq!(pagination(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn total_pages_use_the_requested_page_size() {
        assert_eq!(pagination(1, 200, 237).total_pages, 2);
    }
}
