//! Save-count rankings and suggestions.
//!
//! # Invariants
//! - Rankings order by summed `save_count` descending, ties by smallest id.
//! - Suggestions never include capsules held in the user's own folders.

use crate::config::EngineConfig;
use crate::model::ids::{CapsuleId, UserId};
use crate::repo::folder_repo::FolderStore;
use crate::repo::hierarchy_repo::{HierarchyStore, RankLevel, SaveRanking};
use crate::service::error::{ContentError, ContentResult};
use crate::service::save_state_service::SaveStateService;
use log::info;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingPagination {
    pub total_elements: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingPage {
    pub level: RankLevel,
    pub items: Vec<SaveRanking>,
    pub pagination: RankingPagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCapsule {
    pub id: CapsuleId,
    pub title: String,
    pub save_count: u64,
}

pub struct TrendingService<H: HierarchyStore, F: FolderStore> {
    store: H,
    save_state: SaveStateService<F>,
    config: EngineConfig,
}

impl<H: HierarchyStore, F: FolderStore> TrendingService<H, F> {
    pub fn new(store: H, folders: F, config: EngineConfig) -> Self {
        Self {
            store,
            save_state: SaveStateService::new(folders),
            config,
        }
    }

    pub fn top_sets(&self, page: u32, page_size: Option<u32>) -> ContentResult<RankingPage> {
        self.top(RankLevel::Set, page, page_size)
    }

    pub fn top_subjects(&self, page: u32, page_size: Option<u32>) -> ContentResult<RankingPage> {
        self.top(RankLevel::Subject, page, page_size)
    }

    pub fn top_themes(&self, page: u32, page_size: Option<u32>) -> ContentResult<RankingPage> {
        self.top(RankLevel::Theme, page, page_size)
    }

    pub fn top(
        &self,
        level: RankLevel,
        page: u32,
        page_size: Option<u32>,
    ) -> ContentResult<RankingPage> {
        if page < 1 {
            return Err(ContentError::Validation(
                "page must be at least 1".to_string(),
            ));
        }
        if page_size == Some(0) {
            return Err(ContentError::Validation(
                "pageSize must be at least 1".to_string(),
            ));
        }
        let limit = self.config.effective_page_size(page_size);
        let offset = u64::from(page - 1) * u64::from(limit);

        let items = self
            .store
            .rank_by_save_count(level, offset, u64::from(limit))?;
        let total_elements = self.store.count_ranked_groups(level)?;

        Ok(RankingPage {
            level,
            items,
            pagination: RankingPagination {
                total_elements,
                total_pages: total_elements.div_ceil(u64::from(limit)),
                current_page: page,
                limit,
            },
        })
    }

    /// Most-saved capsules the user has not saved, up to `trending_limit`.
    pub fn suggested_capsules(&self, user_id: UserId) -> ContentResult<Vec<SuggestedCapsule>> {
        let saved = self.save_state.saved_capsule_ids(user_id)?;
        let capsules = self
            .store
            .list_most_saved_capsules(&saved, u64::from(self.config.trending_limit))?;
        info!(
            "event=suggested_capsules module=trending status=ok excluded={} items={}",
            saved.len(),
            capsules.len()
        );
        Ok(capsules
            .into_iter()
            .map(|capsule| SuggestedCapsule {
                id: capsule.id,
                title: capsule.title,
                save_count: capsule.metadata.save_count,
            })
            .collect())
    }
}
