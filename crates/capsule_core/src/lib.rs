//! Core navigation and recommendation engine for capsule content.
//! Owns hierarchy traversal, preference sampling and save-state rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::capsule::{
    Capsule, CapsuleMetadata, CapsuleValidationError, PollOption, PromptKind, QuestionOrPoll,
    Slide, SlideKind,
};
pub use model::folder::{Folder, FolderPrivacy};
pub use model::hierarchy::{CapsuleSet, Intent, Subject, Theme, TimelineEntry};
pub use model::ids::{
    new_content_id, CapsuleId, ContentId, EntityKind, FolderId, IntentId, SetId, SubjectId,
    ThemeId, UserId,
};
pub use model::ordinal::{compare_siblings, sort_siblings, Ordinal};
pub use model::preference::UserPreference;
pub use repo::folder_repo::{FolderStore, SqliteFolderRepository};
pub use repo::hierarchy_repo::{
    CapsuleFilter, HierarchyStore, RankLevel, SaveRanking, SqliteHierarchyRepository,
};
pub use repo::memory::InMemoryFolderStore;
pub use repo::preference_repo::{PreferenceStore, SqlitePreferenceRepository};
pub use repo::{RepoError, RepoResult};
pub use service::error::{parse_id, parse_id_list, ContentError, ContentResult};
pub use service::navigation_service::{CascadeStep, NavigationService, NextCapsule};
pub use service::preference_service::{PreferenceService, SavedPreference};
pub use service::recommendation_service::{
    Pagination, RecommendationService, RecommendedCapsule, SamplePage, SampleRequest,
};
pub use service::save_state_service::SaveStateService;
pub use service::trending_service::{
    RankingPage, RankingPagination, SuggestedCapsule, TrendingService,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
