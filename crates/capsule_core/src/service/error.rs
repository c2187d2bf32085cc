//! Service-level error taxonomy.
//!
//! # Invariants
//! - `Validation` and `NotFound` are client-class; `Store` is server-class.
//! - `NoRecommendation` only means the corpus holds no capsules at all.

use crate::model::ids::{ContentId, EntityKind};
use crate::repo::RepoError;
use thiserror::Error;
use uuid::Uuid;

pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: ContentId },

    #[error("no recommendation available: corpus holds no capsules")]
    NoRecommendation,

    #[error("store error: {0}")]
    Store(#[from] RepoError),
}

impl ContentError {
    pub fn not_found(kind: EntityKind, id: ContentId) -> Self {
        Self::NotFound { kind, id }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NoRecommendation => "NO_RECOMMENDATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}

/// Parses a caller-supplied identifier.
pub fn parse_id(field: &str, value: &str) -> ContentResult<Uuid> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContentError::Validation(format!("{field} is required")));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| ContentError::Validation(format!("{field} is not a valid id: `{trimmed}`")))
}

/// Parses a comma-separated identifier list; blank entries are skipped.
pub fn parse_id_list(field: &str, value: &str) -> ContentResult<Vec<Uuid>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_id(field, item))
        .collect()
}
