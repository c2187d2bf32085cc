//! Next-item resolution over the content hierarchy.
//!
//! # Responsibility
//! - Resolve "what comes after this capsule" through the sibling cascade.
//! - Fall back to the globally most-saved capsule when the cascade is dry.
//!
//! # Invariants
//! - Steps run in fixed order and stop at the first hit.
//! - Sibling lookups use id order only; `recommended_order` is ignored here.
//! - A childless level fails its whole branch; no further siblings are tried.

use crate::model::capsule::Capsule;
use crate::model::ids::{CapsuleId, EntityKind, SubjectId};
use crate::repo::hierarchy_repo::HierarchyStore;
use crate::repo::RepoResult;
use crate::service::error::{ContentError, ContentResult};
use log::{error, info};
use serde::Serialize;
use std::time::Instant;

/// Cascade step that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    SameSet,
    NextSetInSubject,
    NextSubjectInTheme,
    NextThemeInIntent,
    GlobalTrending,
}

impl CascadeStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SameSet => "same_set",
            Self::NextSetInSubject => "next_set_in_subject",
            Self::NextSubjectInTheme => "next_subject_in_theme",
            Self::NextThemeInIntent => "next_theme_in_intent",
            Self::GlobalTrending => "global_trending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextCapsule {
    pub capsule: Capsule,
    pub step: CascadeStep,
}

pub struct NavigationService<H: HierarchyStore> {
    store: H,
}

impl<H: HierarchyStore> NavigationService<H> {
    pub fn new(store: H) -> Self {
        Self { store }
    }

    /// Returns the capsule that follows `capsule_id`.
    ///
    /// # Errors
    /// - `NotFound` when the capsule (or its theme, once needed) is missing.
    /// - `NoRecommendation` when the corpus is empty past the cascade.
    /// - `Store` on any store fault; nothing partial is returned.
    pub fn resolve_next(&self, capsule_id: CapsuleId) -> ContentResult<Capsule> {
        self.resolve_next_detailed(capsule_id)
            .map(|resolved| resolved.capsule)
    }

    /// Same as [`Self::resolve_next`], also reporting which step matched.
    pub fn resolve_next_detailed(&self, capsule_id: CapsuleId) -> ContentResult<NextCapsule> {
        let started_at = Instant::now();
        let result = self.cascade(capsule_id);
        match &result {
            Ok(resolved) => info!(
                "event=next_resolve module=navigation status=ok step={} duration_ms={}",
                resolved.step.as_str(),
                started_at.elapsed().as_millis()
            ),
            Err(ContentError::Store(err)) => error!(
                "event=next_resolve module=navigation status=error error_code=store_error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
            Err(err) => info!(
                "event=next_resolve module=navigation status=miss error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn cascade(&self, capsule_id: CapsuleId) -> ContentResult<NextCapsule> {
        let current = self
            .store
            .get_capsule(capsule_id)?
            .ok_or_else(|| ContentError::not_found(EntityKind::Capsule, capsule_id))?;

        if let Some(capsule) = self
            .store
            .next_capsule_in_set(current.set_id, Some(current.id))?
        {
            return Ok(found(capsule, CascadeStep::SameSet));
        }

        if let Some(set) = self
            .store
            .next_set_in_subject(current.subject_id, Some(current.set_id))?
        {
            if let Some(capsule) = self.store.next_capsule_in_set(set.id, None)? {
                return Ok(found(capsule, CascadeStep::NextSetInSubject));
            }
        }

        if let Some(subject) = self
            .store
            .next_subject_in_theme(current.theme_id, Some(current.subject_id))?
        {
            if let Some(capsule) = self.first_capsule_of_subject(subject.id)? {
                return Ok(found(capsule, CascadeStep::NextSubjectInTheme));
            }
        }

        let theme = self
            .store
            .get_theme(current.theme_id)?
            .ok_or_else(|| ContentError::not_found(EntityKind::Theme, current.theme_id))?;
        if let Some(next_theme) = self
            .store
            .next_theme_in_intent(theme.intent_id, Some(theme.id))?
        {
            if let Some(subject) = self.store.next_subject_in_theme(next_theme.id, None)? {
                if let Some(capsule) = self.first_capsule_of_subject(subject.id)? {
                    return Ok(found(capsule, CascadeStep::NextThemeInIntent));
                }
            }
        }

        self.store
            .most_saved_capsule()?
            .map(|capsule| found(capsule, CascadeStep::GlobalTrending))
            .ok_or(ContentError::NoRecommendation)
    }

    fn first_capsule_of_subject(&self, subject_id: SubjectId) -> RepoResult<Option<Capsule>> {
        match self.store.next_set_in_subject(subject_id, None)? {
            Some(set) => self.store.next_capsule_in_set(set.id, None),
            None => Ok(None),
        }
    }
}

fn found(capsule: Capsule, step: CascadeStep) -> NextCapsule {
    NextCapsule { capsule, step }
}
