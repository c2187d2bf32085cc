//! Intent, Theme, Subject and Set entities.
//!
//! # Invariants
//! - Each non-root entity has exactly one parent id.
//! - `Subject::default_timeline` is read through `ordered_timeline()`, never
//!   in storage order.

use crate::model::ids::{new_content_id, IntentId, SetId, SubjectId, ThemeId};
use crate::model::ordinal::{sort_siblings, Ordinal};
use serde::{Deserialize, Serialize};

/// Root of the hierarchy: why a user is here (skills, news, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub name: String,
    pub description: Option<String>,
}

impl Intent {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(new_content_id(), name)
    }

    pub fn with_id(id: IntentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    pub description: Option<String>,
    pub intent_id: IntentId,
}

impl Theme {
    pub fn new(intent_id: IntentId, name: impl Into<String>) -> Self {
        Self::with_id(new_content_id(), intent_id, name)
    }

    pub fn with_id(id: ThemeId, intent_id: IntentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            intent_id,
        }
    }
}

/// One step of a subject's authored learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub set_id: SetId,
    pub recommended_order: Option<i64>,
}

impl Ordinal for TimelineEntry {
    fn ordinal_id(&self) -> SetId {
        self.set_id
    }

    fn recommended_order(&self) -> Option<i64> {
        self.recommended_order
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub description: Option<String>,
    pub theme_id: ThemeId,
    pub default_timeline: Vec<TimelineEntry>,
}

impl Subject {
    pub fn new(theme_id: ThemeId, name: impl Into<String>) -> Self {
        Self::with_id(new_content_id(), theme_id, name)
    }

    pub fn with_id(id: SubjectId, theme_id: ThemeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            theme_id,
            default_timeline: Vec::new(),
        }
    }

    /// Returns the default timeline in sibling order.
    pub fn ordered_timeline(&self) -> Vec<TimelineEntry> {
        let mut entries = self.default_timeline.clone();
        sort_siblings(&mut entries);
        entries
    }
}

/// A Set groups capsules under one subject.
///
/// Named `CapsuleSet` to keep it apart from collection types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleSet {
    pub id: SetId,
    pub name: String,
    pub description: Option<String>,
    pub subject_id: SubjectId,
    pub recommended_order: Option<i64>,
}

impl CapsuleSet {
    pub fn new(subject_id: SubjectId, name: impl Into<String>) -> Self {
        Self::with_id(new_content_id(), subject_id, name)
    }

    pub fn with_id(id: SetId, subject_id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            subject_id,
            recommended_order: None,
        }
    }
}

impl Ordinal for CapsuleSet {
    fn ordinal_id(&self) -> SetId {
        self.id
    }

    fn recommended_order(&self) -> Option<i64> {
        self.recommended_order
    }
}
