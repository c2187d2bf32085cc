//! Identifier types.
//!
//! Every entity id is a UUIDv7, whose byte order (and canonical text order)
//! follows creation time. Navigation relies on that total order as the
//! authoring sequence within a parent.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Creation-ordered identifier shared by all hierarchy entities.
pub type ContentId = Uuid;

pub type IntentId = ContentId;
pub type ThemeId = ContentId;
pub type SubjectId = ContentId;
pub type SetId = ContentId;
pub type CapsuleId = ContentId;
pub type FolderId = ContentId;

/// Identifier of an end user. Owned by the external account system.
pub type UserId = Uuid;

/// Generates a new id that sorts after every id generated before it.
pub fn new_content_id() -> ContentId {
    Uuid::now_v7()
}

/// Entity kinds addressable by id, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Intent,
    Theme,
    Subject,
    Set,
    Capsule,
    Folder,
    UserPreference,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Theme => "theme",
            Self::Subject => "subject",
            Self::Set => "set",
            Self::Capsule => "capsule",
            Self::Folder => "folder",
            Self::UserPreference => "user preference",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
