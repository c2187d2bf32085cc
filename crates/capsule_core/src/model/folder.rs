//! Folder domain model.
//!
//! # Invariants
//! - Personal folders are controlled by their creator alone.
//! - Public folders list their creator as a participant from creation on.
//! - Only the creator's folders count towards save-state.

use crate::model::ids::{new_content_id, CapsuleId, FolderId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderPrivacy {
    Personal,
    Public,
}

impl FolderPrivacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Public => "public",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personal" => Some(Self::Personal),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub description: Option<String>,
    pub privacy: FolderPrivacy,
    pub creator_id: UserId,
    pub participant_ids: Vec<UserId>,
    pub capsule_ids: Vec<CapsuleId>,
}

impl Folder {
    pub fn new(creator_id: UserId, name: impl Into<String>, privacy: FolderPrivacy) -> Self {
        Self::with_id(new_content_id(), creator_id, name, privacy)
    }

    pub fn with_id(
        id: FolderId,
        creator_id: UserId,
        name: impl Into<String>,
        privacy: FolderPrivacy,
    ) -> Self {
        let participant_ids = match privacy {
            FolderPrivacy::Public => vec![creator_id],
            FolderPrivacy::Personal => Vec::new(),
        };
        Self {
            id,
            name: name.into(),
            description: None,
            privacy,
            creator_id,
            participant_ids,
            capsule_ids: Vec::new(),
        }
    }

    pub fn contains(&self, capsule_id: CapsuleId) -> bool {
        self.capsule_ids.contains(&capsule_id)
    }

    /// Creator or participant.
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.creator_id == user_id || self.participant_ids.contains(&user_id)
    }

    /// Save-state predicate: creator-scoped, participants excluded.
    pub fn is_saved_by(&self, user_id: UserId, capsule_id: CapsuleId) -> bool {
        self.creator_id == user_id && self.contains(capsule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Folder, FolderPrivacy};
    use uuid::Uuid;

    #[test]
    fn public_folder_lists_creator_as_participant() {
        let creator = Uuid::from_u128(1);
        assert_eq!(
            Folder::new(creator, "Shared", FolderPrivacy::Public).participant_ids,
            vec![creator]
        );
        assert!(Folder::new(creator, "Mine", FolderPrivacy::Personal)
            .participant_ids
            .is_empty());
    }

    #[test]
    fn participant_membership_does_not_count_as_saved() {
        let creator = Uuid::from_u128(1);
        let participant = Uuid::from_u128(2);
        let capsule = Uuid::from_u128(50);
        let mut folder = Folder::new(creator, "Shared", FolderPrivacy::Public);
        folder.participant_ids.push(participant);
        folder.capsule_ids.push(capsule);

        assert!(folder.is_member(participant));
        assert!(!folder.is_saved_by(participant, capsule));
        assert!(folder.is_saved_by(creator, capsule));
    }
}
