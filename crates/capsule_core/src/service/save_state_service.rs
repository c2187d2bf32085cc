//! Save-state resolution.
//!
//! # Invariants
//! - A capsule is saved for a user iff a folder created by that user holds it.
//! - Participant-only membership never marks a capsule saved.

use crate::model::capsule::Capsule;
use crate::model::folder::Folder;
use crate::model::ids::{CapsuleId, UserId};
use crate::repo::folder_repo::FolderStore;
use crate::service::error::ContentResult;
use log::error;
use std::collections::HashSet;

pub struct SaveStateService<F: FolderStore> {
    folders: F,
}

impl<F: FolderStore> SaveStateService<F> {
    pub fn new(folders: F) -> Self {
        Self { folders }
    }

    pub fn is_saved(&self, user_id: UserId, capsule_id: CapsuleId) -> ContentResult<bool> {
        self.folders
            .find_by_creator_containing(user_id, capsule_id)
            .map_err(|err| {
                error!(
                    "event=save_state_lookup module=save_state status=error error_code=store_error error={}",
                    err
                );
                err.into()
            })
    }

    /// Pairs each capsule with its save-state, keeping input order.
    ///
    /// One folder query per call, independent of `capsules.len()`.
    pub fn annotate(
        &self,
        user_id: UserId,
        capsules: Vec<Capsule>,
    ) -> ContentResult<Vec<(Capsule, bool)>> {
        let saved = self.saved_capsule_ids(user_id)?;
        Ok(capsules
            .into_iter()
            .map(|capsule| {
                let is_saved = saved.contains(&capsule.id);
                (capsule, is_saved)
            })
            .collect())
    }

    pub fn saved_capsule_ids(&self, user_id: UserId) -> ContentResult<HashSet<CapsuleId>> {
        Ok(self
            .folders
            .saved_capsule_ids(user_id)?
            .into_iter()
            .collect())
    }

    pub fn folders_for_user(&self, user_id: UserId) -> ContentResult<Vec<Folder>> {
        Ok(self.folders.list_folders_for_user(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::SaveStateService;
    use crate::model::capsule::{Capsule, QuestionOrPoll};
    use crate::model::folder::{Folder, FolderPrivacy};
    use crate::model::hierarchy::{CapsuleSet, Subject};
    use crate::repo::memory::InMemoryFolderStore;
    use uuid::Uuid;

    fn capsule(id: u128) -> Capsule {
        let subject = Subject::with_id(Uuid::from_u128(900), Uuid::from_u128(800), "Subject");
        let set = CapsuleSet::with_id(Uuid::from_u128(1000), subject.id, "Set");
        Capsule::with_id(
            Uuid::from_u128(id),
            &subject,
            &set,
            "Title",
            QuestionOrPoll::question("Why?"),
        )
    }

    #[test]
    fn annotate_marks_only_creator_folder_contents() {
        let owner = Uuid::from_u128(1);
        let participant = Uuid::from_u128(2);
        let saved = capsule(10);
        let unsaved = capsule(11);

        let mut folder = Folder::new(owner, "Reading list", FolderPrivacy::Public);
        folder.participant_ids.push(participant);
        folder.capsule_ids.push(saved.id);
        let mut store = InMemoryFolderStore::new();
        store.insert(folder);
        let service = SaveStateService::new(store);

        let annotated = service
            .annotate(owner, vec![unsaved.clone(), saved.clone()])
            .unwrap();
        assert_eq!(
            annotated
                .iter()
                .map(|(capsule, is_saved)| (capsule.id, *is_saved))
                .collect::<Vec<_>>(),
            vec![(unsaved.id, false), (saved.id, true)]
        );

        assert!(service.is_saved(owner, saved.id).unwrap());
        assert!(!service.is_saved(participant, saved.id).unwrap());
    }
}
