//! In-memory folder store for tests and seeded fixtures.

use crate::model::folder::Folder;
use crate::model::ids::{CapsuleId, UserId};
use crate::model::preference::dedup_preserving_order;
use crate::repo::folder_repo::FolderStore;
use crate::repo::RepoResult;

#[derive(Debug, Clone, Default)]
pub struct InMemoryFolderStore {
    folders: Vec<Folder>,
}

impl InMemoryFolderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, folder: Folder) {
        self.folders.push(folder);
    }
}

impl FromIterator<Folder> for InMemoryFolderStore {
    fn from_iter<I: IntoIterator<Item = Folder>>(iter: I) -> Self {
        Self {
            folders: iter.into_iter().collect(),
        }
    }
}

impl FolderStore for InMemoryFolderStore {
    fn find_by_creator_containing(
        &self,
        user_id: UserId,
        capsule_id: CapsuleId,
    ) -> RepoResult<bool> {
        Ok(self
            .folders
            .iter()
            .any(|folder| folder.is_saved_by(user_id, capsule_id)))
    }

    fn saved_capsule_ids(&self, user_id: UserId) -> RepoResult<Vec<CapsuleId>> {
        let mut ids = dedup_preserving_order(
            self.folders
                .iter()
                .filter(|folder| folder.creator_id == user_id)
                .flat_map(|folder| folder.capsule_ids.iter().copied()),
        );
        ids.sort_unstable();
        Ok(ids)
    }

    fn list_folders_for_user(&self, user_id: UserId) -> RepoResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .filter(|folder| folder.is_member(user_id))
            .cloned()
            .collect();
        folders.sort_by_key(|folder| folder.id);
        Ok(folders)
    }
}
