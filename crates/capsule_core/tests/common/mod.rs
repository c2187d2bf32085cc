#![allow(dead_code)]

use capsule_core::{
    Capsule, CapsuleSet, Intent, IntentId, QuestionOrPoll, Slide, SqliteHierarchyRepository,
    Subject, Theme,
};
use rusqlite::Connection;
use uuid::Uuid;

/// Seeds hierarchy rows with ids that increase in creation order.
pub struct Corpus<'conn> {
    pub repo: SqliteHierarchyRepository<'conn>,
    next_id: u128,
}

impl<'conn> Corpus<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            repo: SqliteHierarchyRepository::try_new(conn).unwrap(),
            next_id: 0,
        }
    }

    pub fn next_id(&mut self) -> Uuid {
        self.next_id += 1;
        Uuid::from_u128(self.next_id)
    }

    pub fn intent(&mut self, name: &str) -> Intent {
        let intent = Intent::with_id(self.next_id(), name);
        self.repo.insert_intent(&intent).unwrap();
        intent
    }

    pub fn theme(&mut self, intent: &Intent, name: &str) -> Theme {
        let theme = Theme::with_id(self.next_id(), intent.id, name);
        self.repo.insert_theme(&theme).unwrap();
        theme
    }

    pub fn subject(&mut self, theme: &Theme, name: &str) -> Subject {
        let subject = Subject::with_id(self.next_id(), theme.id, name);
        self.repo.insert_subject(&subject).unwrap();
        subject
    }

    pub fn set(&mut self, subject: &Subject, name: &str) -> CapsuleSet {
        let set = CapsuleSet::with_id(self.next_id(), subject.id, name);
        self.repo.insert_set(&set).unwrap();
        set
    }

    pub fn capsule(&mut self, subject: &Subject, set: &CapsuleSet, title: &str) -> Capsule {
        self.capsule_with(subject, set, title, 0, &[])
    }

    pub fn capsule_with(
        &mut self,
        subject: &Subject,
        set: &CapsuleSet,
        title: &str,
        save_count: u64,
        intent_tags: &[IntentId],
    ) -> Capsule {
        let id = self.next_id();
        let mut capsule = Capsule::with_id(
            id,
            subject,
            set,
            title,
            QuestionOrPoll::question("What stood out?"),
        );
        capsule.slides.push(Slide::text(format!("{title} slide")));
        capsule.intent_tags = intent_tags.to_vec();
        capsule.metadata.save_count = save_count;
        self.repo.insert_capsule(&capsule).unwrap();
        capsule
    }
}
