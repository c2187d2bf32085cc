mod common;

use capsule_core::db::open_db_in_memory;
use capsule_core::{
    Capsule, CapsuleFilter, CapsuleId, CapsuleSet, CascadeStep, ContentError, EntityKind,
    HierarchyStore, Intent, IntentId, NavigationService, RankLevel, RepoError, RepoResult,
    SaveRanking, SetId, SqliteHierarchyRepository, Subject, SubjectId, Theme, ThemeId,
};
use common::Corpus;
use std::collections::HashSet;
use uuid::Uuid;

fn navigation(conn: &rusqlite::Connection) -> NavigationService<SqliteHierarchyRepository<'_>> {
    NavigationService::new(SqliteHierarchyRepository::try_new(conn).unwrap())
}

#[test]
fn same_set_successor_then_first_capsule_of_next_set() {
    let conn = open_db_in_memory().unwrap();
    let mut corpus = Corpus::new(&conn);
    let intent = corpus.intent("Grow");
    let theme = corpus.theme(&intent, "Focus");
    let subject = corpus.subject(&theme, "Deep work");
    let s1 = corpus.set(&subject, "Basics");
    let c1 = corpus.capsule(&subject, &s1, "c1");
    let c2 = corpus.capsule(&subject, &s1, "c2");
    let c3 = corpus.capsule(&subject, &s1, "c3");
    let s2 = corpus.set(&subject, "Practice");
    let d1 = corpus.capsule(&subject, &s2, "d1");
    corpus.capsule(&subject, &s2, "d2");

    let service = navigation(&conn);

    let next = service.resolve_next_detailed(c1.id).unwrap();
    assert_eq!(next.capsule.id, c2.id);
    assert_eq!(next.step, CascadeStep::SameSet);

    let next = service.resolve_next_detailed(c3.id).unwrap();
    assert_eq!(next.capsule.id, d1.id);
    assert_eq!(next.step, CascadeStep::NextSetInSubject);
    assert_eq!(next.capsule.title, "d1");
    assert_eq!(next.capsule.slides.len(), 1);
}

#[test]
fn cascade_escalates_to_next_subject_then_next_theme() {
    let conn = open_db_in_memory().unwrap();
    let mut corpus = Corpus::new(&conn);
    let intent = corpus.intent("Grow");
    let theme_a = corpus.theme(&intent, "Focus");
    let subject_a = corpus.subject(&theme_a, "Deep work");
    let set_a = corpus.set(&subject_a, "Basics");
    let last_of_subject_a = corpus.capsule(&subject_a, &set_a, "a1");
    let subject_b = corpus.subject(&theme_a, "Rest");
    let set_b = corpus.set(&subject_b, "Sleep");
    let first_of_subject_b = corpus.capsule(&subject_b, &set_b, "b1");
    let theme_c = corpus.theme(&intent, "Energy");
    let subject_c = corpus.subject(&theme_c, "Nutrition");
    let set_c = corpus.set(&subject_c, "Meals");
    let first_of_theme_c = corpus.capsule(&subject_c, &set_c, "c1");

    let service = navigation(&conn);

    let next = service.resolve_next_detailed(last_of_subject_a.id).unwrap();
    assert_eq!(next.capsule.id, first_of_subject_b.id);
    assert_eq!(next.step, CascadeStep::NextSubjectInTheme);

    let next = service.resolve_next_detailed(first_of_subject_b.id).unwrap();
    assert_eq!(next.capsule.id, first_of_theme_c.id);
    assert_eq!(next.step, CascadeStep::NextThemeInIntent);
}

#[test]
fn childless_next_set_fails_branch_without_trying_later_sets() {
    let conn = open_db_in_memory().unwrap();
    let mut corpus = Corpus::new(&conn);
    let intent = corpus.intent("Grow");
    let theme = corpus.theme(&intent, "Focus");
    let subject_a = corpus.subject(&theme, "Deep work");
    let s1 = corpus.set(&subject_a, "Basics");
    let only = corpus.capsule(&subject_a, &s1, "only");
    corpus.set(&subject_a, "Empty");
    let s3 = corpus.set(&subject_a, "Later");
    corpus.capsule(&subject_a, &s3, "skipped");
    let subject_b = corpus.subject(&theme, "Rest");
    let set_b = corpus.set(&subject_b, "Sleep");
    let target = corpus.capsule(&subject_b, &set_b, "target");

    let next = navigation(&conn).resolve_next_detailed(only.id).unwrap();
    assert_eq!(next.capsule.id, target.id);
    assert_eq!(next.step, CascadeStep::NextSubjectInTheme);
}

#[test]
fn cascade_follows_id_order_not_recommended_order() {
    let conn = open_db_in_memory().unwrap();
    let mut corpus = Corpus::new(&conn);
    let intent = corpus.intent("Grow");
    let theme = corpus.theme(&intent, "Focus");
    let subject = corpus.subject(&theme, "Deep work");

    let mut s1 = CapsuleSet::with_id(corpus.next_id(), subject.id, "First by id");
    s1.recommended_order = Some(9);
    corpus.repo.insert_set(&s1).unwrap();
    let mut s2 = CapsuleSet::with_id(corpus.next_id(), subject.id, "Second by id");
    s2.recommended_order = Some(1);
    corpus.repo.insert_set(&s2).unwrap();
    let mut s0 = CapsuleSet::with_id(corpus.next_id(), subject.id, "Unordered");
    s0.recommended_order = None;
    corpus.repo.insert_set(&s0).unwrap();

    let c1 = corpus.capsule(&subject, &s1, "c1");
    let c2 = corpus.capsule(&subject, &s2, "c2");

    let next = navigation(&conn).resolve_next(c1.id).unwrap();
    assert_eq!(next.id, c2.id);

    let listed: Vec<_> = corpus
        .repo
        .list_sets_by_subject(subject.id)
        .unwrap()
        .into_iter()
        .map(|set| set.id)
        .collect();
    assert_eq!(listed, vec![s2.id, s1.id, s0.id]);
}

#[test]
fn dry_cascade_falls_back_to_most_saved_with_smallest_id_tie_break() {
    let conn = open_db_in_memory().unwrap();
    let mut corpus = Corpus::new(&conn);

    let other_intent = corpus.intent("Play");
    let other_theme = corpus.theme(&other_intent, "Games");
    let other_subject = corpus.subject(&other_theme, "Chess");
    let other_set = corpus.set(&other_subject, "Openings");
    let trending = corpus.capsule_with(&other_subject, &other_set, "trending", 7, &[]);
    corpus.capsule_with(&other_subject, &other_set, "tied later", 7, &[]);

    let intent = corpus.intent("Grow");
    let theme = corpus.theme(&intent, "Focus");
    let subject = corpus.subject(&theme, "Deep work");
    let set = corpus.set(&subject, "Basics");
    corpus.capsule_with(&subject, &set, "c1", 3, &[]);
    let last = corpus.capsule_with(&subject, &set, "c2", 2, &[]);

    let next = navigation(&conn).resolve_next_detailed(last.id).unwrap();
    assert_eq!(next.capsule.id, trending.id);
    assert_eq!(next.step, CascadeStep::GlobalTrending);
}

#[test]
fn unknown_capsule_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let missing = Uuid::from_u128(404);

    match navigation(&conn).resolve_next(missing) {
        Err(ContentError::NotFound { kind, id }) => {
            assert_eq!(kind, EntityKind::Capsule);
            assert_eq!(id, missing);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Store that knows one capsule but reports an otherwise empty corpus.
///
/// With `broken_subject_lookup` set, `next_subject_in_theme` fails like a
/// lost database connection.
struct LoneCapsuleStore {
    capsule: Capsule,
    theme: Theme,
    broken_subject_lookup: bool,
}

impl HierarchyStore for LoneCapsuleStore {
    fn get_intent(&self, _id: IntentId) -> RepoResult<Option<Intent>> {
        Ok(None)
    }
    fn get_theme(&self, id: ThemeId) -> RepoResult<Option<Theme>> {
        Ok((id == self.theme.id).then(|| self.theme.clone()))
    }
    fn get_subject(&self, _id: SubjectId) -> RepoResult<Option<Subject>> {
        Ok(None)
    }
    fn get_set(&self, _id: SetId) -> RepoResult<Option<CapsuleSet>> {
        Ok(None)
    }
    fn get_capsule(&self, id: CapsuleId) -> RepoResult<Option<Capsule>> {
        Ok((id == self.capsule.id).then(|| self.capsule.clone()))
    }
    fn get_capsules(&self, _ids: &[CapsuleId]) -> RepoResult<Vec<Capsule>> {
        Ok(Vec::new())
    }
    fn next_capsule_in_set(
        &self,
        _set_id: SetId,
        _after: Option<CapsuleId>,
    ) -> RepoResult<Option<Capsule>> {
        Ok(None)
    }
    fn next_set_in_subject(
        &self,
        _subject_id: SubjectId,
        _after: Option<SetId>,
    ) -> RepoResult<Option<CapsuleSet>> {
        Ok(None)
    }
    fn next_subject_in_theme(
        &self,
        _theme_id: ThemeId,
        _after: Option<SubjectId>,
    ) -> RepoResult<Option<Subject>> {
        if self.broken_subject_lookup {
            return Err(RepoError::InvalidData("subjects table unreadable".to_string()));
        }
        Ok(None)
    }
    fn next_theme_in_intent(
        &self,
        _intent_id: IntentId,
        _after: Option<ThemeId>,
    ) -> RepoResult<Option<Theme>> {
        Ok(None)
    }
    fn most_saved_capsule(&self) -> RepoResult<Option<Capsule>> {
        Ok(None)
    }
    fn list_themes_by_intent(&self, _intent_id: IntentId) -> RepoResult<Vec<Theme>> {
        Ok(Vec::new())
    }
    fn list_subjects_by_theme(&self, _theme_id: ThemeId) -> RepoResult<Vec<Subject>> {
        Ok(Vec::new())
    }
    fn list_sets_by_subject(&self, _subject_id: SubjectId) -> RepoResult<Vec<CapsuleSet>> {
        Ok(Vec::new())
    }
    fn list_capsules_by_set(&self, _set_id: SetId) -> RepoResult<Vec<Capsule>> {
        Ok(Vec::new())
    }
    fn count_matching_capsules(&self, filter: &CapsuleFilter) -> RepoResult<u64> {
        Ok(u64::from(filter.matches(&self.capsule)))
    }
    fn sample_matching_capsule_ids(
        &self,
        filter: &CapsuleFilter,
        limit: u64,
    ) -> RepoResult<Vec<CapsuleId>> {
        let matched = filter.matches(&self.capsule) && limit > 0;
        Ok(matched.then_some(self.capsule.id).into_iter().collect())
    }
    fn rank_by_save_count(
        &self,
        _level: RankLevel,
        _offset: u64,
        _limit: u64,
    ) -> RepoResult<Vec<SaveRanking>> {
        Ok(Vec::new())
    }
    fn count_ranked_groups(&self, _level: RankLevel) -> RepoResult<u64> {
        Ok(0)
    }
    fn list_most_saved_capsules(
        &self,
        _excluded: &HashSet<CapsuleId>,
        _limit: u64,
    ) -> RepoResult<Vec<Capsule>> {
        Ok(Vec::new())
    }
}

fn lone_capsule_store(broken_subject_lookup: bool) -> LoneCapsuleStore {
    let intent_id = Uuid::from_u128(1);
    let theme = Theme::with_id(Uuid::from_u128(2), intent_id, "Focus");
    let subject = Subject::with_id(Uuid::from_u128(3), theme.id, "Deep work");
    let set = CapsuleSet::with_id(Uuid::from_u128(4), subject.id, "Basics");
    let capsule = Capsule::with_id(
        Uuid::from_u128(5),
        &subject,
        &set,
        "Lonely",
        capsule_core::QuestionOrPoll::question("Why?"),
    );
    LoneCapsuleStore {
        capsule,
        theme,
        broken_subject_lookup,
    }
}

#[test]
fn empty_corpus_yields_no_recommendation() {
    let store = lone_capsule_store(false);
    let capsule_id = store.capsule.id;
    let service = NavigationService::new(store);

    let err = service.resolve_next(capsule_id).unwrap_err();
    assert!(matches!(err, ContentError::NoRecommendation));
    assert!(!err.is_client_error());
}

#[test]
fn store_fault_mid_cascade_aborts_without_fallback() {
    let store = lone_capsule_store(true);
    let capsule_id = store.capsule.id;
    let service = NavigationService::new(store);

    let result = service.resolve_next_detailed(capsule_id);
    let err = match result {
        Err(err) => err,
        Ok(next) => panic!("store fault produced a recommendation: {next:?}"),
    };
    assert!(matches!(err, ContentError::Store(RepoError::InvalidData(_))));
    assert_eq!(err.code(), "STORE_ERROR");
    assert!(!err.is_client_error());
}

#[test]
fn lone_capsule_matches_its_own_theme_filter() {
    let store = lone_capsule_store(false);
    let by_theme = CapsuleFilter::new(Vec::new(), vec![store.theme.id]);
    let by_other_intent = CapsuleFilter::new(vec![Uuid::from_u128(99)], Vec::new());

    assert_eq!(store.count_matching_capsules(&by_theme).unwrap(), 1);
    assert_eq!(
        store.sample_matching_capsule_ids(&by_theme, 100).unwrap(),
        vec![store.capsule.id]
    );
    assert_eq!(store.count_matching_capsules(&by_other_intent).unwrap(), 0);
}
