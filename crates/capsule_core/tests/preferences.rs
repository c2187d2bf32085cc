mod common;

use capsule_core::db::open_db_in_memory;
use capsule_core::{
    ContentError, EngineConfig, EntityKind, InMemoryFolderStore, PreferenceService,
    RecommendationService, SqliteHierarchyRepository, SqlitePreferenceRepository,
};
use common::Corpus;
use uuid::Uuid;

const USER: Uuid = Uuid::from_u128(0x51);

fn ids(values: &[u128]) -> Vec<Uuid> {
    values.iter().copied().map(Uuid::from_u128).collect()
}

#[test]
fn save_creates_then_merges_without_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let service = PreferenceService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());

    let first = service
        .save_preferences(USER, ids(&[1, 2, 1]), ids(&[10]))
        .unwrap();
    assert!(first.created);
    assert_eq!(first.preference.intent_ids, ids(&[1, 2]));

    let second = service
        .save_preferences(USER, ids(&[3, 2]), ids(&[11, 10]))
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.preference.intent_ids, ids(&[1, 2, 3]));
    assert_eq!(second.preference.theme_ids, ids(&[10, 11]));

    let stored = service.get_preferences(USER).unwrap();
    assert_eq!(stored, second.preference);
}

#[test]
fn replace_keeps_omitted_lists_and_requires_existing_preference() {
    let conn = open_db_in_memory().unwrap();
    let service = PreferenceService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());

    match service.replace_preferences(USER, Some(ids(&[1])), None) {
        Err(ContentError::NotFound { kind, id }) => {
            assert_eq!(kind, EntityKind::UserPreference);
            assert_eq!(id, USER);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    service
        .save_preferences(USER, ids(&[1, 2]), ids(&[10]))
        .unwrap();
    let replaced = service
        .replace_preferences(USER, None, Some(ids(&[12, 12, 13])))
        .unwrap();
    assert_eq!(replaced.intent_ids, ids(&[1, 2]));
    assert_eq!(replaced.theme_ids, ids(&[12, 13]));
    assert_eq!(service.get_preferences(USER).unwrap(), replaced);
}

#[test]
fn stored_preference_drives_the_sampler() {
    let conn = open_db_in_memory().unwrap();
    let mut corpus = Corpus::new(&conn);
    let intent = corpus.intent("Grow");
    let theme = corpus.theme(&intent, "Focus");
    let other_theme = corpus.theme(&intent, "Energy");
    let subject = corpus.subject(&theme, "Deep work");
    let set = corpus.set(&subject, "Basics");
    let other_subject = corpus.subject(&other_theme, "Meals");
    let other_set = corpus.set(&other_subject, "Breakfast");
    let wanted = corpus.capsule(&subject, &set, "wanted");
    corpus.capsule(&other_subject, &other_set, "unwanted");

    let preferences =
        PreferenceService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());
    let sampler = RecommendationService::new(
        SqliteHierarchyRepository::try_new(&conn).unwrap(),
        InMemoryFolderStore::new(),
        EngineConfig::default(),
    );

    assert!(matches!(
        preferences.sample_for_user(&sampler, USER, 1, None),
        Err(ContentError::NotFound { .. })
    ));

    preferences
        .save_preferences(USER, Vec::new(), vec![theme.id])
        .unwrap();
    let page = preferences
        .sample_for_user(&sampler, USER, 1, None)
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].capsule.id, wanted.id);
    assert!(!page.items[0].is_saved);
}
