use super::*;
use crate::storage::MemoryStorage;

#[test]
fn unanswered_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(ConsentPreferences::load(&storage).unwrap(), None);
}

#[test]
fn presets() {
    let all = ConsentPreferences::accept_all();
    assert!(all.necessary && all.analytics && all.marketing && all.functional);
    let min = ConsentPreferences::necessary_only();
    assert!(min.necessary && !min.analytics && !min.marketing && !min.functional);
    assert_eq!(ConsentPreferences::default(), min);
}

#[test]
fn save_then_load() {
    let mut storage = MemoryStorage::new();
    let prefs = ConsentPreferences { analytics: true, ..ConsentPreferences::necessary_only() };
    prefs.save(&mut storage).unwrap();
    assert_eq!(ConsentPreferences::load(&storage).unwrap(), Some(prefs));
}

#[test]
fn necessary_cannot_be_declined() {
    let mut storage = MemoryStorage::new();
    let declined = ConsentPreferences { necessary: false, ..ConsentPreferences::accept_all() };
    let written = declined.save(&mut storage).unwrap();
    assert!(written.necessary);

    storage
        .set(CONSENT_KEY, r#"{"necessary":false,"analytics":true}"#)
        .unwrap();
    let loaded = ConsentPreferences::load(&storage).unwrap().unwrap();
    assert!(loaded.necessary);
    assert!(loaded.analytics);
    assert!(!loaded.marketing);
}

#[test]
fn stored_shape_matches_host_page() {
    let mut storage = MemoryStorage::new();
    ConsentPreferences::accept_all().save(&mut storage).unwrap();
    let raw = storage.get(CONSENT_KEY).unwrap().unwrap();
    assert_eq!(raw, r#"{"necessary":true,"analytics":true,"marketing":true,"functional":true}"#);
}

#[test]
fn corrupt_flags_are_an_error() {
    let mut storage = MemoryStorage::new();
    storage.set(CONSENT_KEY, "yes").unwrap();
    assert!(matches!(ConsentPreferences::load(&storage), Err(StorageError::Corrupt { .. })));
}
