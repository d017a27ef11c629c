use super::*;
use crate::storage::MemoryStorage;

#[test]
fn restore_without_profile_is_signed_out() {
    let storage = MemoryStorage::new();
    let session = Session::restore(&storage).unwrap();
    assert!(!session.is_signed_in());
    assert_eq!(session, Session::signed_out());
}

#[test]
fn login_derives_profile_from_email() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    let user = session.login(&mut storage, "  jane@example.com ").unwrap().clone();
    assert_eq!(user.email, "jane@example.com");
    assert_eq!(user.name, "jane");
    assert_eq!(user.role, Role::User);
    assert_eq!(user.subscription, Subscription::Pro);
    assert_eq!(user.brand_kit, Some(BrandKit::default()));
    assert!(session.is_signed_in());
    assert!(!session.is_admin());
}

#[test]
fn login_with_admin_address_grants_admin() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    session.login(&mut storage, "admin@studio.co").unwrap();
    assert!(session.is_admin());
}

#[test]
fn login_rejects_malformed_email() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    for bad in ["", "   ", "jane", "@example.com", "jane@"] {
        assert!(matches!(session.login(&mut storage, bad), Err(SessionError::InvalidEmail)), "{bad:?}");
    }
    assert!(!session.is_signed_in());
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
}

#[test]
fn register_creates_free_profile_without_brand_kit() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    let user = session.register(&mut storage, "sam@shop.ke", " Sam ").unwrap();
    assert_eq!(user.name, "Sam");
    assert_eq!(user.subscription, Subscription::Free);
    assert_eq!(user.role, Role::User);
    assert!(user.brand_kit.is_none());
}

#[test]
fn register_requires_name() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    assert!(matches!(session.register(&mut storage, "sam@shop.ke", "  "), Err(SessionError::MissingName)));
}

#[test]
fn profile_persists_across_restore() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    let user = session.login(&mut storage, "jane@example.com").unwrap().clone();
    let restored = Session::restore(&storage).unwrap();
    assert_eq!(restored.user(), Some(&user));
}

#[test]
fn stored_profile_uses_camel_case_keys() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    session.login(&mut storage, "jane@example.com").unwrap();
    let raw = storage.get(USER_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["brandKit"]["fonts"][0], "Inter");
    assert_eq!(value["subscription"], "pro");
    assert_eq!(value["role"], "user");
}

#[test]
fn logout_clears_memory_and_storage() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    session.login(&mut storage, "jane@example.com").unwrap();
    session.logout(&mut storage).unwrap();
    assert!(!session.is_signed_in());
    assert!(!Session::restore(&storage).unwrap().is_signed_in());
}

#[test]
fn upgrade_changes_subscription() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    session.register(&mut storage, "sam@shop.ke", "Sam").unwrap();
    let user = session.upgrade(&mut storage, Subscription::Enterprise).unwrap();
    assert_eq!(user.subscription, Subscription::Enterprise);
    let restored = Session::restore(&storage).unwrap();
    assert_eq!(restored.user().unwrap().subscription, Subscription::Enterprise);
}

#[test]
fn upgrade_requires_sign_in() {
    let mut storage = MemoryStorage::new();
    let mut session = Session::signed_out();
    assert!(matches!(session.upgrade(&mut storage, Subscription::Pro), Err(SessionError::SignedOut)));
}

#[test]
fn corrupt_profile_is_an_error() {
    let mut storage = MemoryStorage::new();
    storage.set(USER_KEY, "not json").unwrap();
    assert!(matches!(
        Session::restore(&storage),
        Err(SessionError::Storage(StorageError::Corrupt { .. }))
    ));
}
