//! End-to-end flows over the credential list.

use assert_matches::assert_matches;
use idem_core::{Element, ElementError, Timestamp, VerifiedElement};
use idem_userdata::{Credential, CredentialList, Password, U2fToken, WebauthnToken};

fn sample_list() -> CredentialList {
    CredentialList::new(vec![
        Credential::Password(Password::new("5fa1...", "$NDNv1H1$salt$32$32$")),
        Credential::U2f(
            U2fToken::new("kh-u2f", "https://example.com/u2f", "U2F_V2", "pk-1")
                .with_description("desk key"),
        ),
        Credential::Webauthn(
            WebauthnToken::new("kh-web", "https://example.com", "cred-data")
                .with_description("phone"),
        ),
    ])
    .unwrap()
}

/// A mixed list survives a storage cycle with kinds and order intact.
#[test]
fn test_storage_cycle_preserves_kinds() {
    let list = sample_list();
    let restored = CredentialList::from_records(list.to_records()).unwrap();

    assert_eq!(restored, list);
    assert_eq!(restored.passwords().len(), 1);
    assert_eq!(restored.security_keys().len(), 2);
}

/// Every stored record carries the tag its kind decodes by.
#[test]
fn test_records_are_tagged_by_kind() {
    let tags: Vec<_> = sample_list()
        .to_records()
        .iter()
        .map(|record| record["credential_type"].as_str().map(str::to_owned))
        .collect();

    assert_eq!(
        tags,
        [
            Some("password".to_owned()),
            Some("u2f".to_owned()),
            Some("webauthn".to_owned()),
        ]
    );
}

/// A proofing workflow looks a credential up by key and marks it verified
/// in place.
#[test]
fn test_proofing_marks_credential_verified() {
    let mut list = sample_list();
    let token = U2fToken::new("kh-u2f", "https://example.com/u2f", "U2F_V2", "pk-1");
    let key = token.derived_key();

    let credential = list.find_mut(&key).unwrap().unwrap();
    assert!(!credential.is_verified());
    credential.set_verified(true).unwrap();
    credential.set_verified_by(Some("vetting_app".to_owned()));
    credential.set_verified_ts(Some(Timestamp::Now));

    let credential = list.find(&key).unwrap().unwrap();
    assert!(credential.is_verified());
    assert_eq!(credential.verified_by(), Some("vetting_app"));
}

/// Registering the same physical token twice collides on the derived key.
#[test]
fn test_same_token_registers_once() {
    let mut list = sample_list();
    let again = Credential::U2f(
        U2fToken::new("kh-u2f", "https://example.com/u2f", "U2F_V2", "pk-1")
            .with_description("same token, new label"),
    );

    assert_matches!(list.add(again), Err(ElementError::Duplicate { .. }));
    assert_eq!(list.count(), 3);
}

/// Passwords can be swapped: remove by credential id, add the replacement.
#[test]
fn test_password_rotation() {
    let mut list = sample_list();

    list.remove("5fa1...").unwrap();
    list.add(Credential::Password(
        Password::new("7bc2...", "$NDNv1H1$other$32$32$").with_generated(true),
    ))
    .unwrap();

    let passwords = list.passwords();
    assert_eq!(passwords.len(), 1);
    assert_eq!(passwords[0].credential_id(), "7bc2...");
    assert!(passwords[0].is_generated());
}

/// A record with a kind this build does not know is rejected, not dropped.
#[test]
fn test_unknown_kind_fails_loudly() {
    let mut records = sample_list().to_records();
    records[0].insert(
        "credential_type".to_owned(),
        serde_json::Value::String("fido3".to_owned()),
    );

    assert_matches!(
        CredentialList::from_records(records),
        Err(ElementError::InvalidValue { field: "credential_type", .. })
    );
}

/// Credential keys are stable identifiers: equal input, equal key.
#[test]
fn test_credential_keys_are_deterministic() {
    let token = Credential::Webauthn(WebauthnToken::new("kh", "https://example.com", "data"));
    let same = Credential::Webauthn(WebauthnToken::new("kh", "https://example.com", "data"));
    assert_eq!(token.key(), same.key());

    let password = Credential::Password(Password::new("id-9", "salt"));
    assert_eq!(password.key(), "id-9");
}
