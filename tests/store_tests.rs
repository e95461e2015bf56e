//! Integration tests for the encrypted diary store.


use chrono::{Duration, Utc};
use moodstack::diary::{
    DiaryContent, DiaryRecord, EncryptionMode, EncryptionOptions, MatchType, Unlock,
};
use moodstack::errors::AppError;
use test_helpers::{temp_store, MASTER_KEY, OTHER_KEY, TEST_PASSWORD};

fn record_at(title: &str, content: &str, minutes_ago: i64) -> DiaryRecord {
    let mut record = DiaryRecord::new(title, content);
    record.created_at = Utc::now() - Duration::minutes(minutes_ago);
    record.updated_at = record.created_at;
    record
}

#[test]
fn test_each_mode_roundtrips() {
    let (_dir, store) = temp_store();

    let unified = DiaryRecord::new("unified", "plain day");
    let biometric = DiaryRecord::new("biometric", "fingerprint day");
    let individual = DiaryRecord::new("individual", "secret day");

    store.save(&unified, 1, &MASTER_KEY).unwrap();
    store
        .save_with_options(&biometric, 1, &MASTER_KEY, &EncryptionOptions::biometric())
        .unwrap();
    store
        .save_with_options(
            &individual,
            1,
            &MASTER_KEY,
            &EncryptionOptions::individual(TEST_PASSWORD),
        )
        .unwrap();

    let entry = store.get_decrypted(&unified.id, 1, &MASTER_KEY).unwrap();
    assert_eq!(entry.content.as_plaintext(), Some("plain day"));

    let entry = store.get_decrypted(&biometric.id, 1, &MASTER_KEY).unwrap();
    assert_eq!(entry.content.as_plaintext(), Some("fingerprint day"));
    assert_eq!(entry.encryption_mode, EncryptionMode::Biometric);

    let entry = store.get_decrypted(&individual.id, 1, &MASTER_KEY).unwrap();
    assert!(entry.content.is_locked());

    let entry = store
        .get_with_password(&individual.id, 1, TEST_PASSWORD)
        .unwrap();
    assert_eq!(entry.content.as_plaintext(), Some("secret day"));
}

#[test]
fn test_encryption_info_reports_salt_only_for_individual() {
    let (_dir, store) = temp_store();
    let unified = DiaryRecord::new("a", "a");
    let individual = DiaryRecord::new("b", "b");

    store.save(&unified, 1, &MASTER_KEY).unwrap();
    store
        .save_with_options(&individual, 1, &[], &EncryptionOptions::individual("pw"))
        .unwrap();

    let info = store.encryption_info(&unified.id, 1).unwrap();
    assert_eq!(info.mode, EncryptionMode::Unified);
    assert!(!info.has_salt);

    let info = store.encryption_info(&individual.id, 1).unwrap();
    assert_eq!(info.mode, EncryptionMode::Individual);
    assert!(info.has_salt);
}

#[test]
fn test_wrong_credentials_are_decryption_errors() {
    let (_dir, store) = temp_store();
    let unified = DiaryRecord::new("u", "content");
    let individual = DiaryRecord::new("i", "content");

    store.save(&unified, 9, &MASTER_KEY).unwrap();
    store
        .save_with_options(&individual, 9, &[], &EncryptionOptions::individual("right"))
        .unwrap();

    match store.get_decrypted(&unified.id, 9, &OTHER_KEY) {
        Err(AppError::Decryption {
            operation,
            diary_id,
            owner_id,
        }) => {
            assert_eq!(operation, "get_decrypted");
            assert_eq!(diary_id, unified.id);
            assert_eq!(owner_id, 9);
        }
        other => panic!("Expected decryption error, got {:?}", other),
    }

    let err = store.get_with_password(&individual.id, 9, "wrong").unwrap_err();
    assert!(err.is_decryption_failure());

    let err = store.get_with_password(&individual.id, 9, "").unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn test_owner_scoping() {
    let (_dir, store) = temp_store();
    let record = DiaryRecord::new("mine", "owner one only");
    store.save(&record, 1, &MASTER_KEY).unwrap();

    assert!(matches!(
        store.get_decrypted(&record.id, 2, &MASTER_KEY),
        Err(AppError::NotFound(_))
    ));
    assert!(store.list_decrypted(2, &MASTER_KEY).unwrap().is_empty());
    assert!(matches!(
        store.delete(&record.id, 2),
        Err(AppError::NotFound(_))
    ));

    // Another owner cannot take over the id either
    let result = store.save(&record, 2, &MASTER_KEY);
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));

    let entry = store.get_decrypted(&record.id, 1, &MASTER_KEY).unwrap();
    assert_eq!(entry.content.as_plaintext(), Some("owner one only"));
}

#[test]
fn test_list_is_newest_first_and_degrades_gracefully() {
    let (_dir, store) = temp_store();

    let oldest = record_at("oldest", "first", 30);
    let locked = record_at("locked", "needs password", 20);
    let foreign_key = record_at("foreign", "other key", 10);
    let newest = record_at("newest", "last", 0);

    store.save(&oldest, 1, &MASTER_KEY).unwrap();
    store
        .save_with_options(&locked, 1, &MASTER_KEY, &EncryptionOptions::individual("pw"))
        .unwrap();
    store.save(&foreign_key, 1, &OTHER_KEY).unwrap();
    store.save(&newest, 1, &MASTER_KEY).unwrap();

    let entries = store.list_decrypted(1, &MASTER_KEY).unwrap();
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["newest", "locked", "oldest"]);

    let locked_entry = &entries[1];
    assert_eq!(locked_entry.content, DiaryContent::Locked);
    assert_eq!(locked_entry.encryption_mode, EncryptionMode::Individual);
}

#[test]
fn test_save_replaces_by_id() {
    let (_dir, store) = temp_store();
    let mut record = DiaryRecord::new("draft", "first version").with_tags(["draft"]);
    store.save(&record, 1, &MASTER_KEY).unwrap();

    record.title = "final".to_string();
    record.content = "second version".to_string();
    record.tags = vec!["final".to_string(), "reviewed".to_string()];
    record.updated_at = Utc::now();
    store.save(&record, 1, &MASTER_KEY).unwrap();

    let entries = store.list_decrypted(1, &MASTER_KEY).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "final");
    assert_eq!(entries[0].content.as_plaintext(), Some("second version"));
    assert_eq!(entries[0].tags, vec!["final", "reviewed"]);
}

#[test]
fn test_mode_switch_to_individual_and_back() {
    let (_dir, store) = temp_store();
    let record = DiaryRecord::new("switch", "moving between modes");
    store.save(&record, 1, &MASTER_KEY).unwrap();
    let original = store.get_decrypted(&record.id, 1, &MASTER_KEY).unwrap();

    store
        .re_encrypt(
            &record.id,
            1,
            Unlock::MasterKey(&MASTER_KEY),
            &[],
            &EncryptionOptions::individual("pw"),
        )
        .unwrap();
    assert!(store.encryption_info(&record.id, 1).unwrap().has_salt);
    assert!(store
        .get_decrypted(&record.id, 1, &MASTER_KEY)
        .unwrap()
        .content
        .is_locked());

    store
        .re_encrypt(
            &record.id,
            1,
            Unlock::Password("pw"),
            &OTHER_KEY,
            &EncryptionOptions::unified(),
        )
        .unwrap();

    let info = store.encryption_info(&record.id, 1).unwrap();
    assert_eq!(info.mode, EncryptionMode::Unified);
    assert!(!info.has_salt);

    let entry = store.get_decrypted(&record.id, 1, &OTHER_KEY).unwrap();
    assert_eq!(entry.content.as_plaintext(), Some("moving between modes"));
    assert_eq!(entry.created_at, original.created_at);
    assert!(entry.updated_at >= entry.created_at);
}

#[test]
fn test_re_encrypt_requires_matching_credential() {
    let (_dir, store) = temp_store();
    let record = DiaryRecord::new("t", "c");
    store
        .save_with_options(&record, 1, &[], &EncryptionOptions::individual("pw"))
        .unwrap();

    let result = store.re_encrypt(
        &record.id,
        1,
        Unlock::MasterKey(&MASTER_KEY),
        &MASTER_KEY,
        &EncryptionOptions::unified(),
    );
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));

    let result = store.re_encrypt(
        &record.id,
        1,
        Unlock::Password("nope"),
        &MASTER_KEY,
        &EncryptionOptions::unified(),
    );
    assert!(result.unwrap_err().is_decryption_failure());
}

#[test]
fn test_delete_then_missing() {
    let (_dir, store) = temp_store();
    let record = DiaryRecord::new("gone", "soon");
    store.save(&record, 1, &MASTER_KEY).unwrap();

    store.delete(&record.id, 1).unwrap();
    assert!(matches!(
        store.get_decrypted(&record.id, 1, &MASTER_KEY),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(store.delete(&record.id, 1), Err(AppError::NotFound(_))));
}

#[test]
fn test_invalid_records_rejected_before_storage() {
    let (_dir, store) = temp_store();

    let mut record = DiaryRecord::new("t", "c");
    record.id = String::new();
    assert!(matches!(
        store.save(&record, 1, &MASTER_KEY),
        Err(AppError::InvalidArgument(_))
    ));

    let mut record = DiaryRecord::new("t", "c");
    record.updated_at = record.created_at - Duration::seconds(1);
    assert!(matches!(
        store.save(&record, 1, &MASTER_KEY),
        Err(AppError::InvalidArgument(_))
    ));

    let options = EncryptionOptions::parse("individual", None);
    assert!(matches!(options, Err(AppError::InvalidArgument(_))));
    let options = EncryptionOptions::parse("rot13", None);
    assert!(matches!(options, Err(AppError::InvalidArgument(_))));
    assert!(store.list_decrypted(1, &MASTER_KEY).unwrap().is_empty());
}

#[test]
fn test_search_is_case_insensitive() {
    let (_dir, store) = temp_store();
    store
        .save(&DiaryRecord::new("Rainy Monday", "stayed in"), 1, &MASTER_KEY)
        .unwrap();
    store
        .save(&DiaryRecord::new("Tuesday", "The RAIN stopped"), 1, &MASTER_KEY)
        .unwrap();
    store
        .save(&DiaryRecord::new("Wednesday", "sunny"), 1, &MASTER_KEY)
        .unwrap();

    let hits = store.search(1, &MASTER_KEY, "rain").unwrap();
    assert_eq!(hits.len(), 2);

    let everything = store.search(1, &MASTER_KEY, "").unwrap();
    assert_eq!(everything.len(), 3);
}

#[test]
fn test_search_with_context_classifies_matches() {
    let (_dir, store) = temp_store();
    store
        .save(&DiaryRecord::new("walk", "a long walk by the river"), 1, &MASTER_KEY)
        .unwrap();
    store
        .save(&DiaryRecord::new("river day", "swimming"), 1, &MASTER_KEY)
        .unwrap();
    store
        .save(&DiaryRecord::new("River", "the river was cold"), 1, &MASTER_KEY)
        .unwrap();

    let mut results = store
        .search_with_context(1, &MASTER_KEY, "river", 5)
        .unwrap();
    results.sort_by(|a, b| a.entry.title.cmp(&b.entry.title));

    let types: Vec<(&str, MatchType)> = results
        .iter()
        .map(|r| (r.entry.title.as_str(), r.match_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("River", MatchType::Both),
            ("river day", MatchType::Title),
            ("walk", MatchType::Content),
        ]
    );

    let walk = &results[2];
    assert_eq!(walk.snippets, vec!["... the river"]);
    assert_eq!(results[0].snippets, vec!["the river was ..."]);
    assert!(results[1].snippets.is_empty());

    assert!(store
        .search_with_context(1, &MASTER_KEY, "", 5)
        .unwrap()
        .is_empty());
}

#[test]
fn test_locked_diaries_do_not_leak_through_search() {
    let (_dir, store) = temp_store();
    let record = DiaryRecord::new("private", "the word is marmalade");
    store
        .save_with_options(&record, 1, &[], &EncryptionOptions::individual("pw"))
        .unwrap();

    assert!(store.search(1, &MASTER_KEY, "marmalade").unwrap().is_empty());
    assert_eq!(store.search(1, &MASTER_KEY, "private").unwrap().len(), 1);
}
