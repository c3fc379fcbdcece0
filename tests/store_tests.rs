//! Integration tests for the CredVault store module.

use std::fs;
use std::path::PathBuf;

use credvault::codec::{ObfuscationCodec, ShiftCodec, XorCodec};
use credvault::errors::CredVaultError;
use credvault::store::{HashIndex, RecordStore};
use tempfile::TempDir;

/// Helper: a backing-file path inside a fresh temp dir.
fn store_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("vault.txt");
    (dir, path)
}

fn no_codec() -> Option<Box<dyn ObfuscationCodec>> {
    None
}

fn xor_codec() -> Option<Box<dyn ObfuscationCodec>> {
    Some(Box::new(XorCodec::new(b"correct horse").unwrap()))
}

fn shift_codec() -> Option<Box<dyn ObfuscationCodec>> {
    Some(Box::new(ShiftCodec::default()))
}

/// Records with awkward contents: separators, escapes, unicode, empty owner.
fn sample_records() -> Vec<(String, String, String)> {
    let mut records = vec![
        ("github".into(), "p@ss,1".into(), "alice".into()),
        ("github".into(), "b0b's,pw\\".into(), "bob".into()),
        ("alice".into(), "Secret123".into(), String::new()),
        ("bank".into(), "line\nbreak".into(), "alice".into()),
        ("café".into(), "naïve,Grüße".into(), "carol".into()),
    ];
    for i in 0..20 {
        records.push((format!("app{i}"), format!("pw,{i}"), "dave".into()));
    }
    records
}

fn roundtrip_with(codec: fn() -> Option<Box<dyn ObfuscationCodec>>) {
    let (_dir, path) = store_path();
    let records = sample_records();

    let mut store = RecordStore::open(&path, 100, codec()).unwrap();
    for (key, value, owner) in &records {
        store.insert(key, value, owner).unwrap();
    }
    store.close().unwrap();

    let store = RecordStore::open(&path, 100, codec()).unwrap();
    assert_eq!(store.len(), records.len());
    assert_eq!(store.skipped_lines(), 0);
    for (key, value, owner) in &records {
        assert_eq!(store.get(key, owner), Some(value.as_str()), "{key}/{owner}");
    }
}

// ---------------------------------------------------------------------------
// Persistence round-trip
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_without_codec() {
    roundtrip_with(no_codec);
}

#[test]
fn roundtrip_with_xor_codec() {
    roundtrip_with(xor_codec);
}

#[test]
fn roundtrip_with_shift_codec() {
    roundtrip_with(shift_codec);
}

#[test]
fn file_has_one_line_per_record() {
    let (_dir, path) = store_path();
    let mut store = RecordStore::open(&path, 100, no_codec()).unwrap();
    store.insert("github", "a,b", "alice").unwrap();
    store.insert("alice", "pw", "").unwrap();
    store.close().unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<&str> = raw.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["alice,pw,", "github,a\\,b,alice"]);
}

#[test]
fn removed_records_are_not_written() {
    let (_dir, path) = store_path();
    let mut store = RecordStore::open(&path, 100, no_codec()).unwrap();
    store.insert("github", "x", "alice").unwrap();
    store.insert("email", "y", "alice").unwrap();
    assert!(store.remove("github", "alice"));
    store.close().unwrap();

    let store = RecordStore::open(&path, 100, no_codec()).unwrap();
    assert_eq!(store.len(), 1);
    assert!(!store.contains("github", "alice"));
}

#[test]
fn codec_mismatch_skips_undecodable_lines() {
    let (_dir, path) = store_path();
    let mut store = RecordStore::open(&path, 100, no_codec()).unwrap();
    store.insert("github", "not base64!", "alice").unwrap();
    store.close().unwrap();

    // Opening a plain file with a codec configured cannot decode the value.
    let store = RecordStore::open(&path, 100, xor_codec()).unwrap();
    assert_eq!(store.len(), 0);
    assert_eq!(store.skipped_lines(), 1);
}

// ---------------------------------------------------------------------------
// Collisions, duplicates, capacity
// ---------------------------------------------------------------------------

#[test]
fn colliding_key_survives_removal_and_reload() {
    let (_dir, path) = store_path();
    let mut store = RecordStore::open(&path, 100, no_codec()).unwrap();

    // "ab" and "ba" share both hashes and therefore a probe sequence.
    store.insert("ab", "first", "").unwrap();
    store.insert("ba", "second", "").unwrap();
    store.remove("ab", "");
    assert_eq!(store.get("ba", ""), Some("second"));
    store.close().unwrap();

    let store = RecordStore::open(&path, 100, no_codec()).unwrap();
    assert_eq!(store.get("ba", ""), Some("second"));
    assert!(!store.contains("ab", ""));
}

#[test]
fn duplicate_lookup_order_survives_reload() {
    let (_dir, path) = store_path();
    let mut store = RecordStore::open(&path, 100, no_codec()).unwrap();
    store.insert("github", "older", "alice").unwrap();
    store.insert("github", "newer", "alice").unwrap();
    assert_eq!(store.get("github", "alice"), Some("older"));
    store.close().unwrap();

    let mut store = RecordStore::open(&path, 100, no_codec()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("github", "alice"), Some("older"));
    assert_eq!(store.remove_all("github", "alice"), 2);
}

#[test]
fn full_table_reports_capacity_exhausted() {
    let mut index = HashIndex::new(10).unwrap();
    for i in 0..10 {
        index.insert(&format!("key{i}"), "v", "").unwrap();
    }

    let err = index.insert("one-too-many", "v", "").unwrap_err();
    assert!(matches!(err, CredVaultError::CapacityExhausted { capacity: 10 }));

    // Every record is still reachable.
    for i in 0..10 {
        assert!(index.contains(&format!("key{i}"), ""));
    }
}

#[test]
fn full_table_of_one_key_reports_capacity_exhausted() {
    let mut index = HashIndex::new(5).unwrap();
    for i in 0..5 {
        index.insert("same", &i.to_string(), "owner").unwrap();
    }
    assert!(index.insert("same", "6", "owner").is_err());
    assert_eq!(index.get("same", "owner"), Some("0"));
}

#[test]
fn store_insert_on_full_table_fails_without_marking_dirty() {
    let (_dir, path) = store_path();
    let mut store = RecordStore::open(&path, 2, no_codec()).unwrap();
    store.insert("a", "1", "").unwrap();
    store.insert("b", "2", "").unwrap();
    store.save().unwrap();

    assert!(matches!(
        store.insert("c", "3", ""),
        Err(CredVaultError::CapacityExhausted { capacity: 2 })
    ));
    assert!(!store.is_dirty());
}

#[test]
fn unreadable_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be cannot be read as text.
    let path = dir.path().join("vault.txt");
    fs::create_dir(&path).unwrap();

    let result = RecordStore::open(&path, 100, no_codec());
    assert!(matches!(result, Err(CredVaultError::Io(_))));
}
