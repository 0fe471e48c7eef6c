//! Tests for WAL Recovery
//!
//! These tests verify:
//! - Recovery from an empty WAL
//! - Replay reproduces the MemTable produced by live traffic
//! - Later records override earlier ones for the same key
//! - A torn trailing record aborts recovery

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use lsmcore::memtable::{MemTable, Value};
use lsmcore::wal::{RecoveryStats, Wal, WalRecord};
use lsmcore::LsmError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn live(v: &[u8]) -> Option<Value> {
    Some(Value::Live(v.to_vec()))
}

/// The mixed workload used across recovery tests
fn workload() -> Vec<WalRecord> {
    vec![
        WalRecord::put(b"a".to_vec(), b"A".to_vec()),
        WalRecord::put(b"b".to_vec(), b"BB".to_vec()),
        WalRecord::put(b"c".to_vec(), b"CCC".to_vec()),
        WalRecord::put(b"f".to_vec(), b"FFFFF".to_vec()),
        WalRecord::put(b"g".to_vec(), b"GGGGGG".to_vec()),
        WalRecord::delete(b"a".to_vec()),
        WalRecord::delete(b"c".to_vec()),
        WalRecord::delete(b"d".to_vec()),
        WalRecord::delete(b"e".to_vec()),
        WalRecord::put(b"z".to_vec(), b"".to_vec()),
    ]
}

// =============================================================================
// Recover: Clean WAL Tests
// =============================================================================

#[test]
fn test_recover_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();

    let (memtable, stats) = wal.recover_with_stats().unwrap();

    assert!(memtable.is_empty());
    assert_eq!(stats, RecoveryStats::default());
}

#[test]
fn test_recover_mixed_workload() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();
    for record in workload() {
        wal.append(&record).unwrap();
    }

    let memtable = wal.recover().unwrap();

    assert_eq!(memtable.get(b"b"), live(b"BB"));
    assert_eq!(memtable.get(b"f"), live(b"FFFFF"));
    assert_eq!(memtable.get(b"g"), live(b"GGGGGG"));
    assert_eq!(memtable.get(b"z"), live(b""));

    for key in [&b"a"[..], b"c", b"d", b"e"] {
        assert_eq!(memtable.get(key), Some(Value::Tombstone));
    }

    assert_eq!(memtable.get(b"x"), None);
    assert_eq!(memtable.entry_count(), 8);
}

#[test]
fn test_recover_matches_direct_application() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();
    let direct = MemTable::new();

    for record in workload() {
        wal.append(&record).unwrap();
        match record.operation {
            lsmcore::wal::Operation::Put => direct.put(record.key, record.value),
            lsmcore::wal::Operation::Del => direct.delete(record.key),
        };
    }

    let recovered = wal.recover().unwrap();

    assert_eq!(recovered.size(), direct.size());
    assert_eq!(recovered.entry_count(), direct.entry_count());
    for key in [&b"a"[..], b"b", b"c", b"d", b"e", b"f", b"g", b"z", b"missing"] {
        assert_eq!(recovered.get(key), direct.get(key));
    }
}

#[test]
fn test_recover_later_records_win() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();

    wal.append(&WalRecord::put(b"k".to_vec(), b"v1".to_vec())).unwrap();
    wal.append(&WalRecord::delete(b"k".to_vec())).unwrap();
    wal.append(&WalRecord::put(b"k".to_vec(), b"v3".to_vec())).unwrap();

    let memtable = wal.recover().unwrap();

    assert_eq!(memtable.get(b"k"), live(b"v3"));
}

#[test]
fn test_recover_stats() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();
    for record in workload() {
        wal.append(&record).unwrap();
    }

    let (_, stats) = wal.recover_with_stats().unwrap();

    assert_eq!(stats.records, 10);
    assert_eq!(stats.puts, 6);
    assert_eq!(stats.deletes, 4);
    assert_eq!(stats.bytes_read, wal.size());
}

#[test]
fn test_recover_after_reopen() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let wal = Wal::open(&wal_path).unwrap();
        for record in workload() {
            wal.append(&record).unwrap();
        }
        // Dropped without close, as in a crash after the last append
    }

    let wal = Wal::open(&wal_path).unwrap();
    let memtable = wal.recover().unwrap();

    assert_eq!(memtable.get(b"g"), live(b"GGGGGG"));
    assert_eq!(memtable.get(b"a"), Some(Value::Tombstone));
}

#[test]
fn test_recover_does_not_modify_log() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();
    wal.append(&WalRecord::put(b"k".to_vec(), b"v".to_vec())).unwrap();
    let size = wal.size();

    wal.recover().unwrap();
    wal.recover().unwrap();

    assert_eq!(wal.size(), size);
    assert_eq!(std::fs::metadata(&wal_path).unwrap().len(), size);
}

// =============================================================================
// Recover: Failure Tests
// =============================================================================

#[test]
fn test_recover_fails_on_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let wal = Wal::open(&wal_path).unwrap();
        wal.append(&WalRecord::put(b"k".to_vec(), b"v".to_vec())).unwrap();
        wal.close().unwrap();
    }
    {
        // Half a record, as left by a crash mid-write
        let partial = WalRecord::put(b"key2".to_vec(), b"value2".to_vec()).encode();
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&partial[..20]).unwrap();
    }

    let wal = Wal::open(&wal_path).unwrap();
    let result = wal.recover();

    assert!(matches!(result, Err(LsmError::WalCorruption(_))));
}

#[test]
fn test_recover_on_closed_wal_fails() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();
    wal.close().unwrap();

    assert!(matches!(wal.recover(), Err(LsmError::Closed(_))));
}
