//! Tests for the Strata error handling system.

use std::collections::HashSet;
use std::path::PathBuf;

use strata_core::errors::error_code::{self, StrataErrorCode};
use strata_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let codes = [
        ScanError::Cancelled.error_code(),
        ParseError::UnsupportedLanguage {
            extension: "xyz".into(),
        }
        .error_code(),
        StorageError::DbBusy.error_code(),
        LockError::StaleLock {
            path: PathBuf::from("/tmp/index.lock"),
            pid: Some(7),
        }
        .error_code(),
        HistoryError::Git {
            message: "bad object".into(),
        }
        .error_code(),
        GraphError::SymbolNotFound { id: 3 }.error_code(),
        ConfigError::FileNotFound {
            path: "/tmp".into(),
        }
        .error_code(),
        PipelineError::Cancelled.error_code(),
    ];
    for code in codes {
        assert!(!code.is_empty());
    }
}

#[test]
fn test_pipeline_error_delegates_codes() {
    let err = PipelineError::from(StorageError::SchemaMismatch {
        found: 9,
        supported: 2,
    });
    assert_eq!(err.error_code(), error_code::SCHEMA_MISMATCH);

    let err = PipelineError::from(LockError::ConcurrentRunConflict {
        path: PathBuf::from(".strata/index.lock"),
        pid: Some(1234),
    });
    assert_eq!(err.error_code(), error_code::CONCURRENT_RUN);

    let err = PipelineError::from(ScanError::Cancelled);
    assert_eq!(err.error_code(), error_code::CANCELLED);
}

#[test]
fn test_tagged_format() {
    let err = StorageError::MigrationFailed {
        version: 2,
        message: "no such table".into(),
    };
    let tagged = err.tagged();
    assert!(tagged.starts_with("[MIGRATION_FAILED] "));
    assert!(tagged.contains("v2"));
}

#[test]
fn test_lock_and_storage_codes_are_distinct() {
    let codes: HashSet<&str> = [
        LockError::ConcurrentRunConflict {
            path: PathBuf::new(),
            pid: None,
        }
        .error_code(),
        LockError::StaleLock {
            path: PathBuf::new(),
            pid: None,
        }
        .error_code(),
        StorageError::MigrationFailed {
            version: 1,
            message: String::new(),
        }
        .error_code(),
        StorageError::SchemaMismatch {
            found: 3,
            supported: 2,
        }
        .error_code(),
        StorageError::DiskFull.error_code(),
    ]
    .into_iter()
    .collect();
    assert_eq!(codes.len(), 5);
}

#[test]
fn test_parse_errors_name_the_file_or_grammar() {
    let err = ParseError::NoTree {
        path: "src/slow.py".into(),
    };
    assert!(err.to_string().contains("src/slow.py"));
    assert_eq!(err.error_code(), error_code::PARSE_ERROR);

    let wrapped = PipelineError::from(ParseError::GrammarRejected {
        language: "kotlin".into(),
        message: "abi 15".into(),
    });
    assert_eq!(wrapped.error_code(), error_code::PARSE_ERROR);
    assert!(wrapped.tagged().starts_with("[PARSE_ERROR] extraction: kotlin"));
}

#[test]
fn test_display_messages_carry_context() {
    let err = ScanError::RootNotFound {
        path: PathBuf::from("/work/missing-repo"),
    };
    let msg = err.to_string();
    assert!(msg.contains("/work/missing-repo"));
    assert_eq!(err.error_code(), error_code::SCAN_ERROR);

    let err = LockError::StaleLock {
        path: PathBuf::from(".strata/index.lock"),
        pid: Some(4242),
    };
    assert!(err.to_string().contains("4242"));
}
