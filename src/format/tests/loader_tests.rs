//! Loader state machine, staging release and configuration limits.

use crate::config::LoaderConfig;
use crate::constants::HEADER_BYTES;
use crate::format::{
    ErrorKind, JdxError, Loader, LoaderState, StagingStats, read_dataset_with, read_header_with,
};
use crate::model::{BuildStage, Version};
use crate::test_data::{TempFile, small_dataset, synthetic_dataset};

#[test]
fn test_header_only_states() {
    let bytes = small_dataset(2).to_bytes().unwrap();
    let mut loader = Loader::new(bytes.as_slice());
    assert_eq!(loader.state(), LoaderState::Unopened);

    let header = loader.parse_header().unwrap().clone();
    assert_eq!(loader.state(), LoaderState::HeaderParsed);
    assert_eq!(loader.header(), Some(&header));

    assert_eq!(loader.read_header().unwrap(), header);
    assert_eq!(loader.state(), LoaderState::Done);
    assert!(loader.state().is_terminal());
}

#[test]
fn test_full_read_states() {
    let bytes = small_dataset(2).to_bytes().unwrap();
    let mut loader = Loader::new(bytes.as_slice());

    let dataset = loader.read_dataset().unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(loader.state(), LoaderState::Complete);
}

#[test]
fn test_no_reentry_after_terminal_state() {
    let bytes = small_dataset(1).to_bytes().unwrap();

    let mut loader = Loader::new(bytes.as_slice());
    loader.read_header().unwrap();
    let err = loader.read_dataset().unwrap_err();
    assert!(matches!(err, JdxError::InvalidState { .. }));
    assert_eq!(err.kind(), ErrorKind::Value);
    // misuse is reported without moving the loader
    assert_eq!(loader.state(), LoaderState::Done);

    let mut loader = Loader::new(bytes.as_slice());
    loader.read_dataset().unwrap();
    assert!(loader.parse_header().is_err());
    assert!(loader.read_header().is_err());
    assert_eq!(loader.state(), LoaderState::Complete);
}

#[test]
fn test_failed_state_records_kind() {
    let mut bytes = small_dataset(1).to_bytes().unwrap();
    bytes[0] = b'X';

    let mut loader = Loader::new(bytes.as_slice());
    assert!(loader.read_dataset().is_err());
    assert_eq!(loader.state(), LoaderState::Failed(ErrorKind::Format));
    assert!(loader.header().is_none());
    assert!(loader.read_header().is_err());
}

#[test]
fn test_staging_released_on_success() {
    let bytes = small_dataset(20).to_bytes().unwrap();
    let mut loader = Loader::new(bytes.as_slice());
    loader.read_dataset().unwrap();

    assert_eq!(
        loader.staging_stats(),
        StagingStats {
            acquired: 1,
            released: 1
        }
    );
}

#[test]
fn test_staging_released_on_failure() {
    let dataset = small_dataset(4);
    let bytes = dataset.to_bytes().unwrap();
    let record = dataset.header().record_byte_size();

    for cut in [HEADER_BYTES + 1, HEADER_BYTES + record, bytes.len() - 1] {
        let mut loader = Loader::new(&bytes[..cut]);
        assert!(loader.read_dataset().is_err());

        let stats = loader.staging_stats();
        assert_eq!(stats.acquired, 1, "cut at {}", cut);
        assert!(stats.is_balanced(), "cut at {}", cut);
    }
}

#[test]
fn test_legacy_staging_released() {
    let version = Version::new(0, 3, 1, BuildStage::Rc);
    let bytes = synthetic_dataset(version, 5, 5, 1, 8).to_bytes().unwrap();

    let mut loader = Loader::new(bytes.as_slice());
    loader.read_dataset().unwrap();
    let stats = loader.staging_stats();
    // compressed input and inflated body
    assert_eq!(stats.acquired, 2);
    assert!(stats.is_balanced());

    let mut loader = Loader::new(&bytes[..bytes.len() - 2]);
    assert!(loader.read_dataset().is_err());
    assert!(loader.staging_stats().is_balanced());
}

#[test]
fn test_empty_dataset_acquires_nothing() {
    let bytes = small_dataset(0).to_bytes().unwrap();
    assert_eq!(bytes.len(), HEADER_BYTES);

    let mut loader = Loader::new(bytes.as_slice());
    let dataset = loader.read_dataset().unwrap();
    assert!(dataset.is_empty());
    assert_eq!(loader.staging_stats(), StagingStats::default());
}

#[test]
fn test_header_only_acquires_nothing() {
    let bytes = small_dataset(5).to_bytes().unwrap();
    let mut loader = Loader::new(bytes.as_slice());
    loader.read_header().unwrap();
    assert_eq!(loader.staging_stats(), StagingStats::default());
}

#[test]
fn test_newer_version_rejected() {
    for version in [
        Version::new(2, 0, 0, BuildStage::Release),
        Version::new(1, 1, 0, BuildStage::Release),
    ] {
        let bytes = synthetic_dataset(version, 2, 2, 1, 1).to_bytes().unwrap();
        let err = Loader::new(bytes.as_slice()).read_header().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionMismatch, "{}", version);
        assert!(matches!(
            err,
            JdxError::VersionMismatch { found, .. } if found == version
        ));
    }
}

#[test]
fn test_legacy_disallowed_by_config() {
    let version = Version::new(0, 9, 0, BuildStage::Release);
    let file = TempFile::with_bytes(
        ".jdx",
        &synthetic_dataset(version, 2, 2, 1, 3).to_bytes().unwrap(),
    );

    let strict = LoaderConfig::default().allow_legacy(false);
    let err = read_header_with(file.path(), &strict).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionMismatch);
    assert!(read_dataset_with(file.path(), &LoaderConfig::default()).is_ok());
}

#[test]
fn test_payload_limit() {
    let dataset = synthetic_dataset(Version::current(), 10, 10, 1, 10);
    let file = TempFile::with_bytes(".jdx", &dataset.to_bytes().unwrap());

    let tight = LoaderConfig::default().max_dataset_bytes(100);
    let mut loader = Loader::open(file.path(), tight).unwrap();
    let err = loader.read_dataset().unwrap_err();
    assert!(matches!(
        err,
        JdxError::PayloadTooLarge {
            declared: 1040,
            limit: 100
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(loader.staging_stats(), StagingStats::default());

    // the header alone is still readable
    let tight = LoaderConfig::default().max_dataset_bytes(100);
    assert!(read_header_with(file.path(), &tight).is_ok());
}

#[test]
fn test_hostile_item_count_rejected_before_allocation() {
    let mut bytes = small_dataset(1).to_bytes().unwrap();
    bytes[19..27].copy_from_slice(&u64::MAX.to_le_bytes());

    let mut loader = Loader::new(bytes.as_slice());
    let err = loader.read_dataset().unwrap_err();
    assert!(matches!(err, JdxError::PayloadTooLarge { .. }));
    assert_eq!(loader.staging_stats(), StagingStats::default());
}
