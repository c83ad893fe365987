//! Write-then-read tests through files on disk.

use crate::format::{read_dataset, read_header, write_dataset};
use crate::model::{BuildStage, Dataset, Version};
use crate::test_data::{TempFile, label_for, synthetic_dataset};

fn roundtrip(dataset: &Dataset) -> Dataset {
    let file = TempFile::new(".jdx");
    write_dataset(file.path(), dataset).unwrap();
    read_dataset(file.path()).unwrap()
}

#[test]
fn test_roundtrip_item_counts() {
    for count in [0, 1, 1000] {
        let dataset = synthetic_dataset(Version::current(), 28, 28, 1, count);
        let restored = roundtrip(&dataset);
        assert_eq!(restored, dataset, "item count {}", count);
    }
}

#[test]
fn test_roundtrip_rgb() {
    let dataset = synthetic_dataset(Version::current(), 32, 32, 3, 10);
    let restored = roundtrip(&dataset);

    assert_eq!(restored.header().item_byte_size(), 32 * 32 * 3);
    assert_eq!(restored, dataset);
}

#[test]
fn test_items_keep_file_order() {
    let dataset = synthetic_dataset(Version::current(), 2, 2, 1, 25);
    let restored = roundtrip(&dataset);

    let expected: Vec<i32> = (0..25).map(label_for).collect();
    assert_eq!(restored.labels(), expected);
}

#[test]
fn test_every_item_sized_from_header() {
    let dataset = synthetic_dataset(Version::current(), 7, 5, 4, 12);
    let restored = roundtrip(&dataset);

    let size = restored.header().item_byte_size();
    assert_eq!(size, 7 * 5 * 4);
    assert!(restored.iter().all(|item| item.len() == size));
}

#[test]
fn test_header_only_read_matches_full_read() {
    let dataset = synthetic_dataset(Version::current(), 28, 28, 1, 50);
    let file = TempFile::new(".jdx");
    write_dataset(file.path(), &dataset).unwrap();

    let header = read_header(file.path()).unwrap();
    let full = read_dataset(file.path()).unwrap();
    assert_eq!(&header, full.header());
}

#[test]
fn test_prerelease_version_is_readable() {
    let version = Version::new(1, 0, 3, BuildStage::Beta);
    let dataset = synthetic_dataset(version, 3, 3, 1, 4);
    let restored = roundtrip(&dataset);

    assert_eq!(restored.header().version(), version);
    assert_eq!(restored, dataset);
}

#[test]
fn test_legacy_roundtrip() {
    let version = Version::new(0, 9, 0, BuildStage::Release);
    let dataset = synthetic_dataset(version, 28, 28, 1, 100);
    let restored = roundtrip(&dataset);

    let header = restored.header();
    assert!(header.is_legacy());
    assert!(header.compressed_size().is_some());
    assert_eq!(header.item_count(), 100);
    assert_eq!(dataset.header().compressed_size(), None);
    assert_eq!(restored, dataset);
}

#[test]
fn test_legacy_empty_roundtrip() {
    let version = Version::new(0, 9, 0, BuildStage::Release);
    let dataset = synthetic_dataset(version, 4, 4, 1, 0);
    let restored = roundtrip(&dataset);

    assert!(restored.is_empty());
    assert_eq!(restored.header().compressed_size(), Some(0));
    assert_eq!(restored, dataset);
}

#[test]
fn test_in_memory_roundtrip() {
    let dataset = synthetic_dataset(Version::current(), 6, 6, 2, 9);
    let bytes = dataset.to_bytes().unwrap();

    let mut written = Vec::new();
    dataset.write_to(&mut written).unwrap();
    assert_eq!(written, bytes);

    let restored = crate::format::Loader::new(bytes.as_slice())
        .read_dataset()
        .unwrap();
    assert_eq!(restored, dataset);
}
