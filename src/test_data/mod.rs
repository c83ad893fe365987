//! Synthetic datasets and scratch files for tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{Dataset, Header, Item, Version};

static NEXT_TEMP_ID: AtomicUsize = AtomicUsize::new(0);

/// Pixel value of byte `offset` in item `index`.
fn pattern(index: u64, offset: usize) -> u8 {
    ((index as usize * 31 + offset * 7) % 251) as u8
}

/// Label assigned to item `index`; spans negative values too.
pub fn label_for(index: u64) -> i32 {
    (index % 10) as i32 - 3
}

/// Build a dataset of `count` items with a deterministic pixel pattern.
pub fn synthetic_dataset(
    version: Version,
    width: u32,
    height: u32,
    bit_depth: u32,
    count: u64,
) -> Dataset {
    let header = Header::new(version, width, height, bit_depth, count).unwrap();
    let size = header.item_byte_size();
    let items = (0..count)
        .map(|index| {
            let data = (0..size).map(|offset| pattern(index, offset)).collect();
            Item::new(data, label_for(index))
        })
        .collect();
    Dataset::new(header, items).unwrap()
}

/// Small v1.x dataset used where the geometry does not matter.
pub fn small_dataset(count: u64) -> Dataset {
    synthetic_dataset(Version::current(), 4, 3, 2, count)
}

/// A file under the system temp directory, removed on drop.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    /// Reserve a unique path ending in `suffix`.
    pub fn new(suffix: &str) -> Self {
        let id = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "jdx-test-{}-{}{}",
            std::process::id(),
            id,
            suffix
        ));
        Self { path }
    }

    /// Create the file with `bytes` as its contents.
    pub fn with_bytes(suffix: &str, bytes: &[u8]) -> Self {
        let file = Self::new(suffix);
        std::fs::write(&file.path, bytes).unwrap();
        file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
