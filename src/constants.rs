//! Global constants for the JDX container layout

/// Magic bytes at the start of every JDX file
pub const MAGIC: &[u8; 3] = b"JDX";

/// Size of the on-disk version block (major, minor, patch, build stage tag)
pub const VERSION_BYTES: usize = 4;

/// Size of the canonical header region
pub const HEADER_BYTES: usize = MAGIC.len() + VERSION_BYTES + 4 + 4 + 4 + 8;

/// Size of the legacy header region (canonical + compressed body size)
pub const LEGACY_HEADER_BYTES: usize = HEADER_BYTES + 8;

/// Size of the label field at the start of every item record
pub const LABEL_BYTES: usize = 4;

/// Format major version that still uses the compressed-body layout
pub const LEGACY_MAJOR: u8 = 0;

/// Default ceiling on the declared item payload of a single dataset (4 GiB)
pub const DEFAULT_MAX_DATASET_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// File extension for JDX datasets
pub const FILE_EXTENSION: &str = "jdx";
