//! Data models for JDX datasets.

mod dataset;
mod header;
mod item;
mod version;

pub use dataset::Dataset;
pub use header::Header;
pub(crate) use header::checked_item_byte_size;
pub use item::Item;
pub use version::{BuildStage, Version, version_string};
