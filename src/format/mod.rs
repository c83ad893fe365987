//! JDX container encoding and decoding.
//!
//! A JDX file is a fixed header followed by one record per item. The byte
//! layout is documented in the `layout` module; the decode pipeline lives in
//! [`Loader`].
//!
//! ## Layouts
//!
//! - **v1.x**: 27-byte header, then raw `label + pixels` records
//! - **v0.x (legacy)**: 35-byte header carrying the compressed body size,
//!   then the same records compressed as one [`BodyCodec`] stream
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jdx::format::{read_dataset, read_header};
//!
//! let header = read_header("train.jdx")?;
//! println!("{} items of {} bytes", header.item_count(), header.item_byte_size());
//!
//! let dataset = read_dataset("train.jdx")?;
//! for item in &dataset {
//!     println!("label {}", item.label());
//! }
//! ```

pub mod archive;
mod codec;
mod error;
mod layout;
mod loader;
mod staging;
mod writer;

#[cfg(test)]
mod tests;

pub use codec::{BodyCodec, DeflateCodec};
pub use error::{ErrorKind, JdxError, Region, Result};
pub use loader::{
    Loader, LoaderState, read_dataset, read_dataset_with, read_header, read_header_with,
};
pub use staging::StagingStats;
pub use writer::{write_dataset, write_dataset_to, write_dataset_with_codec};
