//! JDX - labeled raster dataset container
//!
//! Reader (and round-trip writer) for JDX files: a fixed header describing
//! image geometry and item count, followed by one `label + pixels` record per
//! item.
//!
//! ```rust,ignore
//! let header = jdx::read_header("train.jdx")?;
//! let dataset = jdx::read_dataset("train.jdx")?;
//! assert_eq!(&header, dataset.header());
//! ```

pub mod config;
pub mod constants;
pub mod format;
pub mod model;

#[cfg(test)]
mod test_data;

pub use config::{ConfigError, LoaderConfig, LogLevel};
pub use format::{
    ErrorKind, JdxError, Loader, LoaderState, Result, read_dataset, read_dataset_with,
    read_header, read_header_with, write_dataset,
};
pub use model::{BuildStage, Dataset, Header, Item, Version, version_string};
