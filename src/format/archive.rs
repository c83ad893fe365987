//! Reading JDX files packed inside ZIP archives.
//!
//! Entries are decoded in place through the archive's decompressing reader;
//! nothing is extracted to disk.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::config::LoaderConfig;
use crate::constants::FILE_EXTENSION;
use crate::format::Result;
use crate::format::loader::Loader;
use crate::model::{Dataset, Header};

/// Check if an archive entry name looks like a JDX file.
fn is_jdx_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    // Skip hidden files and macOS metadata
    if lower.contains("__macosx") || lower.contains("/.") || lower.starts_with('.') {
        return false;
    }
    Path::new(&lower)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == FILE_EXTENSION)
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
    log::debug!("Opening ZIP file: {:?}", path);
    Ok(ZipArchive::new(File::open(path)?)?)
}

/// Names of the JDX entries in an archive, sorted.
fn jdx_entries<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();

        if file.is_dir() {
            log::trace!("Skipping directory: {}", name);
            continue;
        }
        if !is_jdx_entry(&name) {
            log::trace!("Skipping non-JDX entry: {}", name);
            continue;
        }
        names.push(name);
    }

    // Sort names for consistent ordering
    names.sort();
    Ok(names)
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: &str,
    config: &LoaderConfig,
) -> Result<Dataset> {
    let file = archive.by_name(entry)?;
    log::debug!("Decoding '{}' ({} bytes uncompressed)", entry, file.size());
    Loader::with_config(file, config.clone())
        .named(entry)
        .read_dataset()
}

/// List the JDX entries of a ZIP archive, sorted by name.
pub fn list_entries(path: impl AsRef<Path>) -> Result<Vec<String>> {
    jdx_entries(&mut open_archive(path.as_ref())?)
}

/// Read only the header of one archive entry.
pub fn read_header_from_zip(path: impl AsRef<Path>, entry: &str) -> Result<Header> {
    let mut archive = open_archive(path.as_ref())?;
    let file = archive.by_name(entry)?;
    Loader::new(file).named(entry).read_header()
}

/// Read one archive entry as a dataset.
pub fn read_dataset_from_zip(path: impl AsRef<Path>, entry: &str) -> Result<Dataset> {
    let mut archive = open_archive(path.as_ref())?;
    read_entry(&mut archive, entry, &LoaderConfig::default())
}

/// Read every JDX entry of an archive, in name order.
///
/// The first entry that fails to decode aborts the whole read.
pub fn read_all_from_zip(
    path: impl AsRef<Path>,
    config: &LoaderConfig,
) -> Result<Vec<(String, Dataset)>> {
    let path = path.as_ref();
    let mut archive = open_archive(path)?;
    let names = jdx_entries(&mut archive)?;

    let mut datasets = Vec::with_capacity(names.len());
    for name in names {
        let dataset = read_entry(&mut archive, &name, config)?;
        datasets.push((name, dataset));
    }

    log::info!("Read {} datasets from ZIP {:?}", datasets.len(), path);
    Ok(datasets)
}
