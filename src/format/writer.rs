//! Encoder for JDX files, the inverse of the loader.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::format::Result;
use crate::format::codec::{BodyCodec, DeflateCodec};
use crate::format::layout::{encode_header, encode_record};
use crate::model::Dataset;

/// Write a dataset to a file.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing {} items to {:?}", dataset.len(), path);

    let mut writer = BufWriter::new(File::create(path)?);
    write_dataset_to(&mut writer, dataset)?;
    writer.flush()?;
    Ok(())
}

/// Encode a dataset into any writer.
///
/// v1.x headers are followed by raw records; v0.x headers by a body
/// compressed with [`DeflateCodec`].
pub fn write_dataset_to<W: Write + ?Sized>(writer: &mut W, dataset: &Dataset) -> Result<()> {
    write_dataset_with_codec(writer, dataset, &DeflateCodec::default())
}

/// Encode a dataset, compressing legacy bodies with `codec`.
pub fn write_dataset_with_codec<W: Write + ?Sized>(
    writer: &mut W,
    dataset: &Dataset,
    codec: &dyn BodyCodec,
) -> Result<()> {
    let header = dataset.header();

    if header.is_legacy() && dataset.is_empty() {
        // an empty legacy file has no body at all
        writer.write_all(&encode_header(header, Some(0)))?;
    } else if header.is_legacy() {
        let mut body = Vec::with_capacity(header.record_byte_size() * dataset.len());
        for item in dataset {
            encode_record(item, &mut body);
        }
        let compressed = codec.compress(&body)?;
        log::debug!(
            "Compressed {} body bytes to {} with {}",
            body.len(),
            compressed.len(),
            codec.id()
        );

        writer.write_all(&encode_header(header, Some(compressed.len() as u64)))?;
        writer.write_all(&compressed)?;
    } else {
        writer.write_all(&encode_header(header, None))?;

        let mut record = Vec::with_capacity(header.record_byte_size());
        for item in dataset {
            record.clear();
            encode_record(item, &mut record);
            writer.write_all(&record)?;
        }
    }

    Ok(())
}
