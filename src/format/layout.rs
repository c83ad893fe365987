//! Byte layout of the JDX header and item records.
//!
//! All integers are little-endian.
//!
//! ```text
//! offset  size  field
//!      0     3  magic "JDX"
//!      3     1  version.major
//!      4     1  version.minor
//!      5     1  version.patch
//!      6     1  version.build_stage (0=dev 1=alpha 2=beta 3=rc 4=release)
//!      7     4  image_width  u32
//!     11     4  image_height u32
//!     15     4  bit_depth    u32 (bytes per pixel)
//!     19     8  item_count   u64
//!     27     8  compressed_size u64   (v0.x only)
//! ```
//!
//! v1.x files follow the header with `item_count` records of
//! `label: i32` + `image_width * image_height * bit_depth` pixel bytes.
//! v0.x files follow it with `compressed_size` bytes holding the same
//! records compressed by a [`BodyCodec`](super::BodyCodec).

use std::io::{self, Read};

use crate::config::LoaderConfig;
use crate::constants::{HEADER_BYTES, LABEL_BYTES, LEGACY_HEADER_BYTES, LEGACY_MAJOR, MAGIC};
use crate::format::{JdxError, Region, Result};
use crate::model::{BuildStage, Header, Item, Version, checked_item_byte_size};

/// Read until `buf` is full or the stream ends. Returns the bytes read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Append up to `len` bytes to `buf`. Returns the bytes read.
///
/// `buf` grows with the data actually present, not with `len`.
pub(crate) fn read_bounded<R: Read + ?Sized>(
    reader: &mut R,
    len: u64,
    buf: &mut Vec<u8>,
) -> io::Result<usize> {
    Read::take(&mut *reader, len).read_to_end(buf)
}

/// Read exactly `buf.len()` bytes of `region`, reporting a short read as truncation.
pub(crate) fn read_region<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    region: Region,
    offset: usize,
) -> Result<()> {
    let found = read_full(reader, buf)?;
    if found < buf.len() {
        return Err(JdxError::truncated(
            region,
            (offset + buf.len()) as u64,
            (offset + found) as u64,
        ));
    }
    Ok(())
}

/// Whether this decoder can read files stamped with `version`.
///
/// v0.x is the legacy layout. For v1 and later the major version must match
/// and the minor version must not be newer than ours. Build stage is ignored.
pub(crate) fn check_supported(version: Version, config: &LoaderConfig) -> Result<()> {
    let current = Version::current();
    let supported = if version.major == LEGACY_MAJOR {
        config.allow_legacy
    } else {
        version.major == current.major && version.minor <= current.minor
    };

    if supported {
        Ok(())
    } else {
        Err(JdxError::VersionMismatch {
            supported: current,
            found: version,
        })
    }
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// Decode and validate a header, consuming exactly its on-disk region.
pub(crate) fn decode_header<R: Read + ?Sized>(
    reader: &mut R,
    config: &LoaderConfig,
) -> Result<Header> {
    let mut bytes = [0u8; LEGACY_HEADER_BYTES];
    read_region(reader, &mut bytes[..HEADER_BYTES], Region::Header, 0)?;

    let mut magic = [0u8; 3];
    magic.copy_from_slice(&bytes[..MAGIC.len()]);
    if &magic != MAGIC {
        return Err(JdxError::BadMagic { found: magic });
    }

    let stage_tag = bytes[6];
    let build_stage = BuildStage::from_u8(stage_tag).ok_or_else(|| {
        JdxError::invalid_format(format!("unknown build stage tag {}", stage_tag))
    })?;
    let version = Version::new(bytes[3], bytes[4], bytes[5], build_stage);
    check_supported(version, config)?;

    let image_width = u32_at(&bytes, 7);
    let image_height = u32_at(&bytes, 11);
    let bit_depth = u32_at(&bytes, 15);
    let item_count = u64_at(&bytes, 19);

    for (field, value) in [
        ("image_width", image_width),
        ("image_height", image_height),
        ("bit_depth", bit_depth),
    ] {
        if value == 0 {
            return Err(JdxError::ZeroDimension { field });
        }
    }

    if checked_item_byte_size(image_width, image_height, bit_depth).is_none() {
        return Err(JdxError::invalid_format(format!(
            "item size {}x{}x{} overflows",
            image_width, image_height, bit_depth
        )));
    }

    let compressed_size = if version.major == LEGACY_MAJOR {
        read_region(
            reader,
            &mut bytes[HEADER_BYTES..],
            Region::Header,
            HEADER_BYTES,
        )?;
        Some(u64_at(&bytes, HEADER_BYTES))
    } else {
        None
    };

    Ok(Header::from_parts(
        version,
        image_width,
        image_height,
        bit_depth,
        item_count,
        compressed_size,
    ))
}

/// Encode a header. Legacy headers need the compressed body size.
pub(crate) fn encode_header(header: &Header, compressed_size: Option<u64>) -> Vec<u8> {
    let version = header.version();
    let mut out = Vec::with_capacity(header.encoded_len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[
        version.major,
        version.minor,
        version.patch,
        version.build_stage.as_u8(),
    ]);
    out.extend_from_slice(&header.image_width().to_le_bytes());
    out.extend_from_slice(&header.image_height().to_le_bytes());
    out.extend_from_slice(&header.bit_depth().to_le_bytes());
    out.extend_from_slice(&header.item_count().to_le_bytes());
    if header.is_legacy() {
        out.extend_from_slice(&compressed_size.unwrap_or(0).to_le_bytes());
    }
    out
}

/// Split one record into an owned item, copying the pixel bytes.
pub(crate) fn decode_record(record: &[u8]) -> Item {
    let mut label = [0u8; LABEL_BYTES];
    label.copy_from_slice(&record[..LABEL_BYTES]);
    Item::new(record[LABEL_BYTES..].to_vec(), i32::from_le_bytes(label))
}

/// Append one record (label + pixels) to `out`.
pub(crate) fn encode_record(item: &Item, out: &mut Vec<u8>) {
    out.extend_from_slice(&item.label().to_le_bytes());
    out.extend_from_slice(item.data());
}
