//! Dataset header: format version, image geometry and item count.

use serde::Serialize;

use crate::constants::{HEADER_BYTES, LABEL_BYTES, LEGACY_HEADER_BYTES, LEGACY_MAJOR};
use crate::format::{JdxError, Result};
use crate::model::Version;

/// Fixed-layout metadata describing a dataset.
///
/// Every dimension is non-zero and `image_width * image_height * bit_depth`
/// fits in `usize`; both are checked by [`Header::new`] and by the decoder.
///
/// Equality compares the version, geometry and item count. The compressed
/// body size is an encoding detail of the legacy layout and is ignored.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Header {
    version: Version,
    image_width: u32,
    image_height: u32,
    bit_depth: u32,
    item_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    compressed_size: Option<u64>,
}

impl Header {
    /// Create a header, validating the image geometry.
    ///
    /// `bit_depth` is the number of bytes per pixel.
    pub fn new(
        version: Version,
        image_width: u32,
        image_height: u32,
        bit_depth: u32,
        item_count: u64,
    ) -> Result<Self> {
        for (name, value) in [
            ("image_width", image_width),
            ("image_height", image_height),
            ("bit_depth", bit_depth),
        ] {
            if value == 0 {
                return Err(JdxError::invalid_argument(name, "must be non-zero"));
            }
        }

        checked_item_byte_size(image_width, image_height, bit_depth).ok_or_else(|| {
            JdxError::invalid_argument(
                "image_width*image_height*bit_depth",
                format!(
                    "{}x{}x{} overflows the addressable item size",
                    image_width, image_height, bit_depth
                ),
            )
        })?;

        Ok(Self {
            version,
            image_width,
            image_height,
            bit_depth,
            item_count,
            compressed_size: None,
        })
    }

    /// Attach the compressed body size carried by the legacy layout.
    pub fn with_compressed_size(mut self, compressed_size: u64) -> Result<Self> {
        if !self.is_legacy() {
            return Err(JdxError::invalid_argument(
                "compressed_size",
                format!(
                    "only legacy (v0.x) headers carry a compressed size, header is {}",
                    self.version
                ),
            ));
        }
        self.compressed_size = Some(compressed_size);
        Ok(self)
    }

    /// Build a header from fields already validated by the decoder.
    pub(crate) fn from_parts(
        version: Version,
        image_width: u32,
        image_height: u32,
        bit_depth: u32,
        item_count: u64,
        compressed_size: Option<u64>,
    ) -> Self {
        Self {
            version,
            image_width,
            image_height,
            bit_depth,
            item_count,
            compressed_size,
        }
    }

    /// Format version stamped in the header.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Image width in pixels.
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Image height in pixels.
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Bytes per pixel.
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Number of items declared.
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Size of the compressed body, present only for legacy headers read from disk.
    pub fn compressed_size(&self) -> Option<u64> {
        self.compressed_size
    }

    /// Length of every item's pixel buffer: `image_width * image_height * bit_depth`.
    pub fn item_byte_size(&self) -> usize {
        // Invariant established at construction.
        self.image_width as usize * self.image_height as usize * self.bit_depth as usize
    }

    /// Length of one on-disk record (label + pixels).
    pub fn record_byte_size(&self) -> usize {
        LABEL_BYTES + self.item_byte_size()
    }

    /// Total bytes of all records, or `None` on overflow.
    pub fn payload_byte_size(&self) -> Option<u64> {
        (self.record_byte_size() as u64).checked_mul(self.item_count)
    }

    /// True when this header uses the compressed-body layout.
    pub fn is_legacy(&self) -> bool {
        self.version.major == LEGACY_MAJOR
    }

    /// Size of this header's on-disk region.
    pub fn encoded_len(&self) -> usize {
        if self.is_legacy() {
            LEGACY_HEADER_BYTES
        } else {
            HEADER_BYTES
        }
    }

    /// Same header with a different item count.
    #[cfg(test)]
    pub(crate) fn with_item_count(&self, item_count: u64) -> Self {
        Self {
            item_count,
            ..self.clone()
        }
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.image_width == other.image_width
            && self.image_height == other.image_height
            && self.bit_depth == other.bit_depth
            && self.item_count == other.item_count
    }
}

/// `width * height * depth` as `usize`, or `None` on overflow.
pub(crate) fn checked_item_byte_size(width: u32, height: u32, depth: u32) -> Option<usize> {
    let size = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(depth as usize)?;
    // the record (label + pixels) must be addressable too
    size.checked_add(LABEL_BYTES)?;
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ErrorKind;
    use crate::model::BuildStage;

    #[test]
    fn test_item_byte_size() {
        let header = Header::new(Version::current(), 28, 28, 1, 10).unwrap();
        assert_eq!(header.item_byte_size(), 784);
        assert_eq!(header.record_byte_size(), 788);
        assert_eq!(header.payload_byte_size(), Some(7880));

        let header = Header::new(Version::current(), 32, 32, 3, 0).unwrap();
        assert_eq!(header.item_byte_size(), 3072);
        assert_eq!(header.payload_byte_size(), Some(0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let cases = [
            (0, 28, 1, "image_width"),
            (28, 0, 1, "image_height"),
            (28, 28, 0, "bit_depth"),
        ];

        for (w, h, d, field) in cases {
            let err = Header::new(Version::current(), w, h, d, 1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Value);
            assert!(err.to_string().contains(field), "{} not in {}", field, err);
        }
    }

    #[test]
    fn test_overflowing_geometry_rejected() {
        let err = Header::new(Version::current(), u32::MAX, u32::MAX, u32::MAX, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_compressed_size_is_legacy_only() {
        let canonical = Header::new(Version::current(), 4, 4, 1, 1).unwrap();
        let err = canonical.with_compressed_size(10).unwrap_err();
        assert!(err.to_string().contains("compressed_size"));

        let legacy_version = Version::new(0, 2, 0, BuildStage::Release);
        let legacy = Header::new(legacy_version, 4, 4, 1, 1)
            .unwrap()
            .with_compressed_size(10)
            .unwrap();
        assert!(legacy.is_legacy());
        assert_eq!(legacy.compressed_size(), Some(10));
        assert_eq!(legacy.encoded_len(), LEGACY_HEADER_BYTES);
    }

    #[test]
    fn test_equality_ignores_compressed_size() {
        let version = Version::new(0, 9, 0, BuildStage::Release);
        let built = Header::new(version, 4, 4, 1, 3).unwrap();
        let decoded = built.clone().with_compressed_size(65).unwrap();
        assert_eq!(built, decoded);

        let other = Header::new(version, 4, 4, 1, 2).unwrap();
        assert_ne!(built, other);
    }

    #[test]
    fn test_encoded_len() {
        let header = Header::new(Version::current(), 1, 1, 1, 0).unwrap();
        assert_eq!(header.encoded_len(), HEADER_BYTES);
        assert_eq!(HEADER_BYTES, 27);
    }
}
