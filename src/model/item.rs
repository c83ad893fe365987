//! A single labeled image record.

use image::{DynamicImage, GenericImageView, ImageBuffer};
use ndarray::{Array3, ArrayView3};

use crate::format::{JdxError, Result};
use crate::model::Header;

/// One dataset record: raw pixel bytes plus an integer class label.
///
/// The buffer is owned; its length equals the enclosing header's
/// [`Header::item_byte_size`] once the item is part of a [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    data: Vec<u8>,
    label: i32,
}

impl Item {
    /// Create an item from an owned pixel buffer and label.
    ///
    /// The length is checked when the item joins a dataset.
    pub fn new(data: Vec<u8>, label: i32) -> Self {
        Self { data, label }
    }

    /// Create an item whose buffer length is checked against `header`.
    pub fn for_header(header: &Header, data: Vec<u8>, label: i32) -> Result<Self> {
        check_len("data", header, data.len())?;
        Ok(Self::new(data, label))
    }

    /// Create an item from a decoded image.
    ///
    /// The image's pixel type must be `bit_depth` bytes wide and its
    /// dimensions must match the header.
    pub fn from_image(header: &Header, image: &DynamicImage, label: i32) -> Result<Self> {
        let color = image.color();
        if u32::from(color.bytes_per_pixel()) != header.bit_depth() {
            return Err(JdxError::type_mismatch(
                "image",
                format!("{}-byte pixels", header.bit_depth()),
                format!("{:?}", color),
            ));
        }

        let (width, height) = GenericImageView::dimensions(image);
        if (width, height) != (header.image_width(), header.image_height()) {
            return Err(JdxError::invalid_argument(
                "image",
                format!(
                    "dimensions {}x{} do not match header {}x{}",
                    width,
                    height,
                    header.image_width(),
                    header.image_height()
                ),
            ));
        }

        Ok(Self::new(image.as_bytes().to_vec(), label))
    }

    /// Raw pixel bytes, row-major with interleaved channels.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Class label.
    pub fn label(&self) -> i32 {
        self.label
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take ownership of the pixel buffer and label.
    pub fn into_parts(self) -> (Vec<u8>, i32) {
        (self.data, self.label)
    }

    /// Borrow the pixels as a `(height, width, bit_depth)` array.
    pub fn view(&self, header: &Header) -> Result<ArrayView3<'_, u8>> {
        check_len("item", header, self.data.len())?;
        ArrayView3::from_shape(shape_of(header), &self.data)
            .map_err(|e| JdxError::invalid_argument("item", e.to_string()))
    }

    /// Copy the pixels into an owned `(height, width, bit_depth)` array.
    pub fn to_array(&self, header: &Header) -> Result<Array3<u8>> {
        Ok(self.view(header)?.to_owned())
    }

    /// Copy the pixels into an image for viewing or export.
    ///
    /// Supports 1 (grayscale), 2 (grayscale + alpha), 3 (RGB) and 4 (RGBA)
    /// bytes per pixel.
    pub fn to_image(&self, header: &Header) -> Result<DynamicImage> {
        check_len("item", header, self.data.len())?;

        let (w, h) = (header.image_width(), header.image_height());
        let data = self.data.clone();
        let image = match header.bit_depth() {
            1 => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            other => {
                return Err(JdxError::invalid_argument(
                    "bit_depth",
                    format!("no image type with {} bytes per pixel", other),
                ));
            }
        };

        image.ok_or_else(|| JdxError::invalid_argument("item", "buffer too small for image"))
    }
}

/// `(height, width, bit_depth)` shape for the header's geometry.
pub(crate) fn shape_of(header: &Header) -> (usize, usize, usize) {
    (
        header.image_height() as usize,
        header.image_width() as usize,
        header.bit_depth() as usize,
    )
}

fn check_len(argument: &str, header: &Header, len: usize) -> Result<()> {
    if len != header.item_byte_size() {
        return Err(JdxError::invalid_argument(
            argument,
            format!(
                "length {} does not match item size {} ({}x{}x{})",
                len,
                header.item_byte_size(),
                header.image_width(),
                header.image_height(),
                header.bit_depth()
            ),
        ));
    }
    Ok(())
}
