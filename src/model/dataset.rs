//! A header plus its ordered item records.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::Array4;

use crate::format::{self, JdxError, Result};
use crate::model::{Header, Item};

/// A complete dataset.
///
/// Owns its header and every item buffer. `items.len()` always equals
/// `header.item_count()` and every item is `header.item_byte_size()` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    header: Header,
    items: Vec<Item>,
}

impl Dataset {
    /// Create a dataset, checking the item count and every item's length.
    pub fn new(header: Header, items: Vec<Item>) -> Result<Self> {
        if items.len() as u64 != header.item_count() {
            return Err(JdxError::invalid_argument(
                "items",
                format!(
                    "header declares {} items but {} were supplied",
                    header.item_count(),
                    items.len()
                ),
            ));
        }

        let expected = header.item_byte_size();
        if let Some((index, item)) = items
            .iter()
            .enumerate()
            .find(|(_, item)| item.len() != expected)
        {
            return Err(JdxError::invalid_argument(
                format!("items[{}].data", index),
                format!("length {} does not match item size {}", item.len(), expected),
            ));
        }

        Ok(Self { header, items })
    }

    /// Read a dataset from a JDX file.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        format::read_dataset(path)
    }

    /// Write this dataset to a JDX file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        format::write_dataset(path, self)
    }

    /// Encode this dataset into a writer.
    pub fn write_to<W: std::io::Write>(&self, mut writer: W) -> Result<()> {
        format::write_dataset_to(&mut writer, self)
    }

    /// Encode this dataset into an in-memory JDX image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.header.encoded_len());
        format::write_dataset_to(&mut bytes, self)?;
        Ok(bytes)
    }

    /// The dataset header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Items in file order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the dataset has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over items in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Take ownership of the header and items.
    pub fn into_parts(self) -> (Header, Vec<Item>) {
        (self.header, self.items)
    }

    /// Labels of every item, in file order.
    pub fn labels(&self) -> Vec<i32> {
        self.items.iter().map(Item::label).collect()
    }

    /// Number of items per label.
    pub fn label_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.label()).or_insert(0) += 1;
        }
        counts
    }

    /// Copy every item into one `(n, height, width, bit_depth)` array.
    pub fn images_array(&self) -> Result<Array4<u8>> {
        let (h, w, d) = super::item::shape_of(&self.header);
        let mut flat = Vec::with_capacity(self.items.len() * self.header.item_byte_size());
        for item in &self.items {
            flat.extend_from_slice(item.data());
        }

        Array4::from_shape_vec((self.items.len(), h, w, d), flat)
            .map_err(|e| JdxError::invalid_argument("items", e.to_string()))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Dataset {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
