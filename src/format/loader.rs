//! Single-pass JDX decoder.
//!
//! A [`Loader`] walks one byte stream through these states:
//!
//! ```text
//! Unopened -> HeaderParsed -> Done                        (header-only read)
//!                          -> ItemsStreaming -> Complete  (full read)
//! any state -> Failed(kind)
//! ```
//!
//! `Done`, `Complete` and `Failed` are terminal. Decoding is all-or-nothing:
//! a failed read never hands back a partial dataset, and every staging
//! buffer acquired along the way is released before the error is returned.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use web_time::Instant;

use crate::config::LoaderConfig;
use crate::format::codec::{BodyCodec, DeflateCodec};
use crate::format::layout::{decode_header, decode_record, read_bounded, read_full};
use crate::format::staging::{StagingBuffer, StagingCounters, StagingStats};
use crate::format::{ErrorKind, JdxError, Region, Result};
use crate::model::{Dataset, Header, Item};

/// Records reserved up front; larger datasets grow the item vector as they stream.
const MAX_PREALLOCATED_ITEMS: u64 = 1 << 16;

/// Where a [`Loader`] is in its single pass over the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// Nothing read yet.
    Unopened,
    /// Header decoded; items not yet touched.
    HeaderParsed,
    /// Header-only read finished.
    Done,
    /// Item records are being decoded.
    ItemsStreaming,
    /// Full dataset read finished.
    Complete,
    /// A read failed.
    Failed(ErrorKind),
}

impl LoaderState {
    /// True for states no operation can leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoaderState::Done | LoaderState::Complete | LoaderState::Failed(_)
        )
    }
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderState::Unopened => write!(f, "unopened"),
            LoaderState::HeaderParsed => write!(f, "header-parsed"),
            LoaderState::Done => write!(f, "done"),
            LoaderState::ItemsStreaming => write!(f, "streaming items"),
            LoaderState::Complete => write!(f, "complete"),
            LoaderState::Failed(kind) => write!(f, "failed ({:?})", kind),
        }
    }
}

/// Decoder for one JDX stream.
pub struct Loader<R> {
    reader: R,
    config: LoaderConfig,
    codec: Box<dyn BodyCodec>,
    state: LoaderState,
    header: Option<Header>,
    staging: StagingCounters,
    source: String,
}

impl Loader<File> {
    /// Open a file for a header-only read.
    ///
    /// The file is not buffered, so nothing past the header is read.
    pub fn open_unbuffered(path: impl AsRef<Path>, config: LoaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Loader::with_config(file, config).named(path.display().to_string()))
    }
}

impl Loader<BufReader<File>> {
    /// Open a file for a full read.
    pub fn open(path: impl AsRef<Path>, config: LoaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Loader::with_config(BufReader::new(file), config).named(path.display().to_string()))
    }
}

impl<R: Read> Loader<R> {
    /// Create a loader with default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, LoaderConfig::default())
    }

    /// Create a loader with the given configuration.
    pub fn with_config(reader: R, config: LoaderConfig) -> Self {
        Self {
            reader,
            config,
            codec: Box::new(DeflateCodec::default()),
            state: LoaderState::Unopened,
            header: None,
            staging: StagingCounters::default(),
            source: "<stream>".to_string(),
        }
    }

    /// Replace the codec used for legacy compressed bodies.
    pub fn with_codec(mut self, codec: Box<dyn BodyCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Name the stream in log messages.
    pub fn named(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Current state.
    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// The decoded header, once parsed.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Staging buffer activity so far.
    pub fn staging_stats(&self) -> StagingStats {
        self.staging.snapshot()
    }

    /// Decode the header. `Unopened -> HeaderParsed`.
    pub fn parse_header(&mut self) -> Result<&Header> {
        self.expect_state(LoaderState::Unopened, "parse header")?;

        match decode_header(&mut self.reader, &self.config) {
            Ok(header) => {
                log::debug!(
                    "{}: header {} {}x{}x{} with {} items",
                    self.source,
                    header.version(),
                    header.image_width(),
                    header.image_height(),
                    header.bit_depth(),
                    header.item_count()
                );
                if header.is_legacy() {
                    log::warn!(
                        "{}: legacy {} layout with compressed body",
                        self.source,
                        header.version()
                    );
                }
                self.state = LoaderState::HeaderParsed;
                Ok(self.header.insert(header))
            }
            Err(e) => self.fail(e),
        }
    }

    /// Header-only read. Ends in `Done`; no item bytes are read.
    pub fn read_header(&mut self) -> Result<Header> {
        if self.state == LoaderState::Unopened {
            self.parse_header()?;
        }
        self.expect_state(LoaderState::HeaderParsed, "finish header-only read")?;

        let header = self.take_header()?;
        self.state = LoaderState::Done;
        Ok(header)
    }

    /// Full read. Ends in `Complete` with every item materialized.
    pub fn read_dataset(&mut self) -> Result<Dataset> {
        if self.state == LoaderState::Unopened {
            self.parse_header()?;
        }
        self.expect_state(LoaderState::HeaderParsed, "read items")?;

        let header = self.take_header()?;
        let started = Instant::now();
        self.state = LoaderState::ItemsStreaming;

        let result = self
            .check_payload_limit(&header)
            .and_then(|()| self.stream_items(&header))
            .and_then(|items| {
                self.expect_end_of_stream(&header)?;
                Dataset::new(header, items)
            });

        match result {
            Ok(dataset) => {
                self.state = LoaderState::Complete;
                log::info!(
                    "{}: read {} items in {:.2?}",
                    self.source,
                    dataset.len(),
                    started.elapsed()
                );
                Ok(dataset)
            }
            Err(e) => self.fail(e),
        }
    }

    fn stream_items(&mut self, header: &Header) -> Result<Vec<Item>> {
        if header.item_count() == 0 {
            if let Some(size) = header.compressed_size().filter(|&size| size != 0) {
                return Err(JdxError::invalid_format(format!(
                    "legacy header declares no items but a {}-byte body",
                    size
                )));
            }
            log::debug!("{}: no items declared", self.source);
            return Ok(Vec::new());
        }

        if header.is_legacy() {
            decode_compressed_body(&mut self.reader, header, self.codec.as_ref(), &self.staging)
        } else {
            decode_records(&mut self.reader, header, &self.staging)
        }
    }

    fn check_payload_limit(&self, header: &Header) -> Result<()> {
        let limit = self.config.max_dataset_bytes;
        let too_large = |declared| JdxError::PayloadTooLarge { declared, limit };

        let declared = header
            .payload_byte_size()
            .ok_or_else(|| too_large(u64::MAX))?;
        if declared > limit || usize::try_from(declared).is_err() {
            return Err(too_large(declared));
        }
        if let Some(compressed) = header.compressed_size().filter(|&size| size > limit) {
            return Err(too_large(compressed));
        }
        Ok(())
    }

    fn expect_end_of_stream(&mut self, header: &Header) -> Result<()> {
        let mut probe = [0u8; 1];
        if read_full(&mut self.reader, &mut probe)? != 0 {
            return Err(JdxError::TrailingData {
                declared: header.item_count(),
            });
        }
        Ok(())
    }

    fn take_header(&mut self) -> Result<Header> {
        self.header.take().ok_or_else(|| JdxError::InvalidState {
            operation: "take header",
            state: self.state.to_string(),
        })
    }

    fn expect_state(&self, expected: LoaderState, operation: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(JdxError::InvalidState {
                operation,
                state: self.state.to_string(),
            });
        }
        Ok(())
    }

    fn fail<T>(&mut self, error: JdxError) -> Result<T> {
        log::debug!("{}: read failed: {}", self.source, error);
        self.state = LoaderState::Failed(error.kind());
        self.header = None;
        Err(error)
    }
}

/// Stream `item_count` uncompressed records through one staging buffer.
fn decode_records<R: Read + ?Sized>(
    reader: &mut R,
    header: &Header,
    counters: &StagingCounters,
) -> Result<Vec<Item>> {
    let declared = header.item_count();
    let record_len = header.record_byte_size();
    let mut staging = StagingBuffer::acquire(record_len, "record", counters);
    let mut items = Vec::with_capacity(declared.min(MAX_PREALLOCATED_ITEMS) as usize);

    for index in 0..declared {
        let buffer = staging.as_mut_vec();
        buffer.clear();
        let found = read_bounded(reader, record_len as u64, buffer)?;
        if found == 0 {
            return Err(JdxError::CountMismatch {
                declared,
                found: index,
            });
        }
        if found < record_len {
            return Err(JdxError::truncated(
                Region::Record { index },
                record_len as u64,
                found as u64,
            ));
        }

        let item = decode_record(staging.as_slice());
        log::trace!("record {}: label {}", index, item.label());
        items.push(item);
    }

    Ok(items)
}

/// Read and inflate a legacy body, then split it into items.
fn decode_compressed_body<R: Read + ?Sized>(
    reader: &mut R,
    header: &Header,
    codec: &dyn BodyCodec,
    counters: &StagingCounters,
) -> Result<Vec<Item>> {
    let declared = header.item_count();
    let compressed_size = header
        .compressed_size()
        .ok_or_else(|| JdxError::invalid_format("legacy header without compressed size"))?;
    let record_len = header.record_byte_size();
    // payload size was checked against the configured limit and usize range
    let expected = record_len * declared as usize;

    let body = {
        let mut compressed =
            StagingBuffer::acquire(compressed_size as usize, "compressed", counters);
        let found = read_bounded(reader, compressed_size, compressed.as_mut_vec())?;
        if (found as u64) < compressed_size {
            return Err(JdxError::truncated(Region::Body, compressed_size, found as u64));
        }
        // one byte past the declared records is enough to detect excess
        codec.decompress(compressed.as_slice(), expected + 1)?
    };
    let body = StagingBuffer::adopt(body, "body", counters);

    if body.len() > expected {
        return Err(JdxError::TrailingData { declared });
    }
    let whole = body.len() / record_len;
    let partial = body.len() % record_len;
    if partial != 0 {
        return Err(JdxError::truncated(
            Region::Record {
                index: whole as u64,
            },
            record_len as u64,
            partial as u64,
        ));
    }
    if (whole as u64) < declared {
        return Err(JdxError::CountMismatch {
            declared,
            found: whole as u64,
        });
    }

    Ok(body
        .as_slice()
        .chunks_exact(record_len)
        .map(decode_record)
        .collect())
}

/// Read only the header of a JDX file.
pub fn read_header(path: impl AsRef<Path>) -> Result<Header> {
    read_header_with(path, &LoaderConfig::default())
}

/// Read only the header of a JDX file with explicit configuration.
pub fn read_header_with(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Header> {
    Loader::open_unbuffered(path, config.clone())?.read_header()
}

/// Read a complete JDX dataset.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    read_dataset_with(path, &LoaderConfig::default())
}

/// Read a complete JDX dataset with explicit configuration.
pub fn read_dataset_with(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Dataset> {
    Loader::open(path, config.clone())?.read_dataset()
}
