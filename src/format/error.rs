//! Error types for JDX decode, encode and construction.

use thiserror::Error;

use crate::model::Version;

/// Coarse classification of a [`JdxError`].
///
/// Binding layers map these onto their own exception hierarchy
/// (`IOError`, `FormatError`, `TypeError`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The stream could not be opened or ended inside a fixed-size region.
    Io,
    /// The bytes do not follow the JDX layout.
    Format,
    /// The header version is well formed but not supported by this decoder.
    VersionMismatch,
    /// A constructor received the wrong kind of value.
    Type,
    /// A constructor received a value of the right kind but wrong shape.
    Value,
}

/// Region of a JDX stream, used to report where a short read happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The fixed-size header block.
    Header,
    /// An item record (label + pixels).
    Record {
        /// Zero-based index of the record.
        index: u64,
    },
    /// The compressed body of a legacy file.
    Body,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Header => write!(f, "header"),
            Region::Record { index } => write!(f, "item record {}", index),
            Region::Body => write!(f, "compressed body"),
        }
    }
}

/// Errors that can occur while reading, writing or building JDX data.
#[derive(Error, Debug)]
pub enum JdxError {
    /// I/O error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream ended inside a fixed-size region
    #[error("Truncated {region}: expected {expected} bytes, found {found}")]
    Truncated {
        /// Region being read
        region: Region,
        /// Bytes the region requires
        expected: u64,
        /// Bytes actually available
        found: u64,
    },

    /// Magic bytes do not spell `JDX`
    #[error("Bad magic: expected \"JDX\", found {found:?}")]
    BadMagic {
        /// The bytes found at offset 0
        found: [u8; 3],
    },

    /// Invalid format structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// A header dimension is zero
    #[error("Header field '{field}' must be non-zero")]
    ZeroDimension {
        /// Name of the zero field
        field: &'static str,
    },

    /// Stream holds a different number of records than the header declares
    #[error("Item count mismatch: header declares {declared}, stream holds {found}")]
    CountMismatch {
        /// Count declared by the header
        declared: u64,
        /// Count of complete records found
        found: u64,
    },

    /// Bytes remain after the last declared record
    #[error("Trailing data after {declared} declared items")]
    TrailingData {
        /// Count declared by the header
        declared: u64,
    },

    /// Declared payload exceeds the configured ceiling
    #[error("Declared payload of {declared} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Payload size implied by the header
        declared: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Body codec failure
    #[error("Codec '{codec}' failed: {message}")]
    Codec {
        /// Identifier of the codec
        codec: &'static str,
        /// Description of the failure
        message: String,
    },

    /// ZIP archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Version is readable but not supported by this decoder
    #[error("Version mismatch: supported {supported}, found {found}")]
    VersionMismatch {
        /// Newest version this decoder supports
        supported: Version,
        /// Version stamped in the file
        found: Version,
    },

    /// A constructor argument has the wrong kind
    #[error("Type mismatch for '{argument}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the argument
        argument: &'static str,
        /// Expected kind
        expected: String,
        /// Kind actually supplied
        found: String,
    },

    /// A constructor argument has an invalid value
    #[error("Invalid value for '{argument}': {reason}")]
    InvalidArgument {
        /// Name of the argument
        argument: String,
        /// Why it was rejected
        reason: String,
    },

    /// Loader operation called in a state that does not allow it
    #[error("Cannot {operation} while loader is {state}")]
    InvalidState {
        /// Operation attempted
        operation: &'static str,
        /// State the loader was in
        state: String,
    },
}

impl JdxError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JdxError::Io(_) | JdxError::Truncated { .. } => ErrorKind::Io,
            JdxError::Archive(zip::result::ZipError::Io(_)) => ErrorKind::Io,
            JdxError::BadMagic { .. }
            | JdxError::InvalidFormat { .. }
            | JdxError::ZeroDimension { .. }
            | JdxError::CountMismatch { .. }
            | JdxError::TrailingData { .. }
            | JdxError::PayloadTooLarge { .. }
            | JdxError::Codec { .. }
            | JdxError::Archive(_) => ErrorKind::Format,
            JdxError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            JdxError::TypeMismatch { .. } => ErrorKind::Type,
            JdxError::InvalidArgument { .. } | JdxError::InvalidState { .. } => ErrorKind::Value,
        }
    }

    /// Create a truncation error.
    pub fn truncated(region: Region, expected: u64, found: u64) -> Self {
        Self::Truncated {
            region,
            expected,
            found,
        }
    }

    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        argument: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            argument,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a codec error.
    pub fn codec(codec: &'static str, message: impl Into<String>) -> Self {
        Self::Codec {
            codec,
            message: message.into(),
        }
    }
}

/// Result type for JDX operations.
pub type Result<T> = std::result::Result<T, JdxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let io = JdxError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(
            JdxError::truncated(Region::Header, 27, 3).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            JdxError::CountMismatch {
                declared: 5,
                found: 3
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(
            JdxError::type_mismatch("image", "Rgb8", "Luma8").kind(),
            ErrorKind::Type
        );
        assert_eq!(
            JdxError::invalid_argument("items", "wrong length").kind(),
            ErrorKind::Value
        );
    }

    #[test]
    fn test_zip_io_is_io_kind() {
        let err = JdxError::from(zip::result::ZipError::Io(std::io::Error::other("boom")));
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = JdxError::from(zip::result::ZipError::FileNotFound);
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_messages_name_the_argument() {
        let err = JdxError::invalid_argument("image_width", "must be non-zero");
        assert!(err.to_string().contains("image_width"));

        let err = JdxError::truncated(Region::Record { index: 4 }, 788, 100);
        assert!(err.to_string().contains("item record 4"));
        assert!(err.to_string().contains("788"));
    }
}
