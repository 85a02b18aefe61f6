//! Error types for PE image analysis.
//!
//! Header-stage failures abort an analysis outright; nothing read after a
//! bad header can be trusted. Table-stage failures never surface here at
//! all: the export/import readers degrade to partial results instead (see
//! the `complete` flags on their tables).

use thiserror::Error;

/// Failure modes of the image parser.
#[derive(Debug, Error)]
pub enum PeError {
    /// Missing or wrong legacy-stub / image-header signature.
    #[error("not a PE image: bad or missing signature")]
    InvalidFormat,

    /// Optional-header magic is neither PE32 nor PE32+.
    #[error("unsupported optional header magic: {magic:#06x}")]
    UnsupportedImage { magic: u16 },

    /// A read ran past the end of the buffer.
    #[error("truncated file: needed {expected} bytes, have {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    /// A data-directory RVA does not map into any section.
    #[error("directory RVA {rva:#010x} does not map to any section")]
    CorruptDirectory { rva: u32 },

    /// Input file exceeds the configured size cap.
    #[error("file size {size} exceeds limit {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    /// File could not be opened or mapped.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, PeError>;
