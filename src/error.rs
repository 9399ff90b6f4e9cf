//! Error taxonomy for the index build and query paths

use thiserror::Error;

/// Errors surfaced while building or reading a serialized index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ranker produced a non-finite score for term {term:?} doc {doc}")]
    RankerDomain { term: String, doc: u32 },

    /// Every way a serialized index can be unreadable collapses here, with
    /// `source` carrying the specific cause.
    #[error("index corrupt: {0}")]
    IndexCorrupt(#[source] CorruptCause),
}

impl IndexError {
    /// Construct an [`IndexError::IndexCorrupt`] wrapping a free-text cause.
    pub fn corrupt(message: impl Into<String>) -> Self {
        IndexError::IndexCorrupt(CorruptCause::Message(message.into()))
    }

    /// Construct an [`IndexError::IndexCorrupt`] wrapping an unknown codec
    /// name.
    pub fn unknown_codec(name: impl Into<String>) -> Self {
        IndexError::IndexCorrupt(CorruptCause::UnknownCodec(name.into()))
    }

    /// Construct an [`IndexError::IndexCorrupt`] wrapping an unknown d-ness
    /// tag.
    pub fn unknown_d_ness(tag: impl Into<String>) -> Self {
        IndexError::IndexCorrupt(CorruptCause::UnknownDNess(tag.into()))
    }
}

/// Specific cause carried by [`IndexError::IndexCorrupt`]'s source chain.
#[derive(Debug, Error)]
pub enum CorruptCause {
    #[error("{0}")]
    Message(String),

    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    #[error("unknown d-ness: {0}")]
    UnknownDNess(String),
}

/// Errors surfaced by the codec encode path
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("destination buffer too small to hold encoded output")]
    EncodingOverflow,
}
