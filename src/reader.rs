//! Serialized index reader.
//!
//! Loads the frozen file set a [`crate::builder::IndexBuilder`] produces.
//! Reads from a path (mmap'd via `memmap2` when `config.use_mmap`, matching
//! the teacher's dependency choice) or directly from byte slices, which is
//! what every test below uses to avoid touching the filesystem clock or
//! needing a real corpus.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use parking_lot::RwLock;

use crate::codecs::{Codec, CodecKind, DGapKind};
use crate::config::ReaderConfig;
use crate::error::{CorruptCause, IndexError};

/// One vocabulary entry: a term and where its segment-header array lives
/// in the postings blob.
#[derive(Debug, Clone)]
pub struct TermRecord {
    pub term: Vec<u8>,
    pub impacts: u32,
    pub offset: u64,
}

/// One on-disk segment header: `(impact, docid-run)` unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    pub impact: u8,
    pub segment_frequency: u32,
    pub offset: u64,
    pub end: u64,
}

const SEGMENT_HEADER_BYTES: usize = 1 + 4 + 8 + 8;

enum Blob {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Blob {
    fn as_slice(&self) -> &[u8] {
        match self {
            Blob::Owned(v) => v,
            Blob::Mapped(m) => m,
        }
    }
}

/// A loaded, immutable index ready for query-time traversal.
pub struct SerializedIndex {
    terms: Vec<TermRecord>,
    blob: Blob,
    primary_keys: Vec<Vec<u8>>,
    codec_kind: CodecKind,
    d_ness: DGapKind,
}

impl SerializedIndex {
    /// Load from a file set on disk.
    pub fn open(
        vocab_path: &Path,
        blob_path: &Path,
        primary_keys_path: &Path,
        codec_descriptor_path: &Path,
        config: &ReaderConfig,
    ) -> Result<Self, IndexError> {
        let vocab_bytes = std::fs::read(vocab_path)?;
        let pk_bytes = std::fs::read(primary_keys_path)?;
        let descriptor_text = std::fs::read_to_string(codec_descriptor_path)?;

        let blob = if config.use_mmap {
            let file = File::open(blob_path)?;
            Blob::Mapped(unsafe { Mmap::map(&file)? })
        } else {
            Blob::Owned(std::fs::read(blob_path)?)
        };

        log::debug!("opening serialized index at {}", vocab_path.display());
        Self::from_parts(&vocab_bytes, blob, &pk_bytes, &descriptor_text)
    }

    /// Load from in-memory byte slices, the path every test below uses.
    pub fn from_bytes(
        vocab_bytes: &[u8],
        blob_bytes: &[u8],
        primary_key_bytes: &[u8],
        codec_descriptor_text: &str,
    ) -> Result<Self, IndexError> {
        Self::from_parts(
            vocab_bytes,
            Blob::Owned(blob_bytes.to_vec()),
            primary_key_bytes,
            codec_descriptor_text,
        )
    }

    fn from_parts(
        vocab_bytes: &[u8],
        blob: Blob,
        pk_bytes: &[u8],
        descriptor_text: &str,
    ) -> Result<Self, IndexError> {
        let terms = parse_vocabulary(vocab_bytes)?;
        let primary_keys = parse_primary_keys(pk_bytes)?;
        let (codec_kind, d_ness) = parse_codec_descriptor(descriptor_text)?;

        log::debug!(
            "loaded index: {} terms, {} primary keys, codec={}",
            terms.len(),
            primary_keys.len(),
            codec_kind.name()
        );

        Ok(Self {
            terms,
            blob,
            primary_keys,
            codec_kind,
            d_ness,
        })
    }

    /// Vocabulary, in on-disk (lexicographic) order.
    pub fn terms(&self) -> &[TermRecord] {
        &self.terms
    }

    /// The segment-header array for one term, in on-disk (descending
    /// impact) order.
    pub fn segment_headers(&self, term: &TermRecord) -> Result<Vec<SegmentHeader>, IndexError> {
        let blob = self.blob.as_slice();
        let mut headers = Vec::with_capacity(term.impacts as usize);
        let mut at = term.offset as usize;
        for _ in 0..term.impacts {
            let end = at + SEGMENT_HEADER_BYTES;
            if end > blob.len() {
                let msg = format!(
                    "truncated segment header for term {:?} at offset {}",
                    String::from_utf8_lossy(&term.term),
                    at
                );
                log::error!("{msg}");
                return Err(IndexError::corrupt(msg));
            }
            let impact = blob[at];
            let segment_frequency = u32::from_le_bytes(blob[at + 1..at + 5].try_into().unwrap());
            let offset = u64::from_le_bytes(blob[at + 5..at + 13].try_into().unwrap());
            let end_off = u64::from_le_bytes(blob[at + 13..at + 21].try_into().unwrap());
            headers.push(SegmentHeader {
                impact,
                segment_frequency,
                offset,
                end: end_off,
            });
            at = end;
        }
        Ok(headers)
    }

    pub fn postings_blob(&self) -> &[u8] {
        self.blob.as_slice()
    }

    /// Primary key for internal docid `doc` (1-indexed).
    pub fn primary_key(&self, doc: u32) -> Option<&[u8]> {
        self.primary_keys.get(doc as usize - 1).map(|v| v.as_slice())
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &[u8]> {
        self.primary_keys.iter().map(|v| v.as_slice())
    }

    /// The codec and d-ness chosen at build time, ready to drive
    /// [`crate::dispatch::decode_and_process`].
    pub fn codec(&self) -> (Box<dyn Codec>, DGapKind) {
        (self.codec_kind.codec(), self.d_ness)
    }
}

/// Thread-shared handle to a [`SerializedIndex`], allowing concurrent
/// query-time reads plus an atomic swap on reload.
///
/// Mirrors the teacher's `FtsIndex` wrapping its active profile in
/// `RwLock<Box<dyn SearchProfile>>` so in-flight queries never block
/// behind a reload from disk; here the lock guards the whole immutable
/// snapshot rather than a mutable profile.
#[derive(Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<SerializedIndex>>,
}

impl SharedIndex {
    pub fn new(index: SerializedIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Run `f` against the currently active index under a read lock.
    /// Multiple query threads may hold this concurrently.
    pub fn with_read<R>(&self, f: impl FnOnce(&SerializedIndex) -> R) -> R {
        f(&self.inner.read())
    }

    /// Atomically swap in a freshly opened index.
    pub fn reload(&self, index: SerializedIndex) {
        log::debug!("reloading serialized index, {} terms", index.terms().len());
        *self.inner.write() = index;
    }
}

fn parse_vocabulary(bytes: &[u8]) -> Result<Vec<TermRecord>, IndexError> {
    let mut terms = Vec::new();
    let mut at = 0usize;
    while at < bytes.len() {
        let term_len = read_u32(bytes, at, "vocabulary term length")? as usize;
        at += 4;
        if at + term_len > bytes.len() {
            return Err(IndexError::corrupt("vocabulary truncated mid-term"));
        }
        let term = bytes[at..at + term_len].to_vec();
        at += term_len;
        let impacts = read_u32(bytes, at, "vocabulary impact count")?;
        at += 4;
        let offset = read_u64(bytes, at, "vocabulary offset")?;
        at += 8;
        terms.push(TermRecord {
            term,
            impacts,
            offset,
        });
    }
    Ok(terms)
}

fn parse_primary_keys(bytes: &[u8]) -> Result<Vec<Vec<u8>>, IndexError> {
    let mut keys = Vec::new();
    let mut at = 0usize;
    while at < bytes.len() {
        let len = read_u32(bytes, at, "primary key length")? as usize;
        at += 4;
        if at + len > bytes.len() {
            return Err(IndexError::corrupt(
                "primary key table truncated mid-record",
            ));
        }
        keys.push(bytes[at..at + len].to_vec());
        at += len;
    }
    Ok(keys)
}

fn parse_codec_descriptor(text: &str) -> Result<(CodecKind, DGapKind), IndexError> {
    let line = text.lines().next().unwrap_or("");
    let mut parts = line.splitn(2, '\t');
    let name = parts.next().unwrap_or("");
    let d_ness_str = parts.next().unwrap_or("");

    let codec_kind = CodecKind::from_name(name).ok_or_else(|| {
        log::error!("unknown codec name in descriptor: {name:?}");
        IndexError::unknown_codec(name)
    })?;
    let d_ness = DGapKind::from_str(d_ness_str).ok_or_else(|| {
        log::error!("unknown d-ness in descriptor: {d_ness_str:?}");
        IndexError::unknown_d_ness(d_ness_str)
    })?;
    Ok((codec_kind, d_ness))
}

fn read_u32(bytes: &[u8], at: usize, what: &str) -> Result<u32, IndexError> {
    bytes
        .get(at..at + 4)
        .map(|s| u32::from_le_bytes(s.try_into().unwrap()))
        .ok_or_else(|| IndexError::corrupt(format!("truncated {what}")))
}

fn read_u64(bytes: &[u8], at: usize, what: &str) -> Result<u64, IndexError> {
    bytes
        .get(at..at + 8)
        .map(|s| u64::from_le_bytes(s.try_into().unwrap()))
        .ok_or_else(|| IndexError::corrupt(format!("truncated {what}")))
}
