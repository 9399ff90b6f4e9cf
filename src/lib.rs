//! Impact-ordered inverted index: arena-backed postings accumulation,
//! two-pass impact quantization, a SIMD integer codec family, and the
//! on-disk index format that ties them together.
//!
//! Build-side: [`postings::PostingsAccumulator`] collects `(doc, pos)`
//! occurrences per term over an [`arena::Arena`]-backed
//! [`dynamic_array::DynamicArray`]; [`quantizer::ImpactQuantizer`] reduces
//! a pluggable [`quantizer::Ranker`]'s scores to 8-bit impacts;
//! [`builder::IndexBuilder`] serializes the result via a chosen
//! [`codecs::Codec`]. Query-side: [`reader::SerializedIndex`] loads the
//! file set back and [`dispatch::decode_and_process`] streams decoded
//! segments into a [`dispatch::Sink`].

pub mod arena;
pub mod builder;
pub mod codecs;
pub mod config;
pub mod dispatch;
pub mod dynamic_array;
pub mod error;
pub mod ordering;
pub mod postings;
pub mod quantizer;
pub mod reader;
pub mod shard;

pub use builder::{BuildStats, IndexBuilder};
pub use codecs::{Codec, CodecKind, DGapKind};
pub use config::{IndexBuildConfig, ReaderConfig};
pub use dispatch::{decode_and_process, DocBlock, Sink};
pub use error::{CodecError, IndexError};
pub use quantizer::{Bm25Ranker, ImpactQuantizer, Ranker};
pub use reader::{SerializedIndex, SharedIndex};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
