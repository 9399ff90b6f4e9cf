//! Explicit configuration structs for the build and read paths.
//!
//! No module-level mutable state anywhere in this crate; every tunable
//! lives on one of these two structs and is threaded through
//! constructors, mirroring the teacher's `TurboConfig` pattern. Arena
//! sizing and growth are owned by the ingestion/shard side (see
//! [`crate::shard`]), not by the builder, so they are not configured here.

use crate::codecs::{CodecKind, DGapKind};

/// Tunables for [`crate::builder::IndexBuilder`].
#[derive(Debug, Clone)]
pub struct IndexBuildConfig {
    /// Codec used to encode every segment's docid stream.
    pub codec: CodecKind,
    /// d-gap strategy applied to docids before encoding.
    pub d_ness: DGapKind,
    /// Smallest emittable impact (inclusive). Threaded into
    /// [`crate::quantizer::ImpactQuantizer::with_range`].
    pub smallest_impact: u8,
    /// Largest emittable impact (inclusive). Threaded into
    /// [`crate::quantizer::ImpactQuantizer::with_range`].
    pub largest_impact: u8,
}

impl Default for IndexBuildConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::SimdEliasGammaVb,
            d_ness: DGapKind::D1,
            smallest_impact: crate::quantizer::SMALLEST_IMPACT,
            largest_impact: crate::quantizer::LARGEST_IMPACT,
        }
    }
}

/// Tunables for [`crate::reader::SerializedIndex`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Prefer `memmap2` over a full read into memory when opening from a
    /// path. Byte-slice-backed readers (tests) ignore this.
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { use_mmap: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_config_defaults_are_in_domain() {
        let config = IndexBuildConfig::default();
        assert!(config.smallest_impact <= config.largest_impact);
    }

    #[test]
    fn reader_config_defaults_to_mmap() {
        assert!(ReaderConfig::default().use_mmap);
    }
}
