//! Integer compression codec family.
//!
//! Every codec implements the same narrow contract so the decoder
//! dispatch and the index builder can treat them polymorphically, the way
//! the teacher's `profiles::create_profile` treats search profiles as
//! interchangeable behind a trait object.

pub mod d_gap;
pub mod simd_eliasgamma;
pub mod varint;

use crate::error::CodecError;

/// Maximum decoder overscan, in integers, any codec in this family may
/// write past the logical output length. Callers provision output
/// padding accordingly (spec: bounded by 4 KiB for all included codecs).
pub const MAX_OVERSCAN_INTS: usize = 1024;

/// A 32-bit integer compression codec.
///
/// `encode` returns the number of bytes written, or `0` if `dst_cap` was
/// insufficient (the `EncodingOverflow` contract, recoverable by retrying
/// with a larger buffer). `decode` has no error return: the caller is
/// trusted to hand back bytes this same codec produced.
pub trait Codec {
    fn name(&self) -> &'static str;

    /// Encode `src[..n]` into `dst`, returning bytes written or `0` on
    /// overflow.
    fn encode(&self, dst: &mut [u8], src: &[u32]) -> Result<usize, CodecError>;

    /// Decode `n` integers from `src` into `dst`. `dst` must have room for
    /// at least `n + MAX_OVERSCAN_INTS` elements.
    fn decode(&self, dst: &mut [u32], n: usize, src: &[u8]);
}

/// Which codec a serialized index was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    SimdEliasGammaVb,
    Varint,
}

impl CodecKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SimdEliasGammaVb => simd_eliasgamma::NAME,
            Self::Varint => varint::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            simd_eliasgamma::NAME => Some(Self::SimdEliasGammaVb),
            varint::NAME => Some(Self::Varint),
            _ => None,
        }
    }

    pub fn codec(&self) -> Box<dyn Codec> {
        match self {
            Self::SimdEliasGammaVb => Box::new(simd_eliasgamma::SimdEliasGammaVb),
            Self::Varint => Box::new(varint::VarintCodec),
        }
    }
}

/// Which d-gap reconstruction a decoded docid stream needs before it
/// reaches the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DGapKind {
    /// Payload is already absolute, ascending docids.
    D0,
    /// Payload is d-gap encoded; reconstruct via prefix sum.
    D1,
    /// Payload is a fully decoded array of docids; passthrough.
    None,
}

impl DGapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::D0 => "0",
            Self::D1 => "1",
            Self::None => "-1",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "0" => Some(Self::D0),
            "1" => Some(Self::D1),
            "-1" => Some(Self::None),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_kind_name_roundtrip() {
        for kind in [CodecKind::SimdEliasGammaVb, CodecKind::Varint] {
            assert_eq!(CodecKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn d_gap_kind_str_roundtrip() {
        for kind in [DGapKind::D0, DGapKind::D1, DGapKind::None] {
            assert_eq!(DGapKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
