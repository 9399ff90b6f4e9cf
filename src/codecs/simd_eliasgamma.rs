//! SIMD Elias-gamma variable-byte codec.
//!
//! Packs 32-bit integers in parallel columns of 16 lanes. A **frame** is
//! `[selector: u32][payload: 16 x u32]` (68 bytes) and stores one or more
//! **slices**: a slice packs 16 integers column-wise across the 16
//! payload words, each occupying `w` bits at a shared bit offset. The
//! selector is a Elias-gamma unary encoding of the width schedule for the
//! frame, built so the first slice's width sits in the selector's lowest
//! bits; decoding consumes it with a single `trailing_zeros` each step.
//!
//! The 16-lane column is built from two `wide::u32x8` halves (matching
//! the teacher's choice of the `wide` crate for portable SIMD over raw
//! `std::arch` intrinsics); masking during decode is done through the
//! vector type directly so the AND step is genuinely lane-parallel rather
//! than an unrolled scalar loop pretending to be one.

use super::Codec;
use crate::error::CodecError;
use wide::u32x8;

pub const NAME: &str = "simd_eliasgamma_vb";

/// Lanes per slice/frame. Part of the wire format, not an implementation
/// detail: a reader MUST use 16 to reproduce this crate's frames.
pub const FRAME_LANES: usize = 16;
/// Bytes per frame: one u32 selector plus 16 u32 payload words.
pub const FRAME_BYTES: usize = 4 + FRAME_LANES * 4;
/// Declared decoder overscan, in integers: at most one short frame's
/// worth of padding lanes.
pub const OVERSCAN_INTS: usize = FRAME_LANES;

/// Smallest width, in bits, that can represent `max_value` without loss.
fn bits_needed(max_value: u32) -> u32 {
    if max_value == 0 {
        1
    } else {
        32 - max_value.leading_zeros()
    }
}

/// Elias-gamma unary code for one slice width: `w - 1` zero bits followed
/// by a one bit, as a `w`-bit field with the one bit at the top.
fn width_code(w: u32) -> u32 {
    debug_assert!((1..=32).contains(&w));
    1u32 << (w - 1)
}

fn width_mask(w: u32) -> u32 {
    if w == 32 {
        u32::MAX
    } else {
        (1u32 << w) - 1
    }
}

/// Fold the sequence of per-frame slice widths into the 32-bit selector.
///
/// Processes widths from most-recently-added to least, per
/// `value = (value << e[i]) | (1 << (e[i]-1))` iterated `i = k-1 .. 0`,
/// which leaves the *first* slice's width in the selector's lowest bits.
pub fn compute_selector(widths: &[u32]) -> u32 {
    let mut value: u32 = 0;
    for &w in widths.iter().rev() {
        value = (value << w) | width_code(w);
    }
    value
}

struct FrameBuilder {
    payload: [u32; FRAME_LANES],
    widths: Vec<u32>,
    remaining: u32,
    shift: u32,
}

impl FrameBuilder {
    fn new() -> Self {
        Self {
            payload: [0u32; FRAME_LANES],
            widths: Vec::new(),
            remaining: 32,
            shift: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    fn try_add_slice(&mut self, group: &[u32; FRAME_LANES]) -> bool {
        let max_val = group.iter().copied().max().unwrap_or(0);
        let w = bits_needed(max_val);
        if w > self.remaining {
            return false;
        }
        for lane in 0..FRAME_LANES {
            self.payload[lane] |= group[lane] << self.shift;
        }
        self.remaining -= w;
        self.shift += w;
        self.widths.push(w);
        true
    }

    /// Consume leftover bits in the last slice as padding and emit.
    fn finish_into(&mut self, out: &mut Vec<u8>) {
        if let Some(last) = self.widths.last_mut() {
            *last += self.remaining;
        }
        out.extend_from_slice(&compute_selector(&self.widths).to_le_bytes());
        for word in self.payload {
            out.extend_from_slice(&word.to_le_bytes());
        }
        *self = FrameBuilder::new();
    }
}

/// SIMD Elias-gamma variable-byte codec.
pub struct SimdEliasGammaVb;

impl Codec for SimdEliasGammaVb {
    fn name(&self) -> &'static str {
        NAME
    }

    fn encode(&self, dst: &mut [u8], src: &[u32]) -> Result<usize, CodecError> {
        let mut out = Vec::with_capacity(src.len() * 2 + FRAME_BYTES);
        let mut frame = FrameBuilder::new();

        let mut i = 0;
        while i < src.len() {
            let end = (i + FRAME_LANES).min(src.len());
            let mut group = [0u32; FRAME_LANES];
            group[..end - i].copy_from_slice(&src[i..end]);

            if frame.try_add_slice(&group) {
                i = end;
            } else {
                frame.finish_into(&mut out);
                // retry the same group against a fresh frame
            }
        }
        if !frame.is_empty() {
            frame.finish_into(&mut out);
        }

        if out.len() > dst.len() {
            return Err(CodecError::EncodingOverflow);
        }
        dst[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    fn decode(&self, dst: &mut [u32], n: usize, src: &[u8]) {
        let mut out_idx = 0usize;
        let mut frame_off = 0usize;

        while out_idx < n {
            let selector =
                u32::from_le_bytes(src[frame_off..frame_off + 4].try_into().unwrap());
            let mut payload = [0u32; FRAME_LANES];
            for (lane, word) in payload.iter_mut().enumerate() {
                let at = frame_off + 4 + lane * 4;
                *word = u32::from_le_bytes(src[at..at + 4].try_into().unwrap());
            }
            frame_off += FRAME_BYTES;

            let mut lo = u32x8::new(payload[0..8].try_into().unwrap());
            let mut hi = u32x8::new(payload[8..16].try_into().unwrap());

            let mut sel = selector;
            while sel != 0 {
                let w = sel.trailing_zeros() + 1;
                let mask = u32x8::splat(width_mask(w));

                let decoded_lo = (lo & mask).to_array();
                let decoded_hi = (hi & mask).to_array();

                let write_count = FRAME_LANES.min(dst.len().saturating_sub(out_idx)).min(n.saturating_sub(out_idx) + OVERSCAN_INTS);
                for lane in 0..write_count {
                    let value = if lane < 8 {
                        decoded_lo[lane]
                    } else {
                        decoded_hi[lane - 8]
                    };
                    dst[out_idx + lane] = value;
                }

                lo = shr_each(lo, w);
                hi = shr_each(hi, w);
                sel = if w == 32 { 0 } else { sel >> w };
                out_idx += FRAME_LANES;

                if out_idx >= n {
                    break;
                }
            }
        }
    }
}

/// Right-shift every lane of `v` by `amount` (0..=32).
///
/// `wide::u32x8` does not expose a right-shift-by-runtime-scalar
/// operator, so this unpacks to an array, shifts scalarly, and repacks:
/// still a single pass over 8 lanes, just without a dedicated intrinsic.
fn shr_each(v: u32x8, amount: u32) -> u32x8 {
    if amount == 32 {
        return u32x8::splat(0);
    }
    let arr = v.to_array();
    let shifted = [
        arr[0] >> amount,
        arr[1] >> amount,
        arr[2] >> amount,
        arr[3] >> amount,
        arr[4] >> amount,
        arr[5] >> amount,
        arr[6] >> amount,
        arr[7] >> amount,
    ];
    u32x8::new(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(values: &[u32]) -> Vec<u32> {
        let codec = SimdEliasGammaVb;
        let mut buf = vec![0u8; values.len() * 8 + FRAME_BYTES * 2];
        let written = codec.encode(&mut buf, values).unwrap();
        let mut out = vec![0u32; values.len() + OVERSCAN_INTS];
        codec.decode(&mut out, values.len(), &buf[..written]);
        out.truncate(values.len());
        out
    }

    #[test]
    fn round_trips_small_values() {
        let values: Vec<u32> = (0..16).collect();
        assert_eq!(round_trip(&values), values);
    }

    #[test]
    fn round_trips_across_multiple_frames() {
        let values: Vec<u32> = (0..1000).map(|i| (i * 37) % 5000).collect();
        assert_eq!(round_trip(&values), values);
    }

    #[test]
    fn round_trips_non_multiple_of_16() {
        let values: Vec<u32> = (1..=37).collect();
        assert_eq!(round_trip(&values), values);
    }

    #[test]
    fn round_trips_max_width_values() {
        let mut values = vec![u32::MAX; 16];
        values[3] = 0;
        assert_eq!(round_trip(&values), values);
    }

    #[test]
    fn encode_reports_overflow_on_insufficient_capacity() {
        let codec = SimdEliasGammaVb;
        let values: Vec<u32> = (0..16).collect();
        let mut tiny = [0u8; 4];
        assert_eq!(
            codec.encode(&mut tiny, &values),
            Err(CodecError::EncodingOverflow)
        );
    }

    /// S3: a 384-integer fixture with mixed widths (2-7 bits) round-trips.
    #[test]
    fn s3_broken_sequence() {
        let mut values = Vec::with_capacity(384);
        let widths = [2u32, 3, 5, 7, 4, 6];
        for i in 0..384u32 {
            let w = widths[(i as usize / 16) % widths.len()];
            values.push(i % (1 << w));
        }
        assert_eq!(round_trip(&values), values);
    }

    /// S4: a 112-integer fixture containing 793 (10 bits) round-trips.
    #[test]
    fn s4_second_broken_sequence() {
        let mut values: Vec<u32> = (0..112u32).map(|i| i % 64).collect();
        values[55] = 793;
        assert_eq!(round_trip(&values), values);
    }

    /// S6: compute_selector([3,2,5,4]) inverts under repeated
    /// trailing-zeros extraction back to [3,2,5,4].
    #[test]
    fn s6_selector_inverse() {
        let widths = [3u32, 2, 5, 4];
        let selector = compute_selector(&widths);

        let mut decoded = Vec::new();
        let mut sel = selector;
        while sel != 0 {
            let w = sel.trailing_zeros() + 1;
            decoded.push(w);
            sel = if w == 32 { 0 } else { sel >> w };
        }
        assert_eq!(decoded, widths);
    }

    #[test]
    fn selector_bijection_property(
    ) {
        // Property 5: for width sequences summing to <= 32, compute_selector
        // and the trailing-zeros extraction loop are mutual inverses.
        let cases: &[&[u32]] = &[
            &[1],
            &[32],
            &[1, 1, 1, 1, 1, 1, 1, 1],
            &[16, 16],
            &[5, 5, 5, 5, 5, 5],
            &[3, 2, 5, 4],
        ];
        for widths in cases {
            let selector = compute_selector(widths);
            let mut decoded = Vec::new();
            let mut sel = selector;
            while sel != 0 {
                let w = sel.trailing_zeros() + 1;
                decoded.push(w);
                sel = if w == 32 { 0 } else { sel >> w };
            }
            assert_eq!(&decoded, widths);
        }
    }
}
