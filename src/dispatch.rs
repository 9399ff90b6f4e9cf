//! Decoder dispatch: turns one segment's encoded payload into calls
//! against a consumer [`Sink`].
//!
//! Modeled as a callback-driven sink capability, the way the teacher's
//! profile traversal pushes hits into a collector rather than returning
//! an intermediate `Vec` the caller has to re-walk.

use crate::codecs::{d_gap, Codec, DGapKind, MAX_OVERSCAN_INTS};
use wide::u32x8;

/// A SIMD-aligned group of 8 docids, the unit [`Sink::push_back`]
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocBlock(pub [u32; 8]);

/// Consumer of a decoded, d-gap-reconstructed segment.
///
/// `set_score` is called once per segment before any `push_back`/
/// `add_rsv` calls; `push_back` drives the vectorized 8-docid fast path,
/// `add_rsv` the scalar tail.
pub trait Sink {
    fn set_score(&mut self, impact: u64);
    fn push_back(&mut self, docids: DocBlock);
    fn add_rsv(&mut self, doc: u64, impact: u64);
}

/// Decode one segment's payload and stream its docids through `sink`.
///
/// `n_docs` is the segment's `segment_frequency`; `payload` is the byte
/// range `[offset, end)` from the postings blob. `sink.set_score` fires
/// once, then docids flow through in ascending order: full 8-wide groups
/// via [`Sink::push_back`], the remainder (when `n_docs % 8 != 0`)
/// scalarly via [`Sink::add_rsv`].
pub fn decode_and_process(
    impact: u8,
    sink: &mut dyn Sink,
    codec: &dyn Codec,
    n_docs: usize,
    payload: &[u8],
    d_ness: DGapKind,
) {
    let mut buf = vec![0u32; n_docs + MAX_OVERSCAN_INTS];
    codec.decode(&mut buf, n_docs, payload);
    d_gap::reconstruct(d_ness, &mut buf[..n_docs]);

    sink.set_score(impact as u64);

    let mut i = 0;
    while i + 8 <= n_docs {
        let lane = u32x8::new(buf[i..i + 8].try_into().unwrap());
        let docids = lane.to_array();
        // Real postings are always >= 1; a zero here can only be
        // overscan padding leaking in, which bounding by n_docs above
        // should already exclude. Filter defensively anyway.
        if docids.iter().all(|&d| d != 0) {
            sink.push_back(DocBlock(docids));
        } else {
            for &doc in docids.iter().filter(|&&d| d != 0) {
                sink.add_rsv(doc as u64, impact as u64);
            }
        }
        i += 8;
    }
    for &doc in &buf[i..n_docs] {
        if doc != 0 {
            sink.add_rsv(doc as u64, impact as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::varint::VarintCodec;

    #[derive(Default)]
    struct RecordingSink {
        scores: Vec<u64>,
        blocks: Vec<DocBlock>,
        scalars: Vec<(u64, u64)>,
    }

    impl Sink for RecordingSink {
        fn set_score(&mut self, impact: u64) {
            self.scores.push(impact);
        }
        fn push_back(&mut self, docids: DocBlock) {
            self.blocks.push(docids);
        }
        fn add_rsv(&mut self, doc: u64, impact: u64) {
            self.scalars.push((doc, impact));
        }
    }

    #[test]
    fn dispatch_splits_full_blocks_and_scalar_tail() {
        let codec = VarintCodec;
        let docids: Vec<u32> = (1..=11).collect(); // one block of 8, tail of 3
        let mut buf = vec![0u8; docids.len() * 5];
        let written = codec.encode(&mut buf, &docids).unwrap();

        let mut sink = RecordingSink::default();
        decode_and_process(
            42,
            &mut sink,
            &codec,
            docids.len(),
            &buf[..written],
            DGapKind::None,
        );

        assert_eq!(sink.scores, vec![42]);
        assert_eq!(sink.blocks.len(), 1);
        assert_eq!(sink.blocks[0].0, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            sink.scalars,
            vec![(9, 42), (10, 42), (11, 42)]
        );
    }

    #[test]
    fn dispatch_reconstructs_d1_gaps_before_dispatch() {
        let codec = VarintCodec;
        let docids = vec![10u32, 15, 16, 100];
        let gaps = d_gap::encode_gaps(&docids);
        let mut buf = vec![0u8; gaps.len() * 5];
        let written = codec.encode(&mut buf, &gaps).unwrap();

        let mut sink = RecordingSink::default();
        decode_and_process(
            7,
            &mut sink,
            &codec,
            docids.len(),
            &buf[..written],
            DGapKind::D1,
        );

        assert_eq!(
            sink.scalars,
            vec![(10, 7), (15, 7), (16, 7), (100, 7)]
        );
    }
}
