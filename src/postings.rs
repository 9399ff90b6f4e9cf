//! Per-term postings accumulation.
//!
//! A [`PostingsAccumulator`] owns three arena-backed [`DynamicArray`]s
//! (docids, term frequencies, and positions) and exposes the single
//! streaming entry point ingestion needs: [`PostingsAccumulator::push_back`].

use crate::arena::Arena;
use crate::dynamic_array::DynamicArray;

/// `tf` never reaches `0xFFFF`; it saturates one below so the field stays
/// distinguishable from an unset sentinel in formats that use `0xFFFF` for
/// "no frequency recorded" (galago-style readers do this).
pub const TF_SATURATION: u16 = 0xFFFE;

/// One term's postings as they are accumulated during ingestion.
///
/// Invariant: `push_back(d, p)` requires `d >= last_doc` and
/// `p > last_pos`; violating it is a caller precondition failure
/// (`debug_assert!`'d here, undefined behavior in release per the
/// InvariantViolation contract).
pub struct PostingsAccumulator<'a> {
    docids: DynamicArray<'a, u32>,
    tfs: DynamicArray<'a, u16>,
    positions: DynamicArray<'a, u32>,
    last_doc: u32,
    last_pos: u32,
    started: bool,
}

impl<'a> PostingsAccumulator<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            docids: DynamicArray::new(arena),
            tfs: DynamicArray::new(arena),
            positions: DynamicArray::new(arena),
            last_doc: 0,
            last_pos: 0,
            started: false,
        }
    }

    /// Record one occurrence of the term at `(doc, pos)`.
    pub fn push_back(&mut self, doc: u32, pos: u32) {
        debug_assert!(doc >= 1, "docids are 1-indexed; 0 is reserved padding");
        debug_assert!(pos >= 1, "positions are 1-indexed word offsets");
        if self.started {
            debug_assert!(
                doc >= self.last_doc,
                "postings accumulator requires non-decreasing docids"
            );
            if doc == self.last_doc {
                debug_assert!(
                    pos > self.last_pos,
                    "postings accumulator requires strictly increasing positions within a docid"
                );
            }
        }

        if self.started && doc == self.last_doc {
            let tf = self.tfs.back_mut().expect("tf recorded for last_doc");
            if *tf < TF_SATURATION {
                *tf += 1;
            }
        } else {
            self.docids.push_back(doc);
            self.tfs.push_back(1);
            self.last_doc = doc;
        }

        self.positions.push_back(pos);
        self.last_pos = pos;
        self.started = true;
    }

    /// Number of distinct docids recorded so far.
    pub fn doc_count(&self) -> usize {
        self.docids.len()
    }

    /// Iterate `(docid, tf, pos)` triples, one per stored position, with
    /// `tf` repeated across a doc's positions.
    pub fn iter(&self) -> PostingsIter<'_> {
        PostingsIter {
            docids: self.docids.iter(),
            tfs: self.tfs.iter(),
            positions: self.positions.iter(),
            current_doc: None,
            current_tf: 0,
            remaining_in_doc: 0,
        }
    }

    /// Collapse to `(docid, tf)` pairs, discarding positions: the shape
    /// the quantizer and builder consume.
    pub fn doc_tf_pairs(&self) -> Vec<(u32, u16)> {
        self.docids
            .iter()
            .copied()
            .zip(self.tfs.iter().copied())
            .collect()
    }

    /// Render the `<doc,tf,pos,pos,...>` debug text the reference dumper
    /// would print for this term: one `<doc,tf,positions...>` group per
    /// docid, concatenated with no separator.
    pub fn render_debug(&self) -> String {
        let mut out = String::new();
        let mut doc_iter = self.docids.iter();
        let mut tf_iter = self.tfs.iter();
        let mut pos_iter = self.positions.iter();

        while let (Some(&doc), Some(&tf)) = (doc_iter.next(), tf_iter.next()) {
            out.push('<');
            out.push_str(&doc.to_string());
            out.push(',');
            out.push_str(&tf.to_string());
            for _ in 0..tf {
                if let Some(&p) = pos_iter.next() {
                    out.push(',');
                    out.push_str(&p.to_string());
                }
            }
            out.push('>');
        }
        out
    }
}

/// Iterator yielding `(docid, tf, pos)` for every stored position.
pub struct PostingsIter<'a> {
    docids: crate::dynamic_array::Iter<'a, u32>,
    tfs: crate::dynamic_array::Iter<'a, u16>,
    positions: crate::dynamic_array::Iter<'a, u32>,
    current_doc: Option<u32>,
    current_tf: u16,
    remaining_in_doc: u16,
}

impl<'a> Iterator for PostingsIter<'a> {
    type Item = (u32, u16, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining_in_doc == 0 {
            let doc = *self.docids.next()?;
            let tf = *self.tfs.next()?;
            self.current_doc = Some(doc);
            self.current_tf = tf;
            self.remaining_in_doc = tf;
        }
        let pos = *self.positions.next()?;
        self.remaining_in_doc -= 1;
        Some((self.current_doc.unwrap(), self.current_tf, pos))
    }
}

/// A term's postings after impact quantization: docids unchanged, `tf`
/// replaced by a one-byte impact in `[smallest_impact, largest_impact]`.
#[derive(Debug, Clone)]
pub struct QuantizedPostingsList {
    pub docids: Vec<u32>,
    pub impacts: Vec<u8>,
}

impl QuantizedPostingsList {
    pub fn len(&self) -> usize {
        self.docids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S1: pushing (1,100), (1,101), (2,102), (2,103) renders exactly
    /// "<1,2,100,101><2,2,102,103>".
    #[test]
    fn s1_postings_text_render() {
        let arena = Arena::new();
        let mut acc = PostingsAccumulator::new(&arena);
        acc.push_back(1, 100);
        acc.push_back(1, 101);
        acc.push_back(2, 102);
        acc.push_back(2, 103);
        assert_eq!(acc.render_debug(), "<1,2,100,101><2,2,102,103>");
    }

    #[test]
    fn iteration_order_is_doc_then_position() {
        let arena = Arena::new();
        let mut acc = PostingsAccumulator::new(&arena);
        acc.push_back(1, 5);
        acc.push_back(1, 9);
        acc.push_back(3, 1);
        let collected: Vec<_> = acc.iter().collect();
        assert_eq!(collected, vec![(1, 2, 5), (1, 2, 9), (3, 1, 1)]);
    }

    #[test]
    fn tf_saturates_at_0xfffe() {
        let arena = Arena::new();
        let mut acc = PostingsAccumulator::new(&arena);
        for p in 1..=1_000_000u32 {
            acc.push_back(1, p);
        }
        let pairs = acc.doc_tf_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, TF_SATURATION);
    }

    #[test]
    fn doc_tf_pairs_collapses_positions() {
        let arena = Arena::new();
        let mut acc = PostingsAccumulator::new(&arena);
        acc.push_back(1, 1);
        acc.push_back(1, 2);
        acc.push_back(2, 1);
        assert_eq!(acc.doc_tf_pairs(), vec![(1, 2), (2, 1)]);
    }
}
