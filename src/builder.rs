//! Single-writer index serializer.
//!
//! Grounded on the teacher's per-profile `save()` methods (e.g.
//! `TurboProfile::save`): hand-rolled little-endian framing via
//! `to_le_bytes`/`write_all` over a `BufWriter`, rather than a generic
//! `serde`/`bincode` envelope, because the on-disk layout here is
//! byte-exact and read back field-by-field by [`crate::reader`]. The one
//! exception is [`BuildStats`], a plain metrics summary with no byte-exact
//! contract, which uses `serde`/`bincode` the way the teacher's
//! `MemoryStats` does.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::codecs::{d_gap, CodecKind, DGapKind};
use crate::config::IndexBuildConfig;
use crate::error::IndexError;
use crate::postings::PostingsAccumulator;
use crate::quantizer::{ImpactQuantizer, Ranker};

/// Bytes per on-disk segment header: `impact(1) + segment_frequency(4) +
/// offset(8) + end(8)`.
const SEGMENT_HEADER_BYTES: u64 = 1 + 4 + 8 + 8;

/// Summary of one [`IndexBuilder::finish`] run, returned to the caller so
/// it can log or report build metrics without re-reading the file set.
/// `serde`-derived (like the teacher's own `MemoryStats`) so callers can
/// hand it off to whatever metrics sink they use, independent of this
/// crate's byte-exact on-disk framing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildStats {
    pub term_count: u64,
    pub segment_count: u64,
    pub postings_blob_bytes: u64,
    pub primary_key_count: u64,
}

struct PendingTerm {
    term: Vec<u8>,
    /// `(docid, raw score)`, in the ascending docid order the
    /// accumulator produced them.
    scored: Vec<(u32, f64)>,
}

/// Accumulates terms across pass A, then serializes the whole index in
/// [`IndexBuilder::finish`] once every term has been added.
///
/// Quantization here runs globally (pass A across every added term, pass
/// B once in `finish`), matching the "whole index" framing of the
/// quantizer's own contract rather than a per-term-batch one.
pub struct IndexBuilder {
    config: IndexBuildConfig,
    quantizer: ImpactQuantizer,
    terms: Vec<PendingTerm>,
    primary_keys: Vec<Vec<u8>>,
}

impl IndexBuilder {
    pub fn new(config: IndexBuildConfig) -> Self {
        let quantizer = ImpactQuantizer::with_range(config.smallest_impact, config.largest_impact);
        Self {
            config,
            quantizer,
            terms: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    /// Register the primary-key table, indexed from internal docid `1`.
    /// `keys[0]` is the primary key for docid `1`.
    pub fn set_primary_keys(&mut self, keys: Vec<Vec<u8>>) {
        self.primary_keys = keys;
    }

    /// Pass A for one term: score every posting, fold the scores into the
    /// running `(min_rsv, max_rsv)`, and stage the term for `finish`.
    pub fn add_term(
        &mut self,
        term: &str,
        postings: &PostingsAccumulator,
        ranker: &dyn Ranker,
        total_docs: u64,
    ) -> Result<(), IndexError> {
        let df = postings.doc_count() as u32;
        let idf = ranker.compute_idf_component(df, total_docs);

        let mut scored = Vec::with_capacity(postings.doc_count());
        for (doc, tf) in postings.doc_tf_pairs() {
            let score = ranker.compute_score(idf, tf, doc);
            self.quantizer.observe(term, doc, score)?;
            scored.push((doc, score));
        }
        self.terms.push(PendingTerm {
            term: term.as_bytes().to_vec(),
            scored,
        });
        Ok(())
    }

    /// Pass B plus serialization: write the vocabulary, postings blob,
    /// primary-key table, and codec descriptor to the given writers.
    pub fn finish<W1: Write, W2: Write, W3: Write, W4: Write>(
        mut self,
        vocab: &mut W1,
        postings_blob: &mut W2,
        primary_keys: &mut W3,
        codec_descriptor: &mut W4,
    ) -> Result<BuildStats, IndexError> {
        self.terms.sort_by(|a, b| a.term.cmp(&b.term));
        let emitter = self.quantizer.finish_observing();
        let codec = self.config.codec.codec();
        let mut segment_count: u64 = 0;

        log::debug!(
            "flushing index segment: {} terms, codec={}, d_ness={}",
            self.terms.len(),
            codec.name(),
            self.config.d_ness.as_str()
        );

        let mut blob_cursor: u64 = 0;

        for term in &self.terms {
            // Bucket by impact, descending: impact-ordered traversal
            // walks the highest-impact segment first.
            let mut buckets: BTreeMap<u8, Vec<u32>> = BTreeMap::new();
            for &(doc, score) in &term.scored {
                let impact = emitter.emit(score);
                buckets.entry(impact).or_default().push(doc);
            }

            let mut encoded: Vec<(u8, Vec<u32>, Vec<u8>)> = Vec::with_capacity(buckets.len());
            for (impact, docids) in buckets.into_iter().rev() {
                let to_encode = match self.config.d_ness {
                    DGapKind::D1 => d_gap::encode_gaps(&docids),
                    DGapKind::D0 | DGapKind::None => docids.clone(),
                };
                let payload = encode_with_retry(codec.as_ref(), &to_encode)?;
                encoded.push((impact, docids, payload));
            }

            let headers_len = encoded.len() as u64 * SEGMENT_HEADER_BYTES;
            let term_header_offset = blob_cursor;
            let mut payload_cursor = blob_cursor + headers_len;

            let mut headers = Vec::with_capacity(encoded.len() * SEGMENT_HEADER_BYTES as usize);
            let mut payloads = Vec::new();
            for (impact, docids, payload) in &encoded {
                let offset = payload_cursor;
                let end = offset + payload.len() as u64;
                headers.push(*impact);
                headers.extend_from_slice(&(docids.len() as u32).to_le_bytes());
                headers.extend_from_slice(&offset.to_le_bytes());
                headers.extend_from_slice(&end.to_le_bytes());
                payloads.extend_from_slice(payload);
                payload_cursor = end;
            }

            postings_blob.write_all(&headers)?;
            postings_blob.write_all(&payloads)?;
            segment_count += encoded.len() as u64;
            blob_cursor = payload_cursor;

            vocab.write_all(&(term.term.len() as u32).to_le_bytes())?;
            vocab.write_all(&term.term)?;
            vocab.write_all(&(encoded.len() as u32).to_le_bytes())?;
            vocab.write_all(&term_header_offset.to_le_bytes())?;
        }

        for key in &self.primary_keys {
            primary_keys.write_all(&(key.len() as u32).to_le_bytes())?;
            primary_keys.write_all(key)?;
        }

        writeln!(
            codec_descriptor,
            "{}\t{}",
            self.config.codec.name(),
            self.config.d_ness.as_str()
        )?;

        log::debug!("segment flush complete: {blob_cursor} bytes written to postings blob");

        Ok(BuildStats {
            term_count: self.terms.len() as u64,
            segment_count,
            postings_blob_bytes: blob_cursor,
            primary_key_count: self.primary_keys.len() as u64,
        })
    }
}

/// Encode `values` into a freshly sized buffer, doubling capacity on
/// `EncodingOverflow` until it fits.
fn encode_with_retry(
    codec: &dyn crate::codecs::Codec,
    values: &[u32],
) -> Result<Vec<u8>, IndexError> {
    let mut cap = values.len() * 5 + 128;
    loop {
        let mut buf = vec![0u8; cap];
        match codec.encode(&mut buf, values) {
            Ok(written) => {
                buf.truncate(written);
                return Ok(buf);
            }
            Err(_) => cap *= 2,
        }
        if cap > (1 << 30) {
            return Err(IndexError::corrupt(
                "codec refused to encode within a sane buffer size",
            ));
        }
    }
}
