//! Parallel build-side sharding.
//!
//! One arena and one set of accumulators per ingestion thread, no
//! cross-thread mutation; a single-threaded reduction phase merges shard
//! outputs into the unified per-term postings [`crate::builder::IndexBuilder`]
//! consumes. Fan-out uses `rayon`, the same crate the teacher reaches for
//! in its own tokenization/indexing parallelism (e.g. `turbo.rs`'s
//! parallel tokenization pass).

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::arena::Arena;
use crate::postings::PostingsAccumulator;

/// One document as a shard sees it: an internal docid (ascending within
/// the shard) and its already-tokenized `(term, position)` occurrences.
pub struct ShardDocument<'d> {
    pub doc: u32,
    pub terms: &'d [(String, u32)],
}

/// One shard's output: owned `(docid, tf)` pairs per term, independent of
/// the shard's arena so that memory can be reclaimed before the merge
/// phase runs.
pub type ShardOutput = BTreeMap<String, Vec<(u32, u16)>>;

/// Process one shard of documents against a private arena, returning
/// owned per-term postings. Never touches another shard's arena or
/// accumulators, so shards can run fully in parallel.
pub fn build_shard(documents: &[ShardDocument]) -> ShardOutput {
    let arena = Arena::new();
    let mut accumulators: BTreeMap<&str, PostingsAccumulator> = BTreeMap::new();

    for doc in documents {
        for (term, pos) in doc.terms {
            let acc = accumulators
                .entry(term.as_str())
                .or_insert_with(|| PostingsAccumulator::new(&arena));
            acc.push_back(doc.doc, *pos);
        }
    }

    accumulators
        .into_iter()
        .map(|(term, acc)| (term.to_string(), acc.doc_tf_pairs()))
        .collect()
}

/// Fan `documents` out across `shard_count` rayon-driven shards, split
/// into contiguous ranges so each shard's docids stay ascending and
/// shard order matches docid order, then merge in a single-threaded
/// reduction phase.
pub fn build_and_merge_parallel(
    documents: &[ShardDocument],
    shard_count: usize,
) -> BTreeMap<String, Vec<(u32, u16)>> {
    if documents.is_empty() {
        return BTreeMap::new();
    }
    let shard_count = shard_count.clamp(1, documents.len());
    let chunk_size = documents.len().div_ceil(shard_count).max(1);

    log::debug!(
        "building {} documents across {} shards",
        documents.len(),
        shard_count
    );

    let shard_outputs: Vec<ShardOutput> =
        documents.par_chunks(chunk_size).map(build_shard).collect();

    merge_shard_outputs(shard_outputs)
}

/// Single-threaded reduction: concatenate per-shard postings for the
/// same term. Sound only when shards were handed disjoint, ascending
/// docid ranges in shard order, which [`build_and_merge_parallel`]
/// guarantees by chunking `documents` contiguously.
pub fn merge_shard_outputs(shard_outputs: Vec<ShardOutput>) -> BTreeMap<String, Vec<(u32, u16)>> {
    let mut merged: BTreeMap<String, Vec<(u32, u16)>> = BTreeMap::new();
    for shard in shard_outputs {
        for (term, mut postings) in shard {
            merged.entry(term).or_default().append(&mut postings);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(doc: u32, terms: &[(String, u32)]) -> ShardDocument {
        ShardDocument { doc, terms }
    }

    #[test]
    fn single_shard_matches_direct_accumulation() {
        let docs_terms: Vec<Vec<(String, u32)>> = vec![
            vec![("apple".to_string(), 1), ("banana".to_string(), 2)],
            vec![("apple".to_string(), 1)],
        ];
        let documents: Vec<ShardDocument> = docs_terms
            .iter()
            .enumerate()
            .map(|(i, terms)| doc(i as u32 + 1, terms))
            .collect();

        let merged = build_and_merge_parallel(&documents, 1);
        assert_eq!(merged["apple"], vec![(1, 1), (2, 1)]);
        assert_eq!(merged["banana"], vec![(1, 1)]);
    }

    #[test]
    fn multiple_shards_preserve_ascending_docid_order_per_term() {
        let docs_terms: Vec<Vec<(String, u32)>> = (1..=20)
            .map(|i| vec![("common".to_string(), i)])
            .collect();
        let documents: Vec<ShardDocument> = docs_terms
            .iter()
            .enumerate()
            .map(|(i, terms)| doc(i as u32 + 1, terms))
            .collect();

        let merged = build_and_merge_parallel(&documents, 4);
        let docids: Vec<u32> = merged["common"].iter().map(|&(d, _)| d).collect();
        let expected: Vec<u32> = (1..=20).collect();
        assert_eq!(docids, expected);
    }

    #[test]
    fn empty_input_produces_empty_merge() {
        let merged = build_and_merge_parallel(&[], 4);
        assert!(merged.is_empty());
    }
}
