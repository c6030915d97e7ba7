use crate::distance::{comparison_prefix, similarity};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use sapa_dedup_service::dto::{DuplicatePair, Record, DEFAULT_THRESHOLD};

///
/// Finds near-duplicate pairs in a batch of records.
///
/// `records` must be ordered oldest first: for every pair the earlier record is
/// reported as the original. A record matched as a duplicate takes no further
/// part in the run, while an original may collect several duplicates. Pairs
/// come back in the order they were found.
///
/// ## Arguments
///
/// * `records` - The batch to scan, ordered by ascending `created_at`.
/// * `threshold` - Minimum similarity (inclusive) of the comparison prefixes.
/// Clamped into `[0, 1]`.
///
pub fn detect_duplicates(records: &[Record], threshold: f64) -> Vec<DuplicatePair<'_>> {
    let threshold = clamp_threshold(threshold);
    let prefixes: Vec<String> = records
        .par_iter()
        .map(|record| comparison_prefix(&record.content))
        .collect();
    let mut matched: FxHashSet<usize> = FxHashSet::default();
    let mut pairs = Vec::new();
    for i in 0..records.len() {
        if matched.contains(&i) {
            continue;
        }
        // Marking happens after scoring, so the candidates of one original are independent.
        let candidates: Vec<usize> = (i + 1..records.len())
            .filter(|j| !matched.contains(j))
            .collect();
        let hits: Vec<(usize, f64)> = candidates
            .into_par_iter()
            .filter_map(|j| {
                let score = similarity(&prefixes[i], &prefixes[j]);
                (score >= threshold).then_some((j, score))
            })
            .collect();
        for (j, score) in hits {
            matched.insert(j);
            pairs.push(DuplicatePair {
                original: &records[i],
                duplicate: &records[j],
                similarity: score,
            });
        }
    }
    pairs
}

fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        DEFAULT_THRESHOLD
    } else {
        threshold.clamp(0.0, 1.0)
    }
}
