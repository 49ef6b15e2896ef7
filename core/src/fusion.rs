//! Rank fusion over a lexical (BM25) result set and a semantic result
//! set, with two strategies: weighted-sum of min-max-normalized scores,
//! and Reciprocal Rank Fusion over per-side rank positions.

use crate::error::{Result, SearchError};
use crate::index::{InvertedIndex, ScoredDoc};
use crate::normalize::min_max_normalize;
use crate::semantic::{SemanticHit, SemanticProvider};
use crate::DocId;
use std::collections::HashMap;

/// Both strategies pull `limit * CANDIDATE_OVERSAMPLE` candidates per
/// side, so normalization and rank accumulation operate over a broad
/// pool rather than only the final top-N.
pub const CANDIDATE_OVERSAMPLE: usize = 500;

/// Fuses lexical and semantic rankings into one ordered result list.
/// Holds references only: the index is read-only once query-ready, and
/// the provider is any implementation of the semantic capability.
pub struct HybridSearch<'a, P: SemanticProvider> {
    index: &'a InvertedIndex,
    semantic: &'a P,
}

impl<'a, P: SemanticProvider> HybridSearch<'a, P> {
    pub fn new(index: &'a InvertedIndex, semantic: &'a P) -> Self {
        Self { index, semantic }
    }

    /// Weighted fusion: composite = alpha * normalized_lexical
    /// + (1 - alpha) * normalized_semantic. `alpha` = 1 is pure lexical,
    /// 0 is pure semantic. A document absent from one side contributes
    /// 0 from that side rather than being excluded. A side whose scores
    /// are degenerate under min-max normalization (all equal) likewise
    /// contributes 0 for every candidate.
    pub fn weighted_search(
        &self,
        query: &str,
        alpha: f64,
        limit: usize,
    ) -> Result<Vec<ScoredDoc>> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(SearchError::InvalidParameter {
                name: "alpha",
                value: alpha,
            });
        }
        let pool = limit.saturating_mul(CANDIDATE_OVERSAMPLE);
        let lexical = self.index.bm25_search(query, pool)?;
        let semantic = self.semantic_candidates(query, pool)?;

        let lexical_norm = normalized_or_zero(
            &lexical.iter().map(|d| d.score).collect::<Vec<_>>(),
        );
        let semantic_norm = normalized_or_zero(
            &semantic.iter().map(|h| h.score).collect::<Vec<_>>(),
        );

        let mut acc = Accumulator::default();
        for (i, hit) in lexical.iter().enumerate() {
            acc.add(hit.doc_id, alpha * lexical_norm[i]);
        }
        for (i, hit) in semantic.iter().enumerate() {
            acc.add(hit.doc_id, (1.0 - alpha) * semantic_norm[i]);
        }
        Ok(acc.ranked(limit))
    }

    /// Reciprocal Rank Fusion: a document at 1-based rank r on a side
    /// contributes 1/(k + r); documents on both sides accumulate both
    /// contributions. Ranks restart at 1 independently per side. `k`
    /// dampens low ranks and must be positive.
    pub fn rrf_search(&self, query: &str, k: f64, limit: usize) -> Result<Vec<ScoredDoc>> {
        if k <= 0.0 {
            return Err(SearchError::InvalidParameter { name: "k", value: k });
        }
        let pool = limit.saturating_mul(CANDIDATE_OVERSAMPLE);
        let lexical = self.index.bm25_search(query, pool)?;
        let semantic = self.semantic_candidates(query, pool)?;

        let mut acc = Accumulator::default();
        for (rank, hit) in (1..).zip(lexical.iter()) {
            acc.add(hit.doc_id, 1.0 / (k + rank as f64));
        }
        for (rank, hit) in (1..).zip(semantic.iter()) {
            acc.add(hit.doc_id, 1.0 / (k + rank as f64));
        }
        Ok(acc.ranked(limit))
    }

    /// Pulls the semantic side, rejecting failures and malformed hits.
    /// There is no silent degradation to lexical-only ranking: callers
    /// wanting that must catch `SemanticSource` and re-run a lexical
    /// search explicitly.
    fn semantic_candidates(&self, query: &str, pool: usize) -> Result<Vec<SemanticHit>> {
        let hits = self
            .semantic
            .search(query, pool)
            .map_err(|e| SearchError::SemanticSource(e.to_string()))?;
        for hit in &hits {
            if !hit.score.is_finite() {
                return Err(SearchError::SemanticSource(format!(
                    "non-finite score {} for document {}",
                    hit.score, hit.doc_id
                )));
            }
        }
        Ok(hits)
    }
}

/// Normalizes a score list, mapping the normalizer's degenerate empty
/// result back to an all-zero list of the input's length so fusion
/// arithmetic stays total.
fn normalized_or_zero(scores: &[f64]) -> Vec<f64> {
    let normalized = min_max_normalize(scores);
    if normalized.len() == scores.len() {
        normalized
    } else {
        vec![0.0; scores.len()]
    }
}

/// Score accumulator preserving first-seen insertion order, the
/// documented tie-break for equal composite scores.
#[derive(Default)]
struct Accumulator {
    scores: HashMap<DocId, f64>,
    order: Vec<DocId>,
}

impl Accumulator {
    fn add(&mut self, doc_id: DocId, contribution: f64) {
        match self.scores.entry(doc_id) {
            std::collections::hash_map::Entry::Occupied(mut e) => *e.get_mut() += contribution,
            std::collections::hash_map::Entry::Vacant(e) => {
                self.order.push(doc_id);
                e.insert(contribution);
            }
        }
    }

    fn ranked(self, limit: usize) -> Vec<ScoredDoc> {
        let Accumulator { scores, order } = self;
        let mut ranked: Vec<ScoredDoc> = order
            .into_iter()
            .map(|doc_id| ScoredDoc {
                doc_id,
                score: scores[&doc_id],
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);
        ranked
    }
}
