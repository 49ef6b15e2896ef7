use anyhow::anyhow;
use cinerank_core::{
    Document, HybridSearch, InvertedIndex, SearchError, SemanticHit, SemanticProvider, Tokenizer,
};

fn movie(id: u32, title: &str, description: &str) -> Document {
    Document {
        id,
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn movie_index() -> InvertedIndex {
    let corpus = vec![
        movie(1, "Space adventure with astronauts", "A crew leaves orbit."),
        movie(2, "Romantic space love story", "Two hearts among the stars."),
        movie(3, "Kitchen cooking show", "Weeknight recipes."),
        movie(4, "Space station repair mission", "Engineers in space fix a space station."),
    ];
    let mut index = InvertedIndex::new(Tokenizer::new());
    index.build(&corpus).unwrap();
    index
}

/// Fixed ranked list standing in for the external semantic collaborator.
struct FixedProvider(Vec<SemanticHit>);

impl SemanticProvider for FixedProvider {
    fn search(&self, _query: &str, limit: usize) -> anyhow::Result<Vec<SemanticHit>> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

struct FailingProvider;

impl SemanticProvider for FailingProvider {
    fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<SemanticHit>> {
        Err(anyhow!("encoder offline"))
    }
}

fn hit(doc_id: u32, score: f64) -> SemanticHit {
    SemanticHit { doc_id, score }
}

#[test]
fn rrf_lexical_only_document_gets_one_contribution() {
    let index = movie_index();
    let provider = FixedProvider(vec![]);
    let hybrid = HybridSearch::new(&index, &provider);

    let k = 60.0;
    let results = hybrid.rrf_search("astronauts", k, 5).unwrap();
    // Document 1 is the only lexical hit and absent semantically.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].doc_id, 1);
    assert!((results[0].score - 1.0 / (k + 1.0)).abs() < 1e-12);
}

#[test]
fn rrf_document_first_on_both_sides_gets_double_contribution() {
    let index = movie_index();
    let provider = FixedProvider(vec![hit(1, 0.91)]);
    let hybrid = HybridSearch::new(&index, &provider);

    let k = 60.0;
    let results = hybrid.rrf_search("astronauts", k, 5).unwrap();
    assert_eq!(results[0].doc_id, 1);
    assert!((results[0].score - 2.0 / (k + 1.0)).abs() < 1e-12);
}

#[test]
fn rrf_higher_k_flattens_rank_gaps() {
    let index = movie_index();
    let provider = FixedProvider(vec![]);
    let hybrid = HybridSearch::new(&index, &provider);

    // "space" matches documents 1, 2 and 4 with distinct lexical ranks.
    let tight = hybrid.rrf_search("space", 5.0, 5).unwrap();
    let flat = hybrid.rrf_search("space", 500.0, 5).unwrap();
    assert!(tight.len() >= 2 && flat.len() >= 2);
    let tight_gap = tight[0].score - tight[1].score;
    let flat_gap = flat[0].score - flat[1].score;
    assert!(tight_gap > flat_gap);
}

#[test]
fn rrf_sums_contributions_across_sides() {
    let index = movie_index();
    // Semantic side ranks document 2 first, document 1 second.
    let provider = FixedProvider(vec![hit(2, 0.95), hit(1, 0.80)]);
    let hybrid = HybridSearch::new(&index, &provider);

    let k = 60.0;
    let results = hybrid.rrf_search("astronauts", k, 5).unwrap();
    let score_of = |id: u32| results.iter().find(|r| r.doc_id == id).unwrap().score;
    // Document 1: lexical rank 1 + semantic rank 2.
    assert!((score_of(1) - (1.0 / (k + 1.0) + 1.0 / (k + 2.0))).abs() < 1e-12);
    // Document 2: semantic rank 1 only.
    assert!((score_of(2) - 1.0 / (k + 1.0)).abs() < 1e-12);
}

#[test]
fn rrf_rejects_non_positive_k() {
    let index = movie_index();
    let provider = FixedProvider(vec![]);
    let hybrid = HybridSearch::new(&index, &provider);
    assert!(matches!(
        hybrid.rrf_search("space", 0.0, 5),
        Err(SearchError::InvalidParameter { name: "k", .. })
    ));
    assert!(matches!(
        hybrid.rrf_search("space", -1.0, 5),
        Err(SearchError::InvalidParameter { name: "k", .. })
    ));
}

#[test]
fn weighted_pure_lexical_matches_bm25_ordering() {
    let index = movie_index();
    let provider = FixedProvider(vec![hit(3, 0.9), hit(1, 0.6), hit(2, 0.3)]);
    let hybrid = HybridSearch::new(&index, &provider);

    let lexical = index.bm25_search("space astronauts", 10).unwrap();
    let fused = hybrid.weighted_search("space astronauts", 1.0, 10).unwrap();

    let lexical_ids: Vec<u32> = lexical.iter().map(|r| r.doc_id).collect();
    let fused_ids: Vec<u32> = fused.iter().map(|r| r.doc_id).collect();
    // Same ordering over the lexical candidates; semantic-only documents
    // trail with a zero contribution at alpha = 1.
    assert_eq!(&fused_ids[..lexical_ids.len()], &lexical_ids[..]);
    for extra in &fused[lexical_ids.len()..] {
        assert_eq!(extra.score, 0.0);
    }
}

#[test]
fn weighted_pure_semantic_matches_provider_ordering() {
    let index = movie_index();
    let provider = FixedProvider(vec![hit(3, 0.9), hit(2, 0.5), hit(1, 0.1)]);
    let hybrid = HybridSearch::new(&index, &provider);

    let fused = hybrid.weighted_search("space astronauts", 0.0, 3).unwrap();
    let ids: Vec<u32> = fused.iter().map(|r| r.doc_id).collect();
    assert_eq!(ids[0], 3);
    // Provider order 3, 2, 1 wins everywhere except ties at 0.
    assert!((fused[0].score - 1.0).abs() < 1e-12);
}

#[test]
fn weighted_unions_both_candidate_sets() {
    let index = movie_index();
    // Document 3 shares no query term; it can only arrive semantically.
    let provider = FixedProvider(vec![hit(1, 0.9), hit(3, 0.6), hit(2, 0.1)]);
    let hybrid = HybridSearch::new(&index, &provider);

    let fused = hybrid.weighted_search("space astronauts", 0.5, 10).unwrap();
    let ids: Vec<u32> = fused.iter().map(|r| r.doc_id).collect();
    assert!(ids.contains(&3));
    let doc3 = fused.iter().find(|r| r.doc_id == 3).unwrap();
    // Semantic norm of 0.6 over [0.9, 0.6, 0.1] is 0.625; lexical side
    // contributes nothing.
    assert!((doc3.score - 0.5 * 0.625).abs() < 1e-12);
}

#[test]
fn weighted_treats_degenerate_side_as_zero() {
    let index = movie_index();
    // A single semantic hit is degenerate under min-max normalization.
    let provider = FixedProvider(vec![hit(3, 0.5)]);
    let hybrid = HybridSearch::new(&index, &provider);

    let fused = hybrid.weighted_search("space astronauts", 0.5, 10).unwrap();
    let doc3 = fused.iter().find(|r| r.doc_id == 3).unwrap();
    assert_eq!(doc3.score, 0.0);
}

#[test]
fn weighted_rejects_alpha_outside_unit_interval() {
    let index = movie_index();
    let provider = FixedProvider(vec![]);
    let hybrid = HybridSearch::new(&index, &provider);
    for alpha in [-0.1, 1.1] {
        assert!(matches!(
            hybrid.weighted_search("space", alpha, 5),
            Err(SearchError::InvalidParameter { name: "alpha", .. })
        ));
    }
}

#[test]
fn weighted_respects_limit() {
    let index = movie_index();
    let provider = FixedProvider(vec![hit(1, 0.9), hit(2, 0.5), hit(3, 0.1)]);
    let hybrid = HybridSearch::new(&index, &provider);
    let fused = hybrid.weighted_search("space", 0.5, 2).unwrap();
    assert_eq!(fused.len(), 2);
}

#[test]
fn provider_failure_surfaces_without_lexical_fallback() {
    let index = movie_index();
    let provider = FailingProvider;
    let hybrid = HybridSearch::new(&index, &provider);

    // The lexical side alone could answer, but degradation must be the
    // caller's explicit choice.
    assert!(matches!(
        hybrid.weighted_search("space", 0.5, 5),
        Err(SearchError::SemanticSource(_))
    ));
    assert!(matches!(
        hybrid.rrf_search("space", 60.0, 5),
        Err(SearchError::SemanticSource(_))
    ));
}

#[test]
fn malformed_semantic_hit_is_rejected() {
    let index = movie_index();
    let provider = FixedProvider(vec![hit(1, f64::NAN)]);
    let hybrid = HybridSearch::new(&index, &provider);
    assert!(matches!(
        hybrid.rrf_search("space", 60.0, 5),
        Err(SearchError::SemanticSource(_))
    ));
}
