pub mod error;
pub mod fusion;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod semantic;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

pub use error::{Result, SearchError};
pub use fusion::{HybridSearch, CANDIDATE_OVERSAMPLE};
pub use index::{InvertedIndex, ScoredDoc, BM25_B, BM25_K1};
pub use normalize::min_max_normalize;
pub use persist::IndexPaths;
pub use semantic::{SemanticHit, SemanticProvider};
pub use tokenizer::Tokenizer;

pub type DocId = u32;

/// One corpus record. Owned by the index's document map after `build`;
/// everything else refers to it by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub description: String,
}
