use crate::DocId;

/// One hit from a semantic-search collaborator: a document id with an
/// embedding-similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHit {
    pub doc_id: DocId,
    pub score: f64,
}

/// Capability interface for the external semantic collaborator. The
/// fusion engine consumes similarity-ranked hits through this trait and
/// never computes embeddings itself.
///
/// A plain document-level searcher and a chunked variant (chunk-level
/// embeddings aggregated to document scores) are two independent
/// implementations; the fusion engine only needs the capability.
pub trait SemanticProvider {
    /// Returns up to `limit` hits, descending by similarity score.
    fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<SemanticHit>>;
}
