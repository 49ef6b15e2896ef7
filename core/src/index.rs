use crate::error::{Result, SearchError};
use crate::tokenizer::Tokenizer;
use crate::{DocId, Document};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const BM25_K1: f64 = 1.5;
pub const BM25_B: f64 = 0.75;

/// One entry of a ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Inverted index over a corpus snapshot, with BM25 scoring.
///
/// Built once per corpus (`build`), then read-only. There is no
/// incremental update path; rebuilding from a fresh index is the only
/// supported write operation.
#[derive(Debug)]
pub struct InvertedIndex {
    pub(crate) tokenizer: Tokenizer,
    /// term -> ids of documents containing it. BTreeSet iteration gives
    /// the ascending order `get_documents` promises.
    pub(crate) postings: HashMap<String, BTreeSet<DocId>>,
    pub(crate) docmap: HashMap<DocId, Document>,
    /// doc id -> term -> raw occurrence count.
    pub(crate) term_frequencies: HashMap<DocId, HashMap<String, u32>>,
    /// doc id -> post-normalization token count.
    pub(crate) doc_lengths: HashMap<DocId, u32>,
}

impl InvertedIndex {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            postings: HashMap::new(),
            docmap: HashMap::new(),
            term_frequencies: HashMap::new(),
            doc_lengths: HashMap::new(),
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docmap.is_empty()
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&Document> {
        self.docmap.get(&doc_id)
    }

    /// Indexes the full corpus: tokenizes `title + " " + description` of
    /// every document, recording postings, term frequencies and document
    /// lengths. Fails with `AlreadyBuilt` if this index holds documents,
    /// and with `DuplicateDocument` if the corpus repeats an id (ids are
    /// unique by contract; indexing the repeat would accumulate term
    /// frequencies onto the first occurrence's entries).
    pub fn build(&mut self, documents: &[Document]) -> Result<()> {
        if !self.docmap.is_empty() {
            return Err(SearchError::AlreadyBuilt);
        }
        for document in documents {
            if self.docmap.contains_key(&document.id) {
                return Err(SearchError::DuplicateDocument(document.id));
            }
            self.add_document(document);
        }
        tracing::info!(
            num_docs = self.docmap.len(),
            num_terms = self.postings.len(),
            "index built"
        );
        Ok(())
    }

    fn add_document(&mut self, document: &Document) {
        let text = format!("{} {}", document.title, document.description);
        let tokens = self.tokenizer.tokenize(&text);
        self.doc_lengths.insert(document.id, tokens.len() as u32);
        let tf = self.term_frequencies.entry(document.id).or_default();
        for token in tokens {
            self.postings
                .entry(token.clone())
                .or_default()
                .insert(document.id);
            *tf.entry(token).or_insert(0) += 1;
        }
        self.docmap.insert(document.id, document.clone());
    }

    /// Posting-list lookup for one term, ascending by document id.
    /// Unknown terms yield an empty list, never an error; multi-token
    /// input is rejected with `InvalidQuery`.
    pub fn get_documents(&self, term: &str) -> Result<Vec<DocId>> {
        let term = self.tokenizer.single_term(term)?;
        Ok(self
            .postings
            .get(&term)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Raw term frequency; 0 when the document or term is absent.
    pub fn get_tf(&self, doc_id: DocId, term: &str) -> Result<u32> {
        let term = self.tokenizer.single_term(term)?;
        Ok(self.tf_raw(doc_id, &term))
    }

    /// Smoothed IDF: ln((N+1)/(df+1)). Unlike `get_bm25_idf`, this lookup
    /// requires the term to be present in the vocabulary and fails with
    /// `UnknownTerm` otherwise.
    pub fn get_idf(&self, term: &str) -> Result<f64> {
        let term = self.tokenizer.single_term(term)?;
        let df = self
            .postings
            .get(&term)
            .ok_or_else(|| SearchError::UnknownTerm(term.clone()))?
            .len();
        let n = self.docmap.len();
        Ok((((n + 1) as f64) / ((df + 1) as f64)).ln())
    }

    /// BM25 IDF: ln((N - df + 0.5)/(df + 0.5) + 1). Total on any term:
    /// df = 0 yields a defined positive value, so query-time scoring
    /// never fails on vocabulary it has not seen.
    pub fn get_bm25_idf(&self, term: &str) -> Result<f64> {
        let term = self.tokenizer.single_term(term)?;
        Ok(self.bm25_idf_raw(&term))
    }

    /// BM25 contribution of one term to one document, with default
    /// k1 = 1.5 and b = 0.75.
    pub fn bm25_term_score(&self, doc_id: DocId, term: &str) -> Result<f64> {
        self.bm25_term_score_with(doc_id, term, BM25_K1, BM25_B)
    }

    pub fn bm25_term_score_with(
        &self,
        doc_id: DocId,
        term: &str,
        k1: f64,
        b: f64,
    ) -> Result<f64> {
        let term = self.tokenizer.single_term(term)?;
        Ok(self.bm25_raw(doc_id, &term, k1, b))
    }

    /// BM25 ranking over the whole query: candidates are the union of the
    /// query terms' posting lists, each accumulating the sum of its
    /// per-term scores. Descending by score, truncated to `limit`.
    ///
    /// Ties are stable on insertion order: among equal scores the
    /// document first encountered during accumulation (query-term order,
    /// then ascending doc id within a posting list) sorts first.
    pub fn bm25_search(&self, query: &str, limit: usize) -> Result<Vec<ScoredDoc>> {
        let tokens = self.tokenizer.tokenize(query);
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        let mut order: Vec<DocId> = Vec::new();

        for token in &tokens {
            let Some(doc_ids) = self.postings.get(token) else {
                continue;
            };
            for &doc_id in doc_ids {
                let entry = scores.entry(doc_id).or_insert_with(|| {
                    order.push(doc_id);
                    0.0
                });
                *entry += self.bm25_raw(doc_id, token, BM25_K1, BM25_B);
            }
        }

        let mut ranked: Vec<ScoredDoc> = order
            .into_iter()
            .map(|doc_id| ScoredDoc {
                doc_id,
                score: scores[&doc_id],
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Mean post-normalization document length; 0.0 for an empty corpus,
    /// which makes the index unusable for scoring.
    pub fn avg_doc_length(&self) -> f64 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        let total: u64 = self.doc_lengths.values().map(|&l| l as u64).sum();
        total as f64 / self.doc_lengths.len() as f64
    }

    fn tf_raw(&self, doc_id: DocId, term: &str) -> u32 {
        self.term_frequencies
            .get(&doc_id)
            .and_then(|tf| tf.get(term))
            .copied()
            .unwrap_or(0)
    }

    fn bm25_idf_raw(&self, term: &str) -> f64 {
        let df = self.postings.get(term).map_or(0, BTreeSet::len) as f64;
        let n = self.docmap.len() as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// `term` must already be normalized.
    fn bm25_raw(&self, doc_id: DocId, term: &str, k1: f64, b: f64) -> f64 {
        let tf = self.tf_raw(doc_id, term) as f64;
        let avg_len = self.avg_doc_length();
        if avg_len == 0.0 {
            return 0.0;
        }
        let doc_len = self.doc_lengths.get(&doc_id).copied().unwrap_or(0) as f64;
        let length_norm = 1.0 - b + b * (doc_len / avg_len);
        let saturated_tf = (tf * (k1 + 1.0)) / (tf + k1 * length_norm);
        saturated_tf * self.bm25_idf_raw(term)
    }
}
