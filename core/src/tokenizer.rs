use crate::error::{Result, SearchError};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Stopword list compiled into the crate, one term per line.
const DEFAULT_STOPWORDS: &str = include_str!("../data/stopwords.txt");

/// Normalizes raw text into index terms: NFKC, punctuation stripping,
/// lowercasing, stopword removal, stemming. Constructed explicitly and
/// passed to the index rather than living in a process-wide singleton,
/// so two indexes can carry different stopword sets.
pub struct Tokenizer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
    punct: Regex,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `rust_stemmers::Stemmer` does not implement `Debug`.
        f.debug_struct("Tokenizer")
            .field("stopwords", &self.stopwords)
            .field("punct", &self.punct)
            .finish_non_exhaustive()
    }
}

impl Tokenizer {
    /// Tokenizer with the built-in English stopword list.
    pub fn new() -> Self {
        Self::with_stopwords(DEFAULT_STOPWORDS.lines().map(str::to_owned))
    }

    /// Tokenizer with a stopword list read from `path`, one term per line.
    pub fn from_stopwords_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::with_stopwords(text.lines().map(str::to_owned)))
    }

    fn with_stopwords<I: IntoIterator<Item = String>>(words: I) -> Self {
        let stopwords = words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
            // ASCII punctuation, replaced with spaces before splitting so
            // "sci-fi" indexes as two terms.
            punct: Regex::new(r"[[:punct:]]").expect("valid regex"),
        }
    }

    /// Order-preserving tokenization. Duplicates are kept: term-frequency
    /// counting depends on repetition.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>();
        let spaced = self.punct.replace_all(&normalized, " ");
        let lowered = spaced.to_lowercase();
        lowered
            .split_whitespace()
            .filter(|word| !self.stopwords.contains(*word))
            .map(|word| self.stemmer.stem(word).to_string())
            .collect()
    }

    /// Normalizes `text` and requires it to yield exactly one term.
    /// Single-term lookups (`get_documents`, `get_tf`, IDF accessors)
    /// reject multi-word phrases through this.
    pub fn single_term(&self, text: &str) -> Result<String> {
        let mut tokens = self.tokenize(text);
        if tokens.len() != 1 {
            return Err(SearchError::InvalidQuery(format!(
                "expected a single term, got {} tokens from {text:?}",
                tokens.len()
            )));
        }
        Ok(tokens.remove(0))
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_stems() {
        let tok = Tokenizer::new();
        let words = tok.tokenize("Running Runners RUN! A menu.");
        assert!(words.contains(&"run".to_string()));
        assert!(words.contains(&"menu".to_string()));
        assert!(!words.contains(&"a".to_string()));
    }

    #[test]
    fn filters_stopwords() {
        let tok = Tokenizer::new();
        let words = tok.tokenize("The quick brown fox and the lazy dog");
        assert!(!words.contains(&"the".to_string()));
        assert!(!words.contains(&"and".to_string()));
        assert!(words.contains(&"quick".to_string()));
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let tok = Tokenizer::new();
        let words = tok.tokenize("space space adventure");
        assert_eq!(words, vec!["space", "space", "adventur"]);
    }

    #[test]
    fn punctuation_becomes_a_separator() {
        let tok = Tokenizer::new();
        assert_eq!(tok.tokenize("sci-fi"), vec!["sci", "fi"]);
    }

    #[test]
    fn single_term_rejects_phrases() {
        let tok = Tokenizer::new();
        assert!(matches!(
            tok.single_term("space adventure"),
            Err(SearchError::InvalidQuery(_))
        ));
        assert_eq!(tok.single_term("Astronauts").unwrap(), "astronaut");
    }

    #[test]
    fn custom_stopword_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stopwords.txt");
        std::fs::write(&path, "space\n").unwrap();
        let tok = Tokenizer::from_stopwords_file(&path).unwrap();
        assert_eq!(tok.tokenize("space adventure"), vec!["adventur"]);
    }
}
