//! Snapshot persistence for the inverted index.
//!
//! Four co-located bincode artifacts under one cache location form a
//! snapshot: postings, document map, term frequencies and document
//! lengths. `save` stages all four in a temporary directory and
//! publishes with a single rename, so a crash mid-write never leaves a
//! loadable partial state. `load` treats the group as atomic: any
//! artifact missing means the whole snapshot is absent.

use crate::error::{Result, SearchError};
use crate::index::InvertedIndex;
use crate::tokenizer::Tokenizer;
use crate::{DocId, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const ARTIFACTS: [&str; 4] = [
    "postings.bin",
    "docmap.bin",
    "term_frequencies.bin",
    "doc_lengths.bin",
];

/// Cache location of one index snapshot.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn snapshot(&self) -> PathBuf {
        self.root.join("snapshot")
    }

    fn staging(&self) -> PathBuf {
        self.root.join("snapshot.tmp")
    }

    fn retired(&self) -> PathBuf {
        self.root.join("snapshot.old")
    }
}

fn write_artifact<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value)?;
    let mut f = File::create(dir.join(name))?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let mut buf = Vec::new();
    File::open(dir.join(name))?.read_to_end(&mut buf)?;
    bincode::deserialize(&buf)
        .map_err(|e| SearchError::CorruptSnapshot(format!("{name}: {e}")))
}

impl InvertedIndex {
    /// Persists the four index structures as one atomic snapshot.
    pub fn save(&self, paths: &IndexPaths) -> Result<()> {
        fs::create_dir_all(&paths.root)?;
        let staging = paths.staging();
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        write_artifact(&staging, "postings.bin", &self.postings)?;
        write_artifact(&staging, "docmap.bin", &self.docmap)?;
        write_artifact(&staging, "term_frequencies.bin", &self.term_frequencies)?;
        write_artifact(&staging, "doc_lengths.bin", &self.doc_lengths)?;

        // Move any previous snapshot aside rather than deleting it, so a
        // crash during publish never leaves the cache with no snapshot
        // data on disk; the retired copy is removed only once the new
        // snapshot is live.
        let snapshot = paths.snapshot();
        let retired = paths.retired();
        if retired.exists() {
            fs::remove_dir_all(&retired)?;
        }
        let had_previous = snapshot.exists();
        if had_previous {
            fs::rename(&snapshot, &retired)?;
        }
        fs::rename(&staging, &snapshot)?;
        if had_previous {
            fs::remove_dir_all(&retired)?;
        }
        tracing::info!(path = %snapshot.display(), num_docs = self.docmap.len(), "snapshot saved");
        Ok(())
    }

    /// Restores a persisted snapshot. Fails with `IndexNotBuilt` when the
    /// snapshot or any of its four artifacts is missing, and with
    /// `CorruptSnapshot` when the artifacts are present but undecodable
    /// or structurally inconsistent.
    pub fn load(paths: &IndexPaths, tokenizer: Tokenizer) -> Result<Self> {
        let snapshot = paths.snapshot();
        for name in ARTIFACTS {
            if !snapshot.join(name).is_file() {
                return Err(SearchError::IndexNotBuilt);
            }
        }

        let postings: HashMap<String, BTreeSet<DocId>> =
            read_artifact(&snapshot, "postings.bin")?;
        let docmap: HashMap<DocId, Document> = read_artifact(&snapshot, "docmap.bin")?;
        let term_frequencies: HashMap<DocId, HashMap<String, u32>> =
            read_artifact(&snapshot, "term_frequencies.bin")?;
        let doc_lengths: HashMap<DocId, u32> = read_artifact(&snapshot, "doc_lengths.bin")?;

        let index = Self {
            tokenizer,
            postings,
            docmap,
            term_frequencies,
            doc_lengths,
        };
        index.validate()?;
        tracing::debug!(num_docs = index.docmap.len(), "snapshot loaded");
        Ok(index)
    }

    /// Structural consistency checks: every document id referenced by a
    /// posting list or frequency table must exist in the document map,
    /// and per-document frequencies must sum to the recorded length.
    fn validate(&self) -> Result<()> {
        for (term, doc_ids) in &self.postings {
            for doc_id in doc_ids {
                if !self.docmap.contains_key(doc_id) {
                    return Err(SearchError::CorruptSnapshot(format!(
                        "posting list for {term:?} references unknown document {doc_id}"
                    )));
                }
            }
        }
        for (doc_id, tf) in &self.term_frequencies {
            if !self.docmap.contains_key(doc_id) {
                return Err(SearchError::CorruptSnapshot(format!(
                    "term frequencies recorded for unknown document {doc_id}"
                )));
            }
            let token_count: u64 = tf.values().map(|&c| c as u64).sum();
            let recorded = self.doc_lengths.get(doc_id).copied().unwrap_or(0) as u64;
            if token_count != recorded {
                return Err(SearchError::CorruptSnapshot(format!(
                    "document {doc_id}: frequencies sum to {token_count}, length says {recorded}"
                )));
            }
        }
        for doc_id in self.doc_lengths.keys() {
            if !self.docmap.contains_key(doc_id) {
                return Err(SearchError::CorruptSnapshot(format!(
                    "length recorded for unknown document {doc_id}"
                )));
            }
        }
        Ok(())
    }
}
