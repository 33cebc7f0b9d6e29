//! Storage for documents, reports, and the paraphrase cache.
//!
//! The [`Store`] trait is the persistence seam used by the HTTP layer.
//! [`InMemoryStore`] keeps everything in `RwLock<HashMap>` maps for the
//! lifetime of the process; the server constructs one at startup and shares
//! it through an `Arc`.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`create_document`](Store::create_document) | Store a submitted document |
//! | [`get_document`](Store::get_document) | Fetch a document by id |
//! | [`documents_by_user`](Store::documents_by_user) | List a user's documents, newest first |
//! | [`delete_document`](Store::delete_document) | Remove a document and its report |
//! | [`create_report`](Store::create_report) | Persist the analysis of a document |
//! | [`get_report`](Store::get_report) | Fetch a report by id |
//! | [`report_by_document`](Store::report_by_document) | Fetch the report of a document |
//! | [`get_paraphrase_from_cache`](Store::get_paraphrase_from_cache) | Exact-text cache lookup |
//! | [`save_paraphrase_to_cache`](Store::save_paraphrase_to_cache) | Cache a paraphrase (last write wins) |

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{
    Document, NewDocument, NewParaphrase, ParaphraseCacheEntry, PlagiarismAnalysis,
    PlagiarismReport,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_document(&self, doc: NewDocument) -> Result<Document>;

    async fn get_document(&self, id: u64) -> Result<Option<Document>>;

    async fn documents_by_user(&self, user_id: u64) -> Result<Vec<Document>>;

    /// Returns `false` when no such document exists.
    async fn delete_document(&self, id: u64) -> Result<bool>;

    /// Fails when `document_id` does not name a stored document.
    async fn create_report(
        &self,
        document_id: u64,
        analysis: &PlagiarismAnalysis,
    ) -> Result<PlagiarismReport>;

    async fn get_report(&self, id: u64) -> Result<Option<PlagiarismReport>>;

    async fn report_by_document(&self, document_id: u64) -> Result<Option<PlagiarismReport>>;

    /// Lookup by exact original text; no normalization.
    async fn get_paraphrase_from_cache(&self, text: &str) -> Result<Option<ParaphraseCacheEntry>>;

    async fn save_paraphrase_to_cache(&self, entry: NewParaphrase) -> Result<ParaphraseCacheEntry>;
}

/// Hex SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

pub struct InMemoryStore {
    documents: RwLock<HashMap<u64, Document>>,
    reports: RwLock<HashMap<u64, PlagiarismReport>>,
    paraphrases: RwLock<HashMap<String, ParaphraseCacheEntry>>,
    next_document_id: AtomicU64,
    next_report_id: AtomicU64,
    next_paraphrase_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            reports: RwLock::new(HashMap::new()),
            paraphrases: RwLock::new(HashMap::new()),
            next_document_id: AtomicU64::new(1),
            next_report_id: AtomicU64::new(1),
            next_paraphrase_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("store lock poisoned"))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_document(&self, doc: NewDocument) -> Result<Document> {
        let id = self.next_document_id.fetch_add(1, Ordering::SeqCst);
        let document = Document {
            id,
            user_id: doc.user_id,
            content_hash: content_hash(&doc.original_text),
            filename: doc.filename,
            original_text: doc.original_text,
            file_type: doc.file_type,
            file_size: doc.file_size,
            created_at: Utc::now(),
        };
        write(&self.documents)?.insert(id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: u64) -> Result<Option<Document>> {
        Ok(read(&self.documents)?.get(&id).cloned())
    }

    async fn documents_by_user(&self, user_id: u64) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = read(&self.documents)?
            .values()
            .filter(|d| d.user_id == Some(user_id))
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(docs)
    }

    async fn delete_document(&self, id: u64) -> Result<bool> {
        let removed = write(&self.documents)?.remove(&id).is_some();
        if removed {
            write(&self.reports)?.retain(|_, r| r.document_id != id);
        }
        Ok(removed)
    }

    async fn create_report(
        &self,
        document_id: u64,
        analysis: &PlagiarismAnalysis,
    ) -> Result<PlagiarismReport> {
        if !read(&self.documents)?.contains_key(&document_id) {
            bail!("cannot create report: document {} does not exist", document_id);
        }

        let id = self.next_report_id.fetch_add(1, Ordering::SeqCst);
        let report = PlagiarismReport {
            id,
            document_id,
            overall_score: analysis.overall_score,
            matches: analysis.matches.clone(),
            ai_generated: analysis.ai_generated,
            processing_time: analysis.processing_time,
            word_count: analysis.word_count,
            unique_text: analysis.unique_text,
            created_at: Utc::now(),
        };
        write(&self.reports)?.insert(id, report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: u64) -> Result<Option<PlagiarismReport>> {
        Ok(read(&self.reports)?.get(&id).cloned())
    }

    async fn report_by_document(&self, document_id: u64) -> Result<Option<PlagiarismReport>> {
        Ok(read(&self.reports)?
            .values()
            .filter(|r| r.document_id == document_id)
            .max_by_key(|r| r.id)
            .cloned())
    }

    async fn get_paraphrase_from_cache(&self, text: &str) -> Result<Option<ParaphraseCacheEntry>> {
        Ok(read(&self.paraphrases)?.get(text).cloned())
    }

    async fn save_paraphrase_to_cache(&self, entry: NewParaphrase) -> Result<ParaphraseCacheEntry> {
        let id = self.next_paraphrase_id.fetch_add(1, Ordering::SeqCst);
        let cached = ParaphraseCacheEntry {
            id,
            original_text: entry.original_text,
            paraphrased_text: entry.paraphrased_text,
            uniqueness_score: entry.uniqueness_score,
            created_at: Utc::now(),
        };
        write(&self.paraphrases)?.insert(cached.original_text.clone(), cached.clone());
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_doc(text: &str, user_id: Option<u64>) -> NewDocument {
        NewDocument {
            user_id,
            filename: "pasted-text.txt".into(),
            original_text: text.into(),
            file_type: "text".into(),
            file_size: text.len(),
        }
    }

    fn analysis() -> PlagiarismAnalysis {
        PlagiarismAnalysis {
            overall_score: 12,
            matches: vec![],
            ai_generated: false,
            processing_time: 3,
            word_count: 4,
            unique_text: 100,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = InMemoryStore::new();
        let a = store.create_document(new_doc("first text", None)).await.unwrap();
        let b = store.create_document(new_doc("second text", None)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        let r = store.create_report(b.id, &analysis()).await.unwrap();
        assert_eq!(r.id, 1);
        assert_eq!(r.document_id, 2);
    }

    #[tokio::test]
    async fn documents_carry_content_hash() {
        let store = InMemoryStore::new();
        let doc = store.create_document(new_doc("hello", None)).await.unwrap();
        assert_eq!(
            doc.content_hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(store.get_document(doc.id).await.unwrap(), Some(doc));
        assert_eq!(store.get_document(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn report_round_trip_keeps_analysis() {
        let store = InMemoryStore::new();
        let doc = store.create_document(new_doc("some words here now", None)).await.unwrap();
        let report = store.create_report(doc.id, &analysis()).await.unwrap();
        let fetched = store.get_report(report.id).await.unwrap().unwrap();
        assert_eq!(fetched.analysis(), analysis());
        assert_eq!(
            store.report_by_document(doc.id).await.unwrap().map(|r| r.id),
            Some(report.id)
        );
    }

    #[tokio::test]
    async fn report_requires_document() {
        let store = InMemoryStore::new();
        assert!(store.create_report(7, &analysis()).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_report() {
        let store = InMemoryStore::new();
        let doc = store.create_document(new_doc("to be deleted", None)).await.unwrap();
        let report = store.create_report(doc.id, &analysis()).await.unwrap();
        assert!(store.delete_document(doc.id).await.unwrap());
        assert!(store.get_report(report.id).await.unwrap().is_none());
        assert!(!store.delete_document(doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn documents_by_user_filters() {
        let store = InMemoryStore::new();
        store.create_document(new_doc("mine one", Some(1))).await.unwrap();
        store.create_document(new_doc("theirs", Some(2))).await.unwrap();
        store.create_document(new_doc("mine two", Some(1))).await.unwrap();
        store.create_document(new_doc("anonymous", None)).await.unwrap();
        let mine = store.documents_by_user(1).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].original_text, "mine two");
    }

    #[tokio::test]
    async fn paraphrase_cache_is_exact_match() {
        let store = InMemoryStore::new();
        store
            .save_paraphrase_to_cache(NewParaphrase {
                original_text: "Hello world".into(),
                paraphrased_text: "Greetings, world".into(),
                uniqueness_score: 60,
            })
            .await
            .unwrap();
        let hit = store.get_paraphrase_from_cache("Hello world").await.unwrap().unwrap();
        assert_eq!(hit.paraphrased_text, "Greetings, world");
        assert!(store.get_paraphrase_from_cache("hello world").await.unwrap().is_none());
        assert!(store.get_paraphrase_from_cache("Hello world ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn paraphrase_cache_last_write_wins() {
        let store = InMemoryStore::new();
        for (i, p) in ["first", "second"].into_iter().enumerate() {
            store
                .save_paraphrase_to_cache(NewParaphrase {
                    original_text: "same input".into(),
                    paraphrased_text: p.into(),
                    uniqueness_score: i as u32,
                })
                .await
                .unwrap();
        }
        let hit = store.get_paraphrase_from_cache("same input").await.unwrap().unwrap();
        assert_eq!(hit.paraphrased_text, "second");
    }
}
