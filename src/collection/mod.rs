//! Named collections of documents with CRUD and similarity search.
//!
//! A [`Collection`] combines the documents map, the embedding index, and the
//! persistence layer behind one mutual-exclusion domain. Mutations validate
//! the entire batch before applying anything, then write through to storage
//! before returning, so a successful call is both visible to subsequent
//! reads and durable. Queries take the read lock and never block each other.
//!
//! # Module Structure
//!
//! - [`Collection`] - the collection itself
//! - [`config`] - creation/open configuration

pub mod config;

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use log::debug;
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::document::{Document, DocumentPayload};
use crate::embedding::Embedder;
use crate::error::{Result, SagittaError};
use crate::filter::Filter;
use crate::index::{FlatIndex, VectorIndex};
use crate::query::engine;
use crate::query::{SearchRequest, SearchResults};
use crate::snapshot::{self, SNAPSHOT_FILE, Snapshot};
use crate::storage::Storage;
use crate::vector::{DistanceMetric, vector};

pub use self::config::CollectionConfig;

/// Persistence lifecycle of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No state loaded yet.
    Unloaded,
    /// A snapshot is being deserialized.
    Loading,
    /// Open and serving reads and writes.
    Ready,
    /// In-memory state is being serialized to storage.
    Flushing,
    /// Closed; all operations fail with [`SagittaError::Closed`].
    Closed,
}

/// A document plus its insertion sequence.
///
/// The sequence is the stable tie-break for equal distances and the ordering
/// key for full-collection reads. It survives updates, so re-writing a
/// document does not change its rank among equally-distant results.
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub(crate) document: Document,
    pub(crate) seq: u64,
}

#[derive(Debug)]
struct CollectionState {
    lifecycle: Lifecycle,
    dimension: Option<usize>,
    documents: AHashMap<String, StoredDocument>,
    index: Box<dyn VectorIndex>,
    next_seq: u64,
}

/// Point-in-time statistics for a collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of stored documents.
    pub document_count: usize,
    /// Fixed dimension, if established.
    pub dimension: Option<usize>,
    /// Distance metric name.
    pub metric: String,
}

/// Selector for [`Collection::get`] and [`Collection::delete`].
///
/// When both ids and a filter are given, the selection is their
/// intersection: the listed documents that also satisfy the filter.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    /// Document ids to select. Unknown ids are skipped.
    pub ids: Option<Vec<String>>,
    /// Metadata filter to select by.
    pub filter: Option<Filter>,
}

impl Selector {
    /// Selects by explicit ids.
    pub fn ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            filter: None,
        }
    }

    /// Selects by metadata filter.
    pub fn filter(filter: Filter) -> Self {
        Self {
            ids: None,
            filter: Some(filter),
        }
    }

    /// Restricts an id selection with a filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    fn is_empty(&self) -> bool {
        self.ids.is_none() && self.filter.is_none()
    }
}

/// A named, durably persisted set of documents sharing one dimension and one
/// distance metric.
#[derive(Debug)]
pub struct Collection {
    name: String,
    metric: DistanceMetric,
    storage: Arc<dyn Storage>,
    embedder: Option<Arc<dyn Embedder>>,
    state: RwLock<CollectionState>,
}

impl Collection {
    /// Create a new empty collection and persist its initial snapshot.
    pub fn create(
        config: CollectionConfig,
        storage: Arc<dyn Storage>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self> {
        let collection = Self {
            name: config.name,
            metric: config.metric,
            storage,
            embedder,
            state: RwLock::new(CollectionState {
                lifecycle: Lifecycle::Ready,
                dimension: config.dimension_hint,
                documents: AHashMap::new(),
                index: Box::new(FlatIndex::new(config.metric)),
                next_seq: 0,
            }),
        };

        // Write-through from the start: an empty collection is durable too,
        // so a later drop has a snapshot to remove.
        let mut state = collection.state.write();
        collection.flush_locked(&mut state)?;
        drop(state);

        debug!("created collection '{}'", collection.name);
        Ok(collection)
    }

    /// Open a collection from its persisted snapshot.
    ///
    /// Fails with [`SagittaError::NotFound`] when no snapshot exists,
    /// [`SagittaError::CorruptSnapshot`] / [`SagittaError::UnsupportedVersion`]
    /// when the snapshot cannot be read, and
    /// [`SagittaError::InvalidArgument`] when the requested metric or
    /// dimension hint conflicts with the persisted state.
    pub fn open(
        config: CollectionConfig,
        storage: Arc<dyn Storage>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self> {
        let loaded = Self::load_snapshot(&config.name, storage.as_ref())?;

        if loaded.metric != config.metric {
            return Err(SagittaError::invalid_argument(format!(
                "collection '{}' uses metric {}, requested {}",
                config.name,
                loaded.metric.name(),
                config.metric.name()
            )));
        }
        if let (Some(hint), Some(dimension)) = (config.dimension_hint, loaded.dimension) {
            if hint != dimension {
                return Err(SagittaError::invalid_argument(format!(
                    "collection '{}' has dimension {dimension}, hint was {hint}",
                    config.name
                )));
            }
        }

        let dimension_hint = config.dimension_hint;
        Ok(Self::from_snapshot(loaded, dimension_hint, storage, embedder))
    }

    /// Open a collection using whatever metric its snapshot records.
    ///
    /// This is the load path for callers that do not know the metric up
    /// front, such as the CLI. Fails with [`SagittaError::NotFound`] when no
    /// snapshot exists.
    pub fn open_persisted(
        name: &str,
        storage: Arc<dyn Storage>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self> {
        let loaded = Self::load_snapshot(name, storage.as_ref())?;
        Ok(Self::from_snapshot(loaded, None, storage, embedder))
    }

    fn load_snapshot(name: &str, storage: &dyn Storage) -> Result<Snapshot> {
        let bytes = storage.read(SNAPSHOT_FILE)?;
        let loaded = snapshot::decode(&bytes)?;
        if loaded.name != name {
            return Err(SagittaError::corrupt_snapshot(format!(
                "snapshot belongs to collection '{}', expected '{}'",
                loaded.name, name
            )));
        }
        Ok(loaded)
    }

    fn from_snapshot(
        loaded: Snapshot,
        dimension_hint: Option<usize>,
        storage: Arc<dyn Storage>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Self {
        let mut state = CollectionState {
            lifecycle: Lifecycle::Loading,
            dimension: loaded.dimension.or(dimension_hint),
            documents: AHashMap::new(),
            index: Box::new(FlatIndex::new(loaded.metric)),
            next_seq: 0,
        };

        for document in loaded.documents {
            let seq = state.next_seq;
            state.next_seq += 1;
            state
                .index
                .upsert(&document.id, seq, document.vector.clone());
            state
                .documents
                .insert(document.id.clone(), StoredDocument { document, seq });
        }
        state.lifecycle = Lifecycle::Ready;

        debug!(
            "opened collection '{}' with {} documents",
            loaded.name,
            state.documents.len()
        );
        Self {
            name: loaded.name,
            metric: loaded.metric,
            storage,
            embedder,
            state: RwLock::new(state),
        }
    }

    /// Open the persisted collection if a snapshot exists, otherwise create
    /// an empty one.
    pub fn open_or_create(
        config: CollectionConfig,
        storage: Arc<dyn Storage>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self> {
        if storage.exists(SNAPSHOT_FILE) {
            Self::open(config, storage, embedder)
        } else {
            Self::create(config, storage, embedder)
        }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The distance metric this collection ranks by.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The fixed dimension, or `None` before the first add.
    pub fn dimension(&self) -> Option<usize> {
        self.state.read().dimension
    }

    /// Number of stored documents.
    pub fn count(&self) -> usize {
        self.state.read().documents.len()
    }

    /// Whether the collection has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.read().lifecycle == Lifecycle::Closed
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> CollectionStats {
        let state = self.state.read();
        CollectionStats {
            name: self.name.clone(),
            document_count: state.documents.len(),
            dimension: state.dimension,
            metric: self.metric.name().to_string(),
        }
    }

    /// Add a batch of documents.
    ///
    /// The batch is validated in full before any document is applied: a
    /// duplicate id (`DuplicateId`), a wrong-length vector
    /// (`DimensionMismatch`), or a zero vector under cosine (`ZeroVector`)
    /// rejects the whole batch. On the first-ever add the first document's
    /// vector fixes the collection dimension. Returns the assigned ids.
    pub fn add(&self, payloads: Vec<DocumentPayload>) -> Result<Vec<String>> {
        let mut state = self.state.write();
        self.ensure_ready(&state)?;

        if payloads.is_empty() {
            return Ok(Vec::new());
        }

        // Validation pass: nothing is mutated until every payload checks out.
        let mut effective_dimension = state.dimension;
        let mut batch_ids = AHashSet::with_capacity(payloads.len());
        let mut prepared = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let id = match payload.id {
                Some(id) => id,
                None => Uuid::new_v4().to_string(),
            };
            if id.is_empty() {
                return Err(SagittaError::invalid_argument(
                    "document id must not be empty",
                ));
            }
            if state.documents.contains_key(&id) || !batch_ids.insert(id.clone()) {
                return Err(SagittaError::DuplicateId(id));
            }

            let vector = self.resolve_vector(payload.vector, &payload.text)?;
            match effective_dimension {
                Some(expected) => vector::ensure_dimension(expected, vector.len())?,
                None => effective_dimension = Some(vector.len()),
            }
            vector::ensure_valid(&vector, self.metric)?;

            prepared.push(Document {
                id,
                text: payload.text,
                vector,
                metadata: payload.metadata,
            });
        }

        // Apply pass.
        let ids: Vec<String> = prepared.iter().map(|d| d.id.clone()).collect();
        for document in prepared {
            let seq = state.next_seq;
            state.next_seq += 1;
            state
                .index
                .upsert(&document.id, seq, document.vector.clone());
            state
                .documents
                .insert(document.id.clone(), StoredDocument { document, seq });
        }
        state.dimension = effective_dimension;

        self.flush_locked(&mut state)?;
        Ok(ids)
    }

    /// Replace text, metadata, and vector for existing documents.
    ///
    /// Fails with [`SagittaError::NotFound`] if any id is absent; the batch
    /// is all-or-nothing. The documents keep their insertion sequence, so
    /// updating twice with the same payload is indistinguishable from
    /// updating once.
    pub fn update(&self, ids: &[String], payloads: Vec<DocumentPayload>) -> Result<()> {
        if ids.len() != payloads.len() {
            return Err(SagittaError::invalid_argument(format!(
                "got {} ids but {} documents",
                ids.len(),
                payloads.len()
            )));
        }
        let mut state = self.state.write();
        self.ensure_ready(&state)?;

        if ids.is_empty() {
            return Ok(());
        }

        let mut prepared = Vec::with_capacity(ids.len());
        for (id, payload) in ids.iter().zip(payloads) {
            let seq = state
                .documents
                .get(id)
                .ok_or_else(|| SagittaError::not_found(format!("document id: {id}")))?
                .seq;
            if let Some(payload_id) = &payload.id {
                if payload_id != id {
                    return Err(SagittaError::invalid_argument(format!(
                        "payload id '{payload_id}' conflicts with target id '{id}'"
                    )));
                }
            }

            let vector = self.resolve_vector(payload.vector, &payload.text)?;
            if let Some(expected) = state.dimension {
                vector::ensure_dimension(expected, vector.len())?;
            }
            vector::ensure_valid(&vector, self.metric)?;

            prepared.push((
                seq,
                Document {
                    id: id.clone(),
                    text: payload.text,
                    vector,
                    metadata: payload.metadata,
                },
            ));
        }

        for (seq, document) in prepared {
            state
                .index
                .upsert(&document.id, seq, document.vector.clone());
            state
                .documents
                .insert(document.id.clone(), StoredDocument { document, seq });
        }

        self.flush_locked(&mut state)?;
        Ok(())
    }

    /// Delete documents by id, filter, or both (intersection).
    ///
    /// Deleting a non-existent id is a no-op. A selector with neither ids
    /// nor filter fails with [`SagittaError::InvalidArgument`]. Returns the
    /// number of documents removed. Deleted ids are immediately reusable by
    /// a subsequent add.
    pub fn delete(&self, selector: &Selector) -> Result<usize> {
        if selector.is_empty() {
            return Err(SagittaError::invalid_argument(
                "delete requires ids or a filter",
            ));
        }

        let mut state = self.state.write();
        self.ensure_ready(&state)?;

        let targets = resolve_selector(&state.documents, selector);
        if targets.is_empty() {
            return Ok(0);
        }

        for id in &targets {
            state.index.remove(id);
            state.documents.remove(id);
        }

        self.flush_locked(&mut state)?;
        Ok(targets.len())
    }

    /// Fetch documents by id, filter, or both, without mutating anything.
    ///
    /// An empty selector returns the whole collection. Results come back in
    /// insertion order; unknown ids are skipped.
    pub fn get(&self, selector: &Selector) -> Result<Vec<Document>> {
        let state = self.state.read();
        self.ensure_ready(&state)?;

        let mut stored: Vec<&StoredDocument> = if selector.is_empty() {
            state.documents.values().collect()
        } else {
            let targets = resolve_selector(&state.documents, selector);
            targets
                .iter()
                .filter_map(|id| state.documents.get(id))
                .collect()
        };

        stored.sort_by_key(|s| s.seq);
        Ok(stored.iter().map(|s| s.document.clone()).collect())
    }

    /// Execute a similarity search. Read-only and side-effect-free.
    pub fn query(&self, request: &SearchRequest) -> Result<SearchResults> {
        let state = self.state.read();
        self.ensure_ready(&state)?;

        engine::execute(
            request,
            self.metric,
            state.dimension,
            &state.documents,
            state.index.as_ref(),
        )
    }

    /// Embed a query text with the collection's embedder.
    ///
    /// Fails with [`SagittaError::InvalidArgument`] when the collection was
    /// opened without an embedder.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f64>> {
        match &self.embedder {
            Some(embedder) => embedder.embed(text),
            None => Err(SagittaError::invalid_argument(
                "collection has no embedder; supply a vector instead",
            )),
        }
    }

    /// Persist the current in-memory state.
    ///
    /// Mutations write through on their own; an explicit flush is only
    /// needed to retry after a failed write-through.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.write();
        self.ensure_ready(&state)?;
        self.flush_locked(&mut state)
    }

    /// Close the collection and release its storage.
    ///
    /// Closing an already-closed collection is a no-op; every other
    /// operation on a closed collection fails with [`SagittaError::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.lifecycle == Lifecycle::Closed {
            return Ok(());
        }
        state.lifecycle = Lifecycle::Closed;
        self.storage.close()?;
        debug!("closed collection '{}'", self.name);
        Ok(())
    }

    fn ensure_ready(&self, state: &CollectionState) -> Result<()> {
        match state.lifecycle {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Closed => Err(SagittaError::Closed),
            Lifecycle::Unloaded | Lifecycle::Loading | Lifecycle::Flushing => Err(
                SagittaError::invalid_argument("collection is not ready"),
            ),
        }
    }

    fn resolve_vector(&self, vector: Option<Vec<f64>>, text: &str) -> Result<Vec<f64>> {
        match vector {
            Some(vector) => Ok(vector),
            None => match &self.embedder {
                Some(embedder) => embedder.embed(text),
                None => Err(SagittaError::invalid_argument(
                    "payload has no vector and the collection has no embedder",
                )),
            },
        }
    }

    /// Serialize and atomically replace the snapshot while holding the write
    /// lock. On failure the in-memory state stays valid; the caller may
    /// retry with [`flush`](Self::flush).
    fn flush_locked(&self, state: &mut CollectionState) -> Result<()> {
        state.lifecycle = Lifecycle::Flushing;

        let mut stored: Vec<&StoredDocument> = state.documents.values().collect();
        stored.sort_by_key(|s| s.seq);
        let image = Snapshot {
            name: self.name.clone(),
            metric: self.metric,
            dimension: state.dimension,
            documents: stored.iter().map(|s| s.document.clone()).collect(),
        };

        let result = snapshot::encode(&image)
            .and_then(|bytes| self.storage.write_atomic(SNAPSHOT_FILE, &bytes));

        state.lifecycle = Lifecycle::Ready;
        result
    }
}

/// Resolve a selector to target ids, in deterministic (insertion) order.
fn resolve_selector(
    documents: &AHashMap<String, StoredDocument>,
    selector: &Selector,
) -> Vec<String> {
    let matches_filter = |stored: &StoredDocument| match &selector.filter {
        Some(filter) => filter.matches(&stored.document.metadata),
        None => true,
    };

    let mut targets: Vec<(u64, String)> = match &selector.ids {
        Some(ids) => ids
            .iter()
            .filter_map(|id| documents.get(id))
            .filter(|stored| matches_filter(stored))
            .map(|stored| (stored.seq, stored.document.id.clone()))
            .collect(),
        None => documents
            .values()
            .filter(|stored| matches_filter(stored))
            .map(|stored| (stored.seq, stored.document.id.clone()))
            .collect(),
    };

    targets.sort();
    targets.dedup();
    targets.into_iter().map(|(_, id)| id).collect()
}
