//! # Mutation Gateway
//!
//! Serializes mutations per document so concurrent writers cannot race on
//! id allocation or order renames. One lazily-created async mutex per
//! document id, held in a weak-keyed registry so idle documents cost
//! nothing; mutations on different documents never contend.
//!
//! Reads take the document lock only for the directory-scan snapshot.
//! Blob transfer happens unlocked: individual node files are written
//! atomically, so an unlocked read sees old or new content in full.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};

use tokio::sync::Mutex;

use super::entry::{NodeEntry, NodeId};
use super::errors::StoreResult;
use super::node_store::NodeStore;
use crate::observability::Logger;

/// Sweep dead registry slots once the map grows past this.
const REGISTRY_SWEEP_LEN: usize = 64;

/// Write-serialization wrapper around a [`NodeStore`].
#[derive(Debug)]
pub struct MutationGateway {
    store: NodeStore,
    locks: StdMutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl MutationGateway {
    pub fn new(store: NodeStore) -> Self {
        Self {
            store,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Direct access to the store for unlocked blob reads.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Fetch or create the document's mutex. The registry lock is held only
    /// long enough to clone the Arc; waiting happens on the async mutex.
    fn doc_lock(&self, doc: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock registry poisoned");
        if let Some(existing) = locks.get(doc).and_then(Weak::upgrade) {
            return existing;
        }
        if locks.len() >= REGISTRY_SWEEP_LEN {
            locks.retain(|_, weak| weak.strong_count() > 0);
        }
        let fresh = Arc::new(Mutex::new(()));
        locks.insert(doc.to_string(), Arc::downgrade(&fresh));
        fresh
    }

    /// Consistent order snapshot for readers. Holds the document lock for
    /// the scan only, so a read never waits out a full mutation.
    pub async fn snapshot(&self, doc: &str) -> StoreResult<Vec<NodeEntry>> {
        let lock = self.doc_lock(doc);
        let _guard = lock.lock().await;
        self.store.list(doc)
    }

    pub async fn append(&self, doc: &str, blob: &[u8]) -> StoreResult<NodeId> {
        let lock = self.doc_lock(doc);
        let _guard = lock.lock().await;
        let id = self.store.append(doc, blob)?;
        Logger::info(
            "NODE_APPENDED",
            &[("document", doc), ("node", &id.to_string())],
        );
        Ok(id)
    }

    pub async fn replace(&self, doc: &str, id: NodeId, blob: &[u8]) -> StoreResult<()> {
        let lock = self.doc_lock(doc);
        let _guard = lock.lock().await;
        self.store.replace(doc, id, blob)?;
        Logger::info(
            "NODE_REPLACED",
            &[("document", doc), ("node", &id.to_string())],
        );
        Ok(())
    }

    pub async fn delete(&self, doc: &str, id: NodeId) -> StoreResult<()> {
        let lock = self.doc_lock(doc);
        let _guard = lock.lock().await;
        self.store.delete(doc, id)?;
        Logger::info(
            "NODE_DELETED",
            &[("document", doc), ("node", &id.to_string())],
        );
        Ok(())
    }

    pub async fn reorder(&self, doc: &str, order: &[NodeId]) -> StoreResult<()> {
        let lock = self.doc_lock(doc);
        let _guard = lock.lock().await;
        self.store.reorder(doc, order)?;
        Logger::info(
            "DOCUMENT_REORDERED",
            &[("document", doc), ("nodes", &order.len().to_string())],
        );
        Ok(())
    }
}
