//! # Document View
//!
//! Read-side composition over the store. A render plans against a locked
//! order snapshot, then streams blobs lazily and unlocked.

use super::entry::{NodeEntry, NodeId};
use super::errors::{StoreError, StoreResult};
use super::gateway::MutationGateway;

/// Renders documents, whole or as a caller-ordered subset.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    gateway: &'a MutationGateway,
}

impl<'a> DocumentView<'a> {
    pub fn new(gateway: &'a MutationGateway) -> Self {
        Self { gateway }
    }

    /// All node blobs in canonical order.
    pub async fn render_all(&self, doc: &str) -> StoreResult<NodeBlobs<'a>> {
        let entries = self.gateway.snapshot(doc).await?;
        Ok(NodeBlobs::new(self.gateway, doc, entries))
    }

    /// Blobs for exactly the requested ids, in the caller-given order.
    ///
    /// Any id absent from the document fails the whole request up front;
    /// skipping missing nodes would render something silently wrong.
    pub async fn render_subset(&self, doc: &str, ids: &[NodeId]) -> StoreResult<NodeBlobs<'a>> {
        let entries = self.gateway.snapshot(doc).await?;
        let mut plan = Vec::with_capacity(ids.len());
        for &id in ids {
            let entry = entries
                .iter()
                .find(|entry| entry.id == id)
                .ok_or_else(|| StoreError::NodeNotFound {
                    doc: doc.to_string(),
                    id,
                })?;
            plan.push(entry.clone());
        }
        Ok(NodeBlobs::new(self.gateway, doc, plan))
    }
}

/// Lazy blob sequence: each `next()` reads one node file.
pub struct NodeBlobs<'a> {
    gateway: &'a MutationGateway,
    doc: String,
    entries: std::vec::IntoIter<NodeEntry>,
}

impl<'a> NodeBlobs<'a> {
    fn new(gateway: &'a MutationGateway, doc: &str, entries: Vec<NodeEntry>) -> Self {
        Self {
            gateway,
            doc: doc.to_string(),
            entries: entries.into_iter(),
        }
    }

    /// Drain into one concatenated byte buffer.
    pub fn concat(self) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        for blob in self {
            out.extend_from_slice(&blob?);
        }
        Ok(out)
    }
}

impl Iterator for NodeBlobs<'_> {
    type Item = StoreResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(self.gateway.store().read_entry(&self.doc, &entry))
    }
}
