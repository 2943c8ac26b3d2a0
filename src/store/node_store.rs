//! # Node Store
//!
//! Directory-per-document storage engine. The filesystem is the record of
//! truth: the canonical node order is re-derived from a directory scan on
//! every operation, never cached, so out-of-band file manipulation (manual
//! `mv`, deletions, hand-added nodes) is authoritative on next access.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::entry::{node_filename, parse_node_filename, validate_name, NodeEntry, NodeId};
use super::errors::{StoreError, StoreResult};

/// Per-document id allocation high-water file. Invisible to listings
/// because it does not match the node filename pattern.
const SEQ_FILE: &str = ".folio.seq";

/// Filesystem-backed store for one library of documents.
#[derive(Debug)]
pub struct NodeStore {
    library: PathBuf,
    create_on_append: bool,
}

impl NodeStore {
    /// Create a store rooted at the given library directory.
    ///
    /// `create_on_append` controls whether appending to an absent document
    /// creates its directory or fails with `NotFound`.
    pub fn new(library: PathBuf, create_on_append: bool) -> Self {
        Self {
            library,
            create_on_append,
        }
    }

    /// The library root this store serves.
    pub fn library(&self) -> &Path {
        &self.library
    }

    fn doc_dir(&self, doc: &str) -> StoreResult<PathBuf> {
        validate_name(doc)?;
        Ok(self.library.join(doc))
    }

    /// List a document's nodes in canonical order.
    ///
    /// Order is the lexicographic directory listing of node filenames;
    /// positions are the dense indices of that listing, regardless of what
    /// the filename prefixes claim.
    pub fn list(&self, doc: &str) -> StoreResult<Vec<NodeEntry>> {
        let dir = self.doc_dir(doc)?;
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(doc.to_string()));
            }
            Err(e) => return Err(StoreError::io(format!("listing {}", dir.display()), e)),
        };

        let mut names: Vec<(String, NodeId)> = Vec::new();
        for entry in read_dir {
            let entry =
                entry.map_err(|e| StoreError::io(format!("listing {}", dir.display()), e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Some(id) = parse_node_filename(&name) {
                names.push((name, id));
            }
        }
        names.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(position, (filename, id))| NodeEntry {
                id,
                position,
                filename,
            })
            .collect())
    }

    /// Resolve a node id to its current listing entry.
    pub fn find(&self, doc: &str, id: NodeId) -> StoreResult<NodeEntry> {
        self.list(doc)?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::NodeNotFound {
                doc: doc.to_string(),
                id,
            })
    }

    /// Read a node's blob.
    pub fn read(&self, doc: &str, id: NodeId) -> StoreResult<Vec<u8>> {
        let entry = self.find(doc, id)?;
        self.read_entry(doc, &entry)
    }

    /// Read the blob behind an already-resolved entry.
    ///
    /// A node deleted between the scan and this read reports `NodeNotFound`,
    /// same as a never-existed id.
    pub fn read_entry(&self, doc: &str, entry: &NodeEntry) -> StoreResult<Vec<u8>> {
        let path = self.doc_dir(doc)?.join(&entry.filename);
        match fs::read(&path) {
            Ok(blob) => Ok(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NodeNotFound {
                doc: doc.to_string(),
                id: entry.id,
            }),
            Err(e) => Err(StoreError::io(format!("reading {}", path.display()), e)),
        }
    }

    /// Append a blob as a new node at the tail position.
    ///
    /// The returned id is strictly greater than any id ever issued for this
    /// document, deleted ones included: allocation takes the max of the
    /// persisted high-water mark and the listing, and bumps the mark before
    /// the node file exists. A crash between the two steps skips an id.
    pub fn append(&self, doc: &str, blob: &[u8]) -> StoreResult<NodeId> {
        let dir = self.doc_dir(doc)?;
        if !dir.is_dir() {
            if !self.create_on_append {
                return Err(StoreError::NotFound(doc.to_string()));
            }
            fs::create_dir_all(&dir)
                .map_err(|e| StoreError::io(format!("creating {}", dir.display()), e))?;
        }

        let entries = self.list(doc)?;
        let from_listing = entries.iter().map(|e| e.id + 1).max().unwrap_or(0);
        let id = self.read_seq(&dir)?.max(from_listing);
        write_atomic(&dir.join(SEQ_FILE), (id + 1).to_string().as_bytes())?;

        let path = dir.join(node_filename(entries.len(), id));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StoreError::io(format!("creating {}", path.display()), e))?;
        file.write_all(blob)
            .and_then(|_| file.sync_all())
            .map_err(|e| StoreError::io(format!("writing {}", path.display()), e))?;

        Ok(id)
    }

    /// Overwrite a node's blob in place. Id and position are unchanged;
    /// readers observe either the old or the new content in full.
    pub fn replace(&self, doc: &str, id: NodeId, blob: &[u8]) -> StoreResult<()> {
        let entry = self.find(doc, id)?;
        let path = self.doc_dir(doc)?.join(&entry.filename);
        write_atomic(&path, blob)
    }

    /// Remove a node and close the position gap.
    pub fn delete(&self, doc: &str, id: NodeId) -> StoreResult<()> {
        let mut entries = self.list(doc)?;
        let index = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| StoreError::NodeNotFound {
                doc: doc.to_string(),
                id,
            })?;

        let dir = self.doc_dir(doc)?;
        let removed = entries.remove(index);
        let path = dir.join(&removed.filename);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NodeNotFound {
                    doc: doc.to_string(),
                    id,
                });
            }
            Err(e) => return Err(StoreError::io(format!("removing {}", path.display()), e)),
        }

        self.renumber(&dir, &entries)
    }

    /// Realize a caller-supplied order. `order` must be exactly a
    /// permutation of the document's current id set.
    pub fn reorder(&self, doc: &str, order: &[NodeId]) -> StoreResult<()> {
        let entries = self.list(doc)?;
        if order.len() != entries.len() {
            return Err(StoreError::InvalidOrder(format!(
                "expected {} ids, got {}",
                entries.len(),
                order.len()
            )));
        }

        let mut remaining: Vec<&NodeEntry> = entries.iter().collect();
        let mut desired: Vec<NodeEntry> = Vec::with_capacity(order.len());
        for &id in order {
            let index = remaining.iter().position(|entry| entry.id == id).ok_or_else(|| {
                StoreError::InvalidOrder(format!("id {} is not in the document, or repeats", id))
            })?;
            desired.push(remaining.remove(index).clone());
        }

        self.renumber(&self.doc_dir(doc)?, &desired)
    }

    /// Rename entries to dense canonical names realizing the given order.
    ///
    /// Safe as a single pass: a target name carries the node's own id, so it
    /// can only collide with that node's current name, and unchanged names
    /// are skipped.
    fn renumber(&self, dir: &Path, entries: &[NodeEntry]) -> StoreResult<()> {
        for (position, entry) in entries.iter().enumerate() {
            let target = node_filename(position, entry.id);
            if target == entry.filename {
                continue;
            }
            fs::rename(dir.join(&entry.filename), dir.join(&target)).map_err(|e| {
                StoreError::io(format!("renaming {} to {}", entry.filename, target), e)
            })?;
        }
        Ok(())
    }

    fn read_seq(&self, dir: &Path) -> StoreResult<NodeId> {
        let path = dir.join(SEQ_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(format!("reading {}", path.display()), e)),
        };
        raw.trim().parse().map_err(|_| {
            StoreError::io(
                format!("reading {}", path.display()),
                io::Error::new(io::ErrorKind::InvalidData, "corrupt id sequence file"),
            )
        })
    }
}

/// Write a file so that readers see either the prior or the new content,
/// never a mix: write to a sibling temp file, fsync, rename over the target.
fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp)
        .map_err(|e| StoreError::io(format!("creating {}", tmp.display()), e))?;
    file.write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| StoreError::io(format!("writing {}", tmp.display()), e))?;
    fs::rename(&tmp, path).map_err(|e| {
        StoreError::io(
            format!("renaming {} to {}", tmp.display(), path.display()),
            e,
        )
    })
}
