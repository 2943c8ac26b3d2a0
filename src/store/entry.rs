//! # Node Entries
//!
//! The filename is the record: `{position:04}-{id}.html`. The zero-padded
//! position prefix makes the lexicographic directory listing the canonical
//! order; the suffix carries the immutable node id. Files that do not match
//! the pattern are invisible to the engine, so the per-document `.folio.seq`
//! high-water file never shows up as a node.

use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{StoreError, StoreResult};

/// Node identifier: unique within a document, monotonically assigned,
/// never reused after deletion.
pub type NodeId = u64;

/// Width of the zero-padded position prefix in node filenames.
pub const POSITION_WIDTH: usize = 4;

/// One node as observed in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    pub id: NodeId,
    /// Zero-based rank in the canonical order, derived from the listing
    /// index at scan time. Not trusted from the filename prefix.
    pub position: usize,
    pub filename: String,
}

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)-(\d+)\.html$").expect("valid pattern"))
}

/// Canonical filename for a node at the given position.
pub fn node_filename(position: usize, id: NodeId) -> String {
    format!("{:0width$}-{}.html", position, id, width = POSITION_WIDTH)
}

/// Parse a node id out of a directory entry name.
///
/// Returns `None` for anything that is not a node file (the seq file,
/// temp files, stray editor droppings).
pub fn parse_node_filename(name: &str) -> Option<NodeId> {
    let captures = filename_pattern().captures(name)?;
    captures[2].parse().ok()
}

/// Validate a user-supplied document or node path segment.
///
/// Exactly one normal path component is allowed; `..`, `.`, separators and
/// absolute paths are rejected before any path is built from the input.
pub fn validate_name(name: &str) -> StoreResult<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(StoreError::InvalidName(name.to_string())),
    }
}
