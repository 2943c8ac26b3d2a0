//! folio - A minimal, self-hostable HTML fragment document server
//!
//! A document is a directory; each node is one HTML fragment file whose
//! name encodes its position and immutable id. The directory listing is
//! the canonical order, so the on-disk layout is the API's ground truth.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod store;
