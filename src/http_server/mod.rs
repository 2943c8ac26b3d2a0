//! # Folio HTTP Server
//!
//! Transport layer over the node store: document rendering, node CRUD,
//! reordering, and a health probe.

pub mod config;
pub mod document_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use document_routes::{document_routes, DocumentState};
pub use server::HttpServer;
