//! Document HTTP Routes
//!
//! The document surface: whole-document and subset rendering, node CRUD,
//! and explicit reordering. Blob contents pass through opaque; only the
//! transport boundary insists on UTF-8 when assembling an HTML response.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Html,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::observability::Logger;
use crate::store::{DocumentView, MutationGateway, NodeId, NodeStore, StoreError};

// ==================
// Shared State
// ==================

/// Document state shared across handlers
pub struct DocumentState {
    pub gateway: MutationGateway,
}

impl DocumentState {
    pub fn new(library: &FsPath, create_on_append: bool) -> Self {
        let store = NodeStore::new(library.to_path_buf(), create_on_append);
        Self {
            gateway: MutationGateway::new(store),
        }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct NodeSetQuery {
    /// Comma-separated node ids; response preserves this order literally.
    pub nodes: String,
}

#[derive(Debug, Serialize)]
pub struct AppendResponse {
    pub id: NodeId,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

// ==================
// Document Routes
// ==================

/// Create document routes
pub fn document_routes(state: Arc<DocumentState>) -> Router {
    Router::new()
        .route(
            "/:document",
            get(render_document_handler).post(append_node_handler),
        )
        .route("/:document/order", put(reorder_document_handler))
        .route(
            "/:document/:node",
            get(read_node_handler)
                .put(replace_node_handler)
                .delete(delete_node_handler),
        )
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn store_error(e: StoreError) -> ErrorReply {
    let code = e.status_code();
    if code >= 500 {
        Logger::error("STORAGE_FAILURE", &[("error", &e.to_string())]);
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            error: e.to_string(),
            code,
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ErrorReply {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            code: 400,
        }),
    )
}

fn parse_node_id(raw: &str) -> Result<NodeId, ErrorReply> {
    raw.parse()
        .map_err(|_| bad_request(format!("Invalid node id: {}", raw)))
}

fn parse_node_list(raw: &str) -> Result<Vec<NodeId>, ErrorReply> {
    raw.split(',').map(|part| parse_node_id(part.trim())).collect()
}

fn html_body(blob: Vec<u8>) -> Result<Html<String>, ErrorReply> {
    String::from_utf8(blob).map(Html).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Node content is not valid UTF-8".to_string(),
                code: 500,
            }),
        )
    })
}

// ==================
// Document Handlers
// ==================

async fn render_document_handler(
    State(state): State<Arc<DocumentState>>,
    Path(doc): Path<String>,
    nodes: Option<Query<NodeSetQuery>>,
) -> Result<Html<String>, ErrorReply> {
    let view = DocumentView::new(&state.gateway);

    let blobs = match nodes {
        Some(Query(query)) => {
            let ids = parse_node_list(&query.nodes)?;
            view.render_subset(&doc, &ids).await.map_err(store_error)?
        }
        None => view.render_all(&doc).await.map_err(store_error)?,
    };

    html_body(blobs.concat().map_err(store_error)?)
}

async fn append_node_handler(
    State(state): State<Arc<DocumentState>>,
    Path(doc): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<AppendResponse>), ErrorReply> {
    let id = state
        .gateway
        .append(&doc, &body)
        .await
        .map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(AppendResponse { id })))
}

async fn reorder_document_handler(
    State(state): State<Arc<DocumentState>>,
    Path(doc): Path<String>,
    Json(order): Json<Vec<NodeId>>,
) -> Result<StatusCode, ErrorReply> {
    state
        .gateway
        .reorder(&doc, &order)
        .await
        .map_err(store_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ==================
// Node Handlers
// ==================

async fn read_node_handler(
    State(state): State<Arc<DocumentState>>,
    Path((doc, node)): Path<(String, String)>,
) -> Result<(StatusCode, HeaderMap, Bytes), ErrorReply> {
    let id = parse_node_id(&node)?;
    let blob = state.gateway.store().read(&doc, id).map_err(store_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    let etag = format!("\"{:x}\"", Sha256::digest(&blob));
    if let Ok(value) = etag.parse() {
        headers.insert(header::ETAG, value);
    }

    Ok((StatusCode::OK, headers, Bytes::from(blob)))
}

async fn replace_node_handler(
    State(state): State<Arc<DocumentState>>,
    Path((doc, node)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ErrorReply> {
    let id = parse_node_id(&node)?;
    state
        .gateway
        .replace(&doc, id, &body)
        .await
        .map_err(store_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_node_handler(
    State(state): State<Arc<DocumentState>>,
    Path((doc, node)): Path<(String, String)>,
) -> Result<StatusCode, ErrorReply> {
    let id = parse_node_id(&node)?;
    state.gateway.delete(&doc, id).await.map_err(store_error)?;

    Ok(StatusCode::NO_CONTENT)
}
