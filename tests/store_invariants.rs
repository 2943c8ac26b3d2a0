//! Node Store Invariant Tests
//!
//! - Ids are strictly increasing from zero and equal the append count
//! - Deleted ids stay dead: reads fail and ids are never reassigned
//! - Every permutation of the current id set is realizable via reorder
//! - Subset rendering follows the caller-given order, not canonical order

use folio::store::{DocumentView, MutationGateway, NodeStore, StoreError};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_test_store() -> (NodeStore, TempDir) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = NodeStore::new(temp.path().to_path_buf(), true);
    (store, temp)
}

fn ids(store: &NodeStore, doc: &str) -> Vec<u64> {
    store
        .list(doc)
        .unwrap()
        .iter()
        .map(|entry| entry.id)
        .collect()
}

// =============================================================================
// Id Allocation
// =============================================================================

/// Appends on a fresh document return 0, 1, 2, ... and list in append order.
#[test]
fn test_append_ids_count_from_zero() {
    let (store, _temp) = create_test_store();

    for expected in 0..10u64 {
        let id = store.append("doc", format!("<p>{}</p>", expected).as_bytes()).unwrap();
        assert_eq!(id, expected);
    }

    assert_eq!(ids(&store, "doc"), (0..10).collect::<Vec<_>>());

    let positions: Vec<_> = store
        .list("doc")
        .unwrap()
        .iter()
        .map(|entry| entry.position)
        .collect();
    assert_eq!(positions, (0..10).collect::<Vec<_>>());
}

/// Ids are scoped per document, each starting at zero.
#[test]
fn test_ids_are_per_document() {
    let (store, _temp) = create_test_store();

    assert_eq!(store.append("a", b"x").unwrap(), 0);
    assert_eq!(store.append("b", b"y").unwrap(), 0);
    assert_eq!(store.append("a", b"z").unwrap(), 1);
}

// =============================================================================
// Delete Semantics
// =============================================================================

/// delete(id) then read(id) fails NodeNotFound; the id is never reissued.
#[test]
fn test_deleted_ids_stay_dead() {
    let (store, _temp) = create_test_store();
    for blob in [b"a", b"b", b"c"] {
        store.append("doc", blob).unwrap();
    }

    store.delete("doc", 1).unwrap();
    assert!(matches!(
        store.read("doc", 1),
        Err(StoreError::NodeNotFound { id: 1, .. })
    ));

    // Positions compact around the hole.
    assert_eq!(ids(&store, "doc"), vec![0, 2]);

    // New appends continue past every id ever issued.
    assert_eq!(store.append("doc", b"d").unwrap(), 3);
}

/// Draining a document and refilling it never resurrects an id.
#[test]
fn test_ids_survive_full_drain() {
    let (store, _temp) = create_test_store();
    for blob in [b"a", b"b", b"c"] {
        store.append("doc", blob).unwrap();
    }
    for id in 0..3 {
        store.delete("doc", id).unwrap();
    }

    assert!(store.list("doc").unwrap().is_empty());
    assert_eq!(store.append("doc", b"fresh").unwrap(), 3);
}

// =============================================================================
// Reorder
// =============================================================================

/// Every permutation of three nodes is realizable and exact.
#[test]
fn test_reorder_realizes_every_permutation() {
    let permutations: [[u64; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for permutation in permutations {
        let (store, _temp) = create_test_store();
        for blob in [b"a", b"b", b"c"] {
            store.append("doc", blob).unwrap();
        }

        store.reorder("doc", &permutation).unwrap();
        assert_eq!(ids(&store, "doc"), permutation.to_vec());

        // Contents still resolve by id after the renames.
        assert_eq!(store.read("doc", 0).unwrap(), b"a");
        assert_eq!(store.read("doc", 2).unwrap(), b"c");
    }
}

/// Reorder input must be exactly a permutation of the current id set.
#[test]
fn test_reorder_validates_permutation() {
    let (store, _temp) = create_test_store();
    store.append("doc", b"a").unwrap();
    store.append("doc", b"b").unwrap();

    for bad in [vec![0], vec![0, 1, 1], vec![0, 9], vec![]] {
        assert!(
            matches!(store.reorder("doc", &bad), Err(StoreError::InvalidOrder(_))),
            "order {:?} should be rejected",
            bad
        );
    }

    // A failed reorder leaves the document untouched.
    assert_eq!(ids(&store, "doc"), vec![0, 1]);
}

// =============================================================================
// Rendering
// =============================================================================

/// Subset rendering returns blobs in the requested order, whatever the
/// canonical order says.
#[tokio::test]
async fn test_subset_render_is_caller_ordered() {
    let temp = TempDir::new().unwrap();
    let gateway = MutationGateway::new(NodeStore::new(temp.path().to_path_buf(), true));
    for blob in [b"a", b"b", b"c"] {
        gateway.append("doc", blob).await.unwrap();
    }

    let view = DocumentView::new(&gateway);
    let rendered = view
        .render_subset("doc", &[1, 0])
        .await
        .unwrap()
        .concat()
        .unwrap();
    assert_eq!(rendered, b"ba");

    // Repeating an id repeats its blob: the request order is literal.
    let rendered = view
        .render_subset("doc", &[2, 2])
        .await
        .unwrap()
        .concat()
        .unwrap();
    assert_eq!(rendered, b"cc");
}

/// A subset naming a missing id fails whole, reporting that id.
#[tokio::test]
async fn test_subset_render_fails_on_missing_id() {
    let temp = TempDir::new().unwrap();
    let gateway = MutationGateway::new(NodeStore::new(temp.path().to_path_buf(), true));
    gateway.append("doc", b"a").await.unwrap();

    let view = DocumentView::new(&gateway);
    match view.render_subset("doc", &[0, 7]).await {
        Err(StoreError::NodeNotFound { id, .. }) => assert_eq!(id, 7),
        other => panic!("expected NodeNotFound, got {:?}", other.map(|_| ())),
    }
}
