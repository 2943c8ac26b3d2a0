//! Mutation Gateway Concurrency Tests
//!
//! - N concurrent appends to one document yield exactly N nodes with N
//!   distinct, gap-free ids and an uncorrupted order
//! - Mutations on different documents proceed independently
//! - Mutations racing a delete of an unrelated node all apply

use std::collections::HashSet;
use std::sync::Arc;

use folio::store::{MutationGateway, NodeStore};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_test_gateway() -> (Arc<MutationGateway>, TempDir) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = NodeStore::new(temp.path().to_path_buf(), true);
    (Arc::new(MutationGateway::new(store)), temp)
}

// =============================================================================
// Same-Document Races
// =============================================================================

/// Racing appends from many tasks never lose, duplicate, or collide.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_gap_free() {
    let (gateway, _temp) = create_test_gateway();

    const TASKS: usize = 8;
    const APPENDS_PER_TASK: usize = 8;

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let gateway = Arc::clone(&gateway);
        handles.push(tokio::spawn(async move {
            let mut issued = Vec::new();
            for n in 0..APPENDS_PER_TASK {
                let blob = format!("<p>task {} append {}</p>", task, n);
                issued.push(gateway.append("doc", blob.as_bytes()).await.unwrap());
            }
            issued
        }));
    }

    let mut all_ids = Vec::new();
    for handle in handles {
        let issued = handle.await.unwrap();
        // Ids handed to a single caller are strictly increasing.
        assert!(issued.windows(2).all(|w| w[0] < w[1]));
        all_ids.extend(issued);
    }

    let total = TASKS * APPENDS_PER_TASK;
    let distinct: HashSet<_> = all_ids.iter().copied().collect();
    assert_eq!(distinct.len(), total);
    assert_eq!(*all_ids.iter().max().unwrap(), (total as u64) - 1);

    let entries = gateway.snapshot("doc").await.unwrap();
    assert_eq!(entries.len(), total);
    let listed: HashSet<_> = entries.iter().map(|e| e.id).collect();
    assert_eq!(listed, distinct);
}

/// An append racing a delete of an unrelated node: both apply.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_append_races_unrelated_delete() {
    let (gateway, _temp) = create_test_gateway();
    let victim = gateway.append("doc", b"victim").await.unwrap();
    gateway.append("doc", b"survivor").await.unwrap();

    let appender = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.append("doc", b"late").await.unwrap() })
    };
    let deleter = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.delete("doc", victim).await.unwrap() })
    };

    let late = appender.await.unwrap();
    deleter.await.unwrap();

    let entries = gateway.snapshot("doc").await.unwrap();
    let ids: HashSet<_> = entries.iter().map(|e| e.id).collect();
    assert!(ids.contains(&late));
    assert!(!ids.contains(&victim));
    assert_eq!(entries.len(), 2);
}

/// A replace racing a delete of the same id resolves to one of the two
/// serial orders; either way the store stays consistent.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replace_delete_race_stays_consistent() {
    let (gateway, _temp) = create_test_gateway();
    let id = gateway.append("doc", b"original").await.unwrap();

    let replacer = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.replace("doc", id, b"updated").await })
    };
    let deleter = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.delete("doc", id).await })
    };

    let replace_result = replacer.await.unwrap();
    let delete_result = deleter.await.unwrap();

    // Delete-first leaves the replace with NodeNotFound; replace-first
    // deletes the updated content. Both end with the node gone.
    assert!(delete_result.is_ok() || replace_result.is_ok());
    assert!(gateway.snapshot("doc").await.unwrap().is_empty());
    assert!(gateway.store().read("doc", id).is_err());
}

// =============================================================================
// Cross-Document Independence
// =============================================================================

/// Concurrent writers on different documents never interfere; each
/// document allocates its own dense id sequence from zero.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_documents_do_not_serialize_each_other() {
    let (gateway, _temp) = create_test_gateway();

    const DOCS: usize = 4;
    const APPENDS: usize = 10;

    let mut handles = Vec::new();
    for doc in 0..DOCS {
        let gateway = Arc::clone(&gateway);
        handles.push(tokio::spawn(async move {
            let name = format!("doc-{}", doc);
            for n in 0..APPENDS {
                gateway
                    .append(&name, format!("<p>{}</p>", n).as_bytes())
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for doc in 0..DOCS {
        let name = format!("doc-{}", doc);
        let entries = gateway.snapshot(&name).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, (0..APPENDS as u64).collect::<Vec<_>>());
    }
}
