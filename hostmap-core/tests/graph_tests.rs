// Tests for the SQLite host graph store

use hostmap_core::graph::{EdgeKind, HostEdge, HostGraph, current_timestamp};
use tempfile::TempDir;

fn create_test_graph() -> (TempDir, HostGraph) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let graph = HostGraph::open(&db_path).unwrap();
    (temp_dir, graph)
}

fn edge(source_id: i64, target_id: i64) -> HostEdge {
    HostEdge {
        source_id,
        target_id,
        kind: EdgeKind::Resource,
        timestamp: current_timestamp(),
    }
}

// ============================================================================
// Store Creation Tests
// ============================================================================

#[test]
fn test_graph_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!HostGraph::exists(&db_path));
    let graph = HostGraph::open(&db_path);
    assert!(graph.is_ok());
    assert!(HostGraph::exists(&db_path));
}

#[test]
fn test_empty_graph_counts() {
    let (_temp_dir, graph) = create_test_graph();

    assert_eq!(graph.host_count().unwrap(), 0);
    assert_eq!(graph.edge_count().unwrap(), 0);
}

// ============================================================================
// Host Identity Tests
// ============================================================================

#[test]
fn test_get_or_create_host_assigns_ids() {
    let (_temp_dir, graph) = create_test_graph();

    let a = graph.get_or_create_host("a.example.com").unwrap();
    let b = graph.get_or_create_host("b.example.com").unwrap();

    assert!(a > 0);
    assert!(b > 0);
    assert_ne!(a, b);
    assert_eq!(graph.host_count().unwrap(), 2);
}

#[test]
fn test_get_or_create_host_is_idempotent() {
    let (_temp_dir, graph) = create_test_graph();

    let first = graph.get_or_create_host("cdn.example.com").unwrap();
    let second = graph.get_or_create_host("cdn.example.com").unwrap();
    let third = graph.get_or_create_host("cdn.example.com").unwrap();

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(graph.host_count().unwrap(), 1);
}

#[test]
fn test_host_id_lookup() {
    let (_temp_dir, graph) = create_test_graph();

    assert_eq!(graph.host_id("unknown.example.com").unwrap(), None);

    let id = graph.get_or_create_host("known.example.com").unwrap();
    assert_eq!(graph.host_id("known.example.com").unwrap(), Some(id));
}

// ============================================================================
// Edge Buffering and Commit Tests
// ============================================================================

#[test]
fn test_edges_stay_buffered_until_commit() {
    let (_temp_dir, mut graph) = create_test_graph();

    let src = graph.get_or_create_host("src.example.com").unwrap();
    let dst = graph.get_or_create_host("dst.example.com").unwrap();

    graph.append_edges(vec![edge(src, dst)]);
    assert_eq!(graph.pending_edges(), 1);
    assert_eq!(graph.edge_count().unwrap(), 0);

    let written = graph.commit().unwrap();
    assert_eq!(written, 1);
    assert_eq!(graph.pending_edges(), 0);
    assert_eq!(graph.edge_count().unwrap(), 1);
}

#[test]
fn test_commit_with_nothing_pending_is_a_noop() {
    let (_temp_dir, mut graph) = create_test_graph();
    assert_eq!(graph.commit().unwrap(), 0);
}

#[test]
fn test_duplicate_edges_are_preserved() {
    let (_temp_dir, mut graph) = create_test_graph();

    let src = graph.get_or_create_host("src.example.com").unwrap();
    let dst = graph.get_or_create_host("dst.example.com").unwrap();

    // Same relation observed on two crawl passes. No dedup.
    graph.append_edges(vec![edge(src, dst), edge(src, dst)]);
    graph.commit().unwrap();
    graph.append_edges(vec![edge(src, dst)]);
    graph.commit().unwrap();

    assert_eq!(graph.edge_count().unwrap(), 3);
}

#[test]
fn test_edges_from_returns_committed_rows() {
    let (_temp_dir, mut graph) = create_test_graph();

    let src = graph.get_or_create_host("page.example.com").unwrap();
    let cdn = graph.get_or_create_host("cdn.example.com").unwrap();
    let fonts = graph.get_or_create_host("fonts.example.com").unwrap();

    graph.append_edges(vec![edge(src, cdn), edge(src, fonts)]);
    graph.commit().unwrap();

    let edges = graph.edges_from("page.example.com").unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].target_id, cdn);
    assert_eq!(edges[1].target_id, fonts);
    assert!(edges.iter().all(|e| e.kind == EdgeKind::Resource));
    assert!(edges.iter().all(|e| e.timestamp > 0));
}

#[test]
fn test_top_targets_orders_by_inbound_references() {
    let (_temp_dir, mut graph) = create_test_graph();

    let a = graph.get_or_create_host("a.example.com").unwrap();
    let b = graph.get_or_create_host("b.example.com").unwrap();
    let cdn = graph.get_or_create_host("popular-cdn.com").unwrap();
    let fonts = graph.get_or_create_host("fonts.com").unwrap();

    graph.append_edges(vec![
        edge(a, cdn),
        edge(b, cdn),
        edge(a, fonts),
    ]);
    graph.commit().unwrap();

    let top = graph.top_targets(10).unwrap();
    assert_eq!(top[0], ("popular-cdn.com".to_string(), 2));
    assert_eq!(top[1], ("fonts.com".to_string(), 1));
}

// ============================================================================
// Edge Kind Tests
// ============================================================================

#[test]
fn test_edge_kind_round_trip() {
    assert_eq!(EdgeKind::Navigation.as_i64(), 1);
    assert_eq!(EdgeKind::Resource.as_i64(), 2);
    assert_eq!(EdgeKind::from_i64(1), Some(EdgeKind::Navigation));
    assert_eq!(EdgeKind::from_i64(2), Some(EdgeKind::Resource));
    assert_eq!(EdgeKind::from_i64(9), None);
}

#[test]
fn test_persistence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    {
        let mut graph = HostGraph::open(&db_path).unwrap();
        let src = graph.get_or_create_host("src.example.com").unwrap();
        let dst = graph.get_or_create_host("dst.example.com").unwrap();
        graph.append_edges(vec![edge(src, dst)]);
        graph.commit().unwrap();
    }

    let graph = HostGraph::open(&db_path).unwrap();
    assert_eq!(graph.host_count().unwrap(), 2);
    assert_eq!(graph.edge_count().unwrap(), 1);
}
