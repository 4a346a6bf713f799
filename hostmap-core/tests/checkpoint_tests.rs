// Tests for checkpoint save/load and its corruption fallback

use hostmap_core::checkpoint::CheckpointStore;
use hostmap_crawler::{Admission, CrawlState};
use std::fs;
use tempfile::TempDir;
use url::Url;

fn populated_state() -> CrawlState {
    let seeds = vec!["https://seed.com".to_string()];
    let mut state = CrawlState::new(&seeds, 0.001);
    state.admit(&Url::parse("https://alpha.com/docs").unwrap(), 50);
    state.admit(&Url::parse("https://beta.com/blog").unwrap(), 50);
    state.admit(&Url::parse("https://beta.com/shop").unwrap(), 50);
    state
}

// ============================================================================
// Round-Trip Tests
// ============================================================================

#[test]
fn test_save_then_load_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());

    let state = populated_state();
    store.save(&state).unwrap();

    let restored = store.load().expect("checkpoint should load");

    // Queue order preserved exactly.
    let original: Vec<&String> = state.queue().iter().collect();
    let loaded: Vec<&String> = restored.queue().iter().collect();
    assert_eq!(original, loaded);

    // Quota counts intact.
    assert_eq!(restored.quotas(), state.quotas());
    assert_eq!(restored.quotas().get("beta").copied(), Some(2));

    // The filter still knows every admitted signature.
    assert!(restored.seen().contains(&"alpha.com/docs".to_string()));
    assert!(restored.seen().contains(&"beta.com/blog".to_string()));
    assert!(restored.seen().contains(&"beta.com/shop".to_string()));
}

#[test]
fn test_restored_filter_blocks_readmission() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());

    store.save(&populated_state()).unwrap();
    let mut restored = store.load().unwrap();

    assert_eq!(
        restored.admit(&Url::parse("https://alpha.com/docs/deeper").unwrap(), 50),
        Admission::AlreadySeen
    );
}

#[test]
fn test_save_overwrites_previous_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());

    let mut state = populated_state();
    store.save(&state).unwrap();

    // Progress: drain the queue, then save again.
    while state.next_url().is_some() {}
    store.save(&state).unwrap();

    let restored = store.load().unwrap();
    assert_eq!(restored.queue_len(), 0);
}

// ============================================================================
// Fallback Tests
// ============================================================================

#[test]
fn test_load_without_any_checkpoint_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    assert!(store.load().is_none());
}

#[test]
fn test_load_with_missing_file_discards_partial_state() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());

    store.save(&populated_state()).unwrap();
    fs::remove_file(temp_dir.path().join("quotas.json")).unwrap();

    assert!(store.load().is_none());
}

#[test]
fn test_load_with_corrupt_filter_discards_partial_state() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());

    store.save(&populated_state()).unwrap();
    fs::write(temp_dir.path().join("seen_filter.json"), b"not json at all").unwrap();

    assert!(store.load().is_none());
}

#[test]
fn test_load_with_corrupt_frontier_discards_partial_state() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());

    store.save(&populated_state()).unwrap();
    fs::write(temp_dir.path().join("frontier.json"), b"{truncated").unwrap();

    assert!(store.load().is_none());
}

#[test]
fn test_save_creates_state_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("deeply").join("nested");
    let store = CheckpointStore::new(&nested);

    store.save(&populated_state()).unwrap();
    assert!(nested.join("frontier.json").exists());
    assert!(store.load().is_some());
}
