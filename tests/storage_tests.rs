use std::fs;
use std::path::PathBuf;

use retrocade::storage::{Storage, SCORES_PER_GAME};

fn scratch_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("retrocade-test-{}-{name}.json", std::process::id()));
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn missing_file_yields_defaults() {
    let storage = Storage::load_from(scratch_path("missing"));
    assert_eq!(storage.player(), None);
    assert_eq!(storage.volume(), 70);
    assert!(storage.top_scores(0).is_empty());
}

#[test]
fn corrupt_file_is_treated_as_absent() {
    let path = scratch_path("corrupt");
    fs::write(&path, b"{not json at all").unwrap();
    let storage = Storage::load_from(path);
    assert_eq!(storage.player(), None);
    assert_eq!(storage.volume(), 70);
    assert!(storage.top_scores(2).is_empty());
}

#[test]
fn profile_round_trips_through_disk() {
    let path = scratch_path("roundtrip");
    {
        let mut storage = Storage::load_from(path.clone());
        storage.set_player("ALICE");
        storage.set_volume(40);
        storage.submit(0, "ALICE", 1200);
    }
    let storage = Storage::load_from(path);
    assert_eq!(storage.player(), Some("ALICE"));
    assert_eq!(storage.volume(), 40);
    let scores = storage.top_scores(0);
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].name, "ALICE");
    assert_eq!(scores[0].score, 1200);
}

#[test]
fn leaderboard_keeps_the_top_five_sorted() {
    let mut storage = Storage::load_from(scratch_path("topfive"));
    for (name, score) in [
        ("A", 100),
        ("B", 300),
        ("C", 200),
        ("D", 500),
        ("E", 400),
        ("F", 250),
    ] {
        storage.submit(1, name, score);
    }
    let scores = storage.top_scores(1);
    assert_eq!(scores.len(), SCORES_PER_GAME);
    let values: Vec<u32> = scores.iter().map(|e| e.score).collect();
    assert_eq!(values, vec![500, 400, 300, 250, 200]);
    // 100 fell off the bottom.
    assert!(scores.iter().all(|e| e.name != "A"));
}

#[test]
fn ties_keep_the_older_entry_ahead() {
    let mut storage = Storage::load_from(scratch_path("ties"));
    storage.submit(2, "FIRST", 300);
    storage.submit(2, "SECOND", 300);
    let scores = storage.top_scores(2);
    assert_eq!(scores[0].name, "FIRST");
    assert_eq!(scores[1].name, "SECOND");
}

#[test]
fn zero_scores_never_qualify() {
    let mut storage = Storage::load_from(scratch_path("zero"));
    assert!(!storage.qualifies(0, 0));
    assert!(!storage.submit(0, "NOBODY", 0));
    assert!(storage.top_scores(0).is_empty());
}

#[test]
fn qualifies_tracks_the_cutoff() {
    let mut storage = Storage::load_from(scratch_path("cutoff"));
    for i in 1..=SCORES_PER_GAME as u32 {
        storage.submit(3, "X", i * 100);
    }
    assert!(storage.qualifies(3, 150));
    assert!(!storage.qualifies(3, 100));
    assert!(!storage.qualifies(3, 50));
}

#[test]
fn leaderboards_are_keyed_per_game() {
    let mut storage = Storage::load_from(scratch_path("keys"));
    storage.submit(0, "TET", 100);
    storage.submit(4, "XON", 200);
    assert_eq!(storage.top_scores(0).len(), 1);
    assert_eq!(storage.top_scores(4).len(), 1);
    assert_eq!(storage.top_scores(1).len(), 0);
    assert_eq!(storage.top_scores(0)[0].name, "TET");
    assert_eq!(storage.top_scores(4)[0].name, "XON");
}

#[test]
fn session_submission_flags_reset_per_game() {
    let mut storage = Storage::load_from(scratch_path("flags"));
    assert!(!storage.was_submitted(0));
    storage.mark_submitted(0);
    assert!(storage.was_submitted(0));
    assert!(!storage.was_submitted(1));
    storage.clear_submitted(0);
    assert!(!storage.was_submitted(0));
}
