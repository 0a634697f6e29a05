//! On-disk cache and report merge.

use reactji::cache::{CachedTally, DirStore, TallyStore, cache_key};
use reactji::error::Error;
use reactji::model::{Member, Reaction};
use reactji::report::{ReportRow, merge, write_report};
use reactji::tally::ReactionTally;

/// Build a tally from `(emoji, "space separated reactors")` pairs.
fn tally(reactions: &[(&str, &str)], user_id: &str) -> ReactionTally {
    let mut tally = ReactionTally::new();
    for (name, users) in reactions {
        tally.apply(&Reaction::new(*name, users.split_whitespace()), user_id);
    }
    tally
}

#[test]
fn dir_store_round_trips_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path().join("reactions")).unwrap();
    let ada = Member::new("U1", "Ada Lovelace");
    let entry = CachedTally::new(&ada, tally(&[("+1", "U1 U2")], "U1"));

    assert!(!store.contains("Ada Lovelace").unwrap());
    store.store(&cache_key(&ada), &entry).unwrap();

    assert!(store.contains("Ada Lovelace").unwrap());
    assert_eq!(store.load("Ada Lovelace").unwrap(), entry);
    assert_eq!(store.keys().unwrap(), vec!["Ada Lovelace".to_string()]);
}

#[test]
fn dir_store_accepts_very_long_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path()).unwrap();
    // 300 three-byte chars: far past the file name limit before the cut.
    let member = Member::new("U1", "名".repeat(300));
    let key = cache_key(&member);

    store
        .store(&key, &CachedTally::new(&member, tally(&[("+1", "U1")], "U1")))
        .unwrap();

    assert!(store.contains(&key).unwrap());
    assert_eq!(store.load(&key).unwrap().user_id, "U1");
    assert_eq!(store.keys().unwrap(), vec![key]);
}

#[test]
fn dir_store_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path()).unwrap();
    let ada = Member::new("U1", "Ada");

    store
        .store("Ada", &CachedTally::new(&ada, tally(&[("+1", "U1")], "U1")))
        .unwrap();
    let second = store.store("Ada", &CachedTally::new(&ada, ReactionTally::new()));

    assert!(matches!(second, Err(Error::AlreadyCached(_))));
    assert_eq!(store.load("Ada").unwrap().tally.len(), 1);
}

#[test]
fn missing_entry_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirStore::open(dir.path()).unwrap();
    assert!(matches!(store.load("nobody"), Err(Error::NotCached(_))));
}

#[test]
fn keys_ignore_unrelated_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
    std::fs::write(dir.path().join("half.json.tmp"), "{").unwrap();
    let store = DirStore::open(dir.path()).unwrap();

    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn report_merges_all_members() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path().join("reactions")).unwrap();

    let grace = Member::new("U2", "Grace Hopper");
    let ada = Member::new("U1", "Ada Lovelace");
    store
        .store(
            &cache_key(&grace),
            &CachedTally::new(&grace, tally(&[("eyes", "U1 U2")], "U2")),
        )
        .unwrap();
    store
        .store(
            &cache_key(&ada),
            &CachedTally::new(
                &ada,
                tally(&[("tada", "U1"), ("+1", "U1"), ("+1", "U3 U1")], "U1"),
            ),
        )
        .unwrap();

    let rows = merge(&store).unwrap();
    assert_eq!(
        rows,
        vec![
            ReportRow { name: "Ada Lovelace".into(), emoji: "+1".into(), count: 2, count_first: 1 },
            ReportRow { name: "Ada Lovelace".into(), emoji: "tada".into(), count: 1, count_first: 1 },
            ReportRow { name: "Grace Hopper".into(), emoji: "eyes".into(), count: 1, count_first: 0 },
        ]
    );

    let out = dir.path().join("all_reactions.csv");
    assert_eq!(write_report(&store, &out).unwrap(), 3);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "name,emoji,count,count_first\n\
         Ada Lovelace,+1,2,1\n\
         Ada Lovelace,tada,1,1\n\
         Grace Hopper,eyes,1,0\n"
    );
}
