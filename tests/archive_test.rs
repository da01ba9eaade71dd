mod common;

use assetzip::bundle::{ArchiveBuilder, ArchiveStore, StoreState};
use common::{bundle, payload, setup};

#[test]
fn test_round_trip_every_entry() {
    setup();
    let entries: Vec<(String, Vec<u8>)> = (0..20)
        .map(|i| (format!("die{}.png", i + 1), payload(i as u8, 100 + i * 37)))
        .collect();

    let mut builder = ArchiveBuilder::new();
    for (name, data) in &entries {
        builder.add_entry(name, data.clone()).unwrap();
    }
    let blob = builder.build().unwrap();

    let mut store = ArchiveStore::new();
    store.set_archive(blob);
    for (name, data) in &entries {
        assert_eq!(store.extract(name).unwrap(), Some(data.as_slice()), "{}", name);
    }
    assert_eq!(store.extraction_passes(), 1);
}

#[test]
fn test_level_boundaries_round_trip() {
    setup();
    let data = b"boundary ".repeat(500);

    for level in [0, 9] {
        let mut builder = ArchiveBuilder::new();
        builder
            .add_entry_with_level("text.txt", data.clone(), level)
            .unwrap();
        let mut store = ArchiveStore::new();
        store.set_archive(builder.build().unwrap());
        assert_eq!(store.extract("text.txt").unwrap(), Some(data.as_slice()));
    }

    let mut builder = ArchiveBuilder::new();
    assert!(builder.add_entry_with_level("text.txt", data, 10).is_err());
    assert!(builder.is_empty());
}

#[test]
fn test_mixed_levels_in_one_archive() {
    setup();
    let mut builder = ArchiveBuilder::new();
    builder.add_entry_with_level("stored.bin", payload(1, 64), 0).unwrap();
    builder.add_entry_with_level("best.bin", payload(2, 64), 9).unwrap();
    builder.add_entry("default.bin", payload(3, 64)).unwrap();

    let mut store = ArchiveStore::new();
    store.set_archive(builder.build().unwrap());
    assert_eq!(store.extract("stored.bin").unwrap(), Some(payload(1, 64).as_slice()));
    assert_eq!(store.extract("best.bin").unwrap(), Some(payload(2, 64).as_slice()));
    assert_eq!(store.extract("default.bin").unwrap(), Some(payload(3, 64).as_slice()));
}

#[test]
fn test_single_entry_scenario() {
    setup();
    let original = payload(42, 2048);

    let mut builder = ArchiveBuilder::new();
    builder.add_entry("die1.png", original.clone()).unwrap();
    let blob = builder.build().unwrap();
    assert!(!blob.is_empty());

    let mut store = ArchiveStore::new();
    store.set_archive(blob);
    assert_eq!(store.extract("die1.png").unwrap(), Some(original.as_slice()));
    assert_eq!(store.extract("die2.png").unwrap(), None);
}

#[test]
fn test_new_archive_invalidates_extraction_cache() {
    setup();
    let mut store = ArchiveStore::new();

    store.set_archive(bundle(&[("x", b"from blob A".to_vec())]));
    assert_eq!(store.extract("x").unwrap(), Some(&b"from blob A"[..]));

    store.set_archive(bundle(&[("x", b"from blob B".to_vec())]));
    assert_eq!(store.extract("x").unwrap(), Some(&b"from blob B"[..]));
}

#[test]
fn test_reset_extraction_then_extract_again() {
    setup();
    let mut store = ArchiveStore::new();
    store.set_archive(bundle(&[("a.png", payload(5, 300))]));
    store.extract("a.png").unwrap();

    store.reset_extraction();
    assert_eq!(store.state(), StoreState::Archived);
    assert_eq!(store.extract("a.png").unwrap(), Some(payload(5, 300).as_slice()));
}

#[test]
fn test_missing_name_does_not_decompress_again() {
    setup();
    let mut store = ArchiveStore::new();
    store.set_archive(bundle(&[("a", vec![1])]));

    assert_eq!(store.extract("nope").unwrap(), None);
    assert_eq!(store.extract("also-nope").unwrap(), None);
    assert_eq!(store.extract("a").unwrap(), Some(&[1u8][..]));
    assert_eq!(store.extraction_passes(), 1);
}

#[test]
fn test_truncated_archive_is_fatal() {
    setup();
    let blob = bundle(&[("a", payload(9, 500)), ("b", payload(8, 500))]);

    let mut store = ArchiveStore::new();
    store.set_archive(blob[..blob.len() / 2].to_vec());
    assert!(store.extract("a").is_err());
    // Still fatal on retry: nothing was cached from the failed pass.
    assert!(store.extract("b").is_err());
}

#[test]
fn test_rebuild_after_reset_is_independent() {
    setup();
    let mut builder = ArchiveBuilder::new();
    builder.add_entry("first", vec![1; 10]).unwrap();
    let first = builder.build().unwrap();

    builder.reset();
    builder.add_entry("second", vec![2; 10]).unwrap();
    let second = builder.build().unwrap();

    let mut store = ArchiveStore::new();
    store.set_archive(first);
    assert_eq!(store.entry_names().unwrap(), ["first"]);
    store.set_archive(second);
    assert_eq!(store.entry_names().unwrap(), ["second"]);
}

#[test]
fn test_reads_archive_made_by_zip_tool() {
    setup();
    // `zip -X -r external.zip readme.txt sub`
    let fixture = include_bytes!("fixtures/external.zip");

    let mut store = ArchiveStore::new();
    store.set_archive(fixture.to_vec());

    let mut names = store.entry_names().unwrap();
    names.sort();
    assert_eq!(names, ["readme.txt", "sub/die1.txt"]);

    assert_eq!(
        store.extract("readme.txt").unwrap(),
        Some("assetzip fixture\n".repeat(40).as_bytes())
    );
    assert_eq!(store.extract("sub/die1.txt").unwrap(), Some(&b"die one"[..]));
    assert_eq!(store.extract("sub/").unwrap(), None);
}
