//! Store, CSV persistence and reconciliation integration tests

mod common;

use common::fixtures::store_fixture_dir;
use copub_core::error::{CopubError, StoreError};
use copub_core::{
    merge_links, merge_publications, Attribution, CsvStore, LinkTable, Pmid, Publication,
    PublicationTable, Store, StoreBackend, Year, NOT_AVAILABLE,
};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Copy the fixture store into a fresh temporary directory
fn fixture_store() -> (TempDir, CsvStore) {
    let dir = TempDir::new().unwrap();
    for file in ["professors.csv", "publications.csv", "links.csv"] {
        fs::copy(store_fixture_dir().join(file), dir.path().join(file)).unwrap();
    }
    let store = CsvStore::new(dir.path());
    (dir, store)
}

// === CSV loading ===

#[test]
fn test_load_fixture_store() {
    let (_dir, backend) = fixture_store();
    let store = Store::load(&backend).unwrap();

    let names: Vec<&str> = store.professors().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["BEATRIZ COSTA LIMA", "CARLOS DE OLIVEIRA", "JOÃO ALVES DA SILVA"]
    );
    let silva = store.professor(1).unwrap();
    assert!(silva.variants.contains("Silva J"));
    assert_eq!(silva.research_lines, "Doença periodontal; Biofilme");

    assert_eq!(store.publications().len(), 3);
    let first = &store.publications()[&Pmid::new("12345")];
    assert_eq!(first.year, Year::Known(2019));
    assert_eq!(first.author_list, vec!["Silva JA", "Lima BC"]);
    assert!(!first.has_abstract());

    let partial = &store.publications()[&Pmid::new("34567")];
    assert_eq!(partial.title, NOT_AVAILABLE);
    assert_eq!(partial.authors, NOT_AVAILABLE);
    assert_eq!(partial.year, Year::Unknown);

    // "12345.0" and "12345" are the same key; the blank pmid row is skipped
    assert_eq!(store.links().len(), 5);
}

#[test]
fn test_missing_roster_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Store::load(&CsvStore::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        CopubError::Store(StoreError::RosterUnavailable { .. })
    ));
}

#[test]
fn test_first_run_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::copy(
        store_fixture_dir().join("professors.csv"),
        dir.path().join("professors.csv"),
    )
    .unwrap();

    let store = Store::load(&CsvStore::new(dir.path())).unwrap();
    assert_eq!(store.professors().len(), 3);
    assert!(store.publications().is_empty());
    assert!(store.links().is_empty());
}

#[test]
fn test_unreadable_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    fs::copy(
        store_fixture_dir().join("professors.csv"),
        dir.path().join("professors.csv"),
    )
    .unwrap();

    let mut publications = b"pmid,doi,title,journal,year,authors,abstract\n".to_vec();
    publications.extend_from_slice(b"111,,First,J A,2020,Silva JA,\n");
    publications.extend_from_slice(b"222,,Bad \xff\xfe title,J B,2021,Lima BC,\n");
    publications.extend_from_slice(b"333,,Third,J C,2022,Oliveira C,\n");
    fs::write(dir.path().join("publications.csv"), publications).unwrap();

    let mut links = b"pmid,professor_id\n111,1\n".to_vec();
    links.extend_from_slice(b"222,\xff\n");
    links.extend_from_slice(b"333,3\n");
    fs::write(dir.path().join("links.csv"), links).unwrap();

    let store = Store::load(&CsvStore::new(dir.path())).unwrap();
    let pmids: Vec<&str> = store.publications().keys().map(Pmid::as_str).collect();
    assert_eq!(pmids, vec!["111", "333"]);
    assert_eq!(store.links().len(), 2);
    assert!(store.links().contains(&Attribution::new(Pmid::new("333"), 3)));
}

// === Persistence ===

#[test]
fn test_persist_and_reload() {
    let (dir, backend) = fixture_store();
    let mut store = Store::load(&backend).unwrap();
    store.reconcile(
        vec![Publication::new(Pmid::new("45678"))
            .with_title("New finding, with a comma")
            .with_year(Year::Known(2024))
            .with_authors(["Silva JA", "Oliveira C"])],
        vec![
            Attribution::new(Pmid::new("45678"), 1),
            Attribution::new(Pmid::new("45678"), 3),
        ],
    );
    store.persist(&backend).unwrap();

    let reloaded = Store::load(&backend).unwrap();
    assert_eq!(reloaded, store);
    assert_eq!(reloaded.publications().len(), 4);

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_numeric_keys_merge_with_string_batch() {
    let (_dir, backend) = fixture_store();
    let mut store = Store::load(&backend).unwrap();

    let report = store.reconcile(
        vec![Publication::new(Pmid::new("12345"))
            .with_title("Periodontal outcomes")
            .with_abstract("Now with an abstract")],
        vec![Attribution::new(Pmid::new(" 12345 "), 1)],
    );

    assert_eq!(report.publications_inserted, 0);
    assert_eq!(report.publications_replaced, 1);
    assert_eq!(report.links_duplicate, 1);
    assert_eq!(store.publications().len(), 3);
    assert!(store.publications()[&Pmid::new("12345")].has_abstract());
}

#[test]
fn test_saved_links_are_canonical() {
    let (dir, backend) = fixture_store();
    let store = Store::load(&backend).unwrap();
    store.persist(&backend).unwrap();

    let links = fs::read_to_string(dir.path().join("links.csv")).unwrap();
    assert!(links.starts_with("pmid,professor_id\n"));
    assert!(!links.contains("12345.0"));
    assert_eq!(backend.load_links().unwrap().len(), 5);
}

#[test]
fn test_export_pmids() {
    let (_dir, backend) = fixture_store();
    let store = Store::load(&backend).unwrap();
    let mut out = Vec::new();
    assert_eq!(store.export_pmids(&mut out).unwrap(), 3);
    assert_eq!(String::from_utf8(out).unwrap(), "12345\n23456\n34567\n");
}

// === Reconciliation properties ===

fn publications(rows: &[(u32, bool)]) -> Vec<Publication> {
    rows.iter()
        .map(|(id, with_abstract)| {
            let p = Publication::new(Pmid::from(*id as u64)).with_title(format!("Title {}", id));
            if *with_abstract {
                p.with_abstract("Abstract")
            } else {
                p
            }
        })
        .collect()
}

fn links(pairs: &[(u8, u8)]) -> Vec<Attribution> {
    pairs
        .iter()
        .map(|(pmid, prof)| Attribution::new(Pmid::from(*pmid as u64), *prof as i64))
        .collect()
}

proptest! {
    #[test]
    fn test_merge_publications_idempotent(rows in prop::collection::vec((0u32..50, any::<bool>()), 0..40)) {
        let batch = publications(&rows);
        let once = merge_publications(PublicationTable::new(), batch.clone()).merged;
        let twice = merge_publications(once.clone(), batch).merged;
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_publications_one_record_per_key(rows in prop::collection::vec((0u32..50, any::<bool>()), 0..40)) {
        let merged = merge_publications(PublicationTable::new(), publications(&rows)).merged;
        let distinct: std::collections::BTreeSet<u32> = rows.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(merged.len(), distinct.len());
    }

    #[test]
    fn test_merge_links_order_independent(pairs in prop::collection::vec((0u8..20, 0u8..5), 0..40)) {
        let forward = merge_links(LinkTable::new(), links(&pairs)).merged;
        let mut reversed_pairs = pairs.clone();
        reversed_pairs.reverse();
        let reversed = merge_links(LinkTable::new(), links(&reversed_pairs)).merged;
        prop_assert_eq!(&forward, &reversed);

        let again = merge_links(forward.clone(), links(&pairs));
        prop_assert_eq!(again.inserted, 0);
        prop_assert_eq!(again.merged, forward);
    }
}
