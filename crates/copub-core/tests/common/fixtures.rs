//! Test fixture loading utilities

use copub_core::{Professor, ProfessorId};
use std::path::PathBuf;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load a mock PubMed response fixture
#[allow(dead_code)]
pub fn load_pubmed_fixture(name: &str) -> String {
    load_fixture(&format!("pubmed/{}", name))
}

/// Directory holding a small CSV store
#[allow(dead_code)]
pub fn store_fixture_dir() -> PathBuf {
    fixture_path("store")
}

/// A small roster used across tests
#[allow(dead_code)]
pub fn roster() -> Vec<Professor> {
    vec![
        professor(1, "JOÃO ALVES DA SILVA", &["Silva JA", "Silva J"]),
        professor(2, "BEATRIZ COSTA LIMA", &["Lima BC"]),
        professor(3, "CARLOS DE OLIVEIRA", &["Oliveira C", "de Oliveira C"]),
        professor(4, "DANIELA SOUZA", &[]),
    ]
}

#[allow(dead_code)]
pub fn professor(id: ProfessorId, name: &str, variants: &[&str]) -> Professor {
    Professor::new(id, name)
        .with_variants(variants.iter().copied())
        .with_area("Odontologia")
        .with_category("Permanente")
}
