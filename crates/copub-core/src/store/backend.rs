//! Persistence seam

use crate::domain::{Attribution, LinkTable, Professor, Publication, PublicationTable};
use crate::error::StoreError;
use std::cell::RefCell;

/// Loads and saves the store tables.
///
/// Tables are read in full and rewritten in full. Callers must ensure at most one run
/// writes to a given backend at a time.
pub trait StoreBackend {
    fn load_professors(&self) -> Result<Vec<Professor>, StoreError>;
    fn load_publications(&self) -> Result<Vec<Publication>, StoreError>;
    fn save_publications(&self, publications: &PublicationTable) -> Result<(), StoreError>;
    fn load_links(&self) -> Result<Vec<Attribution>, StoreError>;
    fn save_links(&self, links: &LinkTable) -> Result<(), StoreError>;
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    professors: Vec<Professor>,
    publications: RefCell<Vec<Publication>>,
    links: RefCell<Vec<Attribution>>,
}

impl MemoryStore {
    pub fn new(professors: Vec<Professor>) -> Self {
        Self {
            professors,
            ..Default::default()
        }
    }

    pub fn with_publications(self, publications: Vec<Publication>) -> Self {
        self.publications.replace(publications);
        self
    }

    pub fn with_links(self, links: Vec<Attribution>) -> Self {
        self.links.replace(links);
        self
    }

    pub fn publications(&self) -> Vec<Publication> {
        self.publications.borrow().clone()
    }

    pub fn links(&self) -> Vec<Attribution> {
        self.links.borrow().clone()
    }
}

impl StoreBackend for MemoryStore {
    fn load_professors(&self) -> Result<Vec<Professor>, StoreError> {
        Ok(self.professors.clone())
    }

    fn load_publications(&self) -> Result<Vec<Publication>, StoreError> {
        Ok(self.publications())
    }

    fn save_publications(&self, publications: &PublicationTable) -> Result<(), StoreError> {
        self.publications
            .replace(publications.values().cloned().collect());
        Ok(())
    }

    fn load_links(&self) -> Result<Vec<Attribution>, StoreError> {
        Ok(self.links())
    }

    fn save_links(&self, links: &LinkTable) -> Result<(), StoreError> {
        self.links.replace(links.iter().cloned().collect());
        Ok(())
    }
}
