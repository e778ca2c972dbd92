//! The store: roster, publication table and attribution table
//!
//! A [`Store`] is loaded in full from a [`StoreBackend`] at the start of a run, updated
//! in memory through the reconciler, and written back in full at the end. It is also
//! the read model for graph and collaborator queries.

mod backend;
mod csv_store;

pub use backend::{MemoryStore, StoreBackend};
pub use csv_store::CsvStore;

use crate::domain::{
    Attribution, LinkTable, Pmid, Professor, ProfessorId, Publication, PublicationTable,
};
use crate::error::{CopubError, Result};
use crate::graph::{self, CollaborationGraph, CollaboratorReport, ProfessorSummary};
use crate::reconcile::{merge_links, merge_publications};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    professors: Vec<Professor>,
    publications: PublicationTable,
    links: LinkTable,
}

/// Counts from one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub publications_inserted: usize,
    pub publications_replaced: usize,
    pub links_inserted: usize,
    pub links_duplicate: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessorDetail {
    pub professor: ProfessorSummary,
    pub research_lines: String,
    pub variants: BTreeSet<String>,
    /// Newest first; unknown years last
    pub publications: Vec<Publication>,
    pub total_publications: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub professors: usize,
    pub publications: usize,
    pub links: usize,
}

impl Store {
    /// Build a store from loaded rows. Rows go through the reconciler so that duplicate
    /// keys in legacy files collapse. The roster is ordered by display name.
    pub fn new(
        mut professors: Vec<Professor>,
        publications: Vec<Publication>,
        links: Vec<Attribution>,
    ) -> Self {
        let mut seen = BTreeSet::new();
        professors.retain(|p| {
            let fresh = seen.insert(p.id);
            if !fresh {
                tracing::warn!("Duplicate professor id {} ({}), keeping first", p.id, p.name);
            }
            fresh
        });
        professors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Self {
            professors,
            publications: merge_publications(PublicationTable::new(), publications).merged,
            links: merge_links(LinkTable::new(), links).merged,
        }
    }

    /// Load every table. Failure to load the roster is fatal; nothing can be attributed
    /// without it.
    pub fn load<B: StoreBackend + ?Sized>(backend: &B) -> Result<Self> {
        let professors = backend.load_professors()?;
        if professors.is_empty() {
            tracing::warn!("Professor roster is empty");
        }
        let publications = backend.load_publications()?;
        let links = backend.load_links()?;

        let store = Self::new(professors, publications, links);
        tracing::info!(
            professors = store.professors.len(),
            publications = store.publications.len(),
            links = store.links.len(),
            "Store loaded"
        );
        Ok(store)
    }

    /// Write the publication and attribution tables back in full
    pub fn persist<B: StoreBackend + ?Sized>(&self, backend: &B) -> Result<()> {
        backend.save_publications(&self.publications)?;
        backend.save_links(&self.links)?;
        tracing::info!(
            publications = self.publications.len(),
            links = self.links.len(),
            "Store persisted"
        );
        Ok(())
    }

    pub fn professors(&self) -> &[Professor] {
        &self.professors
    }

    pub fn professor(&self, id: ProfessorId) -> Option<&Professor> {
        self.professors.iter().find(|p| p.id == id)
    }

    pub fn publications(&self) -> &PublicationTable {
        &self.publications
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Merge a batch of publications and attributions into the tables
    pub fn reconcile(
        &mut self,
        publications: Vec<Publication>,
        links: Vec<Attribution>,
    ) -> ReconcileReport {
        let pubs = merge_publications(std::mem::take(&mut self.publications), publications);
        self.publications = pubs.merged;

        let linked = merge_links(std::mem::take(&mut self.links), links);
        self.links = linked.merged;

        let report = ReconcileReport {
            publications_inserted: pubs.inserted,
            publications_replaced: pubs.collisions,
            links_inserted: linked.inserted,
            links_duplicate: linked.collisions,
        };
        tracing::info!(
            publications_inserted = report.publications_inserted,
            publications_replaced = report.publications_replaced,
            links_inserted = report.links_inserted,
            links_duplicate = report.links_duplicate,
            "Reconciled batch"
        );
        report
    }

    pub fn graph(&self) -> CollaborationGraph {
        graph::build_graph(&self.professors, &self.links)
    }

    pub fn collaborators(&self, professor_id: ProfessorId) -> Result<CollaboratorReport> {
        graph::collaborators(professor_id, &self.professors, &self.publications, &self.links)
    }

    /// A professor with their attributed publications, newest first
    pub fn professor_detail(&self, professor_id: ProfessorId) -> Result<ProfessorDetail> {
        let professor = self
            .professor(professor_id)
            .ok_or_else(|| CopubError::NotFound(format!("professor {}", professor_id)))?;

        let mut publications: Vec<Publication> = self
            .links
            .iter()
            .filter(|l| l.professor_id == professor_id)
            .filter_map(|l| self.publications.get(&l.pmid))
            .cloned()
            .collect();
        publications.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.pmid.cmp(&b.pmid)));

        Ok(ProfessorDetail {
            professor: professor.into(),
            research_lines: professor.research_lines.clone(),
            variants: professor.variants.clone(),
            total_publications: publications.len(),
            publications,
        })
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            professors: self.professors.len(),
            publications: self.publications.len(),
            links: self.links.len(),
        }
    }

    pub fn pmids(&self) -> impl Iterator<Item = &Pmid> {
        self.publications.keys()
    }

    /// Write every stored pmid, one per line
    pub fn export_pmids<W: Write>(&self, mut out: W) -> std::io::Result<usize> {
        let mut count = 0;
        for pmid in self.pmids() {
            writeln!(out, "{}", pmid)?;
            count += 1;
        }
        out.flush()?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Year;

    fn store() -> Store {
        Store::new(
            vec![
                Professor::new(2, "Zélia"),
                Professor::new(1, "Ana"),
                Professor::new(1, "Ana duplicate"),
            ],
            vec![
                Publication::new(Pmid::new("10")).with_year(Year::Known(2010)),
                Publication::new(Pmid::new("11")).with_year(Year::Known(2020)),
                Publication::new(Pmid::new("10.0")).with_title("Later copy"),
            ],
            vec![
                Attribution::new(Pmid::new("10"), 1),
                Attribution::new(Pmid::new("11"), 1),
                Attribution::new(Pmid::new("10"), 1),
            ],
        )
    }

    #[test]
    fn test_new_dedups_and_sorts() {
        let store = store();
        let names: Vec<&str> = store.professors().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Zélia"]);
        assert_eq!(store.publications().len(), 2);
        assert_eq!(store.publications()[&Pmid::new("10")].title, "Later copy");
        assert_eq!(store.links().len(), 2);
    }

    #[test]
    fn test_professor_detail_sorted() {
        let detail = store().professor_detail(1).unwrap();
        assert_eq!(detail.total_publications, 2);
        assert_eq!(detail.publications[0].pmid, Pmid::new("11"));
        assert!(matches!(
            store().professor_detail(99),
            Err(CopubError::NotFound(_))
        ));
    }

    #[test]
    fn test_stats() {
        let stats = store().stats();
        assert_eq!(stats, StoreStats { professors: 2, publications: 2, links: 2 });
    }

    #[test]
    fn test_export_pmids() {
        let mut out = Vec::new();
        let count = store().export_pmids(&mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "10\n11\n");
    }

    #[test]
    fn test_reconcile_reports_counts() {
        let mut store = store();
        let report = store.reconcile(
            vec![Publication::new(Pmid::new("12"))],
            vec![
                Attribution::new(Pmid::new("12"), 2),
                Attribution::new(Pmid::new("10"), 1),
            ],
        );
        assert_eq!(report.publications_inserted, 1);
        assert_eq!(report.links_inserted, 1);
        assert_eq!(report.links_duplicate, 1);
    }

    #[test]
    fn test_persist_and_reload_memory() {
        let backend = MemoryStore::new(vec![Professor::new(1, "Ana")]);
        let mut loaded = Store::load(&backend).unwrap();
        loaded.reconcile(
            vec![Publication::new(Pmid::new("5"))],
            vec![Attribution::new(Pmid::new("5"), 1)],
        );
        loaded.persist(&backend).unwrap();

        let reloaded = Store::load(&backend).unwrap();
        assert_eq!(reloaded, loaded);
    }
}
