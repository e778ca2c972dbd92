//! In-process bibliographic source

use copub_core::{BibliographicSource, Pmid, Publication, SourceError};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Serves canned search results and records, with scripted failures
#[derive(Default)]
pub struct FakeSource {
    searches: HashMap<String, Vec<Pmid>>,
    records: BTreeMap<Pmid, Publication>,
    /// A fetch batch containing any of these fails with a parse error
    poisoned: BTreeSet<Pmid>,
    /// Upcoming calls that fail with a transient error
    transient_failures: Cell<u32>,
    calls: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: &str, pmids: &[&str]) -> Self {
        self.searches
            .insert(term.to_string(), pmids.iter().map(|p| Pmid::new(p)).collect());
        self
    }

    pub fn with_record(mut self, pmid: &str, title: &str, authors: &[&str]) -> Self {
        let record = Publication::new(Pmid::new(pmid))
            .with_title(title)
            .with_journal("Test Journal")
            .with_authors(authors.iter().copied());
        self.records.insert(record.pmid.clone(), record);
        self
    }

    pub fn with_poisoned(mut self, pmid: &str) -> Self {
        self.poisoned.insert(Pmid::new(pmid));
        self
    }

    pub fn with_transient_failures(self, count: u32) -> Self {
        self.transient_failures.set(count);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn fail_transiently(&self) -> bool {
        let remaining = self.transient_failures.get();
        if remaining > 0 {
            self.transient_failures.set(remaining - 1);
            true
        } else {
            false
        }
    }
}

impl BibliographicSource for FakeSource {
    async fn search_by_term(&self, term: &str) -> Result<Vec<Pmid>, SourceError> {
        self.calls.borrow_mut().push(format!("search:{}", term));
        if self.fail_transiently() {
            return Err(SourceError::RateLimited);
        }
        Ok(self.searches.get(term).cloned().unwrap_or_default())
    }

    async fn fetch_metadata(&self, pmids: &[Pmid]) -> Result<Vec<Publication>, SourceError> {
        let ids: Vec<&str> = pmids.iter().map(Pmid::as_str).collect();
        self.calls.borrow_mut().push(format!("fetch:{}", ids.join(",")));
        if self.fail_transiently() {
            return Err(SourceError::RateLimited);
        }
        if pmids.iter().any(|p| self.poisoned.contains(p)) {
            return Err(SourceError::Parse("truncated payload".to_string()));
        }
        Ok(pmids
            .iter()
            .filter_map(|p| self.records.get(p).cloned())
            .collect())
    }
}
