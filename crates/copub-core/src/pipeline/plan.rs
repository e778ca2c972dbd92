//! Run plans: which attribution strategies take part in a run

use crate::domain::{Pmid, ProfessorId};
use crate::matching::{
    AttributionStrategy, DirectAttribution, ManualEntry, ManualPublication, ManualQuery,
    VariantMatch,
};

/// What a collection run searches for and how its candidates are attributed.
/// Chosen once, before the run starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunPlan {
    /// Search each professor's display name; results belong to that professor
    pub direct_search: bool,
    /// Search each name variant; results are attributed by variant matching
    pub variant_search: bool,
    /// Identifiers supplied by hand for a professor
    pub manual_queries: Vec<(ProfessorId, Pmid)>,
    /// Publications typed in by hand
    pub manual_entries: Vec<ManualPublication>,
}

impl RunPlan {
    /// Direct and variant searches for the whole roster
    pub fn full() -> Self {
        Self {
            direct_search: true,
            variant_search: true,
            ..Self::default()
        }
    }

    pub fn direct_only() -> Self {
        Self {
            direct_search: true,
            ..Self::default()
        }
    }

    pub fn variants_only() -> Self {
        Self {
            variant_search: true,
            ..Self::default()
        }
    }

    pub fn manual_queries(queries: Vec<(ProfessorId, Pmid)>) -> Self {
        Self {
            manual_queries: queries,
            ..Self::default()
        }
    }

    pub fn manual_entry(entries: Vec<ManualPublication>) -> Self {
        Self {
            manual_entries: entries,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.direct_search
            && !self.variant_search
            && self.manual_queries.is_empty()
            && self.manual_entries.is_empty()
    }

    /// The strategies this plan enables
    pub fn strategies(&self) -> Vec<Box<dyn AttributionStrategy>> {
        let mut strategies: Vec<Box<dyn AttributionStrategy>> = Vec::new();
        if !self.manual_queries.is_empty() {
            strategies.push(Box::new(ManualQuery));
        }
        if self.direct_search {
            strategies.push(Box::new(DirectAttribution));
        }
        if self.variant_search {
            strategies.push(Box::new(VariantMatch));
        }
        if !self.manual_entries.is_empty() {
            strategies.push(Box::new(ManualEntry::new(self.manual_entries.clone())));
        }
        strategies
    }
}
