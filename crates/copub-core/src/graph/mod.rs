//! Co-authorship graph derived from attributions
//!
//! Nothing here is persisted: edges are recomputed from the current attribution
//! table on every request. All intermediate maps are ordered, so the same store
//! always yields the same output.

mod collaborators;

pub use collaborators::{
    collaborators, Collaborator, CollaboratorReport, ProfessorSummary, SharedPublication,
};

use crate::domain::{LinkTable, Pmid, Professor, ProfessorId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A professor in the graph
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: ProfessorId,
    pub label: String,
    pub area: String,
    pub category: String,
    /// Distinct publications attributed to this professor
    pub publication_count: usize,
}

/// Weighted undirected co-authorship edge, always with `source < target`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: ProfessorId,
    pub target: ProfessorId,
    /// Number of publications both professors are attributed to
    pub weight: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollaborationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl CollaborationGraph {
    pub fn edge(&self, a: ProfessorId, b: ProfessorId) -> Option<&GraphEdge> {
        let (source, target) = if a < b { (a, b) } else { (b, a) };
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }
}

/// Build the co-authorship graph.
///
/// One node per roster entry, in roster order; professors without attributions are
/// isolated nodes. For every publication with two or more attributed professors, each
/// unordered pair gains one unit of weight. Attributions to professors outside the
/// roster are ignored so that no edge references a missing node.
pub fn build_graph(professors: &[Professor], links: &LinkTable) -> CollaborationGraph {
    let roster: BTreeSet<ProfessorId> = professors.iter().map(|p| p.id).collect();

    let mut by_pmid: BTreeMap<&Pmid, BTreeSet<ProfessorId>> = BTreeMap::new();
    for link in links {
        if roster.contains(&link.professor_id) {
            by_pmid
                .entry(&link.pmid)
                .or_default()
                .insert(link.professor_id);
        }
    }

    let mut counts: BTreeMap<ProfessorId, usize> = BTreeMap::new();
    let mut weights: BTreeMap<(ProfessorId, ProfessorId), u32> = BTreeMap::new();
    for authors in by_pmid.values() {
        let ids: Vec<ProfessorId> = authors.iter().copied().collect();
        for (i, a) in ids.iter().enumerate() {
            *counts.entry(*a).or_default() += 1;
            // ids are sorted, so every later id is greater than `a`
            for b in &ids[i + 1..] {
                *weights.entry((*a, *b)).or_default() += 1;
            }
        }
    }

    let nodes = professors
        .iter()
        .map(|p| GraphNode {
            id: p.id,
            label: p.name.clone(),
            area: p.area.clone(),
            category: p.category.clone(),
            publication_count: counts.get(&p.id).copied().unwrap_or(0),
        })
        .collect();

    let edges = weights
        .into_iter()
        .map(|((source, target), weight)| GraphEdge {
            source,
            target,
            weight,
        })
        .collect();

    CollaborationGraph { nodes, edges }
}
