//! Per-professor collaborator view

use crate::domain::{
    LinkTable, Pmid, Professor, ProfessorId, PublicationTable, Year,
};
use crate::error::{CopubError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfessorSummary {
    pub id: ProfessorId,
    pub name: String,
    pub category: String,
    pub area: String,
}

impl From<&Professor> for ProfessorSummary {
    fn from(p: &Professor) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            category: p.category.clone(),
            area: p.area.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SharedPublication {
    pub pmid: Pmid,
    pub title: String,
    pub year: Year,
    pub doi: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Collaborator {
    #[serde(flatten)]
    pub professor: ProfessorSummary,
    pub shared_count: usize,
    /// Newest first; unknown years last
    pub publications: Vec<SharedPublication>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollaboratorReport {
    pub professor: ProfessorSummary,
    /// Most shared publications first
    pub collaborators: Vec<Collaborator>,
    pub total_collaborators: usize,
    /// Distinct publications shared with at least one collaborator
    pub total_shared_publications: usize,
}

/// Collaborators of one professor.
///
/// Every other roster member sharing at least one publication becomes an entry. Entries
/// are ordered by shared count, descending. Among equal counts no order is promised; the
/// sort is stable, so they currently keep roster order. Shared publications absent from
/// the publication table still count but are not listed.
pub fn collaborators(
    professor_id: ProfessorId,
    professors: &[Professor],
    publications: &PublicationTable,
    links: &LinkTable,
) -> Result<CollaboratorReport> {
    let professor = professors
        .iter()
        .find(|p| p.id == professor_id)
        .ok_or_else(|| CopubError::NotFound(format!("professor {}", professor_id)))?;

    let mut pmids_by_professor: BTreeMap<ProfessorId, BTreeSet<&Pmid>> = BTreeMap::new();
    for link in links {
        pmids_by_professor
            .entry(link.professor_id)
            .or_default()
            .insert(&link.pmid);
    }

    let empty = BTreeSet::new();
    let own = pmids_by_professor.get(&professor_id).unwrap_or(&empty);

    let mut all_shared: BTreeSet<&Pmid> = BTreeSet::new();
    let mut entries = Vec::new();

    for other in professors.iter().filter(|p| p.id != professor_id) {
        let Some(theirs) = pmids_by_professor.get(&other.id) else {
            continue;
        };
        let shared: Vec<&Pmid> = own.intersection(theirs).copied().collect();
        if shared.is_empty() {
            continue;
        }
        all_shared.extend(shared.iter().copied());

        let mut listed: Vec<SharedPublication> = shared
            .iter()
            .filter_map(|pmid| publications.get(*pmid))
            .map(|p| SharedPublication {
                pmid: p.pmid.clone(),
                title: p.title.clone(),
                year: p.year,
                doi: p.doi.clone(),
                abstract_text: p.abstract_text.clone(),
            })
            .collect();
        listed.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.pmid.cmp(&b.pmid)));

        entries.push(Collaborator {
            professor: other.into(),
            shared_count: shared.len(),
            publications: listed,
        });
    }

    entries.sort_by(|a, b| b.shared_count.cmp(&a.shared_count));

    Ok(CollaboratorReport {
        professor: professor.into(),
        total_collaborators: entries.len(),
        total_shared_publications: all_shared.len(),
        collaborators: entries,
    })
}
