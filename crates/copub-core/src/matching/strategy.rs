//! Attribution strategies
//!
//! Each strategy turns the candidates gathered during a run into attributions. The set
//! of strategies taking part in a run is chosen once, up front, from the run plan.

use super::variants_match;
use crate::domain::{
    Attribution, Pmid, Professor, ProfessorId, Publication, PublicationTable, Year,
};
use crate::text::normalize_author_list;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// How a candidate identifier was obtained, and therefore how much it can be trusted
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// Supplied by hand for a given professor
    Manual(ProfessorId),
    /// Returned by a search on the professor's exact name
    Direct(ProfessorId),
    /// Returned by a search on a loose name variant; needs matching
    Ambiguous,
}

/// A candidate publication identifier with its provenance
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    pub pmid: Pmid,
    pub confidence: Confidence,
}

impl Candidate {
    pub fn new(pmid: Pmid, confidence: Confidence) -> Self {
        Self { pmid, confidence }
    }
}

/// Everything a strategy may look at while attributing
pub struct AttributionContext<'a> {
    pub candidates: &'a [Candidate],
    /// Publications whose metadata was obtained this run
    pub articles: &'a PublicationTable,
    /// Publications already in the store before this run
    pub stored: &'a PublicationTable,
    pub professors: &'a [Professor],
}

impl AttributionContext<'_> {
    /// Metadata for `pmid`, preferring this run's fetch over the stored copy
    pub fn article(&self, pmid: &Pmid) -> Option<&Publication> {
        self.articles.get(pmid).or_else(|| self.stored.get(pmid))
    }

    /// Candidates with the given confidence whose article is known
    fn available<'c>(
        &'c self,
        accept: impl Fn(&Confidence) -> bool + 'c,
    ) -> impl Iterator<Item = &'c Candidate> + 'c {
        self.candidates
            .iter()
            .filter(move |c| accept(&c.confidence) && self.article(&c.pmid).is_some())
    }
}

/// Produce attributions from candidates
pub trait AttributionStrategy {
    fn name(&self) -> &'static str;

    /// Publications this strategy supplies itself, without a fetch
    fn publications(&self) -> Vec<Publication> {
        Vec::new()
    }

    fn attribute(&self, ctx: &AttributionContext<'_>) -> Vec<Attribution>;
}

/// Exact-name search results belong to the professor searched for
pub struct DirectAttribution;

impl AttributionStrategy for DirectAttribution {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn attribute(&self, ctx: &AttributionContext<'_>) -> Vec<Attribution> {
        ctx.available(|c| matches!(c, Confidence::Direct(_)))
            .filter_map(|c| match c.confidence {
                Confidence::Direct(id) => Some(Attribution::new(c.pmid.clone(), id)),
                _ => None,
            })
            .collect()
    }
}

/// Hand-supplied identifiers are trusted as given
pub struct ManualQuery;

impl AttributionStrategy for ManualQuery {
    fn name(&self) -> &'static str {
        "manual-query"
    }

    fn attribute(&self, ctx: &AttributionContext<'_>) -> Vec<Attribution> {
        ctx.available(|c| matches!(c, Confidence::Manual(_)))
            .filter_map(|c| match c.confidence {
                Confidence::Manual(id) => Some(Attribution::new(c.pmid.clone(), id)),
                _ => None,
            })
            .collect()
    }
}

/// Loose-variant search results are matched against every professor's variants
pub struct VariantMatch;

impl AttributionStrategy for VariantMatch {
    fn name(&self) -> &'static str {
        "variant-match"
    }

    fn attribute(&self, ctx: &AttributionContext<'_>) -> Vec<Attribution> {
        let roster: Vec<(ProfessorId, BTreeSet<String>)> = ctx
            .professors
            .iter()
            .map(|p| (p.id, p.normalized_variants()))
            .filter(|(_, variants)| !variants.is_empty())
            .collect();

        let pmids: BTreeSet<&Pmid> = ctx
            .available(|c| matches!(c, Confidence::Ambiguous))
            .map(|c| &c.pmid)
            .collect();

        let mut attributions = Vec::new();
        for pmid in pmids {
            let Some(article) = ctx.article(pmid) else {
                continue;
            };
            let authors = normalize_author_list(&article.author_list);
            if authors.is_empty() {
                continue;
            }
            for (id, variants) in &roster {
                if variants_match(variants, &authors) {
                    attributions.push(Attribution::new(pmid.clone(), *id));
                }
            }
        }
        attributions
    }
}

/// A publication typed in by hand, owned by one professor
#[derive(Clone, Debug, PartialEq)]
pub struct ManualPublication {
    pub publication: Publication,
    pub professor_id: ProfessorId,
}

impl ManualPublication {
    /// Build a manual entry with a synthetic `MAN_<timestamp>` identifier.
    ///
    /// `authors` is a `;`-separated list; blank fields become the sentinel.
    pub fn new(
        professor_id: ProfessorId,
        title: &str,
        journal: &str,
        year: &str,
        doi: &str,
        authors: &str,
        at: NaiveDateTime,
    ) -> Self {
        let mut publication = Publication::new(Pmid::manual(at))
            .with_title(title)
            .with_journal(journal)
            .with_year(Year::parse(year))
            .with_doi(doi);
        publication.authors = authors.to_string();
        Self {
            publication: publication.sanitized(),
            professor_id,
        }
    }
}

/// Manually entered publications, attributed to their owner
pub struct ManualEntry {
    entries: Vec<ManualPublication>,
}

impl ManualEntry {
    pub fn new(entries: Vec<ManualPublication>) -> Self {
        Self { entries }
    }
}

impl AttributionStrategy for ManualEntry {
    fn name(&self) -> &'static str {
        "manual-entry"
    }

    fn publications(&self) -> Vec<Publication> {
        self.entries.iter().map(|e| e.publication.clone()).collect()
    }

    fn attribute(&self, _ctx: &AttributionContext<'_>) -> Vec<Attribution> {
        self.entries
            .iter()
            .map(|e| Attribution::new(e.publication.pmid.clone(), e.professor_id))
            .collect()
    }
}
