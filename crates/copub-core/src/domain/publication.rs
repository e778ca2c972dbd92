//! Publication domain model

use super::{Pmid, Year};
use serde::{Deserialize, Serialize};

/// Sentinel for every missing textual field and for an unknown year.
pub const NOT_AVAILABLE: &str = "N/A";

/// A publication record.
///
/// Every optional field holds [`NOT_AVAILABLE`] when absent; [`Publication::sanitized`]
/// is the one place that rule is applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub pmid: Pmid,
    pub doi: String,
    pub title: String,
    pub journal: String,
    pub year: Year,
    /// Individual author names, e.g. `"Silva JA"`
    pub author_list: Vec<String>,
    /// Author names joined with `"; "`
    pub authors: String,
    pub abstract_text: String,
}

impl Publication {
    /// Create a publication with every optional field set to the sentinel
    pub fn new(pmid: Pmid) -> Self {
        Self {
            pmid,
            doi: NOT_AVAILABLE.to_string(),
            title: NOT_AVAILABLE.to_string(),
            journal: NOT_AVAILABLE.to_string(),
            year: Year::Unknown,
            author_list: Vec::new(),
            authors: NOT_AVAILABLE.to_string(),
            abstract_text: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = journal.into();
        self
    }

    pub fn with_year(mut self, year: Year) -> Self {
        self.year = year;
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = doi.into();
        self
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author_list = authors.into_iter().map(Into::into).collect();
        self.authors = self.author_list.join("; ");
        self
    }

    /// Fill blank fields with the sentinel and reconcile the two author forms.
    ///
    /// A record is never rejected for missing fields.
    pub fn sanitized(mut self) -> Self {
        self.doi = field_or_sentinel(&self.doi);
        self.title = field_or_sentinel(&self.title);
        self.journal = field_or_sentinel(&self.journal);
        self.abstract_text = field_or_sentinel(&self.abstract_text);

        self.author_list.retain(|a| !a.trim().is_empty());
        if self.author_list.is_empty() {
            self.author_list = split_author_string(&self.authors);
        }
        self.authors = if self.author_list.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.author_list.join("; ")
        };
        self
    }

    pub fn has_abstract(&self) -> bool {
        is_present(&self.abstract_text)
    }

    pub fn has_doi(&self) -> bool {
        is_present(&self.doi)
    }

    /// PubMed landing page; manual entries have none
    pub fn pubmed_url(&self) -> Option<String> {
        if self.pmid.is_manual() {
            None
        } else {
            Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pmid))
        }
    }

    pub fn doi_url(&self) -> Option<String> {
        self.has_doi().then(|| format!("https://doi.org/{}", self.doi))
    }
}

fn is_present(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != NOT_AVAILABLE
}

/// Trimmed value, or the sentinel when blank
pub fn field_or_sentinel(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a `;`-separated author string into names
pub fn split_author_string(authors: &str) -> Vec<String> {
    if authors.trim() == NOT_AVAILABLE {
        return Vec::new();
    }
    authors
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
