//! Common traits for bibliographic sources

use crate::domain::{Pmid, Publication};
pub use crate::error::SourceError;

/// A searchable bibliographic database.
///
/// Implementations make exactly one upstream request per call; pacing and retries are the
/// caller's concern.
#[allow(async_fn_in_trait)]
pub trait BibliographicSource {
    /// Identifiers of every record matching `term`
    async fn search_by_term(&self, term: &str) -> Result<Vec<Pmid>, SourceError>;

    /// Full records for one batch of identifiers. Identifiers the source does not know are
    /// silently absent from the result.
    async fn fetch_metadata(&self, pmids: &[Pmid]) -> Result<Vec<Publication>, SourceError>;
}
