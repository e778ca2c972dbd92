//! Idempotent merge of publication and attribution batches into the store tables

use crate::domain::{Attribution, LinkTable, Publication, PublicationTable};

/// Result of a merge
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome<T> {
    pub merged: T,
    /// Keys that were not present before
    pub inserted: usize,
    /// Keys that were already present: replaced publications, or dropped duplicate links
    pub collisions: usize,
}

/// Merge incoming publications into an existing table, keyed by pmid.
///
/// Keys are compared in their canonical [`crate::domain::Pmid`] form, so a numeric and a
/// string spelling of the same identifier collide. On collision the incoming record
/// replaces the stored one (last write wins); later passes tend to carry richer fields.
/// Incoming records are sanitized, never rejected, except for a blank key which cannot
/// be stored.
pub fn merge_publications<I>(existing: PublicationTable, incoming: I) -> MergeOutcome<PublicationTable>
where
    I: IntoIterator<Item = Publication>,
{
    let mut merged = existing;
    let mut inserted = 0;
    let mut collisions = 0;

    for publication in incoming {
        if publication.pmid.is_empty() {
            tracing::warn!("Skipping publication without identifier: {:?}", publication.title);
            continue;
        }
        let publication = publication.sanitized();
        match merged.insert(publication.pmid.clone(), publication) {
            Some(_) => collisions += 1,
            None => inserted += 1,
        }
    }

    MergeOutcome {
        merged,
        inserted,
        collisions,
    }
}

/// Merge incoming attributions into an existing table, keyed by `(pmid, professor_id)`.
///
/// Attributions carry no payload, so a duplicate is simply dropped. Existing
/// attributions are never removed.
pub fn merge_links<I>(existing: LinkTable, incoming: I) -> MergeOutcome<LinkTable>
where
    I: IntoIterator<Item = Attribution>,
{
    let mut merged = existing;
    let mut inserted = 0;
    let mut collisions = 0;

    for link in incoming {
        if link.pmid.is_empty() {
            continue;
        }
        if merged.insert(link) {
            inserted += 1;
        } else {
            collisions += 1;
        }
    }

    MergeOutcome {
        merged,
        inserted,
        collisions,
    }
}
