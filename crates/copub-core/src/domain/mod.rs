//! Domain models for copub
//!
//! Professors are read-only input. Publications and attributions are produced by
//! collection runs and merged into the store; collaboration edges are always derived.

mod attribution;
mod pmid;
mod professor;
mod publication;
mod year;

pub use attribution::Attribution;
pub use pmid::Pmid;
pub use professor::{Professor, ProfessorId};
pub use publication::{field_or_sentinel, split_author_string, Publication, NOT_AVAILABLE};
pub use year::Year;

use std::collections::{BTreeMap, BTreeSet};

/// Publications keyed by canonical pmid. One record per key.
pub type PublicationTable = BTreeMap<Pmid, Publication>;

/// Attribution pairs, ordered by pmid then professor id.
pub type LinkTable = BTreeSet<Attribution>;
