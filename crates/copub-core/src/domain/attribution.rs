//! Attribution of a publication to a professor

use super::{Pmid, ProfessorId};
use serde::{Deserialize, Serialize};

/// "This professor authored this publication."
///
/// Ordered by pmid first, so iterating a [`super::LinkTable`] visits each
/// publication's attributions contiguously.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Attribution {
    pub pmid: Pmid,
    pub professor_id: ProfessorId,
}

impl Attribution {
    pub fn new(pmid: Pmid, professor_id: ProfessorId) -> Self {
        Self { pmid, professor_id }
    }
}
