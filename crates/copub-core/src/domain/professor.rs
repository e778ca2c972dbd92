//! Professor roster entries

use crate::text::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type ProfessorId = i64;

/// A member of the organization. Maintained externally; read-only to the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    /// Canonical display name
    pub name: String,
    /// Search aliases as they appear in bibliographic records, e.g. `"Silva JA"`
    pub variants: BTreeSet<String>,
    pub area: String,
    pub category: String,
    pub research_lines: String,
}

impl Professor {
    pub fn new(id: ProfessorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            variants: BTreeSet::new(),
            area: String::new(),
            category: String::new(),
            research_lines: String::new(),
        }
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Variants in matching form. Variants that normalize to nothing are dropped.
    pub fn normalized_variants(&self) -> BTreeSet<String> {
        self.variants
            .iter()
            .map(|v| normalize_name(Some(v.as_str())))
            .filter(|v| !v.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_variants() {
        let p = Professor::new(1, "JOÃO DA SILVA").with_variants(["Silva JA", "Silva, J. A.", " "]);
        let variants = p.normalized_variants();
        assert_eq!(variants.len(), 1);
        assert!(variants.contains("silva ja"));
    }
}
