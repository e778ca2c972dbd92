//! Author attribution: variant matching and the attribution strategies built on it

mod strategy;
mod variants;

pub use strategy::{
    AttributionContext, AttributionStrategy, Candidate, Confidence, DirectAttribution,
    ManualEntry, ManualPublication, ManualQuery, VariantMatch,
};
pub use variants::{variants_match, MIN_CONTAINMENT_LEN};
