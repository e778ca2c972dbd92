//! Bibliographic sources that candidate identifiers and metadata are collected from

pub mod pubmed;
pub mod traits;

pub use pubmed::*;
pub use traits::*;
