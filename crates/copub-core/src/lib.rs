//! copub-core: author attribution and co-authorship graphs for an organization's roster
//!
//! This crate provides:
//!
//! - **Text**: name normalization (case, diacritics, linking particles, initials)
//! - **Matching**: variant-based author matching and the attribution strategies
//! - **Reconcile**: idempotent merge of publication and attribution batches
//! - **Graph**: weighted co-authorship graph and per-professor collaborator views
//! - **Store**: the roster, publication and attribution tables, with CSV persistence
//! - **Sources**: the bibliographic source seam and PubMed E-utilities parsing
//! - **Pipeline**: collection runs (search, fetch, attribute, reconcile)
//! - **Config**: source pacing and data file locations
//!
//! # Data flow
//!
//! ```text
//! Pipeline → Matching/Text → Reconcile → Store → Graph
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
#[cfg(feature = "native")]
pub mod http;
pub mod matching;
pub mod pipeline;
pub mod reconcile;
pub mod sources;
pub mod store;
pub mod text;

pub use config::{CopubConfig, SourceConfig, StoreConfig};
pub use domain::{
    Attribution, LinkTable, Pmid, Professor, ProfessorId, Publication, PublicationTable, Year,
    NOT_AVAILABLE,
};
pub use error::{ConfigError, CopubError, Result, SourceError, StoreError};
pub use graph::{build_graph, CollaborationGraph, CollaboratorReport, GraphEdge, GraphNode};
pub use matching::{variants_match, AttributionStrategy, ManualPublication};
pub use pipeline::{Pipeline, PipelineSettings, RunPlan, RunReport};
pub use reconcile::{merge_links, merge_publications, MergeOutcome};
pub use sources::{BibliographicSource, PubMedSource};
#[cfg(feature = "native")]
pub use sources::PubMedClient;
pub use store::{CsvStore, MemoryStore, ProfessorDetail, Store, StoreBackend, StoreStats};
pub use text::{normalize_author_list, normalize_name};
