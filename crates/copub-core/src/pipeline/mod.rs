//! Collection runs
//!
//! A run gathers candidate identifiers, fetches their metadata in bounded batches,
//! attributes them with the strategies the [`RunPlan`] selects, and reconciles the
//! result into the store. Upstream calls are awaited one at a time, spaced by a
//! [`Throttle`], and retried a bounded number of times on transient failure. A
//! failed search or batch is skipped; the run always completes.

mod plan;
mod throttle;

pub use plan::RunPlan;
pub use throttle::Throttle;

use crate::config::SourceConfig;
use crate::domain::{Pmid, Professor, Publication, PublicationTable};
use crate::error::{Result, SourceError};
use crate::matching::{AttributionContext, Candidate, Confidence};
use crate::sources::BibliographicSource;
use crate::store::{ReconcileReport, Store, StoreBackend};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Pacing and retry settings for a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    pub request_delay: Duration,
    pub batch_size: usize,
    pub max_retries: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for PipelineSettings {
    fn from(config: &SourceConfig) -> Self {
        Self {
            request_delay: config.request_delay(),
            batch_size: config.batch_size,
            max_retries: config.max_retries,
        }
    }
}

/// Summary of one run
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub searches: usize,
    pub searches_failed: usize,
    /// Distinct candidate identifiers gathered
    pub candidates: usize,
    pub batches: usize,
    pub batches_failed: usize,
    pub retries: usize,
    pub publications_fetched: usize,
    /// Attributions produced, by strategy name
    pub attributions: BTreeMap<&'static str, usize>,
    pub reconcile: ReconcileReport,
}

impl RunReport {
    pub fn total_attributions(&self) -> usize {
        self.attributions.values().sum()
    }
}

/// Exact-name search term
pub fn direct_term(name: &str) -> String {
    format!("\"{}\"[Author]", name.trim())
}

/// Loose variant search term
pub fn variant_term(variant: &str) -> String {
    format!("{}[Author]", variant.trim())
}

pub struct Pipeline<S> {
    source: S,
    settings: PipelineSettings,
    throttle: Throttle,
}

impl<S: BibliographicSource> Pipeline<S> {
    pub fn new(source: S, settings: PipelineSettings) -> Self {
        let throttle = Throttle::new(settings.request_delay);
        Self {
            source,
            settings,
            throttle,
        }
    }

    pub fn from_config(source: S, config: &SourceConfig) -> Self {
        Self::new(source, PipelineSettings::from(config))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Load the store, collect, and persist. Only a store failure aborts the run.
    pub async fn run<B: StoreBackend + ?Sized>(
        &mut self,
        backend: &B,
        plan: &RunPlan,
    ) -> Result<RunReport> {
        let mut store = Store::load(backend)?;
        let report = self.collect(&mut store, plan).await;
        store.persist(backend)?;
        Ok(report)
    }

    /// Run the plan against an already loaded store
    pub async fn collect(&mut self, store: &mut Store, plan: &RunPlan) -> RunReport {
        let strategies = plan.strategies();
        tracing::info!(
            strategies = ?strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            professors = store.professors().len(),
            "Starting collection run"
        );

        let mut report = RunReport::default();
        let candidates = self
            .gather_candidates(store.professors(), plan, &mut report)
            .await;

        let to_fetch: Vec<Pmid> = candidates
            .iter()
            .map(|c| &c.pmid)
            .filter(|p| !p.is_manual())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        report.candidates = to_fetch.len();

        let articles = self.fetch_all(&to_fetch, &mut report).await;

        let mut publications = Vec::new();
        let mut links = Vec::new();
        {
            let ctx = AttributionContext {
                candidates: &candidates,
                articles: &articles,
                stored: store.publications(),
                professors: store.professors(),
            };
            for strategy in &strategies {
                publications.extend(strategy.publications());
                let produced = strategy.attribute(&ctx);
                tracing::info!("{}: {} attributions", strategy.name(), produced.len());
                *report.attributions.entry(strategy.name()).or_default() += produced.len();
                links.extend(produced);
            }
        }
        publications.extend(articles.into_values());

        report.reconcile = store.reconcile(publications, links);
        tracing::info!(
            searches = report.searches,
            searches_failed = report.searches_failed,
            batches = report.batches,
            batches_failed = report.batches_failed,
            fetched = report.publications_fetched,
            attributions = report.total_attributions(),
            "Collection run finished"
        );
        report
    }

    async fn gather_candidates(
        &mut self,
        professors: &[Professor],
        plan: &RunPlan,
        report: &mut RunReport,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (professor_id, pmid) in &plan.manual_queries {
            if pmid.is_empty() {
                continue;
            }
            if !professors.iter().any(|p| p.id == *professor_id) {
                tracing::warn!(
                    "Ignoring manual pmid {} for unknown professor {}",
                    pmid,
                    professor_id
                );
                continue;
            }
            candidates.push(Candidate::new(pmid.clone(), Confidence::Manual(*professor_id)));
        }

        if plan.direct_search {
            for professor in professors {
                if professor.name.trim().is_empty() {
                    continue;
                }
                let term = direct_term(&professor.name);
                if let Some(pmids) = self.search(&term, report).await {
                    candidates.extend(
                        pmids
                            .into_iter()
                            .map(|p| Candidate::new(p, Confidence::Direct(professor.id))),
                    );
                }
            }
        }

        if plan.variant_search {
            let variants: BTreeSet<&str> = professors
                .iter()
                .flat_map(|p| p.variants.iter())
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect();
            for variant in variants {
                let term = variant_term(variant);
                if let Some(pmids) = self.search(&term, report).await {
                    candidates.extend(
                        pmids
                            .into_iter()
                            .map(|p| Candidate::new(p, Confidence::Ambiguous)),
                    );
                }
            }
        }

        candidates.sort();
        candidates.dedup();
        candidates
    }

    async fn fetch_all(&mut self, pmids: &[Pmid], report: &mut RunReport) -> PublicationTable {
        let mut articles = PublicationTable::new();
        let batch_size = self.settings.batch_size.max(1);

        for batch in pmids.chunks(batch_size) {
            report.batches += 1;
            let Some(records) = self.fetch_batch(batch, report).await else {
                continue;
            };
            for record in records {
                if record.pmid.is_empty() {
                    continue;
                }
                articles.insert(record.pmid.clone(), record.sanitized());
            }
        }

        report.publications_fetched = articles.len();
        articles
    }

    fn should_retry(&self, err: &SourceError, attempt: u32) -> bool {
        err.is_transient() && attempt < self.settings.max_retries
    }

    async fn search(&mut self, term: &str, report: &mut RunReport) -> Option<Vec<Pmid>> {
        report.searches += 1;
        let mut attempt = 0;
        loop {
            self.throttle.wait().await;
            match self.source.search_by_term(term).await {
                Ok(pmids) => {
                    tracing::debug!("Search {:?}: {} ids", term, pmids.len());
                    return Some(pmids);
                }
                Err(e) if self.should_retry(&e, attempt) => {
                    attempt += 1;
                    report.retries += 1;
                    tracing::warn!(
                        "Search {:?} failed: {} (retry {}/{})",
                        term,
                        e,
                        attempt,
                        self.settings.max_retries
                    );
                }
                Err(e) => {
                    report.searches_failed += 1;
                    tracing::warn!("Skipping search {:?}: {}", term, e);
                    return None;
                }
            }
        }
    }

    async fn fetch_batch(
        &mut self,
        batch: &[Pmid],
        report: &mut RunReport,
    ) -> Option<Vec<Publication>> {
        let mut attempt = 0;
        loop {
            self.throttle.wait().await;
            match self.source.fetch_metadata(batch).await {
                Ok(records) => {
                    tracing::debug!("Fetched {} records for {} ids", records.len(), batch.len());
                    return Some(records);
                }
                Err(e) if self.should_retry(&e, attempt) => {
                    attempt += 1;
                    report.retries += 1;
                    tracing::warn!(
                        "Fetch of {} ids failed: {} (retry {}/{})",
                        batch.len(),
                        e,
                        attempt,
                        self.settings.max_retries
                    );
                }
                Err(e) => {
                    report.batches_failed += 1;
                    tracing::error!(
                        "Discarding batch of {} ids starting at {}: {}",
                        batch.len(),
                        batch.first().map(Pmid::as_str).unwrap_or(""),
                        e
                    );
                    return None;
                }
            }
        }
    }
}
