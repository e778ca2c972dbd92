//! copub command-line driver
//!
//! Runs collection passes against PubMed and answers graph queries from the CSV store.
//! Read-only commands print JSON on stdout; logs go to stderr (`RUST_LOG` controls
//! verbosity).

use chrono::Local;
use clap::{Parser, Subcommand};
use copub_core::{
    CopubConfig, CsvStore, ManualPublication, Pipeline, Pmid, ProfessorId, PubMedClient,
    RunPlan, Store,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copub")]
#[command(author, version, about = "Attribute publications to a roster and map co-authorship")]
struct Cli {
    /// Config file (TOML); defaults to <config dir>/copub/config.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory; overrides the config file and COPUB_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, fetch and attribute publications, then update the store.
    ///
    /// Without flags both the exact-name and the variant searches run.
    Collect {
        /// Search each professor's display name
        #[arg(long)]
        direct: bool,

        /// Search each name variant and attribute by matching
        #[arg(long)]
        variants: bool,

        /// Identifier supplied by hand (repeatable)
        #[arg(long = "pmid", value_name = "PROFESSOR_ID:PMID", value_parser = parse_manual_query)]
        pmids: Vec<(ProfessorId, Pmid)>,
    },

    /// Enter a publication by hand for one professor
    AddManual {
        #[arg(long)]
        professor: ProfessorId,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        journal: String,

        #[arg(long, default_value = "")]
        year: String,

        #[arg(long, default_value = "")]
        doi: String,

        /// Authors separated by ';'
        #[arg(long, default_value = "")]
        authors: String,
    },

    /// Write every stored pmid, one per line
    ExportPmids {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the collaboration graph
    Graph,

    /// Print one professor's collaborators
    Collaborators { professor: ProfessorId },

    /// Print one professor with their publications
    Professor { id: ProfessorId },

    /// Print roster, publication and attribution counts
    Stats,
}

impl Commands {
    fn collect_plan(direct: bool, variants: bool, pmids: Vec<(ProfessorId, Pmid)>) -> RunPlan {
        if !direct && !variants && pmids.is_empty() {
            return RunPlan::full();
        }
        RunPlan {
            direct_search: direct,
            variant_search: variants,
            manual_queries: pmids,
            ..RunPlan::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let backend = CsvStore::from_config(&config.store);
    tracing::debug!("Using data directory {:?}", config.store.data_dir);

    match cli.command {
        Commands::Collect {
            direct,
            variants,
            pmids,
        } => {
            let plan = Commands::collect_plan(direct, variants, pmids);
            let source = PubMedClient::new(&config.source)?;
            let mut pipeline = Pipeline::from_config(source, &config.source);
            let report = pipeline.run(&backend, &plan).await?;
            print_json(&report)?;
        }
        Commands::AddManual {
            professor,
            title,
            journal,
            year,
            doi,
            authors,
        } => {
            let entry = ManualPublication::new(
                professor,
                &title,
                &journal,
                &year,
                &doi,
                &authors,
                Local::now().naive_local(),
            );
            let store = Store::load(&backend)?;
            if store.professor(professor).is_none() {
                return Err(format!("unknown professor {}", professor).into());
            }
            tracing::info!("Adding {} for professor {}", entry.publication.pmid, professor);

            let source = PubMedClient::new(&config.source)?;
            let mut pipeline = Pipeline::from_config(source, &config.source);
            let report = pipeline
                .run(&backend, &RunPlan::manual_entry(vec![entry]))
                .await?;
            print_json(&report)?;
        }
        Commands::ExportPmids { out } => {
            let store = Store::load(&backend)?;
            let count = match out {
                Some(path) => {
                    let count = store.export_pmids(BufWriter::new(File::create(&path)?))?;
                    tracing::info!("Wrote {} pmids to {:?}", count, path);
                    count
                }
                None => store.export_pmids(io::stdout().lock())?,
            };
            tracing::debug!("Exported {} pmids", count);
        }
        Commands::Graph => print_json(&Store::load(&backend)?.graph())?,
        Commands::Collaborators { professor } => {
            print_json(&Store::load(&backend)?.collaborators(professor)?)?
        }
        Commands::Professor { id } => print_json(&Store::load(&backend)?.professor_detail(id)?)?,
        Commands::Stats => print_json(&Store::load(&backend)?.stats())?,
    }

    Ok(())
}

/// Config file (explicit or default), then environment, then command-line overrides
fn load_config(cli: &Cli) -> Result<CopubConfig, copub_core::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => CopubConfig::load(path)?,
        None => CopubConfig::load_default()?,
    };
    config.apply_env();
    if let Some(dir) = &cli.data_dir {
        config.store.data_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `PROFESSOR_ID:PMID`
fn parse_manual_query(raw: &str) -> Result<(ProfessorId, Pmid), String> {
    let (id, pmid) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PROFESSOR_ID:PMID, got {:?}", raw))?;
    let id = id
        .trim()
        .parse::<ProfessorId>()
        .map_err(|e| format!("invalid professor id {:?}: {}", id, e))?;
    let pmid = Pmid::new(pmid);
    if pmid.is_empty() {
        return Err(format!("missing pmid in {:?}", raw));
    }
    Ok((id, pmid))
}
