//! CSV-backed store
//!
//! Three files in a data directory:
//!
//! ```text
//! professors.csv    id,name,variants,area,category,research_lines   (variants ';'-separated)
//! publications.csv  pmid,doi,title,journal,year,authors,abstract
//! links.csv         pmid,professor_id
//! ```

use super::StoreBackend;
use crate::config::StoreConfig;
use crate::domain::{
    Attribution, LinkTable, Pmid, Professor, ProfessorId, Publication, PublicationTable, Year,
};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// CSV file store rooted at a data directory
#[derive(Debug, Clone)]
pub struct CsvStore {
    professors_path: PathBuf,
    publications_path: PathBuf,
    links_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ProfessorRow {
    id: String,
    name: String,
    #[serde(default)]
    variants: String,
    #[serde(default)]
    area: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    research_lines: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PublicationRow {
    pmid: String,
    #[serde(default)]
    doi: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    journal: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    authors: String,
    #[serde(default, rename = "abstract")]
    abstract_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LinkRow {
    pmid: String,
    professor_id: String,
}

impl CsvStore {
    /// Store using the default file names inside `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::from_config(&StoreConfig {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..StoreConfig::default()
        })
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            professors_path: config.data_dir.join(&config.professors_file),
            publications_path: config.data_dir.join(&config.publications_file),
            links_path: config.data_dir.join(&config.links_file),
        }
    }

    pub fn professors_path(&self) -> &Path {
        &self.professors_path
    }

    pub fn publications_path(&self) -> &Path {
        &self.publications_path
    }

    pub fn links_path(&self) -> &Path {
        &self.links_path
    }
}

impl StoreBackend for CsvStore {
    fn load_professors(&self) -> Result<Vec<Professor>, StoreError> {
        let unavailable = |message: String| StoreError::RosterUnavailable {
            path: self.professors_path.display().to_string(),
            message,
        };

        let mut reader = open_reader(&self.professors_path).map_err(|e| unavailable(e.to_string()))?;
        let mut professors = Vec::new();

        for (line, result) in reader.deserialize::<ProfessorRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping roster row {}: {}", line + 1, e);
                    continue;
                }
            };
            let Some(id) = parse_professor_id(&row.id) else {
                tracing::warn!("Skipping roster row {}: invalid id {:?}", line + 1, row.id);
                continue;
            };
            let mut professor = Professor::new(id, row.name.trim())
                .with_variants(split_list(&row.variants))
                .with_area(row.area.trim())
                .with_category(row.category.trim());
            professor.research_lines = row.research_lines.trim().to_string();
            professors.push(professor);
        }

        tracing::debug!(
            "Loaded {} professors from {:?}",
            professors.len(),
            self.professors_path
        );
        Ok(professors)
    }

    fn load_publications(&self) -> Result<Vec<Publication>, StoreError> {
        if !self.publications_path.exists() {
            tracing::info!("No publications file at {:?}, starting empty", self.publications_path);
            return Ok(Vec::new());
        }

        let mut reader = open_reader(&self.publications_path)?;
        let mut publications = Vec::new();

        for (line, result) in reader.deserialize::<PublicationRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping publication row {}: {}", line + 1, e);
                    continue;
                }
            };
            let pmid = Pmid::new(&row.pmid);
            if pmid.is_empty() {
                tracing::warn!("Skipping publication row without pmid: {:?}", row.title);
                continue;
            }
            let mut publication = Publication::new(pmid)
                .with_doi(row.doi)
                .with_title(row.title)
                .with_journal(row.journal)
                .with_year(Year::parse(&row.year))
                .with_abstract(row.abstract_text);
            publication.authors = row.authors;
            publications.push(publication.sanitized());
        }

        Ok(publications)
    }

    fn save_publications(&self, publications: &PublicationTable) -> Result<(), StoreError> {
        let rows = publications.values().map(|p| PublicationRow {
            pmid: p.pmid.to_string(),
            doi: p.doi.clone(),
            title: p.title.clone(),
            journal: p.journal.clone(),
            year: p.year.to_string(),
            authors: p.authors.clone(),
            abstract_text: p.abstract_text.clone(),
        });
        write_rows(&self.publications_path, rows)?;
        tracing::debug!(
            "Saved {} publications to {:?}",
            publications.len(),
            self.publications_path
        );
        Ok(())
    }

    fn load_links(&self) -> Result<Vec<Attribution>, StoreError> {
        if !self.links_path.exists() {
            tracing::info!("No links file at {:?}, starting empty", self.links_path);
            return Ok(Vec::new());
        }

        let mut reader = open_reader(&self.links_path)?;
        let mut links = Vec::new();

        for (line, result) in reader.deserialize::<LinkRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping link row {}: {}", line + 1, e);
                    continue;
                }
            };
            let pmid = Pmid::new(&row.pmid);
            match parse_professor_id(&row.professor_id) {
                Some(id) if !pmid.is_empty() => links.push(Attribution::new(pmid, id)),
                _ => tracing::warn!(
                    "Skipping malformed link row: pmid={:?} professor_id={:?}",
                    row.pmid,
                    row.professor_id
                ),
            }
        }

        Ok(links)
    }

    fn save_links(&self, links: &LinkTable) -> Result<(), StoreError> {
        let rows = links.iter().map(|l| LinkRow {
            pmid: l.pmid.to_string(),
            professor_id: l.professor_id.to_string(),
        });
        write_rows(&self.links_path, rows)?;
        tracing::debug!("Saved {} links to {:?}", links.len(), self.links_path);
        Ok(())
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>, StoreError> {
    let file = File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(BufReader::new(file)))
}

/// Write all rows to a sibling temporary file, then rename it over `path`
fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Integer id, tolerating a zero fractional part (`"3.0"`)
fn parse_professor_id(raw: &str) -> Option<ProfessorId> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<ProfessorId>() {
        return Some(id);
    }
    let value = trimmed.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as ProfessorId)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
