//! PubMed source for biomedical literature
//!
//! API docs: https://www.ncbi.nlm.nih.gov/books/NBK25501/
//! Rate limit: 3 requests/second without API key, 10 with key

use super::traits::SourceError;
use crate::domain::{Pmid, Publication, Year};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[cfg(feature = "native")]
use super::traits::BibliographicSource;
#[cfg(feature = "native")]
use crate::config::SourceConfig;
#[cfg(feature = "native")]
use crate::http::HttpClient;

pub struct PubMedSource;

/// Which record field a text node belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Pmid,
    Title,
    Journal,
    Year,
    MedlineDate,
    Doi,
    ElocationDoi,
    Abstract,
    LastName,
    Initials,
    ForeName,
    CollectiveName,
}

#[derive(Default)]
struct ArticleFields {
    pmid: String,
    title: String,
    journal: String,
    year: String,
    medline_date: String,
    doi: String,
    elocation_doi: String,
    abstract_sections: Vec<String>,
    authors: Vec<String>,
}

#[derive(Default)]
struct AuthorFields {
    last_name: String,
    initials: String,
    fore_name: String,
    collective_name: String,
}

impl PubMedSource {
    /// Parse an efetch `PubmedArticleSet` into publications.
    ///
    /// Any XML error fails the whole payload. Missing fields become sentinels.
    pub fn parse_efetch_response(xml: &str) -> Result<Vec<Publication>, SourceError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut results = Vec::new();
        let mut buf = Vec::new();

        // Open elements with the field their text feeds, if any
        let mut stack: Vec<(String, Option<Field>)> = Vec::new();
        let mut article: Option<ArticleFields> = None;
        let mut author: Option<AuthorFields> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let parent = stack.last().map(|(n, _)| n.as_str()).unwrap_or("");
                    let grandparent = stack
                        .len()
                        .checked_sub(2)
                        .map(|i| stack[i].0.as_str())
                        .unwrap_or("");

                    let mut field = None;
                    match name.as_str() {
                        "PubmedArticle" => article = Some(ArticleFields::default()),
                        "Author" if parent == "AuthorList" && grandparent == "Article" => {
                            author = Some(AuthorFields::default())
                        }
                        _ => {}
                    }

                    if let Some(current) = article.as_mut() {
                        field = field_for(&name, parent, grandparent, e, current, author.is_some());
                        if field == Some(Field::Abstract) {
                            current.abstract_sections.push(String::new());
                        }
                    }
                    stack.push((name, field));
                }
                Event::End(_) => {
                    let Some((name, _)) = stack.pop() else {
                        continue;
                    };
                    match name.as_str() {
                        "Author" => {
                            if let (Some(done), Some(current)) = (author.take(), article.as_mut()) {
                                if let Some(display) = done.display_name() {
                                    current.authors.push(display);
                                }
                            }
                        }
                        "PubmedArticle" => {
                            if let Some(done) = article.take() {
                                if let Some(publication) = done.into_publication() {
                                    results.push(publication);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned());
                    route_text(&stack, &mut article, &mut author, &text);
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    route_text(&stack, &mut article, &mut author, &text);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(results)
    }

    /// Parse an esearch response into identifiers.
    ///
    /// A response carrying an `ERROR` element and no identifiers is an invalid query.
    pub fn parse_esearch_response(xml: &str) -> Result<Vec<Pmid>, SourceError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut pmids = Vec::new();
        let mut error = String::new();
        let mut buf = Vec::new();
        let mut in_id = false;
        let mut in_error = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.name().as_ref() {
                    b"Id" => in_id = true,
                    b"ERROR" => in_error = true,
                    _ => {}
                },
                Event::End(ref e) => match e.name().as_ref() {
                    b"Id" => in_id = false,
                    b"ERROR" => in_error = false,
                    _ => {}
                },
                Event::Text(e) if in_id || in_error => {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if in_id {
                        let pmid = Pmid::new(&text);
                        if !pmid.is_empty() {
                            pmids.push(pmid);
                        }
                    } else {
                        error.push_str(&text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if pmids.is_empty() && !error.is_empty() {
            return Err(SourceError::InvalidQuery(error));
        }
        Ok(pmids)
    }
}

/// The field an element's text feeds, given where it sits in the document
fn field_for(
    name: &str,
    parent: &str,
    grandparent: &str,
    element: &BytesStart<'_>,
    article: &ArticleFields,
    in_author: bool,
) -> Option<Field> {
    match (name, parent) {
        ("PMID", "MedlineCitation") if article.pmid.is_empty() => Some(Field::Pmid),
        ("ArticleTitle", "Article") => Some(Field::Title),
        ("Title", "Journal") => Some(Field::Journal),
        ("Year", "PubDate") => Some(Field::Year),
        ("MedlineDate", "PubDate") => Some(Field::MedlineDate),
        ("AbstractText", "Abstract") => Some(Field::Abstract),
        ("ArticleId", "ArticleIdList")
            if grandparent == "PubmedData" && has_attribute(element, "IdType", "doi") =>
        {
            Some(Field::Doi)
        }
        ("ELocationID", "Article") if has_attribute(element, "EIdType", "doi") => {
            Some(Field::ElocationDoi)
        }
        ("LastName", "Author") if in_author => Some(Field::LastName),
        ("Initials", "Author") if in_author => Some(Field::Initials),
        ("ForeName", "Author") if in_author => Some(Field::ForeName),
        ("CollectiveName", "Author") if in_author => Some(Field::CollectiveName),
        _ => None,
    }
}

fn has_attribute(element: &BytesStart<'_>, key: &str, expected: &str) -> bool {
    element
        .try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.trim().eq_ignore_ascii_case(expected)))
        .unwrap_or(false)
}

/// Append text to the field of the innermost enclosing element that has one.
/// Markup nested inside a field (`<i>`, `<sup>`) keeps feeding that field.
fn route_text(
    stack: &[(String, Option<Field>)],
    article: &mut Option<ArticleFields>,
    author: &mut Option<AuthorFields>,
    text: &str,
) {
    let Some(field) = stack.iter().rev().find_map(|(_, f)| *f) else {
        return;
    };
    let Some(article) = article.as_mut() else {
        return;
    };

    let target = match field {
        Field::Pmid => &mut article.pmid,
        Field::Title => &mut article.title,
        Field::Journal => &mut article.journal,
        Field::Year => &mut article.year,
        Field::MedlineDate => &mut article.medline_date,
        Field::Doi => &mut article.doi,
        Field::ElocationDoi => &mut article.elocation_doi,
        Field::Abstract => match article.abstract_sections.last_mut() {
            Some(section) => section,
            None => return,
        },
        Field::LastName | Field::Initials | Field::ForeName | Field::CollectiveName => {
            let Some(author) = author.as_mut() else {
                return;
            };
            match field {
                Field::LastName => &mut author.last_name,
                Field::Initials => &mut author.initials,
                Field::ForeName => &mut author.fore_name,
                _ => &mut author.collective_name,
            }
        }
    };
    target.push_str(text);
}

/// Collapse runs of whitespace and trim
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl AuthorFields {
    /// `"LastName Initials"`, or the collective name for group authors
    fn display_name(&self) -> Option<String> {
        let collective = collapse(&self.collective_name);
        if !collective.is_empty() {
            return Some(collective);
        }

        let last = collapse(&self.last_name);
        if last.is_empty() {
            return None;
        }
        let mut initials = collapse(&self.initials).replace(' ', "");
        if initials.is_empty() {
            initials = collapse(&self.fore_name)
                .split(|c: char| c.is_whitespace() || c == '-')
                .filter_map(|part| part.chars().next())
                .flat_map(char::to_uppercase)
                .collect();
        }

        if initials.is_empty() {
            Some(last)
        } else {
            Some(format!("{} {}", last, initials))
        }
    }
}

impl ArticleFields {
    fn into_publication(self) -> Option<Publication> {
        let pmid = Pmid::new(&self.pmid);
        if pmid.is_empty() {
            tracing::warn!("Skipping PubmedArticle without PMID: {:?}", collapse(&self.title));
            return None;
        }

        let year = if self.year.trim().is_empty() {
            Year::parse(&self.medline_date)
        } else {
            Year::parse(&self.year)
        };
        let doi = if self.doi.trim().is_empty() {
            collapse(&self.elocation_doi)
        } else {
            collapse(&self.doi)
        };
        let abstract_text = self
            .abstract_sections
            .iter()
            .map(|s| collapse(s))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(
            Publication::new(pmid)
                .with_title(collapse(&self.title))
                .with_journal(collapse(&self.journal))
                .with_year(year)
                .with_doi(doi)
                .with_abstract(abstract_text)
                .with_authors(self.authors)
                .sanitized(),
        )
    }
}

/// PubMed E-utilities client
#[cfg(feature = "native")]
pub struct PubMedClient {
    http: HttpClient,
    esearch_url: String,
    efetch_url: String,
    email: String,
    tool: String,
    api_key: Option<String>,
    retmax: String,
}

#[cfg(feature = "native")]
impl PubMedClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let user_agent = format!("{}/{}", config.tool, env!("CARGO_PKG_VERSION"));
        let http = HttpClient::new(&user_agent, config.timeout())?;

        Ok(Self {
            http,
            esearch_url: config.esearch_url.clone(),
            efetch_url: config.efetch_url.clone(),
            email: config.email.clone(),
            tool: config.tool.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            retmax: config.retmax.to_string(),
        })
    }

    fn common_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("db", "pubmed"), ("retmode", "xml"), ("tool", self.tool.as_str())];
        if !self.email.is_empty() {
            params.push(("email", self.email.as_str()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.as_str()));
        }
        params
    }
}

#[cfg(feature = "native")]
impl BibliographicSource for PubMedClient {
    async fn search_by_term(&self, term: &str) -> Result<Vec<Pmid>, SourceError> {
        if term.trim().is_empty() {
            return Err(SourceError::InvalidQuery("empty search term".to_string()));
        }

        let mut params = self.common_params();
        params.push(("term", term));
        params.push(("retmax", self.retmax.as_str()));

        let response = self.http.get_with_params(&self.esearch_url, &params).await?;
        let pmids = PubMedSource::parse_esearch_response(&response.body)?;
        tracing::debug!("esearch {:?}: {} ids", term, pmids.len());
        Ok(pmids)
    }

    async fn fetch_metadata(&self, pmids: &[Pmid]) -> Result<Vec<Publication>, SourceError> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = pmids.iter().map(Pmid::as_str).collect::<Vec<_>>().join(",");
        let mut params = self.common_params();
        params.push(("id", ids.as_str()));

        let response = self.http.get_with_params(&self.efetch_url, &params).await?;
        let publications = PubMedSource::parse_efetch_response(&response.body)?;
        tracing::debug!(
            "efetch {} ids: {} records",
            pmids.len(),
            publications.len()
        );
        Ok(publications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NOT_AVAILABLE;

    const SAMPLE_EFETCH: &str = r#"<?xml version="1.0"?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">31234567</PMID>
      <Article>
        <Journal>
          <Title>Brazilian Oral Research</Title>
          <JournalIssue>
            <PubDate><Year>2021</Year><Month>Mar</Month></PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Fluoride uptake in <i>Streptococcus mutans</i> biofilms</ArticleTitle>
        <ELocationID EIdType="pii">e012</ELocationID>
        <Abstract>
          <AbstractText Label="BACKGROUND">Caries remains common.</AbstractText>
          <AbstractText Label="RESULTS">Uptake rose by 10 &amp; more.</AbstractText>
        </Abstract>
        <AuthorList>
          <Author>
            <LastName>Silva</LastName>
            <ForeName>João Alves</ForeName>
            <Initials>JA</Initials>
          </Author>
          <Author>
            <LastName>Lima</LastName>
            <ForeName>Beatriz</ForeName>
          </Author>
          <Author>
            <CollectiveName>Oral Health Group</CollectiveName>
          </Author>
        </AuthorList>
      </Article>
      <CommentsCorrectionsList>
        <CommentsCorrections><PMID>11111111</PMID></CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList>
        <ArticleId IdType="pubmed">31234567</ArticleId>
        <ArticleId IdType="doi">10.1590/1807-3107bor-2021.vol35.0012</ArticleId>
      </ArticleIdList>
      <ReferenceList>
        <Reference>
          <ArticleIdList><ArticleId IdType="doi">10.9999/cited</ArticleId></ArticleIdList>
        </Reference>
      </ReferenceList>
    </PubmedData>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>29876543</PMID>
      <Article>
        <Journal>
          <Title>J Dent</Title>
          <JournalIssue><PubDate><MedlineDate>2019 Jan-Feb</MedlineDate></PubDate></JournalIssue>
        </Journal>
        <ArticleTitle>Short report</ArticleTitle>
        <ELocationID EIdType="doi" ValidYN="Y">10.1016/j.jdent.2019.01.001</ELocationID>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_efetch_response() {
        let results = PubMedSource::parse_efetch_response(SAMPLE_EFETCH).unwrap();
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.pmid, Pmid::new("31234567"));
        assert_eq!(first.title, "Fluoride uptake in Streptococcus mutans biofilms");
        assert_eq!(first.journal, "Brazilian Oral Research");
        assert_eq!(first.year, Year::Known(2021));
        assert_eq!(first.doi, "10.1590/1807-3107bor-2021.vol35.0012");
        assert_eq!(first.abstract_text, "Caries remains common. Uptake rose by 10 & more.");
        assert_eq!(
            first.author_list,
            vec!["Silva JA", "Lima B", "Oral Health Group"]
        );
        assert_eq!(first.authors, "Silva JA; Lima B; Oral Health Group");
    }

    #[test]
    fn test_medline_date_and_elocation_fallback() {
        let results = PubMedSource::parse_efetch_response(SAMPLE_EFETCH).unwrap();
        let second = &results[1];
        assert_eq!(second.year, Year::Known(2019));
        assert_eq!(second.doi, "10.1016/j.jdent.2019.01.001");
        assert_eq!(second.abstract_text, NOT_AVAILABLE);
        assert_eq!(second.authors, NOT_AVAILABLE);
        assert!(second.author_list.is_empty());
    }

    #[test]
    fn test_malformed_efetch_is_parse_error() {
        let err = PubMedSource::parse_efetch_response(
            "<PubmedArticleSet><PubmedArticle></PubmedArticleSet>",
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_article_without_pmid_skipped() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><Article>\
                   <ArticleTitle>Orphan</ArticleTitle></Article></MedlineCitation>\
                   </PubmedArticle></PubmedArticleSet>";
        assert!(PubMedSource::parse_efetch_response(xml).unwrap().is_empty());
    }

    const SAMPLE_ESEARCH: &str = r#"<?xml version="1.0"?>
<eSearchResult>
  <Count>2</Count>
  <IdList>
    <Id>12345678</Id>
    <Id>87654321</Id>
  </IdList>
</eSearchResult>"#;

    #[test]
    fn test_parse_esearch_response() {
        let pmids = PubMedSource::parse_esearch_response(SAMPLE_ESEARCH).unwrap();
        assert_eq!(pmids, vec![Pmid::new("12345678"), Pmid::new("87654321")]);
    }

    #[test]
    fn test_esearch_error_is_invalid_query() {
        let xml = "<eSearchResult><ERROR>Invalid query</ERROR></eSearchResult>";
        assert!(matches!(
            PubMedSource::parse_esearch_response(xml),
            Err(SourceError::InvalidQuery(_))
        ));

        let empty = "<eSearchResult><Count>0</Count><IdList/></eSearchResult>";
        assert!(PubMedSource::parse_esearch_response(empty).unwrap().is_empty());
    }

    #[test]
    fn test_author_initials_from_fore_name() {
        let author = AuthorFields {
            last_name: "Souza".to_string(),
            fore_name: "ana-paula".to_string(),
            ..Default::default()
        };
        assert_eq!(author.display_name().as_deref(), Some("Souza AP"));
    }
}
