use super::types::{coerce_count, coerce_flag, truncate_flag, ArticleRecord, QualisTier, MISSING_DISPLAY};
use crate::error::IngestError;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

const DOI_PREFIX: &str = "http://dx.doi.org/";

/// Person name and articles extracted from an ingestion response
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub person_name: String,
    pub articles: Vec<ArticleRecord>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default, rename = "nomePessoa", alias = "personName")]
    person_name: Option<String>,
    #[serde(default, rename = "artigos", alias = "articles")]
    articles: Option<Vec<WireArticle>>,
    #[serde(default)]
    message: Option<String>,
}

/// Article as sent by the ingestion service. Every field is kept as a raw JSON
/// value so that odd types degrade to placeholders instead of failing the
/// whole response.
#[derive(Debug, Default, Deserialize)]
struct WireArticle {
    #[serde(default, rename = "Ano", alias = "year")]
    year: Value,
    #[serde(default, rename = "Qualis", alias = "qualisTier")]
    qualis: Value,
    #[serde(default, rename = "DOI", alias = "doi")]
    doi: Value,
    #[serde(default, rename = "ISSN", alias = "issn")]
    issn: Value,
    #[serde(default, rename = "Título do Periódico", alias = "journalTitle")]
    journal_title: Value,
    #[serde(default, rename = "Título", alias = "title")]
    title: Value,
    #[serde(default, rename = "Autores", alias = "authors")]
    authors: Value,
    #[serde(default, rename = "2023 JIF", alias = "jcrImpactFactor")]
    jcr_impact_factor: Value,
    #[serde(default, rename = "JIF Quartile", alias = "jcrQuartile")]
    jcr_quartile: Value,
    #[serde(default, rename = "SJR", alias = "sjrScore")]
    sjr_score: Value,
    #[serde(default, rename = "SJR Best Quartile", alias = "sjrQuartile")]
    sjr_quartile: Value,
    #[serde(default, rename = "DP", alias = "authorCount")]
    dp: Value,
    #[serde(default, rename = "DC", alias = "studentCoauthorCount")]
    dc: Value,
    #[serde(default, rename = "DIS", alias = "isStudentAuthored")]
    dis: Value,
}

impl WireArticle {
    fn into_record(self) -> ArticleRecord {
        let tier = match display_text(&self.qualis) {
            Some(label) => QualisTier::from_label(&label),
            None => QualisTier::NotClassified,
        };

        ArticleRecord {
            year: value_year(&self.year),
            qualis_tier: tier,
            doi: format_doi(&plain_text(&self.doi)),
            issn: format_issn(&plain_text(&self.issn)),
            journal_title: plain_text(&self.journal_title),
            title: plain_text(&self.title),
            authors: plain_text(&self.authors),
            jcr_impact_factor: display_or_placeholder(&self.jcr_impact_factor),
            jcr_quartile: display_or_placeholder(&self.jcr_quartile),
            sjr_score: display_or_placeholder(&self.sjr_score),
            sjr_quartile: display_or_placeholder(&self.sjr_quartile),
            author_count: value_count(&self.dp),
            student_coauthor_count: value_count(&self.dc),
            student_authored: value_flag(&self.dis),
        }
    }
}

/// Parse an ingestion response from a JSON string
pub fn parse_response(json: &str) -> Result<Ingested, IngestError> {
    let wire: WireResponse = serde_json::from_str(json)?;
    into_ingested(wire)
}

/// Parse an ingestion response from any reader (file, stdin)
pub fn read_response<R: Read>(reader: R) -> Result<Ingested, IngestError> {
    let wire: WireResponse = serde_json::from_reader(reader)?;
    into_ingested(wire)
}

fn into_ingested(wire: WireResponse) -> Result<Ingested, IngestError> {
    let Some(articles) = wire.articles else {
        return Err(match wire.message {
            Some(message) => IngestError::Rejected(message),
            None => IngestError::MissingArticles,
        });
    };

    Ok(Ingested {
        person_name: wire.person_name.unwrap_or_default().trim().to_string(),
        articles: articles.into_iter().map(WireArticle::into_record).collect(),
    })
}

/// Text of a value; null, empty, false and numeric zero count as "nothing"
fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn display_or_placeholder(value: &Value) -> String {
    display_text(value).unwrap_or_else(|| MISSING_DISPLAY.to_string())
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn value_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(v), _) => v.min(u32::MAX as u64) as u32,
            (None, Some(v)) => coerce_count(&v.to_string()),
            _ => 0,
        },
        Value::String(s) => coerce_count(s),
        _ => 0,
    }
}

/// DIS keeps negative numbers; only non-numeric values become 0
fn value_flag(value: &Value) -> i32 {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            (None, Some(v)) => truncate_flag(v),
            _ => 0,
        },
        Value::String(s) => coerce_flag(s),
        _ => 0,
    }
}

fn value_year(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Prefix bare DOIs with the resolver URL; leave full URLs alone
pub fn format_doi(doi: &str) -> String {
    let doi = doi.trim();
    if doi.is_empty() {
        return String::new();
    }
    let lower = doi.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        doi.to_string()
    } else {
        format!("{}{}", DOI_PREFIX, doi)
    }
}

/// Format an eight-character ISSN as XXXX-XXXX
pub fn format_issn(issn: &str) -> String {
    let compact: String = issn.trim().chars().filter(|c| *c != '-').collect();
    if compact.len() == 8 && compact.is_ascii() {
        let (head, tail) = compact.split_at(4);
        format!("{}-{}", head, tail)
    } else {
        issn.trim().to_string()
    }
}
