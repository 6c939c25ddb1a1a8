use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::aggregate::AggregateRow;
use crate::article::QualisTier;
use crate::filter::YearRange;
use crate::scoring::ScoredArticle;
use crate::session::{SessionData, Views};

/// Column header of the delimited per-year summary
pub const SUMMARY_CSV_HEADER: [&str; 17] = [
    "Ano", "A1", "A2", "A3", "A4", "B1", "B2", "B3", "B4", "C", "NP", "Total A", "Total B", "% A",
    "% B", "PQD1_AB", "PQD1",
];

const REPORT_FALLBACK_NAME: &str = "Relatório";

/// Everything the document renderer needs for one researcher's report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub person_name: String,
    pub weighting_percent: f64,
    pub year_range: YearRange,
    pub articles: Vec<ScoredArticle>,
    pub summary: Vec<AggregateRow>,
    pub grand_total: f64,
}

impl ReportData {
    pub fn new(data: &SessionData, views: &Views) -> Self {
        Self {
            person_name: data.person_name.clone(),
            weighting_percent: data.weighting_percent,
            year_range: data.year_range,
            articles: views.articles.clone(),
            summary: views.summary.clone(),
            grand_total: views.grand_total(),
        }
    }
}

/// "<name> - <title>.pdf", with a generic name when the researcher is unknown
pub fn report_file_name(person_name: &str, title: &str) -> String {
    format!("{}.pdf", report_stem(person_name, title))
}

fn report_stem(person_name: &str, title: &str) -> String {
    let name = person_name.trim();
    let name = if name.is_empty() {
        REPORT_FALLBACK_NAME
    } else {
        name
    };
    format!("{} - {}", name, title)
}

/// "<name>_curriculo.csv"
pub fn summary_csv_file_name(person_name: &str) -> String {
    let name = person_name.trim();
    if name.is_empty() {
        "curriculo.csv".to_string()
    } else {
        format!("{}_curriculo.csv", name)
    }
}

/// Fixed decimals with a decimal comma and no grouping (spreadsheet friendly)
fn csv_number(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value).replace('.', ",")
}

fn summary_record(row: &AggregateRow, decimals: usize) -> Vec<String> {
    let mut record = Vec::with_capacity(SUMMARY_CSV_HEADER.len());
    record.push(row.year.to_string());
    for tier in QualisTier::CLASSIFIED {
        record.push(csv_number(row.tiers.get(tier).unwrap_or(0.0), decimals));
    }
    for value in [
        row.unclassified,
        row.total_a,
        row.total_b,
        row.percent_a,
        row.percent_b,
        row.combined(),
        row.bonus_score,
    ] {
        record.push(csv_number(value, decimals));
    }
    record
}

/// Write the per-year summary as `;`-separated values
pub fn write_summary_csv<W: Write>(writer: W, rows: &[AggregateRow], decimals: usize) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    csv_writer
        .write_record(SUMMARY_CSV_HEADER)
        .context("Failed to write summary header")?;
    for row in rows {
        csv_writer
            .write_record(summary_record(row, decimals))
            .with_context(|| format!("Failed to write summary row for {}", row.year))?;
    }
    csv_writer.flush().context("Failed to flush summary")?;
    Ok(())
}

/// Write `<name>_curriculo.csv` into `dir` atomically and return its path
pub fn export_summary_csv(
    dir: &Path,
    person_name: &str,
    rows: &[AggregateRow],
    decimals: usize,
) -> Result<PathBuf> {
    crate::config::ensure_dir(dir)?;
    let path = dir.join(summary_csv_file_name(person_name));

    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    write_summary_csv(&mut file, rows, decimals)?;
    file.commit()
        .with_context(|| format!("Failed to save summary to {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "exported summary");
    Ok(path)
}

/// Write the report payload as JSON next to where the rendered document goes
/// (`<name> - <title>.json`) and return its path
pub fn export_report_payload(dir: &Path, report: &ReportData, title: &str) -> Result<PathBuf> {
    crate::config::ensure_dir(dir)?;
    let path = dir.join(format!("{}.json", report_stem(&report.person_name, title)));

    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, report).context("Failed to serialize report")?;
    file.commit()
        .with_context(|| format!("Failed to save report payload to {}", path.display()))?;

    tracing::info!(path = %path.display(), articles = report.articles.len(), "exported report payload");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleRecord;
    use crate::session::recompute;

    fn sample_views() -> (SessionData, Views) {
        let records = vec![
            ArticleRecord {
                year: 2021,
                qualis_tier: QualisTier::A1,
                author_count: 1,
                student_authored: 1,
                ..ArticleRecord::default()
            },
            ArticleRecord {
                year: 2021,
                qualis_tier: QualisTier::A1,
                author_count: 1,
                student_authored: 1,
                ..ArticleRecord::default()
            },
            ArticleRecord {
                year: 2021,
                qualis_tier: QualisTier::B1,
                author_count: 1,
                student_authored: 1,
                ..ArticleRecord::default()
            },
            ArticleRecord {
                year: 2022,
                qualis_tier: QualisTier::NotClassified,
                author_count: 1,
                student_authored: 1,
                ..ArticleRecord::default()
            },
        ];
        let mut data = SessionData::empty(75.0);
        data.person_name = "Ana Souza".to_string();
        data.working = records;
        let views = recompute(&data.working, &data.year_range, data.weighting_percent);
        (data, views)
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            report_file_name("Ana Souza", "Relatório de Pontuação PPGEC"),
            "Ana Souza - Relatório de Pontuação PPGEC.pdf"
        );
        assert_eq!(
            report_file_name("  ", "Relatório de Pontuação PPGEC"),
            "Relatório - Relatório de Pontuação PPGEC.pdf"
        );
        assert_eq!(summary_csv_file_name("Ana Souza"), "Ana Souza_curriculo.csv");
        assert_eq!(summary_csv_file_name(""), "curriculo.csv");
    }

    #[test]
    fn test_summary_csv_layout() {
        let (_, views) = sample_views();
        let mut out = Vec::new();
        write_summary_csv(&mut out, &views.summary, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Ano;A1;A2;A3;A4;B1;B2;B3;B4;C;NP;Total A;Total B;% A;% B;PQD1_AB;PQD1"
        );
        assert_eq!(
            lines[1],
            "2021;2,000;0,000;0,000;0,000;0,400;0,000;0,000;0,000;0,000;0,000;2,000;0,400;83,333;16,667;2,400;2,800"
        );
        assert!(lines[2].starts_with("2022;0,000"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_summary_csv_decimals() {
        let (_, views) = sample_views();
        let mut out = Vec::new();
        write_summary_csv(&mut out, &views.summary, 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(";2,4;2,8"));
    }

    #[test]
    fn test_export_files() {
        let dir = tempfile::tempdir().unwrap();
        let (data, views) = sample_views();

        let csv_path = export_summary_csv(dir.path(), &data.person_name, &views.summary, 3).unwrap();
        assert!(csv_path.ends_with("Ana Souza_curriculo.csv"));
        assert!(csv_path.exists());

        let report = ReportData::new(&data, &views);
        assert!((report.grand_total - 2.4).abs() < 1e-12);
        let json_path = export_report_payload(dir.path(), &report, "Pontuação").unwrap();
        assert!(json_path.ends_with("Ana Souza - Pontuação.json"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(value["person_name"], "Ana Souza");
        assert_eq!(value["articles"].as_array().unwrap().len(), 4);
        assert_eq!(value["summary"][0]["tiers"]["A1"], 2.0);
    }
}
