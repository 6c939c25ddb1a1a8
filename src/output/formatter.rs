use std::io::IsTerminal;
use chrono::Duration;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::aggregate::{grand_total, AggregateRow};
use crate::article::{QualisTier, MISSING_DISPLAY};
use crate::scoring::{ScoreResult, ScoredArticle};
use crate::session::SessionData;

/// Decimal places for scores shown in the terminal
pub const SCORE_DECIMALS: usize = 3;
/// Decimal places for tier-A / tier-B shares
pub const PERCENT_DECIMALS: usize = 1;

/// Format a number the pt-BR way: decimal comma, dot as thousands separator
/// (1234.5 with 2 decimals -> "1.234,50")
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    // "-0,000" reads as noise; only keep the sign when a digit survives rounding
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{},{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a share as "66,7%"
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, PERCENT_DECIMALS))
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn display_or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING_DISPLAY
    } else {
        value
    }
}

/// One-line session status: person, state, weighting, range, last save
pub fn format_session_header(data: &SessionData, use_colors: bool) -> String {
    let name = if data.person_name.is_empty() {
        "(no name)"
    } else {
        data.person_name.as_str()
    };
    let saved = match data.saved_at {
        Some(at) => format!("saved {} ago", format_age(chrono::Utc::now() - at)),
        None => "never saved".to_string(),
    };
    let weighting = format!("{}%", format_number(data.weighting_percent, 0));

    if use_colors {
        format!(
            "{} [{}]  weighting {}  years {}  {}",
            name.bold(),
            data.state.cyan(),
            weighting.yellow(),
            data.year_range,
            saved.dimmed()
        )
    } else {
        format!(
            "{} [{}]  weighting {}  years {}  {}",
            name, data.state, weighting, data.year_range, saved
        )
    }
}

/// Format scored articles as a table: index (1-based, as accepted by `edit`),
/// year, tier, DP/DC/DIS, score and title
pub fn format_article_table(articles: &[ScoredArticle], use_colors: bool) -> String {
    if articles.is_empty() {
        return "No articles to show.".to_string();
    }

    let term_width = get_terminal_width();

    // "999." + space + year(4) + tier(3) + three counts(3 each) + score(9) + separators
    let index_width = 4;
    let score_width = 9;
    let separator = "  ";
    let fixed_width = index_width + 1 + 4 + 3 + 3 * 4 + score_width + separator.len() * 4;

    let header = format!(
        "{:>iw$} {}{}{:<3}{}{:>3} {:>3} {:>3}{}{:>sw$}{}{}",
        "#",
        "Ano ",
        separator,
        "Q",
        separator,
        "DP",
        "DC",
        "DIS",
        separator,
        "Pontos",
        separator,
        "Título",
        iw = index_width,
        sw = score_width
    );

    let rows = articles.iter().map(|scored| {
        let record = &scored.record;
        let index_str = format!("{:>3}.", scored.index + 1);
        let score_str = format!(
            "{:>width$}",
            format_number(scored.score, SCORE_DECIMALS),
            width = score_width
        );

        let title = if let Some(width) = term_width {
            if width > fixed_width + 10 {
                truncate_title(&record.title, width - fixed_width)
            } else {
                truncate_title(&record.title, 20)
            }
        } else {
            record.title.clone()
        };

        let tier = format!("{:<3}", record.qualis_tier.label());
        let counts = format!(
            "{:>3} {:>3} {:>3}",
            record.author_count, record.student_coauthor_count, record.student_authored
        );

        if use_colors {
            let tier = if record.qualis_tier.is_tier_a() {
                tier.green().to_string()
            } else if record.qualis_tier == QualisTier::NotClassified {
                tier.dimmed().to_string()
            } else {
                tier.yellow().to_string()
            };
            format!(
                "{} {}{}{}{}{}{}{}{}{}",
                index_str.dimmed(),
                record.year,
                separator,
                tier,
                separator,
                counts,
                separator,
                score_str.bold(),
                separator,
                title
            )
        } else {
            format!(
                "{} {}{}{}{}{}{}{}{}{}",
                index_str,
                record.year,
                separator,
                tier,
                separator,
                counts,
                separator,
                score_str,
                separator,
                title
            )
        }
    });

    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };

    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one article with every display field (for `explain` and verbose mode)
pub fn format_article_detail(scored: &ScoredArticle, use_colors: bool) -> String {
    let record = &scored.record;
    let title = display_or_missing(&record.title);
    let score = format_number(scored.score, SCORE_DECIMALS);

    let body = format!(
        "  Year: {}  Qualis: {}\n  Journal: {} (ISSN {})\n  Authors: {}\n  DOI: {}\n  JCR: {} ({})  SJR: {} ({})\n  DP: {}  DC: {}  DIS: {}",
        record.year,
        record.qualis_tier,
        display_or_missing(&record.journal_title),
        display_or_missing(&record.issn),
        display_or_missing(&record.authors),
        display_or_missing(&record.doi),
        display_or_missing(&record.jcr_impact_factor),
        display_or_missing(&record.jcr_quartile),
        display_or_missing(&record.sjr_score),
        display_or_missing(&record.sjr_quartile),
        record.author_count,
        record.student_coauthor_count,
        record.student_authored,
    );

    if use_colors {
        format!(
            "{}. {}\n{}\n  Score: {}",
            scored.index + 1,
            title.bold(),
            body,
            score.bold()
        )
    } else {
        format!("{}. {}\n{}\n  Score: {}", scored.index + 1, title, body, score)
    }
}

/// Format the step-by-step score computation
pub fn format_breakdown(result: &ScoreResult) -> String {
    let mut lines = vec![format!(
        "  Tier weight: {}",
        format_number(result.breakdown.base_weight, SCORE_DECIMALS)
    )];
    for factor in &result.breakdown.factors {
        lines.push(format!(
            "  {}: {} ({} -> {})",
            factor.label,
            factor.description,
            format_number(factor.before, SCORE_DECIMALS),
            format_number(factor.after, SCORE_DECIMALS)
        ));
    }
    lines.push(format!(
        "  Score: {}",
        format_number(result.score, SCORE_DECIMALS)
    ));
    lines.join("\n")
}

/// Format the per-year summary with tier sums, shares and PQD1 columns,
/// followed by the overall points line
pub fn format_summary_table(rows: &[AggregateRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No years to summarize.".to_string();
    }

    let width = 7;
    let mut header = format!("{:<5}", "Ano");
    for tier in QualisTier::CLASSIFIED {
        header.push_str(&format!(" {:>width$}", tier.label(), width = width));
    }
    for label in ["NP", "% B", "Total B", "% A", "PQD1_A", "PQD1", "PQD1_AB"] {
        header.push_str(&format!(" {:>width$}", label, width = width));
    }

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for row in rows {
        let mut line = format!("{:<5}", row.year);
        for tier in QualisTier::CLASSIFIED {
            let value = row.tiers.get(tier).unwrap_or(0.0);
            line.push_str(&format!(
                " {:>width$}",
                format_number(value, SCORE_DECIMALS),
                width = width
            ));
        }
        let cells = [
            format_number(row.unclassified, SCORE_DECIMALS),
            format_percent(row.percent_b),
            format_number(row.total_b, SCORE_DECIMALS),
            format_percent(row.percent_a),
            format_number(row.total_a, SCORE_DECIMALS),
            format_number(row.bonus_score, SCORE_DECIMALS),
            format_number(row.combined(), SCORE_DECIMALS),
        ];
        for cell in cells {
            line.push_str(&format!(" {:>width$}", cell, width = width));
        }
        lines.push(line);
    }

    let total = format!(
        "Pontuação: {}",
        format_number(grand_total(rows), SCORE_DECIMALS)
    );
    lines.push(String::new());
    lines.push(if use_colors {
        total.bold().to_string()
    } else {
        total
    });

    lines.join("\n")
}

/// Format scored articles as tab-separated values for scripting
/// Columns: index, year, tier, DP, DC, DIS, score, title (no headers, no colors)
pub fn format_article_tsv(articles: &[ScoredArticle]) -> String {
    articles
        .iter()
        .map(|scored| {
            let record = &scored.record;
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                scored.index + 1,
                record.year,
                record.qualis_tier,
                record.author_count,
                record.student_coauthor_count,
                record.student_authored,
                scored.score,
                record.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::article::ArticleRecord;
    use crate::scoring::{explain, score_all};

    fn sample_articles() -> Vec<ScoredArticle> {
        let records = vec![
            ArticleRecord {
                year: 2021,
                qualis_tier: QualisTier::A1,
                title: "Concrete fatigue under cyclic load".to_string(),
                author_count: 2,
                student_authored: 0,
                ..ArticleRecord::default()
            },
            ArticleRecord {
                year: 2021,
                qualis_tier: QualisTier::B1,
                title: "Soil stabilization".to_string(),
                author_count: 1,
                student_authored: 1,
                ..ArticleRecord::default()
            },
        ];
        score_all(records.iter().enumerate(), 75.0)
    }

    #[test]
    fn test_format_number_decimal_comma() {
        assert_eq!(format_number(0.375, 3), "0,375");
        assert_eq!(format_number(66.666_666, 1), "66,7");
        assert_eq!(format_number(3.4, 1), "3,4");
    }

    #[test]
    fn test_format_number_thousands() {
        assert_eq!(format_number(1234.5, 2), "1.234,50");
        assert_eq!(format_number(1_234_567.0, 0), "1.234.567");
        assert_eq!(format_number(999.0, 0), "999");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-1.5, 1), "-1,5");
        assert_eq!(format_number(-0.0001, 2), "0,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(33.333_333), "33,3%");
        assert_eq!(format_percent(0.0), "0,0%");
    }

    #[test]
    fn test_article_table_empty() {
        assert_eq!(format_article_table(&[], false), "No articles to show.");
    }

    #[test]
    fn test_article_table_rows() {
        let result = format_article_table(&sample_articles(), false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("DIS"));
        assert!(lines[1].starts_with("  1."));
        assert!(lines[1].contains("A1"));
        assert!(lines[1].contains("0,375"));
        assert!(lines[2].contains("0,400"));
    }

    #[test]
    fn test_article_detail() {
        let articles = sample_articles();
        let result = format_article_detail(&articles[0], false);
        assert!(result.starts_with("1. Concrete fatigue"));
        assert!(result.contains("Qualis: A1"));
        assert!(result.contains("DOI: ---"));
        assert!(result.contains("JCR: --- (---)"));
        assert!(result.contains("DP: 2  DC: 0  DIS: 0"));
        assert!(result.contains("Score: 0,375"));
    }

    #[test]
    fn test_breakdown() {
        let articles = sample_articles();
        let result = format_breakdown(&explain(&articles[0].record, 75.0));
        assert!(result.contains("Tier weight: 1,000"));
        assert!(result.contains("Student weighting: DIS = 0 -> x0.75"));
        assert!(result.contains("Author split: DP = 2 -> /2"));
        assert!(result.ends_with("Score: 0,375"));
    }

    #[test]
    fn test_summary_table() {
        let rows = aggregate(&sample_articles());
        let result = format_summary_table(&rows, false);
        let lines: Vec<&str> = result.lines().collect();
        assert!(lines[0].starts_with("Ano"));
        assert!(lines[0].contains("PQD1_AB"));
        assert!(lines[1].starts_with("2021"));
        // total_a 0.375, total_b 0.4
        assert!(lines[1].contains("48,4%"));
        assert!(lines[1].contains("51,6%"));
        assert_eq!(*lines.last().unwrap(), "Pontuação: 0,775");
    }

    #[test]
    fn test_summary_table_empty() {
        assert_eq!(format_summary_table(&[], false), "No years to summarize.");
    }

    #[test]
    fn test_article_tsv() {
        let result = format_article_tsv(&sample_articles());
        let first = result.lines().next().unwrap();
        assert_eq!(
            first,
            "1\t2021\tA1\t2\t0\t0\t0.375\tConcrete fatigue under cyclic load"
        );
    }

    #[test]
    fn test_session_header() {
        let mut data = SessionData::empty(75.0);
        data.person_name = "Ana".to_string();
        let result = format_session_header(&data, false);
        assert_eq!(result, "Ana [empty]  weighting 75%  years all years  never saved");
    }

    // truncate_title tests
    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
    }

    #[test]
    fn test_truncate_title_long() {
        assert_eq!(truncate_title("This is a very long title", 15), "This is a ve...");
    }

    #[test]
    fn test_truncate_title_very_narrow() {
        assert_eq!(truncate_title("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(2)), "2w");
        assert_eq!(format_age(Duration::seconds(30)), "now");
    }
}
