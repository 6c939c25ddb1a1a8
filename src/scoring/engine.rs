use super::tiers::tier_weight;
use crate::article::ArticleRecord;
use serde::Serialize;

pub const DEFAULT_WEIGHTING_PERCENT: f64 = 75.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Student weighting", "Author split"
    pub description: String, // e.g. "DIS = 0 -> x0.75", "DP = 2 -> /2"
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub base_weight: f64,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// An article of the working snapshot with its freshly computed score.
/// `index` is the article's position in the working snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    pub index: usize,
    pub record: ArticleRecord,
    pub score: f64,
}

/// Score one article. Total over all inputs and never negative.
pub fn score(record: &ArticleRecord, weighting_percent: f64) -> f64 {
    let weighted = tier_weight(record.qualis_tier) * student_factor(record, weighting_percent);
    (weighted / author_divisor(record)).max(0.0)
}

/// Same as [`score`] but records how each step moved the value
pub fn explain(record: &ArticleRecord, weighting_percent: f64) -> ScoreResult {
    let base_weight = tier_weight(record.qualis_tier);
    let mut value = base_weight;
    let mut factors = Vec::new();

    let factor = student_factor(record, weighting_percent);
    let before = value;
    value *= factor;
    let description = if record.is_student_weighted() {
        format!("DIS = 0 -> x{}", factor)
    } else {
        format!("DIS = {} -> no reduction", record.student_authored)
    };
    factors.push(FactorContribution {
        label: "Student weighting".to_string(),
        description,
        before,
        after: value,
    });

    let divisor = author_divisor(record);
    let before = value;
    value /= divisor;
    factors.push(FactorContribution {
        label: "Author split".to_string(),
        description: format!("DP = {} -> /{}", record.author_count, divisor),
        before,
        after: value,
    });

    ScoreResult {
        score: value.max(0.0),
        breakdown: ScoreBreakdown {
            base_weight,
            factors,
        },
    }
}

/// Score every article, keeping its position in the input
pub fn score_all<'a, I>(records: I, weighting_percent: f64) -> Vec<ScoredArticle>
where
    I: IntoIterator<Item = (usize, &'a ArticleRecord)>,
{
    records
        .into_iter()
        .map(|(index, record)| ScoredArticle {
            index,
            record: record.clone(),
            score: score(record, weighting_percent),
        })
        .collect()
}

pub fn is_valid_weighting(percent: f64) -> bool {
    percent.is_finite() && (0.0..=100.0).contains(&percent)
}

fn student_factor(record: &ArticleRecord, weighting_percent: f64) -> f64 {
    if record.is_student_weighted() {
        // f64::max drops NaN, so garbage weighting degrades to 0
        weighting_percent.max(0.0) / 100.0
    } else {
        1.0
    }
}

fn author_divisor(record: &ArticleRecord) -> f64 {
    record.author_count.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::QualisTier;

    fn sample_article(tier: QualisTier, dp: u32, dis: i32) -> ArticleRecord {
        ArticleRecord {
            year: 2021,
            qualis_tier: tier,
            title: "Sample".to_string(),
            author_count: dp,
            student_authored: dis,
            ..ArticleRecord::default()
        }
    }

    #[test]
    fn test_student_weighted_a1() {
        let article = sample_article(QualisTier::A1, 2, 0);
        assert_eq!(score(&article, 75.0), 0.375);
    }

    #[test]
    fn test_unweighted_b2() {
        let article = sample_article(QualisTier::B2, 1, 1);
        assert_eq!(score(&article, 75.0), 0.30);
        assert_eq!(score(&article, 10.0), 0.30);
    }

    #[test]
    fn test_zero_authors_counts_as_one() {
        let zero = sample_article(QualisTier::A2, 0, 3);
        let one = sample_article(QualisTier::A2, 1, 3);
        assert_eq!(score(&zero, 75.0), score(&one, 75.0));
        assert_eq!(score(&zero, 75.0), 0.9);
    }

    #[test]
    fn test_unclassified_scores_zero() {
        let article = sample_article(QualisTier::NotClassified, 1, 1);
        assert_eq!(score(&article, 100.0), 0.0);
        let c = sample_article(QualisTier::C, 1, 0);
        assert_eq!(score(&c, 100.0), 0.0);
    }

    #[test]
    fn test_garbage_weighting_never_negative() {
        let article = sample_article(QualisTier::A1, 1, 0);
        assert_eq!(score(&article, -50.0), 0.0);
        assert_eq!(score(&article, f64::NAN), 0.0);
    }

    #[test]
    fn test_explain_matches_score() {
        let article = sample_article(QualisTier::A3, 3, 0);
        let result = explain(&article, 80.0);
        assert_eq!(result.score, score(&article, 80.0));
        assert_eq!(result.breakdown.base_weight, 0.75);
        assert_eq!(result.breakdown.factors.len(), 2);
        assert_eq!(result.breakdown.factors[0].label, "Student weighting");
        assert_eq!(result.breakdown.factors[0].after, 0.75 * 0.8);
        assert!(result.breakdown.factors[1].description.contains("DP = 3"));
    }

    #[test]
    fn test_explain_unweighted_description() {
        let article = sample_article(QualisTier::B1, 1, 2);
        let result = explain(&article, 75.0);
        assert!(result.breakdown.factors[0].description.contains("no reduction"));
        assert_eq!(result.score, 0.4);
    }

    #[test]
    fn test_score_all_keeps_indices() {
        let articles = [
            sample_article(QualisTier::A1, 1, 1),
            sample_article(QualisTier::B1, 2, 1),
        ];
        let scored = score_all(articles.iter().enumerate().skip(1), 75.0);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].index, 1);
        assert_eq!(scored[0].score, 0.2);
    }

    #[test]
    fn test_is_valid_weighting() {
        assert!(is_valid_weighting(0.0));
        assert!(is_valid_weighting(75.0));
        assert!(is_valid_weighting(100.0));
        assert!(!is_valid_weighting(100.5));
        assert!(!is_valid_weighting(-1.0));
        assert!(!is_valid_weighting(f64::INFINITY));
    }
}
