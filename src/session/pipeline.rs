use crate::aggregate::{aggregate, grand_total, AggregateRow};
use crate::article::ArticleRecord;
use crate::filter::{filter_indexed, YearRange};
use crate::scoring::{score_all, ScoredArticle};
use serde::Serialize;

/// The two derived views of a working snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Views {
    pub articles: Vec<ScoredArticle>,
    pub summary: Vec<AggregateRow>,
}

impl Views {
    pub fn grand_total(&self) -> f64 {
        grand_total(&self.summary)
    }
}

/// Filter, score and aggregate in one pass. Both views always come from the
/// same filtered set.
pub fn recompute(working: &[ArticleRecord], range: &YearRange, weighting_percent: f64) -> Views {
    let articles = score_all(filter_indexed(working, range), weighting_percent);
    let summary = aggregate(&articles);
    tracing::debug!(
        working = working.len(),
        shown = articles.len(),
        years = summary.len(),
        weighting_percent,
        "recomputed views"
    );
    Views { articles, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::QualisTier;

    fn article(year: i32, tier: QualisTier, dp: u32, dis: i32) -> ArticleRecord {
        ArticleRecord {
            year,
            qualis_tier: tier,
            author_count: dp,
            student_authored: dis,
            ..ArticleRecord::default()
        }
    }

    #[test]
    fn test_views_share_the_filter() {
        let working = vec![
            article(2018, QualisTier::A1, 1, 1),
            article(2020, QualisTier::A1, 2, 0),
            article(2021, QualisTier::B2, 1, 1),
        ];
        let views = recompute(&working, &YearRange::new(2020, 2021), 75.0);

        assert_eq!(views.articles.len(), 2);
        assert_eq!(views.articles[0].index, 1);
        assert_eq!(views.articles[0].score, 0.375);
        assert_eq!(views.summary.len(), 2);
        assert_eq!(views.summary[0].year, 2020);
        assert_eq!(views.summary[1].year, 2021);
        assert!(views.summary.iter().all(|row| row.year != 2018));
    }

    #[test]
    fn test_grand_total() {
        let working = vec![
            article(2020, QualisTier::A1, 1, 1),
            article(2021, QualisTier::B1, 1, 1),
        ];
        let views = recompute(&working, &YearRange::unbounded(), 75.0);
        assert!((views.grand_total() - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_empty_working() {
        let views = recompute(&[], &YearRange::unbounded(), 75.0);
        assert_eq!(views, Views::default());
    }
}
