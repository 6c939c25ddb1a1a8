use super::row::AggregateRow;
use crate::scoring::ScoredArticle;
use std::collections::HashMap;

/// Fold scored articles into one row per year, in order of first appearance
pub fn aggregate(scored: &[ScoredArticle]) -> Vec<AggregateRow> {
    let mut rows: Vec<AggregateRow> = Vec::new();
    let mut positions: HashMap<i32, usize> = HashMap::new();

    for article in scored {
        let year = article.record.year;
        let position = *positions.entry(year).or_insert_with(|| {
            rows.push(AggregateRow::empty(year));
            rows.len() - 1
        });

        let row = &mut rows[position];
        if !row.tiers.add(article.record.qualis_tier, article.score) {
            row.unclassified += article.score;
        }
    }

    for row in &mut rows {
        row.finish();
    }
    rows
}

/// Overall points across the summary (sum of each year's tier-A + tier-B)
pub fn grand_total(rows: &[AggregateRow]) -> f64 {
    rows.iter().map(AggregateRow::combined).sum()
}
