use super::range::YearRange;
use crate::article::ArticleRecord;

/// Keep only the articles published inside the range, preserving order
pub fn filter_by_years(records: Vec<ArticleRecord>, range: &YearRange) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .filter(|record| range.contains(record.year))
        .collect()
}

/// Borrowing variant that also yields each article's position in `records`
pub fn filter_indexed<'a>(
    records: &'a [ArticleRecord],
    range: &'a YearRange,
) -> impl Iterator<Item = (usize, &'a ArticleRecord)> + 'a {
    records
        .iter()
        .enumerate()
        .filter(move |(_, record)| range.contains(record.year))
}
