use crate::article::QualisTier;
use serde::Serialize;

/// Fixed institutional bonus applied to the tier-A total in PQD1
pub const TIER_A_BONUS_RATE: f64 = 0.2;

/// Score sums per classified tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TierScores {
    #[serde(rename = "A1")]
    pub a1: f64,
    #[serde(rename = "A2")]
    pub a2: f64,
    #[serde(rename = "A3")]
    pub a3: f64,
    #[serde(rename = "A4")]
    pub a4: f64,
    #[serde(rename = "B1")]
    pub b1: f64,
    #[serde(rename = "B2")]
    pub b2: f64,
    #[serde(rename = "B3")]
    pub b3: f64,
    #[serde(rename = "B4")]
    pub b4: f64,
    #[serde(rename = "C")]
    pub c: f64,
}

impl TierScores {
    /// Sum for a tier; unclassified articles have no bucket here
    pub fn get(&self, tier: QualisTier) -> Option<f64> {
        self.slot(tier).copied()
    }

    fn slot(&self, tier: QualisTier) -> Option<&f64> {
        match tier {
            QualisTier::A1 => Some(&self.a1),
            QualisTier::A2 => Some(&self.a2),
            QualisTier::A3 => Some(&self.a3),
            QualisTier::A4 => Some(&self.a4),
            QualisTier::B1 => Some(&self.b1),
            QualisTier::B2 => Some(&self.b2),
            QualisTier::B3 => Some(&self.b3),
            QualisTier::B4 => Some(&self.b4),
            QualisTier::C => Some(&self.c),
            QualisTier::NotClassified => None,
        }
    }

    /// Add a score to the tier's bucket. Returns false for unclassified tiers.
    pub fn add(&mut self, tier: QualisTier, score: f64) -> bool {
        let slot = match tier {
            QualisTier::A1 => &mut self.a1,
            QualisTier::A2 => &mut self.a2,
            QualisTier::A3 => &mut self.a3,
            QualisTier::A4 => &mut self.a4,
            QualisTier::B1 => &mut self.b1,
            QualisTier::B2 => &mut self.b2,
            QualisTier::B3 => &mut self.b3,
            QualisTier::B4 => &mut self.b4,
            QualisTier::C => &mut self.c,
            QualisTier::NotClassified => return false,
        };
        *slot += score;
        true
    }

    pub fn total_a(&self) -> f64 {
        self.a1 + self.a2 + self.a3 + self.a4
    }

    pub fn total_b(&self) -> f64 {
        self.b1 + self.b2 + self.b3 + self.b4
    }
}

/// One year of the per-year summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub year: i32,
    pub tiers: TierScores,
    /// NP and anything else outside the nine tiers; not part of either total
    pub unclassified: f64,
    pub total_a: f64,
    pub total_b: f64,
    pub percent_a: f64,
    pub percent_b: f64,
    /// PQD1
    pub bonus_score: f64,
}

impl AggregateRow {
    pub(crate) fn empty(year: i32) -> Self {
        Self {
            year,
            tiers: TierScores::default(),
            unclassified: 0.0,
            total_a: 0.0,
            total_b: 0.0,
            percent_a: 0.0,
            percent_b: 0.0,
            bonus_score: 0.0,
        }
    }

    /// Derive totals, shares and PQD1 from the tier buckets
    pub(crate) fn finish(&mut self) {
        self.total_a = self.tiers.total_a();
        self.total_b = self.tiers.total_b();

        // The larger share is divided out and the smaller one is its
        // complement; that subtraction is exact, so the pair sums to 100.
        let combined = self.combined();
        if combined > 0.0 {
            if self.total_a >= self.total_b {
                self.percent_a = self.total_a / combined * 100.0;
                self.percent_b = 100.0 - self.percent_a;
            } else {
                self.percent_b = self.total_b / combined * 100.0;
                self.percent_a = 100.0 - self.percent_b;
            }
        } else {
            self.percent_a = 0.0;
            self.percent_b = 0.0;
        }

        self.bonus_score = self.total_a + self.total_b + TIER_A_BONUS_RATE * self.total_a;
    }

    /// PQD1_AB: tier-A plus tier-B total, without the bonus
    pub fn combined(&self) -> f64 {
        self.total_a + self.total_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_routes_to_bucket() {
        let mut tiers = TierScores::default();
        assert!(tiers.add(QualisTier::A2, 0.5));
        assert!(tiers.add(QualisTier::A2, 0.25));
        assert!(tiers.add(QualisTier::B4, 0.05));
        assert!(!tiers.add(QualisTier::NotClassified, 1.0));
        assert_eq!(tiers.get(QualisTier::A2), Some(0.75));
        assert_eq!(tiers.get(QualisTier::B4), Some(0.05));
        assert_eq!(tiers.get(QualisTier::NotClassified), None);
    }

    #[test]
    fn test_totals_exclude_c() {
        let mut tiers = TierScores::default();
        tiers.add(QualisTier::A1, 1.0);
        tiers.add(QualisTier::B1, 0.5);
        tiers.add(QualisTier::C, 2.0);
        assert_eq!(tiers.total_a(), 1.0);
        assert_eq!(tiers.total_b(), 0.5);
    }

    #[test]
    fn test_finish_with_scores() {
        let mut row = AggregateRow::empty(2021);
        row.tiers.a1 = 2.0;
        row.tiers.b1 = 1.0;
        row.finish();
        assert_eq!(row.total_a, 2.0);
        assert_eq!(row.total_b, 1.0);
        assert!((row.percent_a - 66.666_666).abs() < 1e-3);
        assert!((row.percent_b - 33.333_333).abs() < 1e-3);
        assert!((row.bonus_score - 3.4).abs() < 1e-12);
        assert_eq!(row.combined(), 3.0);
    }

    #[test]
    fn test_shares_sum_to_exactly_100() {
        let weights = [1.0, 0.9, 0.75, 0.6, 0.4, 0.3, 0.15, 0.05];
        for a in &weights[..4] {
            for b in &weights[4..] {
                for dp_a in 1..=7 {
                    for dp_b in 1..=7 {
                        let mut row = AggregateRow::empty(2021);
                        row.tiers.a1 = a / dp_a as f64;
                        row.tiers.b1 = b / dp_b as f64;
                        row.finish();
                        assert_eq!(row.percent_a + row.percent_b, 100.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_group_takes_everything() {
        let mut row = AggregateRow::empty(2021);
        row.tiers.b3 = 0.15;
        row.finish();
        assert_eq!(row.percent_a, 0.0);
        assert_eq!(row.percent_b, 100.0);

        let mut row = AggregateRow::empty(2022);
        row.tiers.a4 = 0.6;
        row.finish();
        assert_eq!(row.percent_a, 100.0);
        assert_eq!(row.percent_b, 0.0);
    }

    #[test]
    fn test_finish_without_scores() {
        let mut row = AggregateRow::empty(2020);
        row.unclassified = 0.0;
        row.finish();
        assert_eq!(row.percent_a, 0.0);
        assert_eq!(row.percent_b, 0.0);
        assert_eq!(row.bonus_score, 0.0);
    }

    #[test]
    fn test_serialized_tier_keys() {
        let json = serde_json::to_value(TierScores::default()).unwrap();
        assert!(json.get("A1").is_some());
        assert!(json.get("C").is_some());
    }
}
