use crate::article::QualisTier;

/// Base weight of each classified tier. Unclassified articles weigh 0.
pub const TIER_WEIGHTS: [(QualisTier, f64); 9] = [
    (QualisTier::A1, 1.00),
    (QualisTier::A2, 0.90),
    (QualisTier::A3, 0.75),
    (QualisTier::A4, 0.60),
    (QualisTier::B1, 0.40),
    (QualisTier::B2, 0.30),
    (QualisTier::B3, 0.15),
    (QualisTier::B4, 0.05),
    (QualisTier::C, 0.00),
];

pub fn tier_weight(tier: QualisTier) -> f64 {
    TIER_WEIGHTS
        .iter()
        .find(|(t, _)| *t == tier)
        .map(|(_, weight)| *weight)
        .unwrap_or(0.0)
}
