pub mod engine;
pub mod row;

pub use engine::{aggregate, grand_total};
pub use row::{AggregateRow, TierScores, TIER_A_BONUS_RATE};
