pub mod config;
pub mod engine;
pub mod tiers;
pub mod validation;

pub use config::*;
pub use engine::{
    explain, is_valid_weighting, score, score_all, FactorContribution, ScoreBreakdown,
    ScoreResult, ScoredArticle, DEFAULT_WEIGHTING_PERCENT,
};
pub use tiers::{tier_weight, TIER_WEIGHTS};
pub use validation::validate_scoring;
