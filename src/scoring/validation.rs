use super::config::ScoringConfig;
use super::engine::is_valid_weighting;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(percent) = config.weighting_percent {
        if !is_valid_weighting(percent) {
            errors.push(format!(
                "scoring.weighting_percent: must be between 0 and 100, got {}",
                percent
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
