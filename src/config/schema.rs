use crate::scoring::ScoringConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPORT_TITLE: &str = "Relatório de Pontuação PPGEC";
pub const DEFAULT_EXPORT_DECIMALS: usize = 3;

/// Top-level config file (~/.config/pqd-score/config.yaml)
///
/// Every section is optional; an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub export: Option<ExportConfig>,
}

impl Config {
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn export(&self) -> ExportConfig {
        self.export.clone().unwrap_or_default()
    }
}

/// Export tuning
///
/// Example YAML:
/// ```yaml
/// export:
///   report_title: "Relatório de Pontuação PPGEC"
///   decimals: 3
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default)]
    pub report_title: Option<String>,
    /// Decimal places in the delimited summary
    #[serde(default)]
    pub decimals: Option<usize>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            report_title: Some(DEFAULT_REPORT_TITLE.to_string()),
            decimals: Some(DEFAULT_EXPORT_DECIMALS),
        }
    }
}

impl ExportConfig {
    pub fn effective_report_title(&self) -> &str {
        self.report_title.as_deref().unwrap_or(DEFAULT_REPORT_TITLE)
    }

    pub fn effective_decimals(&self) -> usize {
        self.decimals.unwrap_or(DEFAULT_EXPORT_DECIMALS)
    }
}
