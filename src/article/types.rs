use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown for bibliometric fields the ingestion service left empty
pub const MISSING_DISPLAY: &str = "---";

/// Qualis classification of a publication venue, best first.
///
/// Anything that is not one of the nine classified tiers (including an absent
/// value) is `NotClassified`, written as "NP".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualisTier {
    A1,
    A2,
    A3,
    A4,
    B1,
    B2,
    B3,
    B4,
    C,
    #[default]
    NotClassified,
}

impl QualisTier {
    pub const CLASSIFIED: [QualisTier; 9] = [
        QualisTier::A1,
        QualisTier::A2,
        QualisTier::A3,
        QualisTier::A4,
        QualisTier::B1,
        QualisTier::B2,
        QualisTier::B3,
        QualisTier::B4,
        QualisTier::C,
    ];

    /// Lenient conversion used for ingested data: unknown labels become NP
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "A1" => QualisTier::A1,
            "A2" => QualisTier::A2,
            "A3" => QualisTier::A3,
            "A4" => QualisTier::A4,
            "B1" => QualisTier::B1,
            "B2" => QualisTier::B2,
            "B3" => QualisTier::B3,
            "B4" => QualisTier::B4,
            "C" => QualisTier::C,
            _ => QualisTier::NotClassified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualisTier::A1 => "A1",
            QualisTier::A2 => "A2",
            QualisTier::A3 => "A3",
            QualisTier::A4 => "A4",
            QualisTier::B1 => "B1",
            QualisTier::B2 => "B2",
            QualisTier::B3 => "B3",
            QualisTier::B4 => "B4",
            QualisTier::C => "C",
            QualisTier::NotClassified => "NP",
        }
    }

    pub fn is_tier_a(&self) -> bool {
        matches!(
            self,
            QualisTier::A1 | QualisTier::A2 | QualisTier::A3 | QualisTier::A4
        )
    }

    pub fn is_tier_b(&self) -> bool {
        matches!(
            self,
            QualisTier::B1 | QualisTier::B2 | QualisTier::B3 | QualisTier::B4
        )
    }
}

impl fmt::Display for QualisTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for QualisTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for QualisTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(QualisTier::from_label(&label))
    }
}

/// One published article as held by an edit session.
///
/// The score is not stored here; it is derived on every recomputation
/// (see `scoring::ScoredArticle`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub year: i32,
    pub qualis_tier: QualisTier,
    pub doi: String,
    pub issn: String,
    pub journal_title: String,
    pub title: String,
    pub authors: String,
    pub jcr_impact_factor: String,
    pub jcr_quartile: String,
    pub sjr_score: String,
    pub sjr_quartile: String,
    /// DP: authors attributed to the article (score divisor)
    pub author_count: u32,
    /// DC: student co-authors, display only
    pub student_coauthor_count: u32,
    /// DIS: 0 selects the student-weighted treatment, any other value (negative
    /// included) means no reduction
    pub student_authored: i32,
}

impl Default for ArticleRecord {
    fn default() -> Self {
        Self {
            year: 0,
            qualis_tier: QualisTier::NotClassified,
            doi: String::new(),
            issn: String::new(),
            journal_title: String::new(),
            title: String::new(),
            authors: String::new(),
            jcr_impact_factor: MISSING_DISPLAY.to_string(),
            jcr_quartile: MISSING_DISPLAY.to_string(),
            sjr_score: MISSING_DISPLAY.to_string(),
            sjr_quartile: MISSING_DISPLAY.to_string(),
            author_count: 0,
            student_coauthor_count: 0,
            student_authored: 0,
        }
    }
}

impl ArticleRecord {
    pub fn is_student_weighted(&self) -> bool {
        self.student_authored == 0
    }

    pub fn count(&self, field: EditableField) -> i64 {
        match field {
            EditableField::AuthorCount => i64::from(self.author_count),
            EditableField::StudentCoauthorCount => i64::from(self.student_coauthor_count),
            EditableField::StudentAuthored => i64::from(self.student_authored),
        }
    }

    /// Set a collaboration count from user text, coercing garbage to 0
    pub fn set_count(&mut self, field: EditableField, value: &str) {
        match field {
            EditableField::AuthorCount => self.author_count = coerce_count(value),
            EditableField::StudentCoauthorCount => {
                self.student_coauthor_count = coerce_count(value)
            }
            EditableField::StudentAuthored => self.student_authored = coerce_flag(value),
        }
    }
}

/// The collaboration fields a user may edit in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    /// DP
    AuthorCount,
    /// DC
    StudentCoauthorCount,
    /// DIS
    StudentAuthored,
}

impl EditableField {
    pub fn code(&self) -> &'static str {
        match self {
            EditableField::AuthorCount => "DP",
            EditableField::StudentCoauthorCount => "DC",
            EditableField::StudentAuthored => "DIS",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for EditableField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dp" | "authors" | "author-count" => Ok(EditableField::AuthorCount),
            "dc" | "students" | "student-coauthors" => Ok(EditableField::StudentCoauthorCount),
            "dis" | "student-authored" => Ok(EditableField::StudentAuthored),
            other => Err(format!(
                "unknown field '{}' (expected DP, DC or DIS)",
                other
            )),
        }
    }
}

/// Coerce free text into a non-negative count.
///
/// Integers parse as-is, decimals are truncated, and anything else (empty,
/// negative, non-numeric) becomes 0.
pub fn coerce_count(text: &str) -> u32 {
    let text = text.trim();
    if let Ok(value) = text.parse::<u32>() {
        return value;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Coerce free text into the DIS flag.
///
/// Any integer keeps its value and sign, decimals are truncated, and
/// non-numeric text becomes 0.
pub fn coerce_flag(text: &str) -> i32 {
    let text = text.trim();
    if let Ok(value) = text.parse::<i32>() {
        return value;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => truncate_flag(value),
        _ => 0,
    }
}

pub(crate) fn truncate_flag(value: f64) -> i32 {
    value.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}
