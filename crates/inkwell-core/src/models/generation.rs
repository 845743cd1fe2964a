use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Target length category for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
    Bullets,
}

impl SummaryLength {
    /// Output token bound for the category
    pub fn max_tokens(&self) -> u32 {
        match self {
            SummaryLength::Short => 80,
            SummaryLength::Medium => 150,
            SummaryLength::Long => 1300,
            SummaryLength::Bullets => 200,
        }
    }

    /// Formatting guidance handed to the model for the category
    pub fn guideline(&self) -> &'static str {
        match self {
            SummaryLength::Short => "2 to 4 sentences",
            SummaryLength::Medium => "6 to 10 sentences",
            SummaryLength::Long => {
                "a detailed summary of 2 to 4 paragraphs (200 to 400 words) that expands on the key insights"
            }
            SummaryLength::Bullets => "5 to 10 bullet points",
        }
    }
}

impl Display for SummaryLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SummaryLength::Short => write!(f, "short"),
            SummaryLength::Medium => write!(f, "medium"),
            SummaryLength::Long => write!(f, "long"),
            SummaryLength::Bullets => write!(f, "bullets"),
        }
    }
}

impl FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            "bullets" => Ok(SummaryLength::Bullets),
            other => Err(format!(
                "Unknown summary type '{}', expected short, medium, long or bullets",
                other
            )),
        }
    }
}
