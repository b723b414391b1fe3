//! Plain-data output of a duplicate-detection pass. Everything here is
//! advisory: the caller decides whether to skip, merge, or import anyway.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse similarity bucket for human-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    /// Bucket a similarity score. Scores at or above 0.95 are exact
    /// equivalents but still report as `High`.
    pub fn for_score(score: f64) -> Tier {
        if score >= 0.85 {
            Tier::High
        } else if score >= 0.70 {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FestivalMatch {
    pub id: Uuid,
    pub name: String,
    pub similarity: f64,
    pub tier: Tier,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueMatch {
    pub id: Uuid,
    pub name: String,
    pub similarity: f64,
    pub tier: Tier,
    pub address: Option<String>,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherMatch {
    pub id: Uuid,
    pub name: String,
    pub similarity: f64,
    pub tier: Tier,
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicianMatch {
    pub id: Uuid,
    pub name: String,
    pub similarity: f64,
    pub tier: Tier,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionAction {
    Skip,
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Festival,
    Venue,
    Teacher,
    Musician,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: SuggestionAction,
    pub kind: MatchKind,
    pub existing_id: Uuid,
    pub existing_name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub has_duplicates: bool,
    pub festivals: Vec<FestivalMatch>,
    pub venues: Vec<VenueMatch>,
    pub teachers: Vec<TeacherMatch>,
    pub musicians: Vec<MusicianMatch>,
    pub suggestions: Vec<Suggestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(Tier::for_score(1.0), Tier::High);
        assert_eq!(Tier::for_score(0.95), Tier::High);
        assert_eq!(Tier::for_score(0.85), Tier::High);
        assert_eq!(Tier::for_score(0.84), Tier::Medium);
        assert_eq!(Tier::for_score(0.70), Tier::Medium);
        assert_eq!(Tier::for_score(0.69), Tier::Low);
    }
}
