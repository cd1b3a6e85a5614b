use crate::UserId;
use serde::{Deserialize, Serialize};

/// The requesting side of a recommendation call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSkillProfile {
    /// Set when the requester is a stored user, so they can be excluded from the pool
    pub user_id: Option<UserId>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Option<String>,
}

impl UserSkillProfile {
    pub fn is_empty(&self) -> bool {
        self.skills_offered.is_empty() && self.skills_wanted.is_empty()
    }
}

/// One entry of the candidate pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub candidate_id: UserId,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: Option<String>,
}

impl CandidateProfile {
    pub fn new(
        candidate_id: impl Into<UserId>,
        offered: impl IntoIterator<Item = impl Into<String>>,
        wanted: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            skills_offered: offered.into_iter().map(Into::into).collect(),
            skills_wanted: wanted.into_iter().map(Into::into).collect(),
            availability: None,
        }
    }

    pub fn with_availability(mut self, availability: impl Into<String>) -> Self {
        self.availability = Some(availability.into());
        self
    }
}

/// How strongly a candidate matches the requester
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    /// Offers something wanted and wants something offered
    Mutual,
    /// Only one direction overlaps
    Partial,
    /// No skill overlap; used to fill remaining slots
    Fallback,
}

/// A ranked, justified recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub candidate_id: UserId,
    pub reason: String,
    pub tier: MatchTier,
}
