use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillswap_types::SkillSwapError;
use thiserror::Error;

/// Oracle failures
#[derive(Debug, Error)]
pub enum OracleError {
    /// Backend unreachable or returned an API error
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    /// Backend answered but the payload does not match the output schema
    #[error("Malformed oracle response: {0}")]
    Malformed(String),
}

impl From<OracleError> for SkillSwapError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Unavailable(msg) => SkillSwapError::OracleUnavailable(msg),
            OracleError::Malformed(msg) => SkillSwapError::MalformedOracleResult(msg),
        }
    }
}

/// Oracle input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    pub user_skills: Vec<String>,
    pub user_wants: Vec<String>,
    pub user_availability: Option<String>,
    pub other_user_profiles: Vec<OracleCandidate>,
    pub number_of_recommendations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleCandidate {
    pub user_id: String,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// Oracle output schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleResponse {
    pub recommendations: Vec<OracleRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRecommendation {
    pub user_id: String,
    #[serde(default)]
    pub reason: String,
}

/// External recommendation generator with a fixed input/output schema
#[async_trait]
pub trait RecommendationOracle: Send + Sync {
    /// Identifier for logs (model name, "static", ...)
    fn id(&self) -> &str;

    async fn recommend(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError>;
}
