//! SkillSwap Provider - the recommendation oracle
//!
//! The oracle is an external model prompted with the requester's skills and a
//! candidate pool. It answers with `{userId, reason}` pairs; the matching crate
//! decides how much of that answer to trust.

mod llm;
mod oracle;
mod prompt;
mod static_oracle;

pub use llm::LlmOracle;
pub use oracle::{
    OracleCandidate, OracleError, OracleRecommendation, OracleRequest, OracleResponse,
    RecommendationOracle,
};
pub use prompt::{parse_response, recommendation_prompt};
pub use static_oracle::StaticOracle;
