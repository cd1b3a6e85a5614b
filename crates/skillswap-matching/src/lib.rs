//! SkillSwap Matching - ranked partner recommendations
//!
//! The ranking policy lives in [`policy`] and is pure. [`RecommendationEngine`]
//! prepares the candidate pool, asks the oracle, validates the answer and
//! enforces the policy on the way out.

pub mod engine;
pub mod policy;

pub use engine::{RecommendationConfig, RecommendationEngine};
pub use policy::{assess, prepare_pool, rank, MatchAssessment, RankedCandidate};
