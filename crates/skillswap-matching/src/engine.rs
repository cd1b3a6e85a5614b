//! Recommendation engine
//!
//! The oracle is asked for a bounded, normalized request. Its answer must
//! name exactly `min(N, pool)` distinct pool members; anything else is a
//! malformed result. The returned order and reasons always come from the
//! ranking policy, with the oracle's reason appended where it adds something.

use crate::policy::{prepare_pool, rank};
use skillswap_provider::{OracleCandidate, OracleRequest, RecommendationOracle};
use skillswap_types::{
    CandidateProfile, MatchTier, Recommendation, Result, SkillSwapError, UserSkillProfile,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationConfig {
    /// Default N when the caller does not ask for a specific count
    pub count: usize,
    pub oracle_timeout: Duration,
    /// Only the best this many candidates are sent to the oracle
    pub max_candidates: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            count: 3,
            oracle_timeout: Duration::from_secs(30),
            max_candidates: 50,
        }
    }
}

pub struct RecommendationEngine {
    oracle: Arc<dyn RecommendationOracle>,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(oracle: Arc<dyn RecommendationOracle>) -> Self {
        Self::with_config(oracle, RecommendationConfig::default())
    }

    pub fn with_config(oracle: Arc<dyn RecommendationOracle>, config: RecommendationConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Produce up to `count` ranked recommendations from `pool`
    ///
    /// Returns exactly `min(count, usable pool)` entries. Fails with
    /// `PreconditionFailed` when the requester has no skills at all, and
    /// with an external-dependency error when the oracle fails, times out
    /// or answers outside the pool.
    pub async fn recommend(
        &self,
        requester: &UserSkillProfile,
        pool: &[CandidateProfile],
        count: Option<usize>,
    ) -> Result<Vec<Recommendation>> {
        if requester.is_empty() {
            return Err(SkillSwapError::PreconditionFailed(
                "requester profile has no offered or wanted skills".into(),
            ));
        }

        let count = match count.unwrap_or(self.config.count) {
            0 => {
                return Err(SkillSwapError::Validation(
                    "recommendation count must be positive".into(),
                ))
            }
            n => n,
        };

        let prepared = cap_pool(
            requester,
            prepare_pool(requester, pool),
            self.config.max_candidates.max(count),
        );
        if prepared.is_empty() {
            debug!("Empty candidate pool, skipping oracle call");
            return Ok(Vec::new());
        }

        let expected = count.min(prepared.len());
        let request = OracleRequest {
            user_skills: requester.skills_offered.clone(),
            user_wants: requester.skills_wanted.clone(),
            user_availability: requester.availability.clone(),
            other_user_profiles: prepared
                .iter()
                .map(|c| OracleCandidate {
                    user_id: c.candidate_id.to_string(),
                    skills_offered: c.skills_offered.clone(),
                    skills_wanted: c.skills_wanted.clone(),
                    availability: c.availability.clone(),
                })
                .collect(),
            number_of_recommendations: expected,
        };

        info!(
            oracle = self.oracle.id(),
            pool = prepared.len(),
            count = expected,
            "Requesting recommendations"
        );

        let started = Instant::now();
        let response =
            match tokio::time::timeout(self.config.oracle_timeout, self.oracle.recommend(&request))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(oracle = self.oracle.id(), "Oracle call failed: {}", e);
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(oracle = self.oracle.id(), "Oracle call timed out");
                    return Err(SkillSwapError::OracleTimeout(
                        self.config.oracle_timeout.as_secs(),
                    ));
                }
            };

        debug!(
            oracle = self.oracle.id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Oracle answered"
        );

        if response.recommendations.len() != expected {
            return Err(SkillSwapError::MalformedOracleResult(format!(
                "expected {} recommendations, got {}",
                expected,
                response.recommendations.len()
            )));
        }

        let known: HashSet<&str> = prepared.iter().map(|c| c.candidate_id.as_str()).collect();
        let mut oracle_reasons: HashMap<&str, &str> = HashMap::new();
        for rec in &response.recommendations {
            let id = rec.user_id.trim();
            if !known.contains(id) {
                return Err(SkillSwapError::MalformedOracleResult(format!(
                    "unknown candidate '{id}'"
                )));
            }
            if oracle_reasons.insert(id, rec.reason.trim()).is_some() {
                return Err(SkillSwapError::MalformedOracleResult(format!(
                    "candidate '{id}' recommended twice"
                )));
            }
        }

        let ranked = rank(requester, &prepared);
        let picked: Vec<&str> = ranked
            .iter()
            .take(expected)
            .map(|r| r.candidate.candidate_id.as_str())
            .collect();
        let overridden = picked
            .iter()
            .filter(|id| !oracle_reasons.contains_key(*id))
            .count();
        if overridden > 0 {
            debug!(overridden, "Ranking policy replaced oracle picks");
        }

        Ok(ranked
            .into_iter()
            .take(expected)
            .map(|r| {
                let mut reason = r.assessment.reason();
                if r.assessment.tier != MatchTier::Fallback {
                    if let Some(extra) = oracle_reasons
                        .get(r.candidate.candidate_id.as_str())
                        .filter(|extra| !extra.is_empty())
                    {
                        reason.push(' ');
                        reason.push_str(extra);
                    }
                }
                Recommendation {
                    candidate_id: r.candidate.candidate_id.clone(),
                    reason,
                    tier: r.assessment.tier,
                }
            })
            .collect())
    }
}

/// Keep the best `cap` candidates in policy order
fn cap_pool(
    requester: &UserSkillProfile,
    prepared: Vec<CandidateProfile>,
    cap: usize,
) -> Vec<CandidateProfile> {
    if prepared.len() <= cap {
        return prepared;
    }
    rank(requester, &prepared)
        .into_iter()
        .take(cap)
        .map(|r| r.candidate.clone())
        .collect()
}
