use crate::oracle::{
    OracleError, OracleRecommendation, OracleRequest, OracleResponse, RecommendationOracle,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Script {
    Respond(OracleResponse),
    Echo,
    Unavailable(String),
    Malformed(String),
}

/// Deterministic oracle for tests and offline runs
///
/// Answers every call with the same scripted response or failure, optionally
/// after a delay, and records what it was asked.
pub struct StaticOracle {
    script: Script,
    delay: Option<Duration>,
    call_count: AtomicU32,
    last_request: Mutex<Option<OracleRequest>>,
}

impl StaticOracle {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Answer with `(user_id, reason)` pairs in the given order
    pub fn responding<I, S, R>(recommendations: I) -> Self
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: Into<String>,
    {
        Self::with_script(Script::Respond(OracleResponse {
            recommendations: recommendations
                .into_iter()
                .map(|(user_id, reason)| OracleRecommendation {
                    user_id: user_id.into(),
                    reason: reason.into(),
                })
                .collect(),
        }))
    }

    /// Echo back the first N candidates of whatever pool it is sent
    pub fn echo() -> Self {
        Self::with_script(Script::Echo)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_script(Script::Unavailable(message.into()))
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::with_script(Script::Malformed(message.into()))
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OracleRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl RecommendationOracle for StaticOracle {
    fn id(&self) -> &str {
        "static"
    }

    async fn recommend(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Echo => Ok(OracleResponse {
                recommendations: request
                    .other_user_profiles
                    .iter()
                    .take(request.number_of_recommendations)
                    .map(|c| OracleRecommendation {
                        user_id: c.user_id.clone(),
                        reason: String::new(),
                    })
                    .collect(),
            }),
            Script::Respond(response) => Ok(response.clone()),
            Script::Unavailable(msg) => Err(OracleError::Unavailable(msg.clone())),
            Script::Malformed(msg) => Err(OracleError::Malformed(msg.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleCandidate;

    fn request(ids: &[&str], n: usize) -> OracleRequest {
        OracleRequest {
            user_skills: vec!["Guitar".into()],
            user_wants: vec!["Python".into()],
            user_availability: None,
            other_user_profiles: ids
                .iter()
                .map(|id| OracleCandidate {
                    user_id: id.to_string(),
                    skills_offered: vec![],
                    skills_wanted: vec![],
                    availability: None,
                })
                    .collect(),
            number_of_recommendations: n,
        }
    }

    #[tokio::test]
    async fn test_echo_takes_first_n() {
        let oracle = StaticOracle::echo();
        let response = oracle.recommend(&request(&["a", "b", "c"], 2)).await.unwrap();
        let ids: Vec<_> = response.recommendations.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(oracle.last_request().unwrap().number_of_recommendations, 2);
    }

    #[tokio::test]
    async fn test_empty_script_answers_nothing() {
        let oracle = StaticOracle::responding(Vec::<(String, String)>::new());
        let response = oracle.recommend(&request(&["a", "b"], 2)).await.unwrap();
        assert!(response.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let oracle = StaticOracle::unavailable("quota exceeded");
        let err = oracle.recommend(&request(&["a"], 1)).await.unwrap_err();
        assert!(matches!(err, OracleError::Unavailable(_)));
    }
}
