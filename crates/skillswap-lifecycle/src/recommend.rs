use serde::Serialize;
use skillswap_matching::RecommendationEngine;
use skillswap_persistence::UserStore;
use skillswap_types::{MatchTier, Result, SkillSwapError, User, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A recommendation mapped back onto the stored user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedUser {
    pub user: User,
    pub reason: String,
    pub tier: MatchTier,
}

/// Recommendations for stored users, drawn from the whole directory
pub struct Recommender {
    users: Arc<dyn UserStore>,
    engine: RecommendationEngine,
}

impl Recommender {
    pub fn new(users: Arc<dyn UserStore>, engine: RecommendationEngine) -> Self {
        Self { users, engine }
    }

    pub async fn recommend_for(
        &self,
        user_id: &UserId,
        count: Option<usize>,
    ) -> Result<Vec<RecommendedUser>> {
        let requester = self.users.get_user(user_id).await?.ok_or_else(|| {
            SkillSwapError::PreconditionFailed(format!("no profile loaded for '{user_id}'"))
        })?;
        if requester.skills_offered.is_empty() && requester.skills_wanted.is_empty() {
            return Err(SkillSwapError::PreconditionFailed(format!(
                "'{user_id}' has not listed any skills yet"
            )));
        }

        let others: Vec<User> = self
            .users
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.id != requester.id)
            .collect();
        let pool: Vec<_> = others.iter().map(User::as_candidate).collect();

        let recommendations = self
            .engine
            .recommend(&requester.skill_profile(), &pool, count)
            .await?;

        let mut by_id: HashMap<UserId, User> =
            others.into_iter().map(|u| (u.id.clone(), u)).collect();
        let matched: Vec<RecommendedUser> = recommendations
            .into_iter()
            .filter_map(|rec| {
                by_id.remove(&rec.candidate_id).map(|user| RecommendedUser {
                    user,
                    reason: rec.reason,
                    tier: rec.tier,
                })
            })
            .collect();

        info!(
            user = %user_id,
            pool = pool.len(),
            returned = matched.len(),
            "Recommendations ready"
        );
        Ok(matched)
    }
}
