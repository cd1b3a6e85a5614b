//! Swap request lifecycle
//!
//! Every mutation loads the request, checks the actor against the current
//! state and then writes with the state it checked as a precondition. A
//! concurrent change between the two surfaces as `StaleStatus`.

use crate::view::RequestView;
use chrono::Utc;
use serde::Serialize;
use skillswap_persistence::{MessageStore, RequestQuery, RequestStore, UserStore};
use skillswap_types::{
    Message, RatingSubmission, RequestId, Result, Review, SkillSwapError, SwapRequest, SwapStatus,
    User, UserId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A user's sessions split by status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sessions {
    /// Accepted, chat open
    pub active: Vec<RequestView>,
    /// Completed, chat read-only, rating possible
    pub completed: Vec<RequestView>,
}

pub struct SwapService {
    users: Arc<dyn UserStore>,
    requests: Arc<dyn RequestStore>,
    messages: Arc<dyn MessageStore>,
}

impl SwapService {
    pub fn new(
        users: Arc<dyn UserStore>,
        requests: Arc<dyn RequestStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            users,
            requests,
            messages,
        }
    }

    /// Send a swap request from `actor` to `to`
    ///
    /// `skill_offered` must be one of the actor's offered skills and
    /// `skill_wanted` one of the receiver's offered skills.
    pub async fn propose_swap(
        &self,
        actor: &UserId,
        to: &UserId,
        skill_offered: &str,
        skill_wanted: &str,
        message: Option<String>,
    ) -> Result<SwapRequest> {
        let from = self.load_user(actor).await?;
        let to = self.load_user(to).await?;

        let request = SwapRequest::propose(&from, &to, skill_offered, skill_wanted, message)?;
        self.requests.insert_request(&request).await?;

        info!(
            request = %request.id,
            from = %request.from_user_id,
            to = %request.to_user_id,
            "Swap request proposed"
        );
        Ok(request)
    }

    /// Move a request along the lifecycle graph on behalf of `actor`
    pub async fn transition_swap(
        &self,
        request_id: &RequestId,
        actor: &UserId,
        target: SwapStatus,
    ) -> Result<SwapRequest> {
        let request = self.load_request(request_id).await?;
        if let Err(err) = request.authorize_transition(actor, target) {
            warn!(request = %request_id, actor = %actor, %target, "Transition refused: {}", err);
            return Err(err);
        }

        let updated = self
            .requests
            .update_status(request_id, request.status, target)
            .await?;

        info!(
            request = %request_id,
            actor = %actor,
            from = %request.status,
            to = %updated.status,
            "Swap request transitioned"
        );
        Ok(updated)
    }

    pub async fn accept(&self, request_id: &RequestId, actor: &UserId) -> Result<SwapRequest> {
        self.transition_swap(request_id, actor, SwapStatus::Accepted)
            .await
    }

    pub async fn reject(&self, request_id: &RequestId, actor: &UserId) -> Result<SwapRequest> {
        self.transition_swap(request_id, actor, SwapStatus::Rejected)
            .await
    }

    pub async fn complete(&self, request_id: &RequestId, actor: &UserId) -> Result<SwapRequest> {
        self.transition_swap(request_id, actor, SwapStatus::Completed)
            .await
    }

    /// Rate the counterpart of a completed swap, once per participant
    pub async fn submit_rating(
        &self,
        request_id: &RequestId,
        actor: &UserId,
        rated: &UserId,
        value: u8,
        comment: Option<String>,
    ) -> Result<()> {
        if !(1..=5).contains(&value) {
            return Err(SkillSwapError::Validation(format!(
                "rating must be between 1 and 5, got {value}"
            )));
        }

        let request = self.load_request(request_id).await?;
        let side = request.authorize_rating(actor, rated)?;

        let submission = RatingSubmission {
            request_id: request_id.clone(),
            rater_id: actor.clone(),
            rated_user_id: rated.clone(),
            side,
            value,
            comment: comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        };
        let rated_user = self.requests.record_rating(&submission).await?;

        info!(
            request = %request_id,
            rater = %actor,
            rated = %rated,
            value,
            rating = rated_user.rating,
            reviews = rated_user.reviews,
            "Rating recorded"
        );
        Ok(())
    }

    /// Reviews `user` has received, newest first
    pub async fn reviews_for(&self, user: &UserId) -> Result<Vec<Review>> {
        self.requests.reviews_for(user).await
    }

    /// Post into the chat of an accepted swap
    pub async fn post_message(
        &self,
        request_id: &RequestId,
        actor: &UserId,
        text: &str,
    ) -> Result<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SkillSwapError::Validation("message cannot be empty".into()));
        }

        let request = self.load_request(request_id).await?;
        request.authorize_message(actor)?;
        let author = self.load_user(actor).await?;

        let message = Message::new(request_id.clone(), &author, text);
        self.messages.append_message(&message).await?;

        debug!(request = %request_id, author = %actor, "Message posted");
        Ok(message)
    }

    /// Chat history of a swap, oldest first
    pub async fn messages(&self, request_id: &RequestId, viewer: &UserId) -> Result<Vec<Message>> {
        let request = self.load_request(request_id).await?;
        if !request.is_participant(viewer) {
            return Err(SkillSwapError::unauthorized(
                viewer,
                "read a session it is not part of",
            ));
        }
        if !request.status.messages_readable() {
            return Err(SkillSwapError::SessionNotOpen {
                request: request_id.to_string(),
                status: request.status,
            });
        }
        self.messages.messages_for(request_id).await
    }

    /// Requests `user` received, newest first
    pub async fn incoming_requests(&self, user: &UserId) -> Result<Vec<RequestView>> {
        self.views(user, RequestQuery::incoming()).await
    }

    /// Requests `user` sent, newest first
    pub async fn outgoing_requests(&self, user: &UserId) -> Result<Vec<RequestView>> {
        self.views(user, RequestQuery::outgoing()).await
    }

    /// Incoming requests still waiting for a decision
    pub async fn pending_incoming(&self, user: &UserId) -> Result<Vec<RequestView>> {
        self.views(
            user,
            RequestQuery::incoming().with_statuses([SwapStatus::Pending]),
        )
        .await
    }

    pub async fn sessions(&self, user: &UserId) -> Result<Sessions> {
        let views = self
            .views(
                user,
                RequestQuery::involving()
                    .with_statuses([SwapStatus::Accepted, SwapStatus::Completed]),
            )
            .await?;

        let (active, completed): (Vec<_>, Vec<_>) = views
            .into_iter()
            .partition(|v| v.request.status == SwapStatus::Accepted);
        Ok(Sessions { active, completed })
    }

    async fn views(&self, user: &UserId, query: RequestQuery) -> Result<Vec<RequestView>> {
        Ok(self
            .requests
            .find_requests(user, &query)
            .await?
            .into_iter()
            .filter_map(|request| RequestView::for_viewer(request, user))
            .collect())
    }

    async fn load_user(&self, id: &UserId) -> Result<User> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| SkillSwapError::not_found("User", id))
    }

    async fn load_request(&self, id: &RequestId) -> Result<SwapRequest> {
        self.requests
            .get_request(id)
            .await?
            .ok_or_else(|| SkillSwapError::not_found("Swap request", id))
    }
}
