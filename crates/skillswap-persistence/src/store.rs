use async_trait::async_trait;
use skillswap_types::{
    Message, RatingSubmission, RequestId, Result, Review, Side, SwapRequest, SwapStatus, User,
    UserId,
};

/// Users directory
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; fails with `Validation` if the id is taken
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Persist owner-editable profile fields. Rating and review count are left untouched.
    async fn save_profile(&self, user: &User) -> Result<()>;

    /// All users, oldest registration first
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Filter for [`RequestStore::find_requests`]
#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
    /// Side the user must be on; `None` matches either
    pub side: Option<Side>,
    /// Accepted statuses; empty matches all
    pub statuses: Vec<SwapStatus>,
}

impl RequestQuery {
    pub fn incoming() -> Self {
        Self {
            side: Some(Side::To),
            statuses: Vec::new(),
        }
    }

    pub fn outgoing() -> Self {
        Self {
            side: Some(Side::From),
            statuses: Vec::new(),
        }
    }

    pub fn involving() -> Self {
        Self::default()
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = SwapStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }
}

/// Swap requests and the ratings attached to them
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_request(&self, request: &SwapRequest) -> Result<()>;

    async fn get_request(&self, id: &RequestId) -> Result<Option<SwapRequest>>;

    /// Requests involving `user`, newest first
    async fn find_requests(&self, user: &UserId, query: &RequestQuery) -> Result<Vec<SwapRequest>>;

    /// Move a request from `expected` to `next`.
    ///
    /// Fails with `StaleStatus` when the stored status is no longer `expected`;
    /// nothing is written in that case.
    async fn update_status(
        &self,
        id: &RequestId,
        expected: SwapStatus,
        next: SwapStatus,
    ) -> Result<SwapRequest>;

    /// Atomically set the rater's flag, record the review and fold the value into
    /// the rated user's average. Returns the rated user as stored afterwards.
    ///
    /// Either all three writes land or none do; a flag that is already set fails
    /// with `AlreadyRated`.
    async fn record_rating(&self, rating: &RatingSubmission) -> Result<User>;

    /// Reviews received by `user`, newest first
    async fn reviews_for(&self, user: &UserId) -> Result<Vec<Review>>;
}

/// Chat messages, owned by their swap request
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message; fails with `SessionNotOpen` unless the parent request is accepted
    async fn append_message(&self, message: &Message) -> Result<()>;

    /// Messages of a request in `created_at` order
    async fn messages_for(&self, request_id: &RequestId) -> Result<Vec<Message>>;
}
