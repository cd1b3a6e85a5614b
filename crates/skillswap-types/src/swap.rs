//! Swap requests and their lifecycle graph
//!
//! ```text
//! pending ──accept──▶ accepted ──complete──▶ completed
//!    └────reject────▶ rejected
//! ```
//!
//! Accept/reject belong to the receiving user, completion to either
//! participant. Rating flags are not status changes and are only written
//! once the swap is completed.

use crate::{Id, Result, SkillSwapError, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Swap request ID type
pub type RequestId = Id<SwapRequest>;

/// Lifecycle status of a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl SwapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Whether `self -> next` is an edge of the lifecycle graph
    pub fn can_transition_to(self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Accepted, Self::Completed)
        )
    }

    /// No status change leaves a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Participants may post chat messages
    pub fn is_session_open(self) -> bool {
        self == Self::Accepted
    }

    /// Chat history is visible (open session, or kept after completion)
    pub fn messages_readable(self) -> bool {
        matches!(self, Self::Accepted | Self::Completed)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = SkillSwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            other => Err(SkillSwapError::Validation(format!(
                "unknown swap status '{other}'"
            ))),
        }
    }
}

/// Which end of a swap request a participant sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    From,
    To,
}

impl Side {
    /// Column holding this side's rating flag
    pub fn rated_column(self) -> &'static str {
        match self {
            Self::From => "from_user_rated",
            Self::To => "to_user_rated",
        }
    }
}

/// How a request looks from one participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDirection {
    /// Viewer received the request
    Incoming,
    /// Viewer sent the request
    Outgoing,
}

/// Display name and avatar captured when the request was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSnapshot {
    pub user_id: UserId,
    pub name: String,
    pub avatar_url: String,
}

/// A proposed or ongoing exchange between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: RequestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Skill the sender teaches, taken from the sender's offered skills
    pub skill_offered: String,
    /// Skill the sender wants, taken from the receiver's offered skills
    pub skill_wanted: String,
    pub message: Option<String>,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub from_user_name: String,
    pub from_user_avatar: String,
    pub to_user_name: String,
    pub to_user_avatar: String,
    pub from_user_rated: bool,
    pub to_user_rated: bool,
}

impl SwapRequest {
    /// Build a pending request, validating both skill choices against the profiles
    pub fn propose(
        from: &User,
        to: &User,
        skill_offered: &str,
        skill_wanted: &str,
        message: Option<String>,
    ) -> Result<Self> {
        if from.id == to.id {
            return Err(SkillSwapError::Validation(
                "cannot propose a swap to yourself".into(),
            ));
        }

        let skill_offered = from.offered_skill(skill_offered).ok_or_else(|| {
            SkillSwapError::InvalidSkillSelection(format!(
                "'{}' is not offered by {}",
                skill_offered.trim(),
                from.id
            ))
        })?;
        let skill_wanted = to.offered_skill(skill_wanted).ok_or_else(|| {
            SkillSwapError::InvalidSkillSelection(format!(
                "'{}' is not offered by {}",
                skill_wanted.trim(),
                to.id
            ))
        })?;

        Ok(Self {
            id: RequestId::new(),
            from_user_id: from.id.clone(),
            to_user_id: to.id.clone(),
            skill_offered: skill_offered.to_string(),
            skill_wanted: skill_wanted.to_string(),
            message: message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            status: SwapStatus::Pending,
            created_at: Utc::now(),
            from_user_name: from.name.clone(),
            from_user_avatar: from.avatar_url.clone(),
            to_user_name: to.name.clone(),
            to_user_avatar: to.avatar_url.clone(),
            from_user_rated: false,
            to_user_rated: false,
        })
    }

    pub fn side_of(&self, user: &UserId) -> Option<Side> {
        if *user == self.from_user_id {
            Some(Side::From)
        } else if *user == self.to_user_id {
            Some(Side::To)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.side_of(user).is_some()
    }

    pub fn counterpart(&self, user: &UserId) -> Option<&UserId> {
        match self.side_of(user)? {
            Side::From => Some(&self.to_user_id),
            Side::To => Some(&self.from_user_id),
        }
    }

    pub fn direction_for(&self, viewer: &UserId) -> Option<RequestDirection> {
        match self.side_of(viewer)? {
            Side::From => Some(RequestDirection::Outgoing),
            Side::To => Some(RequestDirection::Incoming),
        }
    }

    /// Snapshot of the other participant, as seen by `viewer`
    pub fn counterpart_snapshot(&self, viewer: &UserId) -> Option<ParticipantSnapshot> {
        match self.side_of(viewer)? {
            Side::From => Some(ParticipantSnapshot {
                user_id: self.to_user_id.clone(),
                name: self.to_user_name.clone(),
                avatar_url: self.to_user_avatar.clone(),
            }),
            Side::To => Some(ParticipantSnapshot {
                user_id: self.from_user_id.clone(),
                name: self.from_user_name.clone(),
                avatar_url: self.from_user_avatar.clone(),
            }),
        }
    }

    pub fn has_rated(&self, side: Side) -> bool {
        match side {
            Side::From => self.from_user_rated,
            Side::To => self.to_user_rated,
        }
    }

    /// Check that `actor` may move this request to `target` from its current status
    pub fn authorize_transition(&self, actor: &UserId, target: SwapStatus) -> Result<()> {
        let side = self
            .side_of(actor)
            .ok_or_else(|| SkillSwapError::unauthorized(actor, "change a swap it is not part of"))?;

        if !self.status.can_transition_to(target) {
            return Err(SkillSwapError::IllegalTransition {
                from: self.status,
                to: target,
            });
        }

        match target {
            SwapStatus::Accepted | SwapStatus::Rejected if side != Side::To => Err(
                SkillSwapError::unauthorized(actor, format!("mark its own request {target}")),
            ),
            _ => Ok(()),
        }
    }

    /// Check that `actor` may rate `rated` on this request, returning the actor's side
    pub fn authorize_rating(&self, actor: &UserId, rated: &UserId) -> Result<Side> {
        let side = self
            .side_of(actor)
            .ok_or_else(|| SkillSwapError::unauthorized(actor, "rate a swap it is not part of"))?;

        if self.counterpart(actor) != Some(rated) {
            return Err(SkillSwapError::unauthorized(
                actor,
                format!("rate '{rated}' on this swap"),
            ));
        }
        if self.status != SwapStatus::Completed {
            return Err(SkillSwapError::NotCompleted(self.id.to_string()));
        }
        if self.has_rated(side) {
            return Err(SkillSwapError::AlreadyRated {
                request: self.id.to_string(),
                actor: actor.to_string(),
            });
        }
        Ok(side)
    }

    /// Check that `actor` may post into this request's chat
    pub fn authorize_message(&self, actor: &UserId) -> Result<()> {
        if !self.is_participant(actor) {
            return Err(SkillSwapError::unauthorized(
                actor,
                "post in a session it is not part of",
            ));
        }
        if !self.status.is_session_open() {
            return Err(SkillSwapError::SessionNotOpen {
                request: self.id.to_string(),
                status: self.status,
            });
        }
        Ok(())
    }
}

/// One participant rating the other after completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    pub request_id: RequestId,
    pub rater_id: UserId,
    pub rated_user_id: UserId,
    /// Side of the rater; selects which flag gets set
    pub side: Side,
    pub value: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored rating as shown on the rated user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub request_id: RequestId,
    pub rater_id: UserId,
    pub rated_user_id: UserId,
    pub value: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
