//! SkillSwap Types - Core types for the SkillSwap exchange
//!
//! Users, swap requests, chat messages and the recommendation I/O shapes
//! shared by every other crate in the workspace, plus the error taxonomy.

mod availability;
mod error;
mod id;
mod message;
mod provider;
mod recommendation;
mod swap;
mod user;

pub use availability::{
    availability_keywords, compare_availability, describe_availability, AvailabilityOverlap,
    AvailabilitySelection, TimeSlot,
};
pub use error::{ErrorKind, Result, SkillSwapError};
pub use id::Id;
pub use message::{Message, MessageId};
pub use provider::Provider;
pub use recommendation::{CandidateProfile, MatchTier, Recommendation, UserSkillProfile};
pub use swap::{
    ParticipantSnapshot, RatingSubmission, RequestDirection, RequestId, Review, Side, SwapRequest,
    SwapStatus,
};
pub use user::{normalize_skills, running_average, ProfileUpdate, User, UserId};
