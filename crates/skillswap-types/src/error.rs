//! Error taxonomy shared by every SkillSwap operation

use crate::SwapStatus;
use thiserror::Error;

/// Failure categories callers use to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unloaded input the operation cannot run without
    Precondition,
    /// Actor is not allowed to perform the mutation
    Authorization,
    /// Lifecycle state does not allow the operation
    State,
    /// Recommendation oracle failed, timed out or answered nonsense
    ExternalDependency,
    /// Input failed validation
    Validation,
    /// Referenced record does not exist
    NotFound,
    /// Underlying store failed
    Storage,
}

/// SkillSwap errors
#[derive(Debug, Error)]
pub enum SkillSwapError {
    /// Requester profile is absent or cannot drive a recommendation
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Actor is not a legal participant for this mutation
    #[error("User '{actor}' is not allowed to {action}")]
    Unauthorized { actor: String, action: String },

    /// Requested status change is not an edge of the lifecycle graph
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: SwapStatus, to: SwapStatus },

    /// The record changed underneath a read-modify-write
    #[error("Swap request status changed concurrently: expected {expected}, found {actual}")]
    StaleStatus {
        expected: SwapStatus,
        actual: SwapStatus,
    },

    /// Rating attempted before the swap was completed
    #[error("Swap request '{0}' is not completed")]
    NotCompleted(String),

    /// Participant already rated this swap
    #[error("User '{actor}' already rated swap request '{request}'")]
    AlreadyRated { request: String, actor: String },

    /// Messaging attempted outside an accepted session
    #[error("No open session for swap request '{request}' (status {status})")]
    SessionNotOpen { request: String, status: SwapStatus },

    /// Chosen skill is not part of the relevant profile
    #[error("Invalid skill selection: {0}")]
    InvalidSkillSelection(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Oracle could not be reached or reported an error
    #[error("Recommendation oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Oracle did not answer in time
    #[error("Recommendation oracle timed out after {0}s")]
    OracleTimeout(u64),

    /// Oracle answered with the wrong shape, cardinality or unknown ids
    #[error("Malformed oracle result: {0}")]
    MalformedOracleResult(String),

    /// Store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SkillSwapError {
    pub fn unauthorized(actor: impl ToString, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            actor: actor.to_string(),
            action: action.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wrap a store driver error
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionFailed(_) => ErrorKind::Precondition,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::IllegalTransition { .. }
            | Self::StaleStatus { .. }
            | Self::NotCompleted(_)
            | Self::AlreadyRated { .. }
            | Self::SessionNotOpen { .. } => ErrorKind::State,
            Self::InvalidSkillSelection(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::OracleUnavailable(_)
            | Self::OracleTimeout(_)
            | Self::MalformedOracleResult(_) => ErrorKind::ExternalDependency,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether retrying the same call can succeed without the caller changing anything
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ExternalDependency | ErrorKind::Storage)
            || matches!(self, Self::StaleStatus { .. })
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, SkillSwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SkillSwapError::OracleTimeout(30).is_retryable());
        assert!(SkillSwapError::MalformedOracleResult("x".into()).is_retryable());
        assert!(SkillSwapError::StaleStatus {
            expected: SwapStatus::Pending,
            actual: SwapStatus::Accepted,
        }
        .is_retryable());

        assert!(!SkillSwapError::unauthorized("u1", "accept").is_retryable());
        assert!(!SkillSwapError::InvalidSkillSelection("Rust".into()).is_retryable());
        assert!(!SkillSwapError::IllegalTransition {
            from: SwapStatus::Completed,
            to: SwapStatus::Accepted,
        }
        .is_retryable());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            SkillSwapError::AlreadyRated {
                request: "r".into(),
                actor: "u".into()
            }
            .kind(),
            ErrorKind::State
        );
        assert_eq!(
            SkillSwapError::PreconditionFailed("no profile".into()).kind(),
            ErrorKind::Precondition
        );
        assert_eq!(
            SkillSwapError::not_found("User", "u9").to_string(),
            "User 'u9' not found"
        );
    }
}
