//! SkillSwap Lifecycle - the operations callers drive
//!
//! - [`UserDirectory`]: registration, owner-only profile edits, search
//! - [`SwapService`]: propose, accept/reject/complete, rate, chat, listings
//! - [`Recommender`]: recommendations for a stored user
//!
//! Every service works against the store traits from `skillswap-persistence`,
//! so the same code runs on SQLite or on any other store.

mod directory;
mod recommend;
mod swaps;
mod view;

pub use directory::{Page, UserDirectory};
pub use recommend::{RecommendedUser, Recommender};
pub use swaps::{Sessions, SwapService};
pub use view::RequestView;
