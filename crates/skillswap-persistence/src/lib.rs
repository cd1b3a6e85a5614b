//! SkillSwap Persistence - the Users, Requests and Messages stores
//!
//! Core logic only talks to the [`UserStore`], [`RequestStore`] and
//! [`MessageStore`] traits. [`PersistenceService`] implements all three on
//! SQLite; the multi-record writes (status compare-and-set, rating) run in a
//! single transaction there.

mod sqlite;
mod store;

pub use sqlite::PersistenceService;
pub use store::{MessageStore, RequestQuery, RequestStore, UserStore};
