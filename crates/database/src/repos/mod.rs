//! Database repository implementations

pub mod chat_session_repository;
pub mod conversation_repository;
pub mod membership_repository;
pub mod pet_repository;
pub mod team_repository;
pub mod user_repository;

pub use chat_session_repository::*;
pub use conversation_repository::*;
pub use membership_repository::*;
pub use pet_repository::*;
pub use team_repository::*;
pub use user_repository::*;
