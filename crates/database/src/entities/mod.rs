//! Row types returned by the repository layer.

pub mod chat_session;
pub mod conversation;
pub mod membership;
pub mod pet;
pub mod team;
pub mod user;

pub use chat_session::{ChatSession, CreateChatSessionRequest};
pub use conversation::{Conversation, CreateConversationRequest};
pub use membership::{JoinOutcome, Membership};
pub use pet::Pet;
pub use team::{CreateTeamRequest, Team};
pub use user::User;
