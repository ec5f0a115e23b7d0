pub mod auth;
pub mod conversation;
pub mod error;
pub mod invitation;
pub mod pet;
pub mod session;
pub mod team;

pub use error::*;
