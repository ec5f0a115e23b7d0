pub mod add_row;
pub mod ai;
pub mod auth;
pub mod conversations;
pub mod health;
pub mod invitations;
pub mod models;
pub mod sessions;
pub mod teams;
