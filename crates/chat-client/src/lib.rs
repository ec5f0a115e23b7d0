//! Client side of AeosGPT.
//!
//! [`ChatView`] is a synchronous state machine: user actions return
//! [`Command`]s, and the results of running them are fed back in as
//! [`Event`]s. Every command carries a [`Ticket`]; results whose ticket no
//! longer matches the current selection are dropped. [`ChatClient`] runs the
//! commands against a [`ChatApi`] one after another.

mod api;
mod client;
mod error;
mod store;
mod types;
mod view;

pub use api::{ChatApi, HttpChatApi, LoginSession};
pub use client::{perform, ChatClient};
pub use error::ClientError;
pub use store::{
    JsonFileStore, MemoryStore, SelectionStore, SELECTED_SESSION_KEY, SELECTED_TEAM_KEY,
};
pub use types::{ChatSessionSummary, ConversationRecord, TeamSummary};
pub use view::{
    ChatView, Command, Direction, Event, MessageModel, Phase, Ticket, Toast, ToastKind,
    AI_SENDER, GENERIC_ERROR, USER_SENDER,
};
