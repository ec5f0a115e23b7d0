//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{DatabaseError, TeamError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type TeamResult<T> = Result<T, TeamError>;
