//! Command wrappers that turn effectful operations into [`Outcome`] values.

pub mod async_command;
pub mod command;
pub mod database_command;
pub mod errors;
pub mod fault;
pub mod outcome;
pub mod stream_command;

pub use async_command::AsyncCommand;
pub use command::Command;
pub use database_command::{DatabaseCommand, FetchMode, QueryOutput};
pub use errors::CommandError;
pub use outcome::{Outcome, UnhandledRunning};
pub use stream_command::StreamCommand;
