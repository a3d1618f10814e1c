//! CLI session state machine.
//!
//! A [`CliSession`] owns one interactive shell and tracks which mode the
//! device is in. Commands are only trusted when the prompt that follows
//! them announces the state the caller expected.

mod cli;
mod config;
mod context;
mod response;

pub use cli::{CliSession, SessionStatus};
pub use config::SessionConfig;
pub use context::{CliContext, CliState, Mode};
pub use response::RunOutput;
