//! Common types for poolctl: errors, convergence polling and the operator console

#![deny(missing_docs)]

pub mod console;
pub mod error;
pub mod poll;

pub use console::{confirm, is_affirmative, Console, StdConsole};
pub use error::{ClaimStep, Error};
pub use poll::{await_completion, PollConfig, PollResult};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Tag key marking an account as owned
pub const CLAIMED_TAG_KEY: &str = "claimed";

/// Tag value that, under [`CLAIMED_TAG_KEY`], marks an account as owned
pub const CLAIMED_TAG_VALUE: &str = "true";

/// Tag key recording who claimed an account
pub const OWNER_TAG_KEY: &str = "owner";
