//! Error types shared by the account pool and access teardown workflows
//!
//! Errors carry the context an operator needs to act on them: the provider
//! operation that failed, the account left half-claimed, or the condition a
//! poll was waiting for.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Step of a claim that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimStep {
    /// Applying the ownership tags
    Tag,
    /// Moving the account into the destination OU
    Move,
}

impl fmt::Display for ClaimStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimStep::Tag => write!(f, "tag"),
            ClaimStep::Move => write!(f, "move"),
        }
    }
}

/// Main error type for poolctl operations
#[derive(Debug, Error)]
pub enum Error {
    /// Every candidate under the root OU is claimed or suspended, or there
    /// are no candidates at all. Callers fall back to provisioning.
    #[error("no untagged accounts available")]
    NoUntaggedAccounts,

    /// A specific account was requested but it already carries the claim tag
    #[error("account {account_id} is already claimed")]
    AccountAlreadyClaimed {
        /// Requested account
        account_id: String,
    },

    /// A cloud provider or management API call failed
    #[error("{operation} failed: {message}")]
    Provider {
        /// Provider operation that failed (e.g. "ListAccountsForParent")
        operation: String,
        /// Provider's error message, unmodified
        message: String,
    },

    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Reading operator input or writing output failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider reported a terminal failure for an account creation request
    #[error("account creation request {request_id} failed: {reason}")]
    AccountCreationFailed {
        /// Creation request identifier
        request_id: String,
        /// Failure reason reported by the provider
        reason: String,
    },

    /// A convergence poll did not observe its terminal condition in time
    #[error("timed out after {timeout:?} waiting for {awaiting}")]
    Timeout {
        /// What was being waited for
        awaiting: String,
        /// Overall deadline that expired
        timeout: Duration,
    },

    /// A convergence poll check itself failed
    #[error("error while waiting for {awaiting}: {source}")]
    WaitFailed {
        /// What was being waited for
        awaiting: String,
        /// The check failure
        source: Box<Error>,
    },

    /// One half of a claim succeeded and the other failed. The account needs
    /// manual reconciliation.
    #[error("claim of account {account_id} failed at {step} step, manual reconciliation required: {source}")]
    PartialClaim {
        /// Account left in an inconsistent state
        account_id: String,
        /// The step that failed
        step: ClaimStep,
        /// The provider failure
        source: Box<Error>,
    },

    /// No cluster matched the identifier
    #[error("cluster '{identifier}' not found")]
    ClusterNotFound {
        /// Identifier that was looked up
        identifier: String,
    },

    /// The cluster's namespace could not be determined
    #[error("expected one namespace for cluster {cluster_id}, found {found}")]
    NamespaceLookup {
        /// Cluster id used in the label lookup
        cluster_id: String,
        /// Number of namespaces that matched
        found: usize,
    },

    /// The current identity lacks a permission the operation needs
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Cluster identifier has an invalid shape
    #[error("invalid cluster identifier '{0}': only alphanumerics, '-' and '_' are allowed")]
    InvalidClusterKey(String),

    /// Invalid input or configuration
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a provider error for the named operation
    pub fn provider(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a poll check failure with what was being awaited
    pub fn wait_failed(awaiting: impl Into<String>, source: Error) -> Self {
        Self::WaitFailed {
            awaiting: awaiting.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a claim step failure with the affected account
    pub fn partial_claim(account_id: impl Into<String>, step: ClaimStep, source: Error) -> Self {
        Self::PartialClaim {
            account_id: account_id.into(),
            step,
            source: Box::new(source),
        }
    }

    /// Account id an operator must reconcile by hand, if any.
    ///
    /// A failed tag step changed nothing, so only a failed move leaves an
    /// account to reconcile.
    pub fn unreconciled_account(&self) -> Option<&str> {
        match self {
            Error::PartialClaim {
                account_id,
                step: ClaimStep::Move,
                ..
            } => Some(account_id),
            _ => None,
        }
    }
}
