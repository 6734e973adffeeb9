//! Account provider capability surface
//!
//! The account pool only talks to the cloud provider through this trait so
//! workflows can be tested against mocks while production code uses the AWS
//! Organizations API (see [`crate::organizations`]).

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use poolctl_common::Result;

/// Lifecycle state of an account as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountStatus {
    /// Account is usable
    Active,
    /// Account is suspended and must not be handed out
    Suspended,
    /// Account is being closed
    PendingClosure,
    /// Any other provider-defined state
    Other(String),
}

impl AccountStatus {
    /// Map a provider status string to a status
    pub fn parse(status: &str) -> Self {
        match status {
            "ACTIVE" => AccountStatus::Active,
            "SUSPENDED" => AccountStatus::Suspended,
            "PENDING_CLOSURE" => AccountStatus::PendingClosure,
            other => AccountStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "ACTIVE"),
            AccountStatus::Suspended => write!(f, "SUSPENDED"),
            AccountStatus::PendingClosure => write!(f, "PENDING_CLOSURE"),
            AccountStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// An account in the organization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Provider-assigned identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Contact email used at creation
    pub email: String,
    /// Status at listing time
    pub status: AccountStatus,
}

impl Account {
    /// Account with only an id, as returned by sparse listings
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            status: AccountStatus::Active,
        }
    }
}

/// State of an asynchronous account creation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateAccountState {
    /// Provider is still creating the account
    InProgress,
    /// Account exists
    Succeeded,
    /// Creation failed terminally
    Failed,
    /// Any other provider-defined state, treated as not yet terminal
    Other(String),
}

impl CreateAccountState {
    /// Map a provider state string to a state
    pub fn parse(state: &str) -> Self {
        match state {
            "IN_PROGRESS" => CreateAccountState::InProgress,
            "SUCCEEDED" => CreateAccountState::Succeeded,
            "FAILED" => CreateAccountState::Failed,
            other => CreateAccountState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CreateAccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateAccountState::InProgress => write!(f, "IN_PROGRESS"),
            CreateAccountState::Succeeded => write!(f, "SUCCEEDED"),
            CreateAccountState::Failed => write!(f, "FAILED"),
            CreateAccountState::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Status of an account creation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateAccountStatus {
    /// Creation request identifier
    pub request_id: String,
    /// Current state
    pub state: CreateAccountState,
    /// Identifier of the new account, once the provider assigned one
    pub account_id: Option<String>,
    /// Reason reported for a failed request
    pub failure_reason: Option<String>,
}

/// Trait abstracting the account operations of the cloud provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// List the accounts directly under an organizational unit, in provider order
    async fn list_accounts(&self, parent_ou: &str) -> Result<Vec<Account>>;

    /// Get all tags on an account
    async fn account_tags(&self, account_id: &str) -> Result<BTreeMap<String, String>>;

    /// Get the current status of an account
    async fn account_status(&self, account_id: &str) -> Result<AccountStatus>;

    /// Start creating an account, returning the creation request id
    async fn create_account(&self, name: &str, email: &str) -> Result<String>;

    /// Get the status of an account creation request
    async fn create_account_status(&self, request_id: &str) -> Result<CreateAccountStatus>;

    /// Add or overwrite tags on an account
    async fn tag_account(&self, account_id: &str, tags: &BTreeMap<String, String>) -> Result<()>;

    /// Remove tags from an account
    async fn untag_account(&self, account_id: &str, keys: &[String]) -> Result<()>;

    /// Move an account between organizational units
    async fn move_account(&self, account_id: &str, from_ou: &str, to_ou: &str) -> Result<()>;
}
