//! Account pool management
//!
//! Accounts live under a root organizational unit until claimed. Claiming
//! tags an account `claimed=true` and moves it into a destination OU; when no
//! unclaimed account remains, a new one is provisioned.
//!
//! # Modules
//!
//! - [`provider`] - Provider capability trait and account types
//! - [`organizations`] - AWS Organizations implementation of the provider
//! - [`finder`] - Locating an unclaimed account
//! - [`provisioner`] - Creating new accounts and waiting for them
//! - [`claim`] - Tagging and moving a claimed account
//! - [`assign`] - The end-to-end assignment workflow
//! - [`release`] - Returning an account to the pool

#![deny(missing_docs)]

pub mod assign;
pub mod claim;
pub mod finder;
pub mod organizations;
pub mod provider;
pub mod provisioner;
pub mod release;

pub use assign::{assign, AssignRequest, AssignSettings, Assignment};
pub use finder::{find_untagged_account, AccountLookup};
pub use organizations::OrganizationsProvider;
pub use provider::{
    Account, AccountProvider, AccountStatus, CreateAccountState, CreateAccountStatus,
};
pub use provisioner::{create_account, AccountNaming};
