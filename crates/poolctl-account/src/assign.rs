//! Assigning an account to an owner.
//!
//! 1. Use the explicitly requested account, or find an unclaimed one in the pool.
//!    A requested account must sit under the root OU, be unclaimed and, with
//!    the suspend check on, not be suspended. Nothing is written otherwise.
//! 2. If the pool is exhausted, provision a new account
//! 3. Tag it as claimed and move it into the destination OU

use tracing::info;

use crate::claim::commit_claim;
use crate::finder::{find_untagged_account, is_owned, is_suspended, AccountLookup};
use crate::provider::AccountProvider;
use crate::provisioner::{create_account, default_creation_poll, AccountNaming};
use poolctl_common::{Error, PollConfig, Result};

/// Inputs for a single assignment.
#[derive(Clone, Debug)]
pub struct AssignRequest {
    /// Who the account is assigned to, recorded in the `owner` tag
    pub owner: String,
    /// OU holding the pool of unclaimed accounts
    pub root_ou: String,
    /// OU claimed accounts are moved into
    pub destination_ou: String,
    /// Claim this account instead of searching the pool
    pub account_id: Option<String>,
    /// Reject suspended accounts while searching
    pub suspend_check: bool,
    /// Seed for the name of a newly provisioned account
    pub seed: u64,
}

/// Settings shared by all assignments.
#[derive(Clone, Debug)]
pub struct AssignSettings {
    /// Naming for provisioned accounts
    pub naming: AccountNaming,
    /// Poll used while waiting for account creation
    pub creation_poll: PollConfig,
}

impl Default for AssignSettings {
    fn default() -> Self {
        Self {
            naming: AccountNaming::default(),
            creation_poll: default_creation_poll(),
        }
    }
}

/// Result of a successful assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Account now owned by the requester
    pub account_id: String,
    /// Whether the account was created for this assignment
    pub provisioned: bool,
}

/// Check that a requested account can be claimed from `root_ou`
async fn verify_requested_account(
    provider: &dyn AccountProvider,
    account_id: &str,
    root_ou: &str,
    suspend_check: bool,
) -> Result<()> {
    let pooled = provider.list_accounts(root_ou).await?;
    if !pooled.iter().any(|a| a.id == account_id) {
        return Err(Error::validation(format!(
            "account {account_id} is not in root OU {root_ou}"
        )));
    }

    if is_owned(provider, account_id).await? {
        return Err(Error::AccountAlreadyClaimed {
            account_id: account_id.to_string(),
        });
    }

    if suspend_check && is_suspended(provider, account_id).await? {
        return Err(Error::validation(format!(
            "account {account_id} is suspended"
        )));
    }

    Ok(())
}

/// Assign an account to `request.owner`.
pub async fn assign(
    provider: &dyn AccountProvider,
    settings: &AssignSettings,
    request: &AssignRequest,
) -> Result<Assignment> {
    let (account_id, provisioned) = match &request.account_id {
        Some(id) => {
            verify_requested_account(provider, id, &request.root_ou, request.suspend_check)
                .await?;
            info!(account_id = %id, "Using requested account");
            (id.clone(), false)
        }
        None => {
            match find_untagged_account(provider, &request.root_ou, request.suspend_check).await? {
                AccountLookup::Found(id) => (id, false),
                AccountLookup::NotAvailable => {
                    info!(root_ou = %request.root_ou, "Pool exhausted, provisioning a new account");
                    let status = create_account(
                        provider,
                        &settings.naming,
                        &settings.creation_poll,
                        request.seed,
                    )
                    .await?;
                    let id = status.account_id.ok_or_else(|| {
                        Error::provider(
                            "DescribeCreateAccountStatus",
                            format!(
                                "request {} succeeded without an account id",
                                status.request_id
                            ),
                        )
                    })?;
                    (id, true)
                }
            }
        }
    };

    commit_claim(
        provider,
        &account_id,
        Some(&request.owner),
        &request.destination_ou,
        &request.root_ou,
    )
    .await?;

    info!(
        account_id = %account_id,
        owner = %request.owner,
        provisioned,
        "Account assigned"
    );
    Ok(Assignment {
        account_id,
        provisioned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        Account, AccountStatus, CreateAccountState, CreateAccountStatus, MockAccountProvider,
    };
    use mockall::predicate::eq;
    use poolctl_common::ClaimStep;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn request() -> AssignRequest {
        AssignRequest {
            owner: "randuser".to_string(),
            root_ou: "abc".to_string(),
            destination_ou: "abc-vnjfdshs".to_string(),
            account_id: None,
            suspend_check: false,
            seed: 1,
        }
    }

    fn settings() -> AssignSettings {
        AssignSettings {
            naming: AccountNaming::default(),
            creation_poll: PollConfig::fixed(Duration::from_millis(1), Duration::from_secs(5)),
        }
    }

    fn expect_claim(provider: &mut MockAccountProvider, account_id: &'static str) {
        provider
            .expect_tag_account()
            .withf(move |id, tags| {
                id == account_id
                    && tags.get("claimed").map(String::as_str) == Some("true")
                    && tags.get("owner").map(String::as_str) == Some("randuser")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_move_account()
            .with(eq(account_id), eq("abc"), eq("abc-vnjfdshs"))
            .times(1)
            .returning(|_, _, _| Ok(()));
    }

    #[tokio::test]
    async fn claims_pooled_account() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Ok(vec![Account::with_id("111111111111")]));
        provider
            .expect_account_tags()
            .returning(|_| Ok(BTreeMap::new()));
        provider.expect_create_account().never();
        expect_claim(&mut provider, "111111111111");

        let assignment = assign(&provider, &settings(), &request()).await.unwrap();
        assert_eq!(
            assignment,
            Assignment {
                account_id: "111111111111".to_string(),
                provisioned: false,
            }
        );
    }

    #[tokio::test]
    async fn provisions_when_pool_exhausted() {
        let mut provider = MockAccountProvider::new();
        provider.expect_list_accounts().returning(|_| Ok(vec![]));
        provider
            .expect_create_account()
            .times(1)
            .returning(|_, _| Ok("car-1".to_string()));
        provider.expect_create_account_status().returning(|_| {
            Ok(CreateAccountStatus {
                request_id: "car-1".to_string(),
                state: CreateAccountState::Succeeded,
                account_id: Some("999999999999".to_string()),
                failure_reason: None,
            })
        });
        expect_claim(&mut provider, "999999999999");

        let assignment = assign(&provider, &settings(), &request()).await.unwrap();
        assert_eq!(assignment.account_id, "999999999999");
        assert!(assignment.provisioned);
    }

    fn requested(account_id: &str) -> AssignRequest {
        AssignRequest {
            account_id: Some(account_id.to_string()),
            ..request()
        }
    }

    #[tokio::test]
    async fn explicit_account_skips_search() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .with(eq("abc"))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Account::with_id("111111111111"),
                    Account::with_id("555555555555"),
                ])
            });
        provider
            .expect_account_tags()
            .with(eq("555555555555"))
            .times(1)
            .returning(|_| Ok(BTreeMap::new()));
        provider.expect_create_account().never();
        expect_claim(&mut provider, "555555555555");

        let assignment = assign(&provider, &settings(), &requested("555555555555"))
            .await
            .unwrap();
        assert_eq!(assignment.account_id, "555555555555");
        assert!(!assignment.provisioned);
    }

    #[tokio::test]
    async fn explicit_account_owned_by_someone_else_is_not_retagged() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Ok(vec![Account::with_id("555555555555")]));
        provider.expect_account_tags().returning(|_| {
            Ok(BTreeMap::from([
                ("claimed".to_string(), "true".to_string()),
                ("owner".to_string(), "alice".to_string()),
            ]))
        });
        provider.expect_tag_account().never();
        provider.expect_move_account().never();

        let err = assign(&provider, &settings(), &requested("555555555555"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AccountAlreadyClaimed { ref account_id } if account_id == "555555555555"
        ));
    }

    #[tokio::test]
    async fn explicit_account_outside_root_ou_is_rejected() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Ok(vec![Account::with_id("111111111111")]));
        provider.expect_account_tags().never();
        provider.expect_tag_account().never();
        provider.expect_move_account().never();

        let err = assign(&provider, &settings(), &requested("555555555555"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("not in root OU abc")));
    }

    #[tokio::test]
    async fn explicit_suspended_account_is_rejected_with_suspend_check() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Ok(vec![Account::with_id("555555555555")]));
        provider
            .expect_account_tags()
            .returning(|_| Ok(BTreeMap::new()));
        provider
            .expect_account_status()
            .with(eq("555555555555"))
            .returning(|_| Ok(AccountStatus::Suspended));
        provider.expect_tag_account().never();

        let req = AssignRequest {
            suspend_check: true,
            ..requested("555555555555")
        };
        let err = assign(&provider, &settings(), &req).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("suspended")));
    }

    #[tokio::test]
    async fn succeeded_creation_without_account_id_is_an_error() {
        let mut provider = MockAccountProvider::new();
        provider.expect_list_accounts().returning(|_| Ok(vec![]));
        provider
            .expect_create_account()
            .returning(|_, _| Ok("car-2".to_string()));
        provider.expect_create_account_status().returning(|_| {
            Ok(CreateAccountStatus {
                request_id: "car-2".to_string(),
                state: CreateAccountState::Succeeded,
                account_id: None,
                failure_reason: None,
            })
        });
        provider.expect_tag_account().never();

        let err = assign(&provider, &settings(), &request()).await.unwrap_err();
        assert!(err.to_string().contains("car-2"));
    }

    #[tokio::test]
    async fn listing_failure_aborts_before_claim() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Err(Error::provider("ListAccountsForParent", "ExpiredToken")));
        provider.expect_tag_account().never();
        provider.expect_create_account().never();

        let err = assign(&provider, &settings(), &request()).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[tokio::test]
    async fn move_failure_surfaces_account_for_reconciliation() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Ok(vec![Account::with_id("111111111111")]));
        provider
            .expect_account_tags()
            .returning(|_| Ok(BTreeMap::new()));
        provider.expect_tag_account().returning(|_, _| Ok(()));
        provider
            .expect_move_account()
            .returning(|_, _, _| Err(Error::provider("MoveAccount", "ServiceException")));

        let err = assign(&provider, &settings(), &request()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::PartialClaim {
                step: ClaimStep::Move,
                ..
            }
        ));
        assert_eq!(err.unreconciled_account(), Some("111111111111"));
    }
}
