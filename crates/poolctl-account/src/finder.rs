//! Locating a reusable account under a root OU.
//!
//! Candidates are visited in the order the provider lists them. That order is
//! not guaranteed to be stable between calls and is deliberately not sorted.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::provider::{AccountProvider, AccountStatus};
use poolctl_common::{Error, Result, CLAIMED_TAG_KEY, CLAIMED_TAG_VALUE};

/// Outcome of searching the pool for an unclaimed account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountLookup {
    /// First eligible account in provider order
    Found(String),
    /// Pool is empty or every candidate is claimed/suspended
    NotAvailable,
}

impl AccountLookup {
    /// Convert into the error form, mapping `NotAvailable` to
    /// [`Error::NoUntaggedAccounts`]
    pub fn into_result(self) -> Result<String> {
        match self {
            AccountLookup::Found(id) => Ok(id),
            AccountLookup::NotAvailable => Err(Error::NoUntaggedAccounts),
        }
    }
}

/// Whether a tag set carries the positive claim marker
pub fn is_claimed(tags: &BTreeMap<String, String>) -> bool {
    tags.get(CLAIMED_TAG_KEY)
        .is_some_and(|v| v == CLAIMED_TAG_VALUE)
}

/// Whether the account is owned by someone
pub async fn is_owned(provider: &dyn AccountProvider, account_id: &str) -> Result<bool> {
    let tags = provider.account_tags(account_id).await?;
    Ok(is_claimed(&tags))
}

/// Whether the account is suspended
pub async fn is_suspended(provider: &dyn AccountProvider, account_id: &str) -> Result<bool> {
    let status = provider.account_status(account_id).await?;
    Ok(status == AccountStatus::Suspended)
}

/// Find the first account under `root_ou` that is not claimed.
///
/// With `suspend_check` set, otherwise eligible candidates are also rejected
/// when suspended. This costs one extra provider call per candidate.
pub async fn find_untagged_account(
    provider: &dyn AccountProvider,
    root_ou: &str,
    suspend_check: bool,
) -> Result<AccountLookup> {
    let accounts = provider.list_accounts(root_ou).await?;

    for account in &accounts {
        if is_owned(provider, &account.id).await? {
            debug!(account_id = %account.id, "Skipping claimed account");
            continue;
        }

        if suspend_check && is_suspended(provider, &account.id).await? {
            debug!(account_id = %account.id, "Skipping suspended account");
            continue;
        }

        info!(account_id = %account.id, root_ou = %root_ou, "Found unclaimed account");
        return Ok(AccountLookup::Found(account.id.clone()));
    }

    info!(
        root_ou = %root_ou,
        candidates = accounts.len(),
        "No unclaimed accounts in pool"
    );
    Ok(AccountLookup::NotAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Account, MockAccountProvider};
    use mockall::predicate::eq;

    const ROOT_OU: &str = "abc";
    const ACCOUNT: &str = "111111111111";

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn single_account_pool(
        account_tags: BTreeMap<String, String>,
        status: Option<AccountStatus>,
    ) -> MockAccountProvider {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .with(eq(ROOT_OU))
            .times(1)
            .returning(|_| Ok(vec![Account::with_id(ACCOUNT)]));
        provider
            .expect_account_tags()
            .with(eq(ACCOUNT))
            .times(1)
            .returning(move |_| Ok(account_tags.clone()));
        match status {
            Some(status) => {
                provider
                    .expect_account_status()
                    .with(eq(ACCOUNT))
                    .times(1)
                    .returning(move |_| Ok(status.clone()));
            }
            None => {
                provider.expect_account_status().never();
            }
        }
        provider
    }

    #[test]
    fn claim_marker_requires_exact_true() {
        assert!(!is_claimed(&tags(&[])));
        assert!(!is_claimed(&tags(&[("owner", "randuser")])));
        assert!(!is_claimed(&tags(&[("claimed", "false")])));
        assert!(!is_claimed(&tags(&[("claimed", "TRUE")])));
        assert!(is_claimed(&tags(&[("claimed", "true")])));
        assert!(is_claimed(&tags(&[("owner", "randuser"), ("claimed", "true")])));
    }

    #[tokio::test]
    async fn is_owned_for_unowned_account() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_account_tags()
            .returning(|_| Ok(BTreeMap::new()));
        assert!(!is_owned(&provider, "11111").await.unwrap());
    }

    #[tokio::test]
    async fn is_owned_for_owned_account() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_account_tags()
            .returning(|_| Ok(tags(&[("claimed", "true")])));
        assert!(is_owned(&provider, "11111").await.unwrap());
    }

    #[tokio::test]
    async fn is_owned_propagates_provider_error() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_account_tags()
            .returning(|_| Err(Error::provider("ListTagsForResource", "Generic AWS error")));
        let err = is_owned(&provider, "11111").await.unwrap_err();
        assert_eq!(err.to_string(), "ListTagsForResource failed: Generic AWS error");
    }

    #[tokio::test]
    async fn untagged_active_account_is_found() {
        let provider = single_account_pool(tags(&[]), Some(AccountStatus::Active));
        let lookup = find_untagged_account(&provider, ROOT_OU, true).await.unwrap();
        assert_eq!(lookup, AccountLookup::Found(ACCOUNT.to_string()));
    }

    #[tokio::test]
    async fn untagged_suspended_account_is_skipped() {
        let provider = single_account_pool(tags(&[]), Some(AccountStatus::Suspended));
        let lookup = find_untagged_account(&provider, ROOT_OU, true).await.unwrap();
        assert_eq!(lookup, AccountLookup::NotAvailable);
        assert!(matches!(
            lookup.into_result(),
            Err(Error::NoUntaggedAccounts)
        ));
    }

    #[tokio::test]
    async fn suspended_account_is_found_without_suspend_check() {
        let provider = single_account_pool(tags(&[]), None);
        let lookup = find_untagged_account(&provider, ROOT_OU, false).await.unwrap();
        assert_eq!(lookup, AccountLookup::Found(ACCOUNT.to_string()));
    }

    #[tokio::test]
    async fn claimed_account_is_not_available() {
        let provider = single_account_pool(tags(&[("claimed", "true")]), None);
        let lookup = find_untagged_account(&provider, ROOT_OU, false).await.unwrap();
        assert_eq!(lookup, AccountLookup::NotAvailable);
    }

    #[tokio::test]
    async fn claimed_account_with_owner_is_not_available() {
        let provider =
            single_account_pool(tags(&[("owner", "randuser"), ("claimed", "true")]), None);
        let lookup = find_untagged_account(&provider, ROOT_OU, true).await.unwrap();
        assert_eq!(lookup, AccountLookup::NotAvailable);
    }

    #[tokio::test]
    async fn other_claim_values_are_eligible() {
        let provider = single_account_pool(tags(&[("claimed", "false")]), None);
        let lookup = find_untagged_account(&provider, ROOT_OU, false).await.unwrap();
        assert_eq!(lookup, AccountLookup::Found(ACCOUNT.to_string()));
    }

    #[tokio::test]
    async fn empty_pool_is_not_available() {
        let mut provider = MockAccountProvider::new();
        provider.expect_list_accounts().returning(|_| Ok(vec![]));
        provider.expect_account_tags().never();

        let lookup = find_untagged_account(&provider, ROOT_OU, true).await.unwrap();
        assert_eq!(lookup, AccountLookup::NotAvailable);
    }

    #[tokio::test]
    async fn list_error_is_propagated() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_list_accounts()
            .returning(|_| Err(Error::provider("ListAccountsForParent", "Generic AWS error")));
        provider.expect_account_tags().never();

        let err = find_untagged_account(&provider, ROOT_OU, false)
            .await
            .unwrap_err();
        match err {
            Error::Provider { operation, message } => {
                assert_eq!(operation, "ListAccountsForParent");
                assert_eq!(message, "Generic AWS error");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tag_lookup_error_is_propagated() {
        let mut provider = MockAccountProvider::new();
        provider.expect_list_accounts().returning(|_| {
            Ok(vec![Account::with_id(ACCOUNT), Account::with_id("222222222222")])
        });
        provider
            .expect_account_tags()
            .times(1)
            .returning(|_| Err(Error::provider("ListTagsForResource", "Generic AWS error")));

        let result = find_untagged_account(&provider, ROOT_OU, false).await;
        assert!(matches!(result, Err(Error::Provider { .. })));
    }

    #[tokio::test]
    async fn first_eligible_in_provider_order_wins() {
        let mut provider = MockAccountProvider::new();
        provider.expect_list_accounts().returning(|_| {
            Ok(vec![
                Account::with_id("333333333333"),
                Account::with_id("222222222222"),
                Account::with_id("111111111111"),
            ])
        });
        provider.expect_account_tags().returning(|id| {
            if id == "333333333333" {
                Ok(tags(&[("claimed", "true")]))
            } else {
                Ok(BTreeMap::new())
            }
        });
        provider.expect_account_status().returning(|id| {
            if id == "222222222222" {
                Ok(AccountStatus::Suspended)
            } else {
                Ok(AccountStatus::Active)
            }
        });

        let lookup = find_untagged_account(&provider, ROOT_OU, true).await.unwrap();
        assert_eq!(lookup, AccountLookup::Found("111111111111".to_string()));
    }
}
