//! Returning a claimed account to the pool.
//!
//! Operator-driven counterpart of [`crate::claim::commit_claim`], used to
//! finish reconciling a half-claimed account or to recycle one. Never called
//! automatically.

use tracing::info;

use crate::provider::AccountProvider;
use poolctl_common::{Result, CLAIMED_TAG_KEY, OWNER_TAG_KEY};

/// Remove the claim tags from `account_id` and move it from `destination_ou`
/// back to `root_ou`.
pub async fn release(
    provider: &dyn AccountProvider,
    account_id: &str,
    root_ou: &str,
    destination_ou: &str,
) -> Result<()> {
    let keys = [CLAIMED_TAG_KEY.to_string(), OWNER_TAG_KEY.to_string()];
    provider.untag_account(account_id, &keys).await?;
    info!(account_id = %account_id, "Removed claim tags");

    provider
        .move_account(account_id, destination_ou, root_ou)
        .await?;
    info!(account_id = %account_id, to = %root_ou, "Returned account to pool");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAccountProvider;
    use mockall::predicate::eq;
    use poolctl_common::Error;

    #[tokio::test]
    async fn untags_then_moves_back() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_untag_account()
            .withf(|id, keys| id == "111111111111" && keys == ["claimed", "owner"])
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_move_account()
            .with(eq("111111111111"), eq("ou-dest"), eq("r-root"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        release(&provider, "111111111111", "r-root", "ou-dest")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn untag_failure_leaves_placement_alone() {
        let mut provider = MockAccountProvider::new();
        provider
            .expect_untag_account()
            .returning(|_, _| Err(Error::provider("UntagResource", "AccessDenied")));
        provider.expect_move_account().never();

        let err = release(&provider, "111111111111", "r-root", "ou-dest")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "UntagResource failed: AccessDenied");
    }
}
