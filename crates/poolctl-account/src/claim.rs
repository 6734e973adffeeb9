//! Claiming an account: tag it as owned, then move it out of the pool.
//!
//! Tag and move are two independent provider calls. If the second one fails
//! the account is left half-claimed and reported with its id; nothing is
//! rolled back automatically.
//!
//! Two callers racing between a pool scan and the tag call can both claim the
//! same account. The provider offers no conditional tag write, so this window
//! is accepted.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::provider::AccountProvider;
use poolctl_common::{ClaimStep, Error, Result, CLAIMED_TAG_KEY, CLAIMED_TAG_VALUE, OWNER_TAG_KEY};

/// Tags applied when claiming an account
pub fn claim_tags(owner: Option<&str>) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert(CLAIMED_TAG_KEY.to_string(), CLAIMED_TAG_VALUE.to_string());
    if let Some(owner) = owner {
        tags.insert(OWNER_TAG_KEY.to_string(), owner.to_string());
    }
    tags
}

/// Mark an account as claimed, optionally recording its owner.
pub async fn tag_account(
    provider: &dyn AccountProvider,
    account_id: &str,
    owner: Option<&str>,
) -> Result<()> {
    provider
        .tag_account(account_id, &claim_tags(owner))
        .await?;
    info!(account_id = %account_id, owner = owner.unwrap_or(""), "Tagged account as claimed");
    Ok(())
}

/// Move an account from `root_ou` into `destination_ou`.
pub async fn move_account(
    provider: &dyn AccountProvider,
    account_id: &str,
    destination_ou: &str,
    root_ou: &str,
) -> Result<()> {
    provider
        .move_account(account_id, root_ou, destination_ou)
        .await?;
    info!(
        account_id = %account_id,
        from = %root_ou,
        to = %destination_ou,
        "Moved account"
    );
    Ok(())
}

/// Tag then move. Either failure is returned as [`Error::PartialClaim`].
pub async fn commit_claim(
    provider: &dyn AccountProvider,
    account_id: &str,
    owner: Option<&str>,
    destination_ou: &str,
    root_ou: &str,
) -> Result<()> {
    if let Err(e) = tag_account(provider, account_id, owner).await {
        error!(account_id = %account_id, error = %e, "Failed to tag account");
        return Err(Error::partial_claim(account_id, ClaimStep::Tag, e));
    }

    if let Err(e) = move_account(provider, account_id, destination_ou, root_ou).await {
        error!(
            account_id = %account_id,
            error = %e,
            "Account tagged but not moved, reconcile manually"
        );
        return Err(Error::partial_claim(account_id, ClaimStep::Move, e));
    }

    Ok(())
}
