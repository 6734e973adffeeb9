//! Creating fresh accounts when the pool runs dry.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::provider::{AccountProvider, CreateAccountState, CreateAccountStatus};
use poolctl_common::{await_completion, Error, PollConfig, Result};

/// Length of the random account name suffix
pub const SUFFIX_LEN: usize = 6;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Naming scheme for provisioned accounts: `<prefix>+<suffix>@<domain>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountNaming {
    /// Fixed prefix of the account name
    pub prefix: String,
    /// Domain of the contact email
    pub email_domain: String,
}

impl Default for AccountNaming {
    fn default() -> Self {
        Self {
            prefix: "osd-creds-mgmt".to_string(),
            email_domain: "redhat.com".to_string(),
        }
    }
}

/// Name and email for a new account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountIdentity {
    /// Account name
    pub name: String,
    /// Contact email
    pub email: String,
}

impl AccountNaming {
    /// Derive the identity for `seed`. The same seed always yields the same
    /// identity; production callers pass a time-derived seed.
    pub fn for_seed(&self, seed: u64) -> AccountIdentity {
        let name = format!("{}+{}", self.prefix, random_suffix(seed));
        let email = format!("{}@{}", name, self.email_domain);
        AccountIdentity { name, email }
    }
}

/// Lowercase alphanumeric suffix drawn from an RNG seeded with `seed`
pub fn random_suffix(seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())]))
        .collect()
}

/// Seed from the wall clock, for production use
pub fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Default poll for account creation: backoff from 2s to 30s, 10 minute deadline
pub fn default_creation_poll() -> PollConfig {
    PollConfig::with_backoff(
        Duration::from_secs(2),
        Duration::from_secs(30),
        Duration::from_secs(600),
    )
}

/// Create an account named from `seed` and wait for the provider to finish.
///
/// In-progress states are polled per `poll`. A `FAILED` state is returned as
/// [`Error::AccountCreationFailed`] without further checks.
pub async fn create_account(
    provider: &dyn AccountProvider,
    naming: &AccountNaming,
    poll: &PollConfig,
    seed: u64,
) -> Result<CreateAccountStatus> {
    let identity = naming.for_seed(seed);
    info!(name = %identity.name, email = %identity.email, "Creating account");

    let request_id = provider
        .create_account(&identity.name, &identity.email)
        .await?;

    let awaiting = format!("account creation request {request_id}");
    await_completion(poll, &awaiting, || {
        let request_id = request_id.clone();
        async move {
            let status = provider.create_account_status(&request_id).await?;
            match status.state {
                CreateAccountState::Succeeded => Ok(Some(status)),
                CreateAccountState::Failed => Err(Error::AccountCreationFailed {
                    request_id,
                    reason: status
                        .failure_reason
                        .unwrap_or_else(|| "unknown".to_string()),
                }),
                ref state => {
                    debug!(request_id = %request_id, state = %state, "Account creation pending");
                    Ok(None)
                }
            }
        }
    })
    .await
}
