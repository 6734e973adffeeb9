//! Assign command - hand an account from the pool to an owner
//!
//! Usage: poolctl assign --owner <name> (--payer <preset> | --root-ou <id> --destination-ou <id>)

use clap::Args;
use tracing::{error, info};

use poolctl_account::provisioner::time_seed;
use poolctl_account::{assign, AssignRequest, OrganizationsProvider};
use poolctl_common::{ClaimStep, Error as PoolError};

use super::PoolArgs;
use crate::config::load_config;
use crate::Result;

/// Assign an unclaimed account to an owner
#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Owner recorded on the claimed account
    #[arg(long)]
    pub owner: String,

    #[command(flatten)]
    pub pool: PoolArgs,

    /// Claim this account instead of searching the pool
    #[arg(long)]
    pub account_id: Option<String>,

    /// Skip suspended accounts while searching the pool
    #[arg(long)]
    pub suspend_check: bool,

    /// Seed for the name of a newly provisioned account (defaults to the clock)
    #[arg(long)]
    pub seed: Option<u64>,

    /// AWS profile to use
    #[arg(short = 'p', long, env = "AWS_PROFILE")]
    pub profile: Option<String>,
}

pub async fn run(args: AssignArgs) -> Result<()> {
    let config = load_config()?;
    let ous = args.pool.resolve(&config)?;
    let provider = OrganizationsProvider::from_env(args.profile.as_deref()).await;

    let request = AssignRequest {
        owner: args.owner,
        root_ou: ous.root_ou,
        destination_ou: ous.destination_ou,
        account_id: args.account_id,
        suspend_check: args.suspend_check,
        seed: args.seed.unwrap_or_else(time_seed),
    };

    let assignment = match assign(&provider, &config.assign_settings(), &request).await {
        Ok(assignment) => assignment,
        Err(e) => {
            if let Some(account_id) = e.unreconciled_account() {
                error!(account_id = %account_id, "Account left half-claimed");
            }
            if let Some(hint) = claim_failure_hint(&e) {
                eprintln!("{}", hint);
            }
            return Err(e.into());
        }
    };

    info!(
        account_id = %assignment.account_id,
        owner = %request.owner,
        provisioned = assignment.provisioned,
        "Account assigned"
    );
    if assignment.provisioned {
        println!(
            "Assigned newly created account {} to {}",
            assignment.account_id, request.owner
        );
    } else {
        println!(
            "Assigned account {} to {}",
            assignment.account_id, request.owner
        );
    }
    Ok(())
}

/// Operator guidance for a failed claim
fn claim_failure_hint(err: &PoolError) -> Option<String> {
    match err {
        PoolError::PartialClaim {
            account_id,
            step: ClaimStep::Tag,
            ..
        } => Some(format!(
            "Account {} was left untouched, it is safe to retry",
            account_id
        )),
        PoolError::PartialClaim {
            account_id,
            step: ClaimStep::Move,
            ..
        } => Some(format!(
            "Account {} is tagged but was not moved, reconcile it with `poolctl unassign --account-id {}`",
            account_id, account_id
        )),
        _ => None,
    }
}
