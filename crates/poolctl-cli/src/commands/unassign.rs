//! Unassign command - return a claimed account to the pool

use clap::Args;

use poolctl_account::release::release;
use poolctl_account::OrganizationsProvider;

use super::PoolArgs;
use crate::config::load_config;
use crate::Result;

/// Remove the claim tags from an account and move it back to the pool
#[derive(Args, Debug)]
pub struct UnassignArgs {
    /// Account to return
    #[arg(long)]
    pub account_id: String,

    #[command(flatten)]
    pub pool: PoolArgs,

    /// AWS profile to use
    #[arg(short = 'p', long, env = "AWS_PROFILE")]
    pub profile: Option<String>,
}

pub async fn run(args: UnassignArgs) -> Result<()> {
    let config = load_config()?;
    let ous = args.pool.resolve(&config)?;
    let provider = OrganizationsProvider::from_env(args.profile.as_deref()).await;

    release(&provider, &args.account_id, &ous.root_ou, &ous.destination_ou).await?;
    println!("Account {} returned to {}", args.account_id, ous.root_ou);
    Ok(())
}
