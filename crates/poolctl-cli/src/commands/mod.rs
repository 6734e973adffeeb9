//! CLI commands

use clap::Args;

use crate::config::{PayerOus, PoolConfig};
use crate::{Error, Result};

pub mod assign;
pub mod cleanup;
pub mod unassign;

/// Which pool to operate on: a configured payer preset or explicit OUs.
#[derive(Args, Debug, Clone, Default)]
pub struct PoolArgs {
    /// Payer preset from the config file
    #[arg(long, conflicts_with_all = ["root_ou", "destination_ou"])]
    pub payer: Option<String>,

    /// OU holding unclaimed accounts
    #[arg(long, requires = "destination_ou")]
    pub root_ou: Option<String>,

    /// OU claimed accounts are moved into
    #[arg(long, requires = "root_ou")]
    pub destination_ou: Option<String>,
}

impl PoolArgs {
    /// Resolve the root and destination OUs
    pub fn resolve(&self, config: &PoolConfig) -> Result<PayerOus> {
        if let Some(payer) = &self.payer {
            return config.payer(payer).cloned();
        }
        match (&self.root_ou, &self.destination_ou) {
            (Some(root_ou), Some(destination_ou)) => Ok(PayerOus {
                root_ou: root_ou.clone(),
                destination_ou: destination_ou.clone(),
            }),
            _ => Err(Error::validation(
                "specify --payer, or both --root-ou and --destination-ou",
            )),
        }
    }
}
