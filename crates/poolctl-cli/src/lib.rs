//! poolctl CLI library

pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};

/// poolctl - Pooled cloud accounts and emergency cluster access
#[derive(Parser, Debug)]
#[command(name = "poolctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign an unclaimed account to an owner, provisioning one if the pool is empty
    Assign(commands::assign::AssignArgs),
    /// Return a claimed account to the pool
    Unassign(commands::unassign::UnassignArgs),
    /// Drop emergency access to a cluster
    Cleanup(commands::cleanup::CleanupArgs),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Assign(args) => commands::assign::run(args).await,
            Commands::Unassign(args) => commands::unassign::run(args).await,
            Commands::Cleanup(args) => commands::cleanup::run(args).await,
        }
    }
}
