//! Cleanup command - drop emergency access to a cluster
//!
//! Usage: poolctl cleanup <cluster> [--kubeconfig <hive kubeconfig>]
//!
//! PrivateLink clusters have their jump pods removed from the hive shard the
//! current kubeconfig (or `--kubeconfig`) points at. For other clusters the
//! command checks whether `KUBECONFIG` belongs to the cluster.

use std::path::{Path, PathBuf};

use clap::Args;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use poolctl_access::{
    AccessTeardown, HiveWorkloads, KubeconfigSession, ManagedClusters, OcmClient, TeardownOutcome,
};
use poolctl_common::StdConsole;

use crate::config::load_config;
use crate::{Error, Result};

/// Drop emergency access to a cluster
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Cluster id, external id or name
    pub cluster: String,

    /// Kubeconfig for the hive shard (defaults to the kube default chain)
    #[arg(short = 'k', long)]
    pub kubeconfig: Option<PathBuf>,

    /// OCM API URL (overrides the config file)
    #[arg(long, env = "OCM_URL")]
    pub ocm_url: Option<String>,

    /// OCM access token
    #[arg(long, env = "OCM_TOKEN", hide_env_values = true)]
    pub ocm_token: Option<String>,
}

pub async fn run(args: CleanupArgs) -> Result<()> {
    let config = load_config()?;
    let token = args.ocm_token.ok_or_else(|| {
        Error::validation("an OCM token is required, set OCM_TOKEN or pass --ocm-token")
    })?;
    let ocm_url = args.ocm_url.unwrap_or_else(|| config.ocm_url.clone());

    let client = hive_client(args.kubeconfig.as_deref()).await?;
    let clusters = ManagedClusters::new(OcmClient::new(ocm_url, token), HiveWorkloads::new(client));
    let teardown = AccessTeardown::new(clusters, config.teardown_settings());

    let mut console = StdConsole::new();
    let mut session = KubeconfigSession::from_env();

    if let TeardownOutcome::SessionCleared { path } =
        teardown.run(&args.cluster, &mut console, &mut session).await?
    {
        println!("Run `unset KUBECONFIG` in every terminal using {}", path);
    }
    Ok(())
}

async fn hive_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let Some(path) = kubeconfig else {
        return Client::try_default()
            .await
            .map_err(|e| Error::command_failed(format!("Failed to create client: {}", e)));
    };

    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        Error::command_failed(format!("failed to read kubeconfig {}: {}", path.display(), e))
    })?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| Error::command_failed(format!("failed to load kubeconfig: {}", e)))?;
    Client::try_from(config)
        .map_err(|e| Error::command_failed(format!("Failed to create client: {}", e)))
}
