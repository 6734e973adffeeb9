//! Dropping emergency access to a cluster.
//!
//! PrivateLink clusters are reached through jump pods running on the hive
//! shard, in the cluster's namespace. Dropping access there means:
//! 1. Resolve the cluster and its namespace
//! 2. Verify the caller may delete pods there
//! 3. List the jump pods labelled with the cluster id
//! 4. Ask the operator to confirm
//! 5. Delete them with one delete-collection call
//! 6. Poll until the same listing comes back empty
//!
//! Other clusters are accessed with a local kubeconfig, so dropping access
//! only clears the [`KubeconfigSession`].
//!
//! Each run is a single pass; the operator re-runs the command to retry.

use std::time::Duration;

use tracing::{info, warn};

use crate::cluster::{
    validate_cluster_key, Cluster, ClusterManager, LabelSelector, DEFAULT_JUMP_POD_LABEL_KEY,
};
use crate::session::KubeconfigSession;
use poolctl_common::{await_completion, confirm, Console, Error, PollConfig, Result};

/// How a teardown run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Nothing to remove
    AlreadyClean,
    /// The session belongs to some other cluster, assumed clean for this one
    AssumedClean,
    /// Jump pods were deleted and confirmed gone
    Dropped {
        /// Number of pods deleted
        deleted: usize,
    },
    /// The kubeconfig session was cleared
    SessionCleared {
        /// Path that was set
        path: String,
    },
    /// Operator declined, nothing was changed
    Declined,
}

/// Settings for access teardown.
#[derive(Clone, Debug)]
pub struct TeardownSettings {
    /// Label key marking jump pods; the value is the cluster id
    pub jump_pod_label_key: String,
    /// Poll used while waiting for pods to terminate
    pub termination_poll: PollConfig,
}

impl Default for TeardownSettings {
    fn default() -> Self {
        Self {
            jump_pod_label_key: DEFAULT_JUMP_POD_LABEL_KEY.to_string(),
            termination_poll: PollConfig::fixed(Duration::from_secs(5), Duration::from_secs(300)),
        }
    }
}

/// Access teardown controller.
pub struct AccessTeardown<C> {
    clusters: C,
    settings: TeardownSettings,
}

impl<C: ClusterManager> AccessTeardown<C> {
    /// Create a controller over `clusters`
    pub fn new(clusters: C, settings: TeardownSettings) -> Self {
        Self { clusters, settings }
    }

    /// Drop access to the cluster named by `identifier`.
    pub async fn run(
        &self,
        identifier: &str,
        console: &mut dyn Console,
        session: &mut KubeconfigSession,
    ) -> Result<TeardownOutcome> {
        validate_cluster_key(identifier)?;

        let cluster = self.clusters.resolve_cluster(identifier).await?;
        console.println(&format!("Dropping access to cluster '{}'", cluster.name));

        let outcome = if cluster.private_link {
            self.drop_private_link_access(&cluster, console).await?
        } else {
            drop_local_access(&cluster, console, session).await?
        };

        info!(cluster = %cluster.name, outcome = ?outcome, "Access teardown finished");
        Ok(outcome)
    }

    async fn drop_private_link_access(
        &self,
        cluster: &Cluster,
        console: &mut dyn Console,
    ) -> Result<TeardownOutcome> {
        console.println("Cluster is PrivateLink - removing jump pods in the cluster's namespace.");

        let namespace = match self.clusters.resolve_namespace(&cluster.id).await {
            Ok(ns) => ns,
            Err(e) => {
                console.errorln("Failed to retrieve cluster namespace");
                return Err(e);
            }
        };

        if !self.clusters.can_delete_workloads(&namespace).await? {
            return Err(Error::PermissionDenied(format!(
                "cannot delete pods in namespace '{namespace}', are you logged into the hive shard?"
            )));
        }

        let selector = LabelSelector::single(&self.settings.jump_pod_label_key, &cluster.id);
        let pods = match self.clusters.list_workloads(&namespace, &selector).await {
            Ok(pods) => pods,
            Err(e) => {
                console.errorln(&format!(
                    "Failed to list pods in cluster namespace '{namespace}'"
                ));
                return Err(e);
            }
        };

        if pods.is_empty() {
            console.println(&format!("No jump pods found running in namespace '{namespace}'."));
            console.println("Access has been dropped.");
            return Ok(TeardownOutcome::AlreadyClean);
        }

        console.println("");
        console.println(&format!(
            "This will delete {} pods in the namespace '{}'",
            pods.len(),
            namespace
        ));
        for pod in &pods {
            console.println(&format!("- {}", pod.name));
        }
        console.println("");

        if !confirm(console, "Continue? [y/N] ").await? {
            console.println("Access has not been dropped.");
            return Ok(TeardownOutcome::Declined);
        }

        if let Err(e) = self.clusters.delete_workloads(&namespace, &selector).await {
            console.errorln("Failed to delete pod(s)");
            return Err(e);
        }

        console.println(&format!("Waiting for {} pod(s) to terminate", pods.len()));
        let awaiting = format!("jump pods in '{namespace}' to terminate");
        let waited = await_completion(&self.settings.termination_poll, &awaiting, || {
            let namespace = &namespace;
            let selector = &selector;
            async move {
                let remaining = self.clusters.list_workloads(namespace, selector).await?;
                Ok(remaining.is_empty().then_some(()))
            }
        })
        .await;

        if let Err(e) = waited {
            console.errorln("Error while waiting for pods to terminate");
            return Err(match e {
                timeout @ Error::Timeout { .. } => timeout,
                other => Error::wait_failed(awaiting, other),
            });
        }

        console.println("Access has been dropped.");
        Ok(TeardownOutcome::Dropped {
            deleted: pods.len(),
        })
    }
}

async fn drop_local_access(
    cluster: &Cluster,
    console: &mut dyn Console,
    session: &mut KubeconfigSession,
) -> Result<TeardownOutcome> {
    console.println("Unsetting $KUBECONFIG for cluster");

    let (Some(path), Some(file_name)) = (session.path().map(str::to_string), session.file_name())
    else {
        console.errorln("'KUBECONFIG' unset. Access appears to have already been dropped.");
        return Ok(TeardownOutcome::AlreadyClean);
    };

    if !session.references(&cluster.name) {
        warn!(kubeconfig = %path, cluster = %cluster.name, "KUBECONFIG belongs to another cluster");
        console.errorln(&format!(
            "'KUBECONFIG' set to '{}', which does not seem to be the kubeconfig for '{}'. Access assumed to have already been dropped.",
            file_name, cluster.name
        ));
        console.errorln("(If you think this is a mistake, you can still manually drop access by running `unset KUBECONFIG` in the affected terminals)");
        return Ok(TeardownOutcome::AssumedClean);
    }

    if !confirm(console, &format!("$KUBECONFIG set to '{path}'. Unset it? [y/N] ")).await? {
        console.println("Access has not been dropped.");
        return Ok(TeardownOutcome::Declined);
    }

    console.println("Unsetting $KUBECONFIG");
    let path = session.clear().unwrap_or(path);
    console.println("Successfully unset $KUBECONFIG.");
    console.println("Access has been dropped.");
    Ok(TeardownOutcome::SessionCleared { path })
}
