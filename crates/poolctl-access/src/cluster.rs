//! Cluster management capability surface
//!
//! Teardown resolves clusters through the management API and manipulates jump
//! workloads on the hive shard. Both are reached through [`ClusterManager`] so
//! the teardown state machine can run against mocks.

use std::collections::BTreeMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use poolctl_common::{Error, Result};

/// Label on hive namespaces identifying the cluster they belong to
pub const CLUSTER_ID_LABEL_KEY: &str = "api.openshift.com/id";

/// Default label key marking jump pods; its value is the owning cluster's id
pub const DEFAULT_JUMP_POD_LABEL_KEY: &str = "jumpPod";

/// A cluster known to the management API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    /// Internal cluster id
    pub id: String,
    /// Display name, also used in kubeconfig file names
    pub name: String,
    /// Whether the cluster is only reachable through jump pods
    pub private_link: bool,
}

/// An ephemeral workload created to grant access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    /// Workload name
    pub name: String,
    /// Namespace it runs in
    pub namespace: String,
}

/// Exact-match label selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Selector matching a single label
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut match_labels = BTreeMap::new();
        match_labels.insert(key.into(), value.into());
        Self { match_labels }
    }

    /// Labels that must all match
    pub fn match_labels(&self) -> &BTreeMap<String, String> {
        &self.match_labels
    }

    /// Render as a Kubernetes label selector query (`k1=v1,k2=v2`)
    pub fn to_query(&self) -> String {
        self.match_labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Check that a cluster identifier (id, external id or name) is well formed
pub fn validate_cluster_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidClusterKey(key.to_string()))
    }
}

/// Trait abstracting cluster lookup and jump workload operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterManager: Send + Sync {
    /// Look up a cluster by id, external id or name
    async fn resolve_cluster(&self, identifier: &str) -> Result<Cluster>;

    /// Find the hive namespace holding the cluster's resources
    async fn resolve_namespace(&self, cluster_id: &str) -> Result<String>;

    /// Whether the current identity may delete workloads in the namespace
    async fn can_delete_workloads(&self, namespace: &str) -> Result<bool>;

    /// List workloads matching the selector
    async fn list_workloads(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Workload>>;

    /// Delete every workload matching the selector in one call
    async fn delete_workloads(&self, namespace: &str, selector: &LabelSelector) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_query() {
        let selector = LabelSelector::single("jumpPod", "abc123");
        assert_eq!(selector.to_query(), "jumpPod=abc123");
        assert_eq!(
            selector.match_labels().get("jumpPod").map(String::as_str),
            Some("abc123")
        );
    }

    #[test]
    fn valid_cluster_keys() {
        for key in ["1a2b3c4d5e6f", "my-cluster", "my_cluster", "Prod01"] {
            assert!(validate_cluster_key(key).is_ok(), "{key} should be valid");
        }
    }

    #[test]
    fn invalid_cluster_keys() {
        for key in ["", "my cluster", "a/b", "name'; drop", "clüster"] {
            assert!(
                matches!(validate_cluster_key(key), Err(Error::InvalidClusterKey(_))),
                "{key:?} should be invalid"
            );
        }
    }
}
