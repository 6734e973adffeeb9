//! Cluster lookup through the OpenShift Cluster Manager REST API.

use serde::Deserialize;
use tracing::debug;

use crate::cluster::{validate_cluster_key, Cluster};
use poolctl_common::{Error, Result};

/// Default OCM API endpoint
pub const DEFAULT_OCM_URL: &str = "https://api.openshift.com";

#[derive(Debug, Deserialize)]
struct ClusterList {
    #[serde(default)]
    items: Vec<OcmCluster>,
}

#[derive(Debug, Deserialize)]
struct OcmCluster {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    aws: Option<OcmAws>,
}

#[derive(Debug, Deserialize)]
struct OcmAws {
    #[serde(default)]
    private_link: bool,
}

impl From<OcmCluster> for Cluster {
    fn from(c: OcmCluster) -> Self {
        Cluster {
            id: c.id,
            name: c.name,
            private_link: c.aws.is_some_and(|aws| aws.private_link),
        }
    }
}

/// Search expression matching a cluster by id, external id or name
fn search_query(identifier: &str) -> String {
    format!("id = '{identifier}' or external_id = '{identifier}' or name = '{identifier}'")
}

/// Minimal OCM client for resolving clusters.
pub struct OcmClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl OcmClient {
    /// Create a client for `base_url` authenticating with a bearer `token`
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Resolve exactly one cluster for `identifier`
    pub async fn get_cluster(&self, identifier: &str) -> Result<Cluster> {
        validate_cluster_key(identifier)?;

        let url = format!("{}/api/clusters_mgmt/v1/clusters", self.base_url);
        let search = search_query(identifier);
        debug!(url = %url, search = %search, "Searching OCM for cluster");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("search", search.as_str()), ("size", "2")])
            .send()
            .await
            .map_err(|e| Error::provider("GetCluster", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(
                "GetCluster",
                format!("{} - {}", status, body),
            ));
        }

        let list: ClusterList = response
            .json()
            .await
            .map_err(|e| Error::provider("GetCluster", format!("invalid response: {}", e)))?;

        pick_single(identifier, list.items)
    }
}

fn pick_single(identifier: &str, items: Vec<OcmCluster>) -> Result<Cluster> {
    let mut items = items.into_iter();
    match (items.next(), items.next()) {
        (Some(cluster), None) => Ok(cluster.into()),
        (None, _) => Err(Error::ClusterNotFound {
            identifier: identifier.to_string(),
        }),
        (Some(_), Some(_)) => Err(Error::validation(format!(
            "identifier '{identifier}' matches more than one cluster, use the cluster id instead"
        ))),
    }
}
