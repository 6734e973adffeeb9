//! Jump pod operations on the hive shard, and the production [`ClusterManager`].

use async_trait::async_trait;
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec,
};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::{Client, ResourceExt};
use tracing::debug;

use crate::cluster::{Cluster, ClusterManager, LabelSelector, Workload, CLUSTER_ID_LABEL_KEY};
use crate::ocm::OcmClient;
use poolctl_common::{Error, Result};

/// Pod and namespace access on a hive shard
pub struct HiveWorkloads {
    client: Client,
}

impl HiveWorkloads {
    /// Wrap a client logged into the hive shard
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Namespace labelled with the cluster's id. Exactly one must exist.
    pub async fn cluster_namespace(&self, cluster_id: &str) -> Result<String> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let selector = LabelSelector::single(CLUSTER_ID_LABEL_KEY, cluster_id);
        let namespaces = api
            .list(&ListParams::default().labels(&selector.to_query()))
            .await?;

        match namespaces.items.as_slice() {
            [ns] => Ok(ns.name_any()),
            items => Err(Error::NamespaceLookup {
                cluster_id: cluster_id.to_string(),
                found: items.len(),
            }),
        }
    }

    /// Ask the API server whether pods in `namespace` may be bulk deleted
    pub async fn can_delete_pods(&self, namespace: &str) -> Result<bool> {
        let api: Api<SelfSubjectAccessReview> = Api::all(self.client.clone());
        let review = SelfSubjectAccessReview {
            metadata: Default::default(),
            spec: SelfSubjectAccessReviewSpec {
                resource_attributes: Some(ResourceAttributes {
                    namespace: Some(namespace.to_string()),
                    verb: Some("deletecollection".to_string()),
                    resource: Some("pods".to_string()),
                    ..Default::default()
                }),
                non_resource_attributes: None,
            },
            status: None,
        };

        let result = api.create(&PostParams::default(), &review).await?;
        let allowed = result.status.is_some_and(|s| s.allowed);
        debug!(namespace = %namespace, allowed, "Checked pod deletion permission");
        Ok(allowed)
    }

    /// Pods in `namespace` matching `selector`
    pub async fn list_pods(&self, namespace: &str, selector: &LabelSelector) -> Result<Vec<Workload>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api
            .list(&ListParams::default().labels(&selector.to_query()))
            .await?;

        Ok(pods
            .items
            .iter()
            .map(|p| Workload {
                name: p.name_any(),
                namespace: namespace.to_string(),
            })
            .collect())
    }

    /// Delete all pods in `namespace` matching `selector`
    pub async fn delete_pods(&self, namespace: &str, selector: &LabelSelector) -> Result<()> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.delete_collection(
            &DeleteParams::default(),
            &ListParams::default().labels(&selector.to_query()),
        )
        .await?;
        debug!(namespace = %namespace, selector = %selector.to_query(), "Deleted pods");
        Ok(())
    }
}

/// Clusters resolved through OCM, jump pods managed on hive.
pub struct ManagedClusters {
    ocm: OcmClient,
    hive: HiveWorkloads,
}

impl ManagedClusters {
    /// Combine an OCM client and a hive shard client
    pub fn new(ocm: OcmClient, hive: HiveWorkloads) -> Self {
        Self { ocm, hive }
    }
}

#[async_trait]
impl ClusterManager for ManagedClusters {
    async fn resolve_cluster(&self, identifier: &str) -> Result<Cluster> {
        self.ocm.get_cluster(identifier).await
    }

    async fn resolve_namespace(&self, cluster_id: &str) -> Result<String> {
        self.hive.cluster_namespace(cluster_id).await
    }

    async fn can_delete_workloads(&self, namespace: &str) -> Result<bool> {
        self.hive.can_delete_pods(namespace).await
    }

    async fn list_workloads(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Workload>> {
        self.hive.list_pods(namespace, selector).await
    }

    async fn delete_workloads(&self, namespace: &str, selector: &LabelSelector) -> Result<()> {
        self.hive.delete_pods(namespace, selector).await
    }
}
