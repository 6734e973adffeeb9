//! Emergency cluster access teardown
//!
//! PrivateLink clusters are reached through jump pods on the hive shard;
//! every other cluster through a local kubeconfig. [`AccessTeardown`] drops
//! whichever kind of access is in place.

#![deny(missing_docs)]

pub mod cluster;
pub mod hive;
pub mod ocm;
pub mod session;
pub mod teardown;

pub use cluster::{
    validate_cluster_key, Cluster, ClusterManager, LabelSelector, Workload, CLUSTER_ID_LABEL_KEY,
    DEFAULT_JUMP_POD_LABEL_KEY,
};
pub use hive::{HiveWorkloads, ManagedClusters};
pub use ocm::{OcmClient, DEFAULT_OCM_URL};
pub use session::{KubeconfigSession, KUBECONFIG_ENV};
pub use teardown::{AccessTeardown, TeardownOutcome, TeardownSettings};
