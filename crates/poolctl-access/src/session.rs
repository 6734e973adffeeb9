//! Local kubeconfig session for non-PrivateLink clusters.
//!
//! Direct access to a standard cluster is just a `KUBECONFIG` pointing at a
//! downloaded kubeconfig. The value is captured once and passed in, so
//! teardown never touches the process environment itself.

use std::path::Path;

/// Environment variable holding the active kubeconfig path
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// The kubeconfig currently in effect, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KubeconfigSession {
    path: Option<String>,
}

impl KubeconfigSession {
    /// Session pointing at `path`, or no session when `None`.
    ///
    /// An empty path is no session: `KUBECONFIG=` selects no kubeconfig file,
    /// so there is no access to drop.
    pub fn new(path: Option<String>) -> Self {
        Self {
            path: path.filter(|p| !p.is_empty()),
        }
    }

    /// Capture the session from `KUBECONFIG`
    pub fn from_env() -> Self {
        Self::new(std::env::var(KUBECONFIG_ENV).ok())
    }

    /// Full kubeconfig path
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Whether a kubeconfig is set
    pub fn is_set(&self) -> bool {
        self.path.is_some()
    }

    /// Base name of the kubeconfig file
    pub fn file_name(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        Some(
            Path::new(path)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string()),
        )
    }

    /// Whether the kubeconfig file name mentions `cluster_name`.
    ///
    /// Kubeconfigs written for a cluster carry its name. A session for another
    /// cluster is indistinguishable from no session for this one.
    pub fn references(&self, cluster_name: &str) -> bool {
        self.file_name()
            .is_some_and(|f| f.contains(cluster_name))
    }

    /// Drop the session, returning the path that was set
    pub fn clear(&mut self) -> Option<String> {
        self.path.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_no_session() {
        assert!(!KubeconfigSession::new(Some(String::new())).is_set());
        assert!(!KubeconfigSession::new(None).is_set());
    }

    #[test]
    fn empty_value_references_no_cluster() {
        let session = KubeconfigSession::new(Some(String::new()));
        assert_eq!(session.path(), None);
        assert_eq!(session.file_name(), None);
        assert!(!session.references(""));
    }

    #[test]
    fn references_matches_file_name_only() {
        let session = KubeconfigSession::new(Some("/tmp/prod-cluster/kubeconfig-dev".to_string()));
        assert_eq!(session.file_name().as_deref(), Some("kubeconfig-dev"));
        assert!(session.references("dev"));
        assert!(!session.references("prod-cluster"));
    }

    #[test]
    fn clear_takes_path() {
        let mut session = KubeconfigSession::new(Some("/home/u/.kube/my-cluster".to_string()));
        assert_eq!(session.clear().as_deref(), Some("/home/u/.kube/my-cluster"));
        assert!(!session.is_set());
        assert_eq!(session.clear(), None);
    }
}
