use kube::config::{Kubeconfig, KubeconfigError};
use std::path::PathBuf;

/// Where cluster credentials come from, decided once at startup and handed
/// to the cluster client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeAccess {
    /// Explicit kubeconfig file. `None` defers to `KUBECONFIG` (every listed
    /// file, merged) and then `~/.kube/config`.
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl KubeAccess {
    pub fn new(kubeconfig: Option<PathBuf>, context: Option<String>) -> Self {
        Self {
            kubeconfig: kubeconfig.filter(|path| !path.as_os_str().is_empty()),
            context: context.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn read_kubeconfig(&self) -> Result<Kubeconfig, KubeconfigError> {
        match &self.kubeconfig {
            Some(path) => Kubeconfig::read_from(path),
            None => Kubeconfig::read(),
        }
    }

    /// Human-readable origin of the credentials, for error messages.
    pub fn source_label(&self) -> String {
        match &self.kubeconfig {
            Some(path) => path.display().to_string(),
            None => "from KUBECONFIG or ~/.kube/config".to_string(),
        }
    }
}
