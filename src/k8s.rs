use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, KubeconfigError};
use kube::{Api, Client, Config, ResourceExt};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::KubeAccess;
use crate::model::{ServiceInfo, ServicePort};

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to load kubeconfig {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: KubeconfigError,
    },

    #[error("failed to create Kubernetes client")]
    ClientBuild(#[source] kube::Error),

    #[error("failed to list services in namespace {namespace}")]
    Listing {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("no services found in namespace {0}")]
    EmptyNamespace(String),
}

/// Read-only view of the Services in a namespace.
#[async_trait]
pub trait ServiceSource {
    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>, ClusterError>;
}

/// Lists Services through the Kubernetes API using an explicit kubeconfig.
#[derive(Debug, Clone)]
pub struct KubeServiceSource {
    access: KubeAccess,
}

impl KubeServiceSource {
    pub fn new(access: KubeAccess) -> Self {
        Self { access }
    }

    async fn client(&self) -> Result<Client, ClusterError> {
        let path = self.access.source_label();
        let kubeconfig = self
            .access
            .read_kubeconfig()
            .map_err(|source| ClusterError::ConfigLoad {
                path: path.clone(),
                source,
            })?;

        let options = KubeConfigOptions {
            context: self.access.context.clone(),
            cluster: None,
            user: None,
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|source| ClusterError::ConfigLoad { path, source })?;
        debug!(cluster = %config.cluster_url, "kubeconfig loaded");

        Client::try_from(config).map_err(ClusterError::ClientBuild)
    }
}

#[async_trait]
impl ServiceSource for KubeServiceSource {
    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>, ClusterError> {
        let client = self.client().await?;
        let services: Api<Service> = Api::namespaced(client, namespace);

        let list = services
            .list(&ListParams::default())
            .await
            .map_err(|source| ClusterError::Listing {
                namespace: namespace.to_string(),
                source,
            })?;

        Ok(list.into_iter().map(|service| service_info(&service)).collect())
    }
}

/// Fails on an empty listing; there is nothing to select from.
pub fn require_services(
    namespace: &str,
    services: Vec<ServiceInfo>,
) -> Result<Vec<ServiceInfo>, ClusterError> {
    if services.is_empty() {
        return Err(ClusterError::EmptyNamespace(namespace.to_string()));
    }
    Ok(services)
}

fn service_info(service: &Service) -> ServiceInfo {
    let name = service.name_any();
    let ports = service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .map(|ports| ports.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(|port| match u16::try_from(port.port) {
            Ok(number) if number > 0 => Some(ServicePort {
                port: number,
                name: port.name.clone().filter(|value| !value.is_empty()),
            }),
            _ => {
                warn!(service = %name, port = port.port, "skipping out-of-range service port");
                None
            }
        })
        .collect();

    ServiceInfo { name, ports }
}
