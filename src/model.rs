use std::fmt::{Display, Formatter};

/// A Service as listed from the cluster. Port order is the API order and is
/// what the 1-based menu indices refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePort {
    pub port: u16,
    pub name: Option<String>,
}

impl ServiceInfo {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            name: name.into(),
            ports: ports
                .into_iter()
                .map(|port| ServicePort { port, name: None })
                .collect(),
        }
    }

    pub fn port_numbers(&self) -> Vec<u16> {
        self.ports.iter().map(|port| port.port).collect()
    }

    pub fn ports_summary(&self) -> String {
        if self.ports.is_empty() {
            return "no ports".to_string();
        }

        let ports = self
            .ports
            .iter()
            .map(|port| port.port.to_string())
            .collect::<Vec<_>>()
            .join(" , ");
        format!("port {ports}")
    }
}

impl Display for ServicePort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.port, name),
            None => write!(f, "{}", self.port),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LocalPortMode {
    /// local port == remote port
    Mirror,
    /// ask the operator for each local port
    Prompt,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PortMapping {
    pub local: u16,
    pub remote: u16,
}

impl PortMapping {
    pub fn mirrored(port: u16) -> Self {
        Self {
            local: port,
            remote: port,
        }
    }
}

impl Display for PortMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.local, self.remote)
    }
}

/// The operator's choice for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub service: ServiceInfo,
    pub mappings: Vec<PortMapping>,
}
