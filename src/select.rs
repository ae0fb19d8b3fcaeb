use std::io;
use thiserror::Error;
use tracing::debug;

use crate::model::{LocalPortMode, PortMapping, ServiceInfo};
use crate::prompt::Prompt;

const ALL_PORTS_TOKEN: &str = "all";

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid port number: {0}")]
    InvalidLocalPort(String),

    #[error("service {0} exposes no ports")]
    NoPorts(String),

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Prints the numbered Service menu and resolves a single 1-based choice
/// against `services`.
pub fn select_service<'a, P: Prompt>(
    prompt: &mut P,
    services: &'a [ServiceInfo],
) -> Result<&'a ServiceInfo, SelectionError> {
    prompt.say("* service:")?;
    for (index, service) in services.iter().enumerate() {
        prompt.say(&format!(
            "  {}. {} ( {} )",
            index + 1,
            service.name,
            service.ports_summary()
        ))?;
    }

    let reply = prompt.ask("Enter the number: ")?;
    let index = parse_index(reply.trim(), services.len())?;
    debug!(service = %services[index].name, "service selected");
    Ok(&services[index])
}

/// Picks remote ports for `service`. A single-port Service is chosen
/// without prompting.
pub fn select_ports<P: Prompt>(
    prompt: &mut P,
    service: &ServiceInfo,
) -> Result<Vec<u16>, SelectionError> {
    let ports = service.port_numbers();
    if ports.is_empty() {
        return Err(SelectionError::NoPorts(service.name.clone()));
    }
    if ports.len() == 1 {
        debug!(service = %service.name, port = ports[0], "single port auto-selected");
        return Ok(ports);
    }

    prompt.say(&format!("* {}:", service.name))?;
    for (index, port) in service.ports.iter().enumerate() {
        prompt.say(&format!("  {}. {}", index + 1, port))?;
    }

    let reply = prompt.ask("Enter the number(s) or 'all': ")?;
    parse_port_selection(&reply, &ports)
}

/// Resolves `all` or a comma-separated list of 1-based indices into port
/// numbers, keeping the order the tokens were given in.
pub fn parse_port_selection(input: &str, ports: &[u16]) -> Result<Vec<u16>, SelectionError> {
    let input = input.trim();
    if input == ALL_PORTS_TOKEN {
        return Ok(ports.to_vec());
    }

    let mut seen = Vec::new();
    let mut selected = Vec::new();
    for token in input.split(',').map(str::trim) {
        let index = parse_index(token, ports.len())?;
        if seen.contains(&index) {
            return Err(SelectionError::InvalidSelection(token.to_string()));
        }
        seen.push(index);
        selected.push(ports[index]);
    }
    Ok(selected)
}

/// Turns the chosen remote ports into forwarding pairs according to `mode`.
pub fn map_local_ports<P: Prompt>(
    prompt: &mut P,
    remote_ports: &[u16],
    mode: LocalPortMode,
) -> Result<Vec<PortMapping>, SelectionError> {
    if mode == LocalPortMode::Mirror {
        return Ok(remote_ports.iter().copied().map(PortMapping::mirrored).collect());
    }

    let single = remote_ports.len() == 1;
    remote_ports
        .iter()
        .map(|&remote| -> Result<PortMapping, SelectionError> {
            let question = if single {
                "* Local Port: ".to_string()
            } else {
                format!("* Local Port for {remote}: ")
            };
            let local = parse_local_port(&prompt.ask(&question)?)?;
            Ok(PortMapping { local, remote })
        })
        .collect()
}

pub fn parse_local_port(input: &str) -> Result<u16, SelectionError> {
    let input = input.trim();
    match input.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(SelectionError::InvalidLocalPort(input.to_string())),
    }
}

/// Maps a 1-based token to a 0-based index within `count`.
fn parse_index(token: &str, count: usize) -> Result<usize, SelectionError> {
    match token.parse::<usize>() {
        Ok(index) if (1..=count).contains(&index) => Ok(index - 1),
        _ => Err(SelectionError::InvalidSelection(token.to_string())),
    }
}
