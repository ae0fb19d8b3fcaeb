use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::forward::{self, ForwardCommand, ProcessRunner};
use crate::k8s::{self, ServiceSource};
use crate::model::{LocalPortMode, Selection};
use crate::prompt::Prompt;
use crate::select;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub namespace: String,
    pub kubectl: PathBuf,
    pub local_port_mode: LocalPortMode,
}

/// One pick-and-forward run. Each stage must succeed before the next
/// starts; the first failure ends the run.
pub struct Session<S, P, R> {
    source: S,
    prompt: P,
    runner: R,
    options: SessionOptions,
}

impl<S, P, R> Session<S, P, R>
where
    S: ServiceSource,
    P: Prompt,
    R: ProcessRunner,
{
    pub fn new(source: S, prompt: P, runner: R, options: SessionOptions) -> Self {
        Self {
            source,
            prompt,
            runner,
            options,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let kubectl = self
            .runner
            .locate(&self.options.kubectl)
            .context("kubectl check failed")?;
        debug!(path = %kubectl.display(), "forwarding executable found");

        let selection = self.select().await?;

        let command = ForwardCommand::new(
            kubectl,
            &selection.service.name,
            &self.options.namespace,
            &selection.mappings,
        );
        self.prompt
            .say(&format!("Exec Command: {command}"))
            .context("failed to echo command")?;

        forward::launch(&self.runner, &command)
            .await
            .context("port-forward failed")
    }

    async fn select(&mut self) -> Result<Selection> {
        let namespace = self.options.namespace.as_str();
        let listed = self
            .source
            .list_services(namespace)
            .await
            .and_then(|services| k8s::require_services(namespace, services))
            .context("failed to list services")?;
        info!(namespace, count = listed.len(), "services listed");

        let service = select::select_service(&mut self.prompt, &listed)
            .context("service selection failed")?
            .clone();
        let ports =
            select::select_ports(&mut self.prompt, &service).context("port selection failed")?;
        let mappings =
            select::map_local_ports(&mut self.prompt, &ports, self.options.local_port_mode)
                .context("local port input failed")?;

        Ok(Selection { service, mappings })
    }
}

#[cfg(test)]
impl<S, P, R> Session<S, P, R> {
    fn prompt(&self) -> &P {
        &self.prompt
    }

    fn runner(&self) -> &R {
        &self.runner
    }
}
