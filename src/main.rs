mod app;
mod cli;
mod config;
mod forward;
mod k8s;
mod model;
mod prompt;
mod select;

use anyhow::{Context, Result};
use app::{Session, SessionOptions};
use clap::Parser;
use cli::CliArgs;
use config::KubeAccess;
use forward::KubectlRunner;
use k8s::KubeServiceSource;
use model::LocalPortMode;
use prompt::LinePrompt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    let access = KubeAccess::new(args.kubeconfig, args.context);
    debug!(kubeconfig = %access.source_label(), context = ?access.context, "cluster access resolved");

    let options = SessionOptions {
        namespace: args.namespace,
        kubectl: args.kubectl,
        local_port_mode: if args.choose_local_port {
            LocalPortMode::Prompt
        } else {
            LocalPortMode::Mirror
        },
    };

    let mut session = Session::new(
        KubeServiceSource::new(access),
        LinePrompt::stdio(),
        KubectlRunner,
        options,
    );
    session.run().await
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}
