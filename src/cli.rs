use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kube-pfw",
    version,
    about = "Pick a Kubernetes Service and its ports, then port-forward to it."
)]
pub struct CliArgs {
    /// Namespace to list Services from
    pub namespace: String,

    /// Kubeconfig file (defaults to the KUBECONFIG list, then ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// Forwarding executable
    #[arg(long, default_value = "kubectl")]
    pub kubectl: PathBuf,

    /// Ask for a local port per selected port instead of mirroring the remote one
    #[arg(short = 'l', long)]
    pub choose_local_port: bool,

    /// tracing filter (for example: warn,info,debug)
    #[arg(long, default_value = "warn")]
    pub log_filter: String,
}
