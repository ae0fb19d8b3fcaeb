use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::model::PortMapping;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("{0} is not installed or not in PATH")]
    ExecutableNotFound(String),

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} port-forward exited with {status}")]
    Exited { program: String, status: ExitStatus },
}

/// A fully built `port-forward` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ForwardCommand {
    pub fn new(
        program: impl Into<PathBuf>,
        service: &str,
        namespace: &str,
        mappings: &[PortMapping],
    ) -> Self {
        let mut args = vec![
            "port-forward".to_string(),
            format!("service/{service}"),
            "-n".to_string(),
            namespace.to_string(),
        ];
        args.extend(mappings.iter().map(PortMapping::to_string));

        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Display for ForwardCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external programs on behalf of the pipeline.
#[async_trait]
pub trait ProcessRunner {
    /// Resolves `program` on the search path.
    fn locate(&self, program: &Path) -> Result<PathBuf, ForwardError>;

    /// Runs `command` to completion with the terminal attached.
    async fn run(&self, command: &ForwardCommand) -> io::Result<ExitStatus>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KubectlRunner;

#[async_trait]
impl ProcessRunner for KubectlRunner {
    fn locate(&self, program: &Path) -> Result<PathBuf, ForwardError> {
        which::which(program)
            .map_err(|_| ForwardError::ExecutableNotFound(program.display().to_string()))
    }

    async fn run(&self, command: &ForwardCommand) -> io::Result<ExitStatus> {
        TokioCommand::new(command.program())
            .args(command.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
    }
}

/// Blocks until the forwarding process exits; a non-zero status is an error.
pub async fn launch<R: ProcessRunner>(
    runner: &R,
    command: &ForwardCommand,
) -> Result<(), ForwardError> {
    info!(command = %command, "starting port-forward");
    let status = runner
        .run(command)
        .await
        .map_err(|source| ForwardError::Spawn {
            program: command.program_name(),
            source,
        })?;
    debug!(%status, "port-forward exited");

    if status.success() {
        Ok(())
    } else {
        Err(ForwardError::Exited {
            program: command.program_name(),
            status,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{ForwardCommand, ForwardError, ProcessRunner, launch};
    use crate::model::PortMapping;
    use async_trait::async_trait;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::process::ExitStatus;
    use std::sync::Mutex;

    /// Records every command instead of spawning it.
    pub(crate) struct FakeRunner {
        pub installed: bool,
        pub exit: Option<ExitStatus>,
        pub commands: Mutex<Vec<ForwardCommand>>,
    }

    impl FakeRunner {
        pub(crate) fn exiting_with(code: i32) -> Self {
            Self {
                installed: true,
                exit: Some(exit_status(code)),
                commands: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn recorded(&self) -> Vec<ForwardCommand> {
            self.commands.lock().expect("runner lock").clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        fn locate(&self, program: &Path) -> Result<PathBuf, ForwardError> {
            if self.installed {
                Ok(Path::new("/usr/local/bin").join(program))
            } else {
                Err(ForwardError::ExecutableNotFound(program.display().to_string()))
            }
        }

        async fn run(&self, command: &ForwardCommand) -> io::Result<ExitStatus> {
            self.commands.lock().expect("runner lock").push(command.clone());
            self.exit
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    #[cfg(unix)]
    pub(crate) fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    pub(crate) fn exit_status(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }

    #[test]
    fn builds_one_pair_per_port() {
        let command = ForwardCommand::new(
            "kubectl",
            "web",
            "shop",
            &[PortMapping::mirrored(443), PortMapping::mirrored(80)],
        );
        assert_eq!(
            command.args(),
            ["port-forward", "service/web", "-n", "shop", "443:443", "80:80"]
        );
    }

    #[test]
    fn single_port_keeps_service_and_namespace() {
        let command = ForwardCommand::new(
            "kubectl",
            "api",
            "default",
            &[PortMapping {
                local: 18080,
                remote: 8080,
            }],
        );
        let args = command.args();
        assert_eq!(args.iter().filter(|arg| arg.contains(':')).count(), 1);
        assert!(args.contains(&"service/api".to_string()));
        assert!(args.windows(2).any(|pair| pair == ["-n", "default"]));
        assert_eq!(
            command.to_string(),
            "kubectl port-forward service/api -n default 18080:8080"
        );
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let runner = FakeRunner::exiting_with(0);
        let command = ForwardCommand::new("kubectl", "api", "ns", &[PortMapping::mirrored(80)]);
        launch(&runner, &command).await.expect("clean exit");
        assert_eq!(runner.recorded(), vec![command]);
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let runner = FakeRunner::exiting_with(1);
        let command = ForwardCommand::new("kubectl", "api", "ns", &[PortMapping::mirrored(80)]);
        let error = launch(&runner, &command).await.expect_err("failed exit");
        assert!(matches!(error, ForwardError::Exited { ref status, .. } if !status.success()));
        assert!(error.to_string().starts_with("kubectl port-forward exited with"));
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let runner = FakeRunner {
            installed: true,
            exit: None,
            commands: Mutex::new(Vec::new()),
        };
        let command = ForwardCommand::new("kubectl", "api", "ns", &[PortMapping::mirrored(80)]);
        let error = launch(&runner, &command).await.expect_err("spawn failed");
        assert_eq!(error.to_string(), "failed to start kubectl");
    }

    #[test]
    fn missing_executable_is_named() {
        let runner = FakeRunner {
            installed: false,
            exit: None,
            commands: Mutex::new(Vec::new()),
        };
        let error = runner.locate(Path::new("kubectl")).expect_err("not installed");
        assert_eq!(error.to_string(), "kubectl is not installed or not in PATH");
    }
}
