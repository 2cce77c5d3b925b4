//! Applies configuration by shelling out to a playbook runner
//! (`ansible-playbook` by default) limited to a single host.

use std::{
    net::Ipv4Addr,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::process::Command;

use crate::{Error, Result};

/// Marker in the run's recap that says no task failed
const SUCCESS_MARKER: &str = "failed=0";

/// Runs a fixed playbook against one host at a time
#[derive(Debug, Clone)]
pub struct PlaybookRunner {
    program: String,
    playbook: PathBuf,
    inventory: PathBuf,
    timeout: Duration,
}

impl PlaybookRunner {
    pub fn new<P: AsRef<Path>>(program: &str, playbook: P, inventory: P) -> Self {
        PlaybookRunner {
            program: program.to_owned(),
            playbook: playbook.as_ref().to_owned(),
            inventory: inventory.as_ref().to_owned(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the execution ceiling, 30 seconds by default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the runner executable, either as a path or through `PATH`
    pub fn locate(&self) -> Result<PathBuf> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return if candidate.is_file() {
                Ok(candidate.to_owned())
            } else {
                Err(Error::RunnerNotFound(self.program.clone()))
            };
        }
        std::env::var_os("PATH")
            .iter()
            .flat_map(std::env::split_paths)
            .map(|dir| dir.join(&self.program))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::RunnerNotFound(self.program.clone()))
    }

    /// Runs the playbook against `host` with `vars` passed as extra vars.
    /// Succeeds only if the run's report contains the zero-failure marker
    /// before the timeout expires.
    pub async fn run(&self, host: Ipv4Addr, vars: &serde_json::Value) -> Result<()> {
        let program = self.locate()?;
        let mut command = Command::new(&program);
        command
            .arg("-i")
            .arg(&self.inventory)
            .arg(&self.playbook)
            .arg("--limit")
            .arg(host.to_string())
            .arg("-e")
            .arg(vars.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::debug!("playbook: running {} against {}", program.display(), host);
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(output) => output?,
            Err(_) => {
                log::warn!(
                    "playbook: run against {} exceeded {:?}, killed",
                    host,
                    self.timeout
                );
                return Err(Error::Timeout);
            }
        };

        let report = String::from_utf8_lossy(&output.stdout);
        log::trace!("playbook: report\n{}", report);
        if report.contains(SUCCESS_MARKER) {
            Ok(())
        } else {
            log::debug!(
                "playbook: run against {} failed ({}): {}",
                host,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Err(Error::PlaybookFailed)
        }
    }
}
