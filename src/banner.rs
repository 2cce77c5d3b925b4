use std::{net::Ipv4Addr, sync::LazyLock};

use regex::Regex;
use serde_json::json;

use crate::{BannerBackend, Error, GigabitSummary, PlaybookRunner, Result, ShellTransport};

/// [BannerBackend] that reads over a device shell and writes through a
/// playbook run
pub struct DeviceShell<S> {
    shell: S,
    playbook: PlaybookRunner,
}

impl<S: ShellTransport> DeviceShell<S> {
    pub fn new(shell: S, playbook: PlaybookRunner) -> Self {
        DeviceShell { shell, playbook }
    }
}

impl<S: ShellTransport> BannerBackend for DeviceShell<S> {
    async fn read_banner(&self, ip: Ipv4Addr) -> Result<String> {
        let config = self.shell.run_command(ip, "show running-config").await?;
        extract_banner(&config).ok_or(Error::NoBanner)
    }

    async fn write_banner(&self, ip: Ipv4Addr, text: &str) -> Result<()> {
        self.playbook.run(ip, &json!({ "motd_message": text })).await
    }

    async fn interface_summary(&self, ip: Ipv4Addr) -> Result<String> {
        let output = self.shell.run_command(ip, "show ip interface brief").await?;
        let summary = GigabitSummary::from_output(&output);
        if summary.interfaces.is_empty() {
            return Err(Error::InvalidReply("no GigabitEthernet interfaces listed".into()));
        }
        Ok(summary.to_string())
    }
}

// Matches the start of the MOTD banner and captures its delimiter.
static BANNER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^banner motd (\^C|\S)").unwrap());

/// Pulls the MOTD banner out of a running configuration. IOS prints the
/// delimiter as `^C`, other platforms echo whatever single character the
/// banner was entered with. Returns None if there's no banner, or if it's
/// blank.
pub fn extract_banner(config: &str) -> Option<String> {
    let captures = BANNER_START.captures(config)?;
    let delimiter = captures.get(1)?.as_str();
    let start = captures.get(0)?.end();
    let body = &config[start..];
    let end = body.find(delimiter)?;
    let text = body[..end].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}
