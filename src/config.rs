use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{Credentials, PlaybookRunner};

/// Runtime configuration. Every option can also come from the environment,
/// and a `.env` file in the working directory is loaded first.
#[derive(Debug, Clone, Parser)]
#[command(name = "netops-bot", version, about)]
pub struct Config {
    /// Bearer token for the Webex API
    #[arg(long, env = "WEBEX_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Room to take commands from and reply into
    #[arg(long, env = "ROOM_ID")]
    pub room_id: String,

    /// Commands are addressed as `/<bot id>`
    #[arg(long, env = "BOT_ID", default_value = "66070220")]
    pub bot_id: String,

    #[arg(long, env = "WEBEX_API_URL", default_value = "https://webexapis.com/v1")]
    pub api_url: String,

    /// Seconds between two polls of the room
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 1)]
    pub poll_interval: u64,

    #[arg(long, env = "ROUTER_USER", default_value = "admin")]
    pub router_user: String,

    #[arg(long, env = "ROUTER_PASS", hide_env_values = true)]
    pub router_pass: String,

    #[arg(long, env = "RESTCONF_SCHEME", default_value = "https")]
    pub restconf_scheme: String,

    #[arg(long, env = "RESTCONF_PORT", default_value_t = 443)]
    pub restconf_port: u16,

    #[arg(long, env = "NETCONF_PORT", default_value_t = 830)]
    pub netconf_port: u16,

    #[arg(long, env = "SSH_PORT", default_value_t = 22)]
    pub ssh_port: u16,

    /// Seconds before a device request or connection attempt is abandoned
    #[arg(long, env = "DEVICE_TIMEOUT", default_value_t = 10)]
    pub device_timeout: u64,

    #[arg(long, env = "PLAYBOOK_RUNNER", default_value = "ansible-playbook")]
    pub playbook_runner: String,

    #[arg(long, env = "PLAYBOOK", default_value = "banner_playbook.yaml")]
    pub playbook: PathBuf,

    #[arg(long, env = "INVENTORY", default_value = "hosts")]
    pub inventory: PathBuf,

    /// Seconds a playbook run may take before it's killed
    #[arg(long, env = "PLAYBOOK_TIMEOUT", default_value_t = 30)]
    pub playbook_timeout: u64,
}

impl Config {
    /// Loads `.env` if present, then parses the command line and environment
    pub fn load() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                log::warn!("config: ignoring .env: {}", err);
            }
        }
        Config::parse()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.router_user, &self.router_pass)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(self.device_timeout)
    }

    pub fn playbook_runner(&self) -> PlaybookRunner {
        PlaybookRunner::new(&self.playbook_runner, &self.playbook, &self.inventory)
            .with_timeout(Duration::from_secs(self.playbook_timeout))
    }
}
