use std::process::ExitCode;

use netops_bot::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::load();

    match serve(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("stopping: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: &Config) -> Result<()> {
    let credentials = config.credentials();
    let timeout = config.device_timeout();

    let device = Client::new(credentials.clone(), timeout)
        .with_ports(config.ssh_port, config.netconf_port);
    let restconf = RestconfBackend::new(credentials, timeout)?
        .with_endpoint(&config.restconf_scheme, config.restconf_port);
    let netconf = NetconfBackend::new(device.clone());
    let banner = DeviceShell::new(device, config.playbook_runner());

    let chat = WebexClient::new(&config.api_url, &config.access_token, &config.room_id, timeout)?;
    let parser = CommandParser::new(&config.bot_id, ManagementRange::DEFAULT);

    Dispatcher::new(chat, parser, restconf, netconf, banner)
        .with_poll_interval(config.poll_interval())
        .run()
        .await
}
