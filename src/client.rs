use std::{
    io,
    net::Ipv4Addr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use russh::{
    client::{self, Handle, Msg},
    ChannelMsg, ChannelStream, Disconnect,
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::{Error, NetconfConnector, Result, ShellTransport};

/// Login used for every device in the pool
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }
}

/// An SSH client for the devices in the pool. Nothing is connected until a
/// command is run or a NETCONF stream is opened, and every such call gets
/// its own session which is torn down afterwards.
///
/// The same client serves both the interactive shell (port 22) and the
/// NETCONF subsystem (port 830).
#[derive(Clone)]
pub struct Client {
    credentials: Credentials,
    ssh_port: u16,
    netconf_port: u16,
    connect_timeout: Duration,
    config: Arc<client::Config>,
}

impl Client {
    /// Creates a new [Client]. Sessions idle for longer than `timeout` are
    /// dropped, and so are connection attempts that take longer than that.
    pub fn new(credentials: Credentials, timeout: Duration) -> Self {
        let config = client::Config {
            inactivity_timeout: Some(timeout),
            ..Default::default()
        };
        Client {
            credentials,
            ssh_port: 22,
            netconf_port: 830,
            connect_timeout: timeout,
            config: Arc::new(config),
        }
    }

    pub fn with_ports(mut self, ssh_port: u16, netconf_port: u16) -> Self {
        self.ssh_port = ssh_port;
        self.netconf_port = netconf_port;
        self
    }

    /// Opens and authenticates a session to `ip`:`port`
    async fn open_session(&self, ip: Ipv4Addr, port: u16) -> Result<Handle<AcceptAnyHostKey>> {
        log::trace!("ssh: connecting to {}:{}", ip, port);
        let connect = client::connect(self.config.clone(), (ip, port), AcceptAnyHostKey);
        let mut session = tokio::time::timeout(self.connect_timeout, connect).await??;
        let auth = session
            .authenticate_password(&self.credentials.username, &self.credentials.password)
            .await?;
        if !auth.success() {
            return Err(Error::AuthenticationFailed(ip.to_string()));
        }
        log::trace!("ssh: session to {}:{} authenticated", ip, port);
        Ok(session)
    }
}

impl ShellTransport for Client {
    async fn run_command(&self, ip: Ipv4Addr, command: &str) -> Result<String> {
        let session = self.open_session(ip, self.ssh_port).await?;
        let mut channel = session.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut output: Vec<u8> = Vec::new();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status } => {
                    log::trace!("ssh: `{}` exited with {}", command, exit_status);
                }
                _ => {}
            }
        }
        if let Err(err) = session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            log::debug!("ssh: disconnect from {} failed: {}", ip, err);
        }
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

impl NetconfConnector for Client {
    type Stream = SshChannelStream;

    async fn open_stream(&self, ip: Ipv4Addr) -> Result<SshChannelStream> {
        let session = self.open_session(ip, self.netconf_port).await?;
        let channel = session.channel_open_session().await?;
        channel.request_subsystem(true, "netconf").await?;
        Ok(SshChannelStream {
            stream: channel.into_stream(),
            _session: session,
        })
    }
}

/// The byte stream of an SSH subsystem channel. It keeps the session handle
/// alive for as long as the stream is in use.
pub struct SshChannelStream {
    stream: ChannelStream<Msg>,
    _session: Handle<AcceptAnyHostKey>,
}

impl AsyncRead for SshChannelStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for SshChannelStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}

/// Lab devices regenerate their host keys freely, so any key is accepted.
pub struct AcceptAnyHostKey;

impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}
