//! Loopback lifecycle over NETCONF.
//!
//! A fresh session is opened for every operation and closed once it's done.
//! Payloads follow the `ietf-interfaces` and `ietf-ip` models.

use std::net::Ipv4Addr;

use crate::{
    connection::{element_text, has_data, is_ok, is_rpc_error},
    Error, InterfaceIdentity, InterfaceLifecycle, InterfaceState, NetconfConnection,
    NetconfConnector, Result,
};

const IF_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-interfaces";
const IANA_IFT_NS: &str = "urn:ietf:params:xml:ns:yang:iana-if-type";
const IP_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-ip";

/// A [InterfaceLifecycle] implementation speaking NETCONF through whatever
/// `C` connects to
pub struct NetconfBackend<C> {
    connector: C,
    identity: InterfaceIdentity,
}

impl<C: NetconfConnector> NetconfBackend<C> {
    pub fn new(connector: C) -> Self {
        NetconfBackend {
            connector,
            identity: InterfaceIdentity::LOOPBACK,
        }
    }

    async fn connect(&self, ip: Ipv4Addr) -> Result<NetconfConnection<C::Stream>> {
        let stream = self.connector.open_stream(ip).await?;
        NetconfConnection::new(stream).await
    }

    /// Closes `connection`, keeping `result` as the outcome of the operation
    async fn finish<T>(connection: NetconfConnection<C::Stream>, result: Result<T>) -> Result<T> {
        if let Err(err) = connection.close().await {
            log::debug!("netconf: failed to close session: {}", err);
        }
        result
    }

    async fn exists(&self, connection: &mut NetconfConnection<C::Stream>) -> Result<bool> {
        let filter = format!(
            r#"<filter><interfaces xmlns="{}"><interface><name>{}</name></interface></interfaces></filter>"#,
            IF_NS, self.identity.name
        );
        let reply = data_reply(connection.get_config(&filter).await?)?;
        Ok(element_text(&reply, "name").as_deref() == Some(self.identity.name))
    }

    async fn state(&self, connection: &mut NetconfConnection<C::Stream>) -> Result<InterfaceState> {
        let filter = format!(
            r#"<filter><interfaces-state xmlns="{}"><interface><name>{}</name></interface></interfaces-state></filter>"#,
            IF_NS, self.identity.name
        );
        let reply = data_reply(connection.get(&filter).await?)?;
        let admin = element_text(&reply, "admin-status");
        let oper = element_text(&reply, "oper-status");
        match (admin, oper) {
            (Some(admin), Some(oper)) => Ok(InterfaceState::new(&admin, &oper)),
            (None, None) if element_text(&reply, "name").is_none() => Err(Error::NotFound),
            _ => Err(Error::InvalidReply(
                "interface state without admin-status/oper-status".into(),
            )),
        }
    }

    async fn edit(
        &self,
        connection: &mut NetconfConnection<C::Stream>,
        config: &str,
    ) -> Result<()> {
        let reply = connection.edit_config(config).await?;
        if is_ok(&reply) {
            Ok(())
        } else {
            Err(Error::NotAcknowledged)
        }
    }

    async fn do_create(&self, connection: &mut NetconfConnection<C::Stream>) -> Result<()> {
        if self.exists(connection).await? {
            return Err(Error::AlreadyExists);
        }
        self.edit(connection, &self.full_config()).await
    }

    async fn do_delete(&self, connection: &mut NetconfConnection<C::Stream>) -> Result<()> {
        if !self.exists(connection).await? {
            return Err(Error::NotFound);
        }
        let config = format!(
            r#"<config><interfaces xmlns="{}"><interface operation="delete"><name>{}</name></interface></interfaces></config>"#,
            IF_NS, self.identity.name
        );
        self.edit(connection, &config).await
    }

    async fn do_set_enabled(
        &self,
        connection: &mut NetconfConnection<C::Stream>,
        enabled: bool,
    ) -> Result<()> {
        if !self.exists(connection).await? {
            return Err(Error::NotFound);
        }
        match self.state(connection).await {
            Ok(state) if enabled && state.is_enabled() => return Err(Error::AlreadyInState),
            Ok(state) if !enabled && state.is_disabled() => return Err(Error::AlreadyInState),
            Ok(_) | Err(Error::NotFound) => {}
            Err(err) => return Err(err),
        }
        let config = format!(
            r#"<config><interfaces xmlns="{}"><interface><name>{}</name><type xmlns:ianaift="{}">ianaift:{}</type><enabled>{}</enabled></interface></interfaces></config>"#,
            IF_NS, self.identity.name, IANA_IFT_NS, self.identity.iftype, enabled
        );
        self.edit(connection, &config).await
    }

    /// The complete definition used to create the interface
    fn full_config(&self) -> String {
        let id = &self.identity;
        format!(
            concat!(
                r#"<config><interfaces xmlns="{}"><interface>"#,
                "<name>{}</name><description>{}</description>",
                r#"<type xmlns:ianaift="{}">ianaift:{}</type>"#,
                "<enabled>true</enabled>",
                r#"<ipv4 xmlns="{}"><address><ip>{}</ip><netmask>{}</netmask></address></ipv4>"#,
                "</interface></interfaces></config>"
            ),
            IF_NS, id.name, id.description, IANA_IFT_NS, id.iftype, IP_NS, id.address, id.netmask
        )
    }
}

/// Passes on a `get`/`get-config` reply only if it carries data. An
/// `<rpc-error>` or a reply without `<data>` says nothing about the interface.
fn data_reply(reply: String) -> Result<String> {
    if is_rpc_error(&reply) {
        let message = element_text(&reply, "error-message").unwrap_or_default();
        return Err(Error::RpcError(message));
    }
    if !has_data(&reply) {
        return Err(Error::InvalidReply("rpc-reply without data".into()));
    }
    Ok(reply)
}

impl<C: NetconfConnector> InterfaceLifecycle for NetconfBackend<C> {
    async fn create(&self, ip: Ipv4Addr) -> Result<()> {
        let mut connection = self.connect(ip).await?;
        let result = self.do_create(&mut connection).await;
        Self::finish(connection, result).await
    }

    async fn delete(&self, ip: Ipv4Addr) -> Result<()> {
        let mut connection = self.connect(ip).await?;
        let result = self.do_delete(&mut connection).await;
        Self::finish(connection, result).await
    }

    async fn enable(&self, ip: Ipv4Addr) -> Result<()> {
        let mut connection = self.connect(ip).await?;
        let result = self.do_set_enabled(&mut connection, true).await;
        Self::finish(connection, result).await
    }

    async fn disable(&self, ip: Ipv4Addr) -> Result<()> {
        let mut connection = self.connect(ip).await?;
        let result = self.do_set_enabled(&mut connection, false).await;
        Self::finish(connection, result).await
    }

    async fn status(&self, ip: Ipv4Addr) -> Result<InterfaceState> {
        let mut connection = self.connect(ip).await?;
        let result = self.state(&mut connection).await;
        Self::finish(connection, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;

    struct NoDevice;

    impl NetconfConnector for NoDevice {
        type Stream = DuplexStream;

        async fn open_stream(&self, _ip: Ipv4Addr) -> Result<DuplexStream> {
            Err(Error::eof("no device"))
        }
    }

    #[test]
    fn test_full_config() {
        let backend = NetconfBackend::new(NoDevice);
        let config = backend.full_config();
        assert!(config.contains("<name>Loopback66070220</name>"));
        assert!(config.contains("<description>66070220 Loopback interface</description>"));
        assert!(config.contains("ianaift:softwareLoopback</type>"));
        assert!(config.contains("<enabled>true</enabled>"));
        assert!(config.contains("<ip>172.2.20.1</ip><netmask>255.255.255.0</netmask>"));
    }

    #[test]
    fn test_data_reply() {
        let empty = r#"<rpc-reply message-id="101"><data/></rpc-reply>"#;
        assert_eq!(data_reply(empty.to_owned()).unwrap(), empty);

        let denied = r#"<rpc-reply message-id="101"><rpc-error><error-message>resource denied</error-message></rpc-error></rpc-reply>"#;
        match data_reply(denied.to_owned()) {
            Err(Error::RpcError(message)) => assert_eq!(message, "resource denied"),
            other => panic!("expected an rpc-error, got {:?}", other),
        }

        let bare = r#"<rpc-reply message-id="101"><ok/></rpc-reply>"#;
        assert!(matches!(data_reply(bare.to_owned()), Err(Error::InvalidReply(_))));
    }

    #[tokio::test]
    async fn test_connect_failure_fails_every_operation() {
        let backend = NetconfBackend::new(NoDevice);
        let ip = Ipv4Addr::new(10, 0, 15, 61);
        assert!(backend.create(ip).await.is_err());
        assert!(backend.delete(ip).await.is_err());
        assert!(backend.enable(ip).await.is_err());
        assert!(backend.disable(ip).await.is_err());
        assert!(backend.status(ip).await.is_err());
    }
}
