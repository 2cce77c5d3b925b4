//! Loopback lifecycle over RESTCONF.
//!
//! Configuration lives under `ietf-interfaces:interfaces/interface=<name>`,
//! operational state under `ietf-interfaces:interfaces-state/interface=<name>`.
//! Devices are lab routers with self-signed certificates, so certificate
//! validation is off.

use std::{net::Ipv4Addr, time::Duration};

use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{Credentials, Error, InterfaceIdentity, InterfaceLifecycle, InterfaceState, Result};

const YANG_JSON: &str = "application/yang-data+json";

/// A [InterfaceLifecycle] implementation speaking RESTCONF
pub struct RestconfBackend {
    http: reqwest::Client,
    credentials: Credentials,
    scheme: String,
    port: u16,
    identity: InterfaceIdentity,
}

impl RestconfBackend {
    /// Creates a backend talking HTTPS on port 443. Every request is bounded
    /// by `timeout`.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()?;
        Ok(RestconfBackend {
            http,
            credentials,
            scheme: "https".into(),
            port: 443,
            identity: InterfaceIdentity::LOOPBACK,
        })
    }

    /// Overrides the scheme and port used to reach devices
    pub fn with_endpoint(mut self, scheme: &str, port: u16) -> Self {
        self.scheme = scheme.to_owned();
        self.port = port;
        self
    }

    fn data_url(&self, ip: Ipv4Addr) -> String {
        format!("{}://{}:{}/restconf/data", self.scheme, ip, self.port)
    }

    fn config_url(&self, ip: Ipv4Addr) -> String {
        format!(
            "{}/ietf-interfaces:interfaces/interface={}",
            self.data_url(ip),
            self.identity.name
        )
    }

    fn state_url(&self, ip: Ipv4Addr) -> String {
        format!(
            "{}/ietf-interfaces:interfaces-state/interface={}",
            self.data_url(ip),
            self.identity.name
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(header::ACCEPT, YANG_JSON)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        log::debug!(
            "restconf: {} {}",
            response.url().path(),
            response.status().as_u16()
        );
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::AuthenticationFailed(
                response.url().host_str().unwrap_or_default().to_owned(),
            ));
        }
        Ok(response)
    }

    /// Sends `body` as the interface definition using `method`
    async fn write_config(
        &self,
        method: Method,
        ip: Ipv4Addr,
        body: &InterfaceEnvelope<'_>,
    ) -> Result<Response> {
        let builder = self
            .request(method, &self.config_url(ip))
            .header(header::CONTENT_TYPE, YANG_JSON)
            .body(serde_json::to_vec(body)?);
        self.send(builder).await
    }

    async fn exists(&self, ip: Ipv4Addr) -> Result<bool> {
        let response = self.send(self.request(Method::GET, &self.config_url(ip))).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(Error::UnexpectedStatus(s.as_u16())),
        }
    }

    async fn set_enabled(&self, ip: Ipv4Addr, enabled: bool) -> Result<()> {
        if !self.exists(ip).await? {
            return Err(Error::NotFound);
        }
        match self.status(ip).await {
            Ok(state) if enabled && state.is_enabled() => return Err(Error::AlreadyInState),
            Ok(state) if !enabled && state.is_disabled() => return Err(Error::AlreadyInState),
            Ok(_) | Err(Error::NotFound) => {}
            Err(err) => return Err(err),
        }

        // PATCH merges, so the address configuration is left alone
        let body = InterfaceEnvelope::admin(&self.identity, enabled);
        let response = self.write_config(Method::PATCH, ip, &body).await?;
        expect_success(response.status())
    }
}

impl InterfaceLifecycle for RestconfBackend {
    async fn create(&self, ip: Ipv4Addr) -> Result<()> {
        if self.exists(ip).await? {
            return Err(Error::AlreadyExists);
        }
        let body = InterfaceEnvelope::full(&self.identity);
        let response = self.write_config(Method::PUT, ip, &body).await?;
        match response.status() {
            // a PUT that replaced something rather than creating it
            StatusCode::NO_CONTENT => Err(Error::NotAcknowledged),
            s => expect_success(s),
        }
    }

    async fn delete(&self, ip: Ipv4Addr) -> Result<()> {
        if !self.exists(ip).await? {
            return Err(Error::NotFound);
        }
        let response = self.send(self.request(Method::DELETE, &self.config_url(ip))).await?;
        expect_success(response.status())
    }

    async fn enable(&self, ip: Ipv4Addr) -> Result<()> {
        self.set_enabled(ip, true).await
    }

    async fn disable(&self, ip: Ipv4Addr) -> Result<()> {
        self.set_enabled(ip, false).await
    }

    async fn status(&self, ip: Ipv4Addr) -> Result<InterfaceState> {
        let response = self.send(self.request(Method::GET, &self.state_url(ip))).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            s if s.is_success() => {
                let body = response.bytes().await?;
                let envelope: StateEnvelope = serde_json::from_slice(&body)?;
                Ok(InterfaceState::new(
                    &envelope.interface.admin_status,
                    &envelope.interface.oper_status,
                ))
            }
            s => Err(Error::UnexpectedStatus(s.as_u16())),
        }
    }
}

fn expect_success(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::UnexpectedStatus(status.as_u16()))
    }
}

#[derive(Debug, Serialize)]
struct InterfaceEnvelope<'a> {
    #[serde(rename = "ietf-interfaces:interface")]
    interface: InterfaceConfig<'a>,
}

#[derive(Debug, Serialize)]
struct InterfaceConfig<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(rename = "type")]
    iftype: String,
    enabled: bool,
    #[serde(rename = "ietf-ip:ipv4", skip_serializing_if = "Option::is_none")]
    ipv4: Option<Ipv4Config>,
}

#[derive(Debug, Serialize)]
struct Ipv4Config {
    address: Vec<Ipv4Address>,
}

#[derive(Debug, Serialize)]
struct Ipv4Address {
    ip: String,
    netmask: String,
}

impl<'a> InterfaceEnvelope<'a> {
    /// The complete definition used to create the interface
    fn full(identity: &'a InterfaceIdentity) -> Self {
        InterfaceEnvelope {
            interface: InterfaceConfig {
                name: identity.name,
                description: Some(identity.description),
                iftype: format!("iana-if-type:{}", identity.iftype),
                enabled: true,
                ipv4: Some(Ipv4Config {
                    address: vec![Ipv4Address {
                        ip: identity.address.to_string(),
                        netmask: identity.netmask.to_string(),
                    }],
                }),
            },
        }
    }

    /// Just enough to flip the admin state
    fn admin(identity: &'a InterfaceIdentity, enabled: bool) -> Self {
        InterfaceEnvelope {
            interface: InterfaceConfig {
                name: identity.name,
                description: None,
                iftype: format!("iana-if-type:{}", identity.iftype),
                enabled,
                ipv4: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StateEnvelope {
    #[serde(rename = "ietf-interfaces:interface")]
    interface: InterfaceStateBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct InterfaceStateBody {
    admin_status: String,
    oper_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_definition() {
        let body = InterfaceEnvelope::full(&InterfaceIdentity::LOOPBACK);
        let value = serde_json::to_value(&body).expect("failed to serialize");
        let ifc = &value["ietf-interfaces:interface"];
        assert_eq!(ifc["name"], "Loopback66070220");
        assert_eq!(ifc["type"], "iana-if-type:softwareLoopback");
        assert_eq!(ifc["enabled"], true);
        assert_eq!(ifc["ietf-ip:ipv4"]["address"][0]["ip"], "172.2.20.1");
        assert_eq!(ifc["ietf-ip:ipv4"]["address"][0]["netmask"], "255.255.255.0");
    }

    #[test]
    fn test_admin_definition_leaves_address_alone() {
        let body = InterfaceEnvelope::admin(&InterfaceIdentity::LOOPBACK, false);
        let value = serde_json::to_value(&body).expect("failed to serialize");
        let ifc = &value["ietf-interfaces:interface"];
        assert_eq!(ifc["enabled"], false);
        assert!(ifc.get("ietf-ip:ipv4").is_none());
        assert!(ifc.get("description").is_none());
    }

    #[test]
    fn test_state_decoding() {
        let body = r#"{
            "ietf-interfaces:interface": {
                "name": "Loopback66070220",
                "type": "iana-if-type:softwareLoopback",
                "admin-status": "up",
                "oper-status": "up",
                "if-index": 9
            }
        }"#;
        let envelope: StateEnvelope = serde_json::from_str(body).expect("failed to decode");
        assert_eq!(envelope.interface.admin_status, "up");
        assert_eq!(envelope.interface.oper_status, "up");
    }

    #[test]
    fn test_urls() {
        let backend = RestconfBackend::new(
            Credentials::new("admin", "cisco"),
            Duration::from_secs(5),
        )
        .expect("failed to build client")
        .with_endpoint("http", 8080);
        let ip = Ipv4Addr::new(10, 0, 15, 61);
        assert_eq!(
            backend.config_url(ip),
            "http://10.0.15.61:8080/restconf/data/ietf-interfaces:interfaces/interface=Loopback66070220"
        );
        assert_eq!(
            backend.state_url(ip),
            "http://10.0.15.61:8080/restconf/data/ietf-interfaces:interfaces-state/interface=Loopback66070220"
        );
    }
}
