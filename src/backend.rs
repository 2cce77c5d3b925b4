//! The seams between the dispatcher and the outside world.
//!
//! The dispatcher is generic over these, so the production clients and the
//! fakes used in tests are interchangeable. Everything runs on a single
//! thread, hence no `Send` bounds on the returned futures.

#![allow(async_fn_in_trait)]

use std::net::Ipv4Addr;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::{ChatMessage, InterfaceState, Result};

/// Lifecycle of the loopback interface on one device. Implemented once per
/// device-management protocol, with identical semantics:
///
/// * every operation first checks whether the interface exists
/// * success requires an affirmative acknowledgement from the device
/// * any transport failure is a failure of the operation
pub trait InterfaceLifecycle {
    /// Fails with [crate::Error::AlreadyExists] if the interface is present
    async fn create(&self, ip: Ipv4Addr) -> Result<()>;

    /// Fails with [crate::Error::NotFound] if the interface is absent
    async fn delete(&self, ip: Ipv4Addr) -> Result<()>;

    /// Fails with [crate::Error::AlreadyInState] if the interface is already
    /// admin and operationally up
    async fn enable(&self, ip: Ipv4Addr) -> Result<()>;

    /// Fails with [crate::Error::AlreadyInState] if the interface is already
    /// admin and operationally down
    async fn disable(&self, ip: Ipv4Addr) -> Result<()>;

    /// Pure read of admin and oper state
    async fn status(&self, ip: Ipv4Addr) -> Result<InterfaceState>;
}

/// Banner handling, plus the other read-only queries that go over the
/// device's interactive shell
pub trait BannerBackend {
    /// Returns the trimmed banner text, or [crate::Error::NoBanner]
    async fn read_banner(&self, ip: Ipv4Addr) -> Result<String>;

    /// Applies `text` as the banner of the device at `ip`
    async fn write_banner(&self, ip: Ipv4Addr, text: &str) -> Result<()>;

    /// Up/down summary of the device's GigabitEthernet interfaces
    async fn interface_summary(&self, ip: Ipv4Addr) -> Result<String>;
}

/// Runs a single read-only command on a device's shell and returns its
/// output
pub trait ShellTransport {
    async fn run_command(&self, ip: Ipv4Addr, command: &str) -> Result<String>;
}

/// Opens a byte stream carrying a NETCONF session to a device
pub trait NetconfConnector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    async fn open_stream(&self, ip: Ipv4Addr) -> Result<Self::Stream>;
}

/// The chat room we take commands from and answer into
pub trait ChatChannel {
    /// The most recent message in the room, if there's any
    async fn latest_message(&self) -> Result<Option<ChatMessage>>;

    async fn post_message(&self, text: &str) -> Result<()>;
}
