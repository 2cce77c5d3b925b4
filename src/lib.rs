//! Chat-room command dispatcher for a pool of lab routers.
//!
//! Operators post commands like `/66070220 10.0.15.61 create` in a Webex
//! room. The [Dispatcher] picks them up, and manages a fixed loopback
//! interface on the addressed router over RESTCONF or NETCONF, whichever
//! was selected last. Banners are read over SSH and written through a
//! playbook run.
//!
//! ## Examples
//! ```no_run
//! use std::time::Duration;
//! use netops_bot::*;
//!
//! async fn serve() -> Result<()> {
//!     let credentials = Credentials::new("admin", "cisco");
//!     let timeout = Duration::from_secs(10);
//!
//!     // one SSH client serves NETCONF and the device shell
//!     let device = Client::new(credentials.clone(), timeout);
//!     let restconf = RestconfBackend::new(credentials, timeout)?;
//!     let netconf = NetconfBackend::new(device.clone());
//!     let banner = DeviceShell::new(
//!         device,
//!         PlaybookRunner::new("ansible-playbook", "banner_playbook.yaml", "hosts"),
//!     );
//!
//!     let chat = WebexClient::new("https://webexapis.com/v1", "token", "room", timeout)?;
//!     let parser = CommandParser::new("66070220", ManagementRange::DEFAULT);
//!     let mut dispatcher = Dispatcher::new(chat, parser, restconf, netconf, banner);
//!
//!     // only returns once the chat channel fails
//!     dispatcher.run().await
//! }
//! ```
//!
//! Or, without the room, handle a single line of text:
//! ```no_run
//! # use netops_bot::*;
//! # async fn handle<C, R, N, B>(dispatcher: &mut Dispatcher<C, R, N, B>)
//! # where C: ChatChannel, R: InterfaceLifecycle, N: InterfaceLifecycle, B: BannerBackend {
//! assert_eq!(
//!     dispatcher.handle("/66070220 netconf").await.as_deref(),
//!     Some("Ok: Netconf")
//! );
//! # }
//! ```

mod backend;
pub use backend::*;

mod banner;
pub use banner::*;

mod chat;
pub use chat::*;

mod client;
pub use client::*;

mod config;
pub use config::*;

pub mod connection;
pub use connection::NetconfConnection;

mod dispatcher;
pub use dispatcher::*;

mod error;
pub use error::*;

mod models;
pub use models::*;

mod netconf;
pub use netconf::*;

mod parser;
pub use parser::*;

mod playbook;
pub use playbook::*;

mod restconf;
pub use restconf::*;

mod selector;
pub use selector::*;
