//! Module that deals with the NETCONF session and framing.
//!
//! Refer to documentation of [NetconfConnection] for more details.

use std::sync::LazyLock;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result};

/// An established NETCONF session, on which RPCs can be executed and their
/// replies received.
///
/// We only advertise `base:1.0`, so every message in either direction is
/// terminated by the `]]>]]>` end-of-message marker. The request/response
/// mechanism is serial: each RPC waits for its reply before returning.
pub struct NetconfConnection<S> {
    stream: S,
    unparsed_bytes: Vec<u8>,
    next_message_id: u32,
    session_id: Option<u32>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> NetconfConnection<S> {
    /// Wraps `stream` in a session. This consumes the server's hello and sends
    /// ours before returning.
    pub async fn new(stream: S) -> Result<Self> {
        let mut connection = NetconfConnection {
            stream,
            unparsed_bytes: Vec::with_capacity(2 * READ_FRAME_SIZE),
            next_message_id: 101,
            session_id: None,
        };

        let greeting = connection.next_message().await?;
        if !greeting.contains("<hello") {
            return Err(Error::InvalidReply("did not find hello".into()));
        }
        connection.session_id =
            element_text(&greeting, "session-id").and_then(|id| id.parse().ok());
        log::trace!("netconf: received hello, session {:?}", connection.session_id);

        connection.write_message(CLIENT_HELLO).await?;
        log::trace!("netconf: handshake completed. session active");
        Ok(connection)
    }

    /// The session id announced by the server, if it sent one
    pub fn session_id(&self) -> Option<u32> {
        self.session_id
    }

    /// Sends `operation` wrapped in an `<rpc>` element and returns the raw
    /// `<rpc-reply>`.
    pub async fn send_rpc(&mut self, operation: &str) -> Result<String> {
        let message_id = self.next_message_id;
        self.next_message_id += 1;
        let request = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><rpc message-id="{}" xmlns="{}">{}</rpc>"#,
            message_id, BASE_NS, operation
        );
        self.write_message(&request).await?;

        let reply = self.next_message().await?;
        if !reply.contains("<rpc-reply") && !reply.contains(":rpc-reply") {
            return Err(Error::InvalidReply(format!(
                "expected rpc-reply to message {}",
                message_id
            )));
        }
        if let Some(msg) = element_text(&reply, "error-message") {
            log::debug!("netconf: rpc {} returned error: {}", message_id, msg);
        }
        Ok(reply)
    }

    /// `<get-config>` from the running datastore
    pub async fn get_config(&mut self, filter: &str) -> Result<String> {
        self.send_rpc(&format!(
            "<get-config><source><running/></source>{}</get-config>",
            filter
        ))
        .await
    }

    /// `<get>` of configuration and state data
    pub async fn get(&mut self, filter: &str) -> Result<String> {
        self.send_rpc(&format!("<get>{}</get>", filter)).await
    }

    /// `<edit-config>` against the running datastore
    pub async fn edit_config(&mut self, config: &str) -> Result<String> {
        self.send_rpc(&format!(
            "<edit-config><target><running/></target>{}</edit-config>",
            config
        ))
        .await
    }

    /// Politely ends the session
    pub async fn close(mut self) -> Result<()> {
        let reply = self.send_rpc("<close-session/>").await?;
        if !is_ok(&reply) {
            log::debug!("netconf: close-session not acknowledged");
        }
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Writes `message` followed by the end-of-message marker
    async fn write_message(&mut self, message: &str) -> Result<()> {
        self.stream.write_all(message.as_bytes()).await?;
        self.stream.write_all(END_OF_MESSAGE.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads a full message from the server, and returns it without the
    /// end-of-message marker
    async fn next_message(&mut self) -> Result<String> {
        loop {
            // if we already have a full message, return it
            if let Some(message) = self.take_message()? {
                return Ok(message);
            }

            let mut frame = [0_u8; READ_FRAME_SIZE];
            match self.stream.read(&mut frame).await? {
                0 => return Err(Error::eof("premature EOF")),
                count => self.unparsed_bytes.extend_from_slice(&frame[..count]),
            }
        }
    }

    /// Splits the first complete message off `unparsed_bytes`, leaving any
    /// bytes after its marker for the next call
    fn take_message(&mut self) -> Result<Option<String>> {
        let marker = END_OF_MESSAGE.as_bytes();
        let pos = match self
            .unparsed_bytes
            .windows(marker.len())
            .position(|w| w == marker)
        {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let message = std::str::from_utf8(&self.unparsed_bytes[..pos])?
            .trim()
            .to_owned();
        self.unparsed_bytes.drain(..pos + marker.len());
        Ok(Some(message))
    }
}

static OK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(?:[\w-]+:)?ok\s*/>").unwrap());

static RPC_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[\w-]+:)?rpc-error[\s/>]").unwrap());

static DATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[\w-]+:)?data[\s/>]").unwrap());

/// A leaf element: open tag, text, close tag. Captures the open tag name,
/// the text, and the close tag name.
static LEAF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[\w-]+:)?([\w-]+)(?:\s[^>]*)?>\s*([^<]*?)\s*</(?:[\w-]+:)?([\w-]+)>").unwrap()
});

/// Did the device answer with an `<ok/>`?
pub fn is_ok(reply: &str) -> bool {
    OK.is_match(reply)
}

/// Did the device answer with an `<rpc-error>`?
pub fn is_rpc_error(reply: &str) -> bool {
    RPC_ERROR.is_match(reply)
}

/// Does the reply carry a `<data>` element, possibly empty?
pub fn has_data(reply: &str) -> bool {
    DATA.is_match(reply)
}

/// Returns the trimmed text of the first `tag` leaf element in `xml`,
/// ignoring namespace prefixes and attributes
pub fn element_text(xml: &str, tag: &str) -> Option<String> {
    LEAF.captures_iter(xml)
        .find(|c| &c[1] == tag && &c[3] == tag)
        .map(|c| c[2].to_owned())
}

const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

const END_OF_MESSAGE: &str = "]]>]]>";

const CLIENT_HELLO: &str = r#"<?xml version="1.0" encoding="UTF-8"?><hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>"#;

/// Reads are done in sizes of this
const READ_FRAME_SIZE: usize = 2048;
