//! The polling loop tying everything together.
//!
//! Each tick fetches the latest message in the room, parses it, routes it to
//! the selector or a backend, and posts the rendered [Response]. Only the
//! latest message is ever looked at, anything posted in between two polls
//! is skipped.

use std::{net::Ipv4Addr, time::Duration};

use tokio::time::MissedTickBehavior;
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use crate::{
    BannerBackend, ChatChannel, Command, CommandParser, InterfaceChange, InterfaceLifecycle,
    InterfaceOp, ParseError, Protocol, ProtocolSelector, Response, Result, Verb,
};

pub struct Dispatcher<C, R, N, B> {
    chat: C,
    parser: CommandParser,
    selector: ProtocolSelector,
    restconf: R,
    netconf: N,
    banner: B,
    poll_interval: Duration,
    last_handled: Option<String>,
}

impl<C, R, N, B> Dispatcher<C, R, N, B>
where
    C: ChatChannel,
    R: InterfaceLifecycle,
    N: InterfaceLifecycle,
    B: BannerBackend,
{
    pub fn new(chat: C, parser: CommandParser, restconf: R, netconf: N, banner: B) -> Self {
        Dispatcher {
            chat,
            parser,
            selector: ProtocolSelector::new(),
            restconf,
            netconf,
            banner,
            poll_interval: Duration::from_secs(1),
            last_handled: None,
        }
    }

    /// Minimum delay between two polls, 1 second by default
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn selector(&self) -> &ProtocolSelector {
        &self.selector
    }

    /// Polls until the chat channel fails. There's no other way out: the
    /// returned error is the reason the loop stopped.
    pub async fn run(&mut self) -> Result<()> {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);
        log::info!(
            "dispatcher: polling every {:?} for {}",
            self.poll_interval,
            self.parser.prefix()
        );
        while ticks.next().await.is_some() {
            self.poll_once().await?;
        }
        Ok(())
    }

    /// One iteration of the loop. Returns the reply that was posted, if any.
    pub async fn poll_once(&mut self) -> Result<Option<String>> {
        let message = match self.chat.latest_message().await? {
            Some(message) => message,
            None => {
                log::trace!("dispatcher: room is empty");
                return Ok(None);
            }
        };
        if self.last_handled.as_deref() == Some(message.id.as_str()) {
            return Ok(None);
        }
        self.last_handled = Some(message.id.clone());

        let text = match message.text.as_deref() {
            Some(text) => text,
            None => return Ok(None),
        };
        log::debug!(
            "dispatcher: received {:?} from {} ({} s ago)",
            text,
            message.person_email.as_deref().unwrap_or("unknown sender"),
            message.age().map(|a| a.num_seconds()).unwrap_or_default()
        );

        let reply = self.handle(text).await;
        if let Some(reply) = &reply {
            self.chat.post_message(reply).await?;
        }
        Ok(reply)
    }

    /// Handles one message's text and returns the reply, or None if the text
    /// isn't addressed to us.
    pub async fn handle(&mut self, text: &str) -> Option<String> {
        let response = match self.parser.parse(text)? {
            Ok(command) => {
                log::info!("dispatcher: executing {:?}", command.verb());
                self.execute(command).await
            }
            Err(err) => Response::Rejected(err),
        };
        if let Some(err) = response.failure() {
            log::warn!("dispatcher: {:?} failed: {}", text, err);
        }
        let reply = response.to_string();
        log::info!("dispatcher: replying {:?}", reply);
        Some(reply)
    }

    async fn execute(&mut self, command: Command) -> Response {
        match command.into_verb() {
            Verb::SelectProtocol(protocol) => {
                self.selector.select(protocol);
                Response::Selected(protocol)
            }
            Verb::Interface { ip, op } => match self.selector.current() {
                None => Response::Rejected(ParseError::NoMethod),
                Some(Protocol::Restconf) => run_interface_op(&self.restconf, ip, op).await,
                Some(Protocol::Netconf) => run_interface_op(&self.netconf, ip, op).await,
            },
            Verb::ReadBanner { ip } => Response::Banner(self.banner.read_banner(ip).await),
            Verb::WriteBanner { ip, message } => {
                Response::BannerSet(self.banner.write_banner(ip, &message).await)
            }
            Verb::InterfaceSummary { ip } => {
                Response::InterfaceSummary(self.banner.interface_summary(ip).await)
            }
        }
    }
}

async fn run_interface_op<B: InterfaceLifecycle>(
    backend: &B,
    ip: Ipv4Addr,
    op: InterfaceOp,
) -> Response {
    let change = match op.change() {
        Some(change) => change,
        None => return Response::Status(backend.status(ip).await),
    };
    let result = match change {
        InterfaceChange::Create => backend.create(ip).await,
        InterfaceChange::Delete => backend.delete(ip).await,
        InterfaceChange::Enable => backend.enable(ip).await,
        InterfaceChange::Disable => backend.disable(ip).await,
    };
    Response::Lifecycle { change, result }
}
