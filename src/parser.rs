//! Turns chat text into validated [Command]s.
//!
//! The grammar is small and entirely positional:
//!
//! ```text
//! /<id>
//! /<id> <restconf|netconf>
//! /<id> <ip> <create|delete|enable|disable|status|motd|gigabit_status>
//! /<id> <ip> motd <free text...>
//! ```

use std::{fmt, net::Ipv4Addr};

use crate::{Command, InterfaceOp, Protocol, Verb};

/// Why a message addressed to us could not be turned into a [Command]. The
/// [fmt::Display] output is the exact text sent back to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Only the prefix, or a device command before any protocol was selected
    NoMethod,
    /// The second token is neither a protocol nor a known verb
    NoCommand,
    /// A verb was given without a device address
    NoIp,
    /// The device address is malformed or outside the device pool
    IpOutOfRange,
    /// The verb is not valid at this arity
    UnknownCommand,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoMethod => write!(f, "Error: No method specified"),
            ParseError::NoCommand => write!(f, "Error: No command found"),
            ParseError::NoIp => write!(f, "No IP specified"),
            ParseError::IpOutOfRange => write!(f, "Error: IP out of range"),
            ParseError::UnknownCommand => write!(f, "Error: Unknown command"),
        }
    }
}

impl std::error::Error for ParseError {}

/// The pool of device addresses commands may target: a fixed /24 prefix and
/// an inclusive range of host octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagementRange {
    pub prefix: [u8; 3],
    pub first: u8,
    pub last: u8,
}

impl ManagementRange {
    pub const DEFAULT: ManagementRange = ManagementRange {
        prefix: [10, 0, 15],
        first: 61,
        last: 65,
    };

    /// Validates `s` as a device address in this range. Malformed literals
    /// and addresses outside the pool are not told apart.
    pub fn validate(&self, s: &str) -> Option<Ipv4Addr> {
        let ip = parse_dotted_quad(s)?;
        let [a, b, c, d] = ip.octets();
        if [a, b, c] == self.prefix && (self.first..=self.last).contains(&d) {
            Some(ip)
        } else {
            None
        }
    }
}

impl Default for ManagementRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parses a dotted-quad literal of exactly four decimal octets.
///
/// Unlike [Ipv4Addr]'s `FromStr` this accepts leading zeros (`010.0.15.61`),
/// since operators type addresses by hand.
fn parse_dotted_quad(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0_u8; 4];
    let mut count = 0;
    for part in s.split('.') {
        if count == 4 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        octets[count] = part.parse().ok()?;
        count += 1;
    }
    if count == 4 {
        Some(Ipv4Addr::from(octets))
    } else {
        None
    }
}

/// Verbs that are recognised on their own, so that we can tell the operator
/// they forgot the address
const BARE_VERBS: &[&str] = &[
    "create",
    "delete",
    "enable",
    "disable",
    "status",
    "motd",
    "gigabit_status",
];

/// Parses chat text addressed with a fixed prefix, e.g. `/66070220`.
#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: String,
    range: ManagementRange,
}

impl CommandParser {
    /// Creates a parser for messages starting with `/<bot_id>`
    pub fn new(bot_id: &str, range: ManagementRange) -> Self {
        CommandParser {
            prefix: format!("/{}", bot_id),
            range,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parses `text`. Returns `None` if the message is not addressed to us at
    /// all and should be ignored without a reply.
    pub fn parse(&self, text: &str) -> Option<Result<Command, ParseError>> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.first() != Some(&self.prefix.as_str()) {
            return None;
        }
        log::trace!("parser: classifying {} tokens", tokens.len());

        let verb = match tokens.as_slice() {
            [_] => Err(ParseError::NoMethod),
            [_, arg] => self.parse_single(arg),
            [_, ip, verb] => self.parse_device_command(ip, verb),
            [_, ip, verb, rest @ ..] => self.parse_banner_write(ip, verb, rest),
            [] => return None,
        };
        Some(verb.map(|verb| Command::new(text, verb)))
    }

    fn parse_single(&self, arg: &str) -> Result<Verb, ParseError> {
        if let Some(protocol) = Protocol::from_keyword(arg) {
            Ok(Verb::SelectProtocol(protocol))
        } else if parse_dotted_quad(arg).is_some() {
            Err(ParseError::NoCommand)
        } else if BARE_VERBS.contains(&arg) {
            Err(ParseError::NoIp)
        } else {
            Err(ParseError::NoCommand)
        }
    }

    fn parse_device_command(&self, ip: &str, verb: &str) -> Result<Verb, ParseError> {
        let ip = self.range.validate(ip).ok_or(ParseError::IpOutOfRange)?;
        if let Some(op) = InterfaceOp::from_keyword(verb) {
            return Ok(Verb::Interface { ip, op });
        }
        match verb {
            "motd" => Ok(Verb::ReadBanner { ip }),
            "gigabit_status" => Ok(Verb::InterfaceSummary { ip }),
            _ => Err(ParseError::UnknownCommand),
        }
    }

    fn parse_banner_write(&self, ip: &str, verb: &str, rest: &[&str]) -> Result<Verb, ParseError> {
        let ip = self.range.validate(ip).ok_or(ParseError::IpOutOfRange)?;
        if verb != "motd" {
            return Err(ParseError::UnknownCommand);
        }
        Ok(Verb::WriteBanner {
            ip,
            message: rest.join(" "),
        })
    }
}
