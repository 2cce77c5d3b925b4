use std::{fmt, net::Ipv4Addr};

/// The device-management protocol used for loopback lifecycle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// HTTP transported, YANG modelled JSON
    Restconf,
    /// XML RPCs over an SSH subsystem
    Netconf,
}

impl Protocol {
    /// Parses the keyword an operator uses to pick a protocol. Matching is
    /// exact, so `RESTCONF` is not a selection.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "restconf" => Some(Protocol::Restconf),
            "netconf" => Some(Protocol::Netconf),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Restconf => write!(f, "Restconf"),
            Protocol::Netconf => write!(f, "Netconf"),
        }
    }
}

/// One of the five lifecycle operations on the loopback interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceOp {
    Create,
    Delete,
    Enable,
    Disable,
    Status,
}

impl InterfaceOp {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "create" => Some(InterfaceOp::Create),
            "delete" => Some(InterfaceOp::Delete),
            "enable" => Some(InterfaceOp::Enable),
            "disable" => Some(InterfaceOp::Disable),
            "status" => Some(InterfaceOp::Status),
            _ => None,
        }
    }
}

impl InterfaceOp {
    /// The change this operation makes to the device, or None for a status
    /// read
    pub fn change(self) -> Option<InterfaceChange> {
        match self {
            InterfaceOp::Create => Some(InterfaceChange::Create),
            InterfaceOp::Delete => Some(InterfaceChange::Delete),
            InterfaceOp::Enable => Some(InterfaceChange::Enable),
            InterfaceOp::Disable => Some(InterfaceChange::Disable),
            InterfaceOp::Status => None,
        }
    }
}

impl fmt::Display for InterfaceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterfaceOp::Create => "create",
            InterfaceOp::Delete => "delete",
            InterfaceOp::Enable => "enable",
            InterfaceOp::Disable => "disable",
            InterfaceOp::Status => "status",
        };
        f.write_str(s)
    }
}

/// The lifecycle operations that modify the loopback interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceChange {
    Create,
    Delete,
    Enable,
    Disable,
}

impl InterfaceChange {
    /// Word used in the success reply, e.g. "is created successfully"
    pub fn past_tense(self) -> &'static str {
        match self {
            InterfaceChange::Create => "created",
            InterfaceChange::Delete => "deleted",
            InterfaceChange::Enable => "enabled",
            InterfaceChange::Disable => "shutdowned",
        }
    }
}

impl fmt::Display for InterfaceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterfaceChange::Create => "create",
            InterfaceChange::Delete => "delete",
            InterfaceChange::Enable => "enable",
            InterfaceChange::Disable => "disable",
        };
        f.write_str(s)
    }
}

/// What a [Command] asks for. Every variant that touches a device carries
/// the validated device address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    SelectProtocol(Protocol),
    Interface { ip: Ipv4Addr, op: InterfaceOp },
    ReadBanner { ip: Ipv4Addr },
    WriteBanner { ip: Ipv4Addr, message: String },
    InterfaceSummary { ip: Ipv4Addr },
}

/// A fully parsed and validated chat command. There's no way to build a
/// partially valid one: the parser either returns this, or a
/// [crate::ParseError].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    raw: String,
    verb: Verb,
}

impl Command {
    pub(crate) fn new(raw: &str, verb: Verb) -> Self {
        Command {
            raw: raw.to_owned(),
            verb,
        }
    }

    /// The message text this command was parsed from
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Number of whitespace separated tokens in the original text,
    /// including the prefix
    pub fn arg_count(&self) -> usize {
        self.raw.split_whitespace().count()
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    pub fn into_verb(self) -> Verb {
        self.verb
    }

    pub fn target_ip(&self) -> Option<Ipv4Addr> {
        match &self.verb {
            Verb::SelectProtocol(_) => None,
            Verb::Interface { ip, .. }
            | Verb::ReadBanner { ip }
            | Verb::WriteBanner { ip, .. }
            | Verb::InterfaceSummary { ip } => Some(*ip),
        }
    }

    pub fn banner_message(&self) -> Option<&str> {
        match &self.verb {
            Verb::WriteBanner { message, .. } => Some(message),
            _ => None,
        }
    }
}
