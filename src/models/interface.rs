use std::{fmt, net::Ipv4Addr};

/// The loopback interface every lifecycle command operates on. It's the
/// same on every device, only the device address varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceIdentity {
    /// Name as configured on the device
    pub name: &'static str,
    /// Short label used in replies, e.g. "Interface loopback 66070220"
    pub label: &'static str,
    pub description: &'static str,
    /// YANG identity of the interface type
    pub iftype: &'static str,
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl InterfaceIdentity {
    pub const LOOPBACK: InterfaceIdentity = InterfaceIdentity {
        name: "Loopback66070220",
        label: "66070220",
        description: "66070220 Loopback interface",
        iftype: "softwareLoopback",
        address: Ipv4Addr::new(172, 2, 20, 1),
        netmask: Ipv4Addr::new(255, 255, 255, 0),
    };
}

/// Admin or operational state of an interface, as reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
    /// Anything else the device may report, e.g. `testing` or `dormant`
    Other(String),
}

impl LinkState {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "up" => LinkState::Up,
            "down" => LinkState::Down,
            other => LinkState::Other(other.to_owned()),
        }
    }
}

/// Admin and operational state of the loopback interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceState {
    pub admin: LinkState,
    pub oper: LinkState,
}

impl InterfaceState {
    pub fn new(admin: &str, oper: &str) -> Self {
        InterfaceState {
            admin: LinkState::parse(admin),
            oper: LinkState::parse(oper),
        }
    }

    /// Both admin and oper state are up
    pub fn is_enabled(&self) -> bool {
        self.admin == LinkState::Up && self.oper == LinkState::Up
    }

    /// Both admin and oper state are down
    pub fn is_disabled(&self) -> bool {
        self.admin == LinkState::Down && self.oper == LinkState::Down
    }
}

/// One line of `show ip interface brief`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceBrief {
    pub name: String,
    pub ip_address: String,
    /// Line status, e.g. `up`, `down` or `administratively down`
    pub status: String,
    pub protocol: String,
}

impl InterfaceBrief {
    /// Parse a single row of `show ip interface brief`. Returns None for the
    /// header row, or for anything that doesn't have enough columns.
    ///
    /// The status column may itself contain a space (`administratively
    /// down`), so we take the fixed columns from both ends and treat the
    /// rest as the status.
    pub fn from_line(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 6 || tokens[0] == "Interface" {
            return None;
        }
        let protocol = tokens[tokens.len() - 1];
        let status = tokens[4..tokens.len() - 1].join(" ");
        if status.is_empty() {
            log::error!("ifc: unable to determine status in {}", line);
            return None;
        }
        Some(InterfaceBrief {
            name: tokens[0].to_owned(),
            ip_address: tokens[1].to_owned(),
            status,
            protocol: protocol.to_owned(),
        })
    }
}

/// Summary of the GigabitEthernet interfaces on a device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GigabitSummary {
    pub interfaces: Vec<InterfaceBrief>,
    pub up: usize,
    pub down: usize,
    pub admin_down: usize,
}

impl GigabitSummary {
    /// Builds the summary from the full output of `show ip interface brief`
    pub fn from_output(output: &str) -> Self {
        let mut summary = GigabitSummary::default();
        for brief in output.lines().filter_map(InterfaceBrief::from_line) {
            if !brief.name.starts_with("GigabitEthernet") {
                continue;
            }
            match brief.status.as_str() {
                "up" => summary.up += 1,
                "down" => summary.down += 1,
                "administratively down" => summary.admin_down += 1,
                _ => {}
            }
            summary.interfaces.push(brief);
        }
        summary
    }
}

impl fmt::Display for GigabitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self
            .interfaces
            .iter()
            .map(|i| format!("{} {}", i.name, i.status))
            .collect::<Vec<String>>()
            .join(", ");
        write!(
            f,
            "{} -> {} up, {} down, {} administratively down",
            list, self.up, self.down, self.admin_down
        )
    }
}
