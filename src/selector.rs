use crate::Protocol;

/// Holds the protocol chosen by the last selection command.
///
/// Starts out unset, the last selection wins, and nothing is kept across
/// restarts. The dispatcher owns the only instance and is single threaded,
/// so there's no locking here.
#[derive(Debug, Default)]
pub struct ProtocolSelector {
    current: Option<Protocol>,
}

impl ProtocolSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any previous selection
    pub fn select(&mut self, protocol: Protocol) {
        if let Some(previous) = self.current.replace(protocol) {
            log::debug!("selector: {} replaced by {}", previous, protocol);
        } else {
            log::debug!("selector: {} selected", protocol);
        }
    }

    pub fn current(&self) -> Option<Protocol> {
        self.current
    }
}
