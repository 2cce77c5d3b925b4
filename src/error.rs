use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while talking to the chat service or to a
/// device. Failures from device backends are reported back to the room as a
/// plain outcome string, so the variants here only matter for logging and
/// for deciding which string gets sent.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Simple wrapper over all I/O related errors
    #[error("IO operation failed")]
    IoError(#[from] std::io::Error),
    /// The HTTP exchange itself failed (connect, TLS, timeout, body)
    #[error("HTTP request failed")]
    HttpError(#[from] reqwest::Error),
    /// The SSH session failed before we got a usable channel
    #[error("SSH session failed")]
    SshError(#[from] russh::Error),
    /// A JSON body did not have the shape we expected
    #[error("failed to decode JSON body")]
    JsonError(#[from] serde_json::Error),
    /// The device refused our credentials
    #[error("authentication rejected by {0}")]
    AuthenticationFailed(String),
    /// The chat service answered with a non-success status. This is the only
    /// error the dispatcher treats as fatal.
    #[error("chat service replied with status code {0}")]
    ChatStatus(u16),
    /// A device answered with a status code we don't accept for the request
    #[error("device replied with status code {0}")]
    UnexpectedStatus(u16),
    /// The device answered, but without an affirmative acknowledgement
    #[error("device did not acknowledge the request")]
    NotAcknowledged,
    /// The device answered a NETCONF request with an `<rpc-error>`
    #[error("device returned rpc-error: {0}")]
    RpcError(String),
    /// We were unable to make sense of what the device sent back
    #[error("received invalid reply: {0}")]
    InvalidReply(String),
    /// The loopback interface is already present
    #[error("interface already exists")]
    AlreadyExists,
    /// The loopback interface is not present
    #[error("interface does not exist")]
    NotFound,
    /// The loopback interface is already in the requested admin/oper state
    #[error("interface is already in the requested state")]
    AlreadyInState,
    /// The running configuration carries no banner
    #[error("no banner configured")]
    NoBanner,
    /// The playbook runner could not be located
    #[error("playbook runner {0} not found")]
    RunnerNotFound(String),
    /// The playbook run reported failed tasks, or never reported at all
    #[error("playbook run did not succeed")]
    PlaybookFailed,
    /// An operation exceeded its execution ceiling
    #[error("operation timed out")]
    Timeout,
}

impl Error {
    pub fn eof(err: &str) -> Self {
        Self::IoError(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err))
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidReply("failed to parse as utf8".into())
    }
}
