//! The outbound side of every command: a typed result that is collapsed into
//! the plain reply text only when it's rendered with [fmt::Display].

use std::fmt;

use crate::{
    Error, InterfaceChange, InterfaceIdentity, InterfaceState, ParseError, Protocol, Result,
};

/// The result of handling one command, before it's turned into chat text
#[derive(Debug)]
pub enum Response {
    /// The command was rejected before reaching any backend
    Rejected(ParseError),
    /// A protocol was selected
    Selected(Protocol),
    /// A create, delete, enable or disable completed (or didn't)
    Lifecycle {
        change: InterfaceChange,
        result: Result<()>,
    },
    /// Result of a status query
    Status(Result<InterfaceState>),
    /// Result of reading the banner
    Banner(Result<String>),
    /// Result of writing the banner
    BannerSet(Result<()>),
    /// Result of summarising the GigabitEthernet interfaces
    InterfaceSummary(Result<String>),
}

impl Response {
    /// The underlying failure, if any, so that it can be logged before the
    /// detail is lost in rendering
    pub fn failure(&self) -> Option<&Error> {
        match self {
            Response::Lifecycle { result, .. } | Response::BannerSet(result) => {
                result.as_ref().err()
            }
            Response::Status(result) => result.as_ref().err(),
            Response::Banner(result) | Response::InterfaceSummary(result) => result.as_ref().err(),
            Response::Rejected(_) | Response::Selected(_) => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = InterfaceIdentity::LOOPBACK.label;
        match self {
            Response::Rejected(err) => write!(f, "{}", err),
            Response::Selected(protocol) => write!(f, "Ok: {}", protocol),
            Response::Lifecycle { change, result } => match result {
                Ok(()) => write!(
                    f,
                    "Interface loopback {} is {} successfully",
                    label,
                    change.past_tense()
                ),
                Err(_) if *change == InterfaceChange::Disable => {
                    write!(f, "Cannot shutdown: Interface loopback {}", label)
                }
                Err(_) => write!(f, "Cannot {}: Interface loopback {}", change, label),
            },
            Response::Status(Ok(state)) if state.is_enabled() => {
                write!(f, "Interface loopback {} is enabled", label)
            }
            Response::Status(Ok(state)) if state.is_disabled() => {
                write!(f, "Interface loopback {} is disabled", label)
            }
            // mixed admin/oper state is reported like a missing interface
            Response::Status(_) => write!(f, "No Interface loopback {}", label),
            Response::Banner(Ok(text)) => write!(f, "{}", text),
            Response::Banner(Err(_)) => write!(f, "Error: No MOTD Configured"),
            Response::BannerSet(Ok(())) => write!(f, "Ok: success"),
            Response::BannerSet(Err(Error::RunnerNotFound(_))) => {
                write!(f, "Error: playbook runner not found")
            }
            Response::BannerSet(Err(_)) => write!(f, "Error: Failed to set MOTD"),
            Response::InterfaceSummary(Ok(text)) => write!(f, "{}", text),
            Response::InterfaceSummary(Err(_)) => {
                write!(f, "Error: Cannot get interface status")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_rendering() {
        let ok = |change| Response::Lifecycle { change, result: Ok(()) }.to_string();
        let err = |change| {
            Response::Lifecycle {
                change,
                result: Err(Error::NotFound),
            }
            .to_string()
        };
        assert_eq!(
            ok(InterfaceChange::Create),
            "Interface loopback 66070220 is created successfully"
        );
        assert_eq!(
            ok(InterfaceChange::Disable),
            "Interface loopback 66070220 is shutdowned successfully"
        );
        assert_eq!(err(InterfaceChange::Delete), "Cannot delete: Interface loopback 66070220");
        assert_eq!(err(InterfaceChange::Enable), "Cannot enable: Interface loopback 66070220");
        assert_eq!(err(InterfaceChange::Disable), "Cannot shutdown: Interface loopback 66070220");
    }

    #[test]
    fn test_status_rendering() {
        let render = |r| Response::Status(r).to_string();
        assert_eq!(
            render(Ok(InterfaceState::new("up", "up"))),
            "Interface loopback 66070220 is enabled"
        );
        assert_eq!(
            render(Ok(InterfaceState::new("down", "down"))),
            "Interface loopback 66070220 is disabled"
        );
        assert_eq!(
            render(Ok(InterfaceState::new("up", "down"))),
            "No Interface loopback 66070220"
        );
        assert_eq!(render(Err(Error::NotFound)), "No Interface loopback 66070220");
        assert_eq!(render(Err(Error::Timeout)), "No Interface loopback 66070220");
    }

    #[test]
    fn test_banner_rendering() {
        assert_eq!(Response::Banner(Ok("Welcome".into())).to_string(), "Welcome");
        assert_eq!(
            Response::Banner(Err(Error::NoBanner)).to_string(),
            "Error: No MOTD Configured"
        );
        assert_eq!(Response::BannerSet(Ok(())).to_string(), "Ok: success");
        assert_eq!(
            Response::BannerSet(Err(Error::PlaybookFailed)).to_string(),
            "Error: Failed to set MOTD"
        );
        assert_eq!(
            Response::BannerSet(Err(Error::RunnerNotFound("ansible-playbook".into())))
                .to_string(),
            "Error: playbook runner not found"
        );
    }

    #[test]
    fn test_failure_is_exposed() {
        let response = Response::Lifecycle {
            change: InterfaceChange::Create,
            result: Err(Error::AlreadyExists),
        };
        assert!(matches!(response.failure(), Some(Error::AlreadyExists)));
        assert!(Response::Selected(Protocol::Netconf).failure().is_none());
        assert_eq!(Response::Selected(Protocol::Netconf).to_string(), "Ok: Netconf");
    }
}
