//! Integration tests for the NETCONF backend, against a [MockNetconfServer]
//! speaking base:1.0 over plain TCP.

use netops_bot::*;

use server::*;

#[tokio::test]
async fn test_full_lifecycle() {
    let _ = env_logger::try_init();
    let device = MockDevice::new();
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    backend.create(DEVICE_IP).await.expect("create failed");
    assert!(device.get().exists);
    assert!(backend.status(DEVICE_IP).await.unwrap().is_enabled());

    backend.disable(DEVICE_IP).await.expect("disable failed");
    assert!(!device.get().admin_up);
    assert!(backend.status(DEVICE_IP).await.unwrap().is_disabled());

    backend.enable(DEVICE_IP).await.expect("enable failed");
    assert!(device.get().admin_up);

    backend.delete(DEVICE_IP).await.expect("delete failed");
    assert!(!device.get().exists);
    assert_eq!(device.mutations(), 4);

    // one session per operation
    assert_eq!(server.sessions(), 6);
}

#[tokio::test]
async fn test_create_existing() {
    let _ = env_logger::try_init();
    let device = MockDevice::with_state(true, true, true);
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    let result = backend.create(DEVICE_IP).await;
    assert!(matches!(result, Err(Error::AlreadyExists)), "{:?}", result);
    assert_eq!(device.mutations(), 0);
}

#[tokio::test]
async fn test_operations_on_absent_interface() {
    let _ = env_logger::try_init();
    let device = MockDevice::new();
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    assert!(matches!(backend.delete(DEVICE_IP).await, Err(Error::NotFound)));
    assert!(matches!(backend.enable(DEVICE_IP).await, Err(Error::NotFound)));
    assert!(matches!(backend.disable(DEVICE_IP).await, Err(Error::NotFound)));
    assert!(matches!(backend.status(DEVICE_IP).await, Err(Error::NotFound)));
    assert_eq!(device.mutations(), 0);
}

#[tokio::test]
async fn test_already_in_state() {
    let _ = env_logger::try_init();
    let device = MockDevice::with_state(true, true, true);
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    assert!(matches!(backend.enable(DEVICE_IP).await, Err(Error::AlreadyInState)));

    device.set(LoopbackState {
        exists: true,
        admin_up: false,
        oper_up: false,
    });
    assert!(matches!(backend.disable(DEVICE_IP).await, Err(Error::AlreadyInState)));
    assert_eq!(device.mutations(), 0);
}

#[tokio::test]
async fn test_status_is_read_only() {
    let _ = env_logger::try_init();
    let device = MockDevice::with_state(true, true, false);
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    for _ in 0..3 {
        let state = backend.status(DEVICE_IP).await.expect("status failed");
        assert_eq!(state.admin, LinkState::Up);
        assert_eq!(state.oper, LinkState::Down);
    }
    assert_eq!(device.mutations(), 0);
    assert_eq!(server.sessions(), 3);
}

#[tokio::test]
async fn test_unreachable_device() {
    let _ = env_logger::try_init();
    // a connector aimed at a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let backend = NetconfBackend::new(ClosedPort(port));

    let result = backend.create(DEVICE_IP).await;
    assert!(matches!(result, Err(Error::IoError(_))), "{:?}", result);
    assert_eq!(
        Response::Lifecycle {
            change: InterfaceChange::Create,
            result
        }
        .to_string(),
        "Cannot create: Interface loopback 66070220"
    );
}

struct ClosedPort(u16);

impl NetconfConnector for ClosedPort {
    type Stream = tokio::net::TcpStream;

    async fn open_stream(&self, _ip: std::net::Ipv4Addr) -> Result<Self::Stream> {
        Ok(tokio::net::TcpStream::connect(("127.0.0.1", self.0)).await?)
    }
}

#[tokio::test]
async fn test_unacknowledged_changes() {
    let _ = env_logger::try_init();
    let device = MockDevice::new();
    device.set_refuse_changes(true);
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    let result = backend.create(DEVICE_IP).await;
    assert!(matches!(result, Err(Error::NotAcknowledged)), "{:?}", result);
    assert_eq!(
        Response::Lifecycle {
            change: InterfaceChange::Create,
            result
        }
        .to_string(),
        "Cannot create: Interface loopback 66070220"
    );
    assert!(!device.get().exists);

    device.set(LoopbackState {
        exists: true,
        admin_up: true,
        oper_up: true,
    });
    let result = backend.disable(DEVICE_IP).await;
    assert!(matches!(result, Err(Error::NotAcknowledged)), "{:?}", result);
    assert_eq!(
        Response::Lifecycle {
            change: InterfaceChange::Disable,
            result
        }
        .to_string(),
        "Cannot shutdown: Interface loopback 66070220"
    );

    let result = backend.delete(DEVICE_IP).await;
    assert!(matches!(result, Err(Error::NotAcknowledged)), "{:?}", result);
    assert_eq!(
        Response::Lifecycle {
            change: InterfaceChange::Delete,
            result
        }
        .to_string(),
        "Cannot delete: Interface loopback 66070220"
    );
    assert!(device.get().exists);
    assert_eq!(device.mutations(), 0);
}

#[tokio::test]
async fn test_denied_read_blocks_changes() {
    let _ = env_logger::try_init();
    let device = MockDevice::new();
    device.set_deny_reads(true);
    let server = device.start_netconf().await.expect("failed to start server");
    let backend = NetconfBackend::new(server.connector());

    // an rpc-error to get-config is not an absent interface
    let result = backend.create(DEVICE_IP).await;
    match &result {
        Err(Error::RpcError(message)) => assert_eq!(message, "resource denied"),
        other => panic!("expected an rpc-error, got {:?}", other),
    }
    assert_eq!(
        Response::Lifecycle {
            change: InterfaceChange::Create,
            result
        }
        .to_string(),
        "Cannot create: Interface loopback 66070220"
    );
    assert!(!device.get().exists);

    device.set(LoopbackState {
        exists: true,
        admin_up: true,
        oper_up: true,
    });
    assert!(matches!(backend.delete(DEVICE_IP).await, Err(Error::RpcError(_))));
    assert!(matches!(backend.status(DEVICE_IP).await, Err(Error::RpcError(_))));
    assert!(device.get().exists);
    assert_eq!(device.mutations(), 0);
}
