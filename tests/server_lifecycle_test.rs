use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use phase_diagram_api::{ApiError, Result, Server, ServerConfig, VolumeResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const PARTIAL_REQUEST: &[u8] = b"GET /phase-change-diagram?pressure=5 HTTP/1.1\r\nHost: x\r\n";
const FULL_REQUEST: &[u8] = b"GET /phase-change-diagram?pressure=5 HTTP/1.1\r\nHost: x\r\n\r\n";

fn local_config() -> ServerConfig {
    ServerConfig {
        bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        shutdown_timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    }
}

async fn start(config: ServerConfig) -> (SocketAddr, CancellationToken, JoinHandle<Result<()>>) {
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));
    (addr, cancel, handle)
}

/// Reads until the server closes the connection. `None` if it is still open after `wait`.
async fn read_until_closed(stream: &mut TcpStream, wait: Duration) -> Option<String> {
    let deadline = tokio::time::Instant::now() + wait;
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match tokio::time::timeout_at(deadline, stream.read(&mut buf)).await {
            Err(_) => return None,
            Ok(Ok(0)) | Ok(Err(_)) => return Some(String::from_utf8_lossy(&received).into_owned()),
            Ok(Ok(n)) => received.extend_from_slice(&buf[..n]),
        }
    }
}

#[tokio::test]
async fn test_serves_requests_and_shuts_down_on_cancel() {
    let server = Server::bind(local_config()).await.unwrap();
    let addr = server.local_addr().unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/phase-change-diagram"))
        .query(&[("pressure", "5")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body: VolumeResult = response.json().await.unwrap();
    assert!(body.specific_volume_liquid < body.specific_volume_vapor);

    let response = client
        .get(format!("http://{addr}/phase-change-diagram?pressure=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.bytes().await.unwrap().is_empty());
    drop(client);

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("server did not stop after cancellation")
        .unwrap();
    assert!(result.is_ok());

    // listener is closed once run() returns
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_bind_fails_when_port_taken() {
    let first = Server::bind(local_config()).await.unwrap();
    let taken = first.local_addr().unwrap();

    let config = ServerConfig {
        bind_addr: taken,
        ..local_config()
    };
    let err = Server::bind(config).await.err().unwrap();
    assert!(matches!(err, ApiError::IoError(_)));
}

#[tokio::test]
async fn test_bind_rejects_invalid_config() {
    let config = ServerConfig {
        read_timeout: Duration::ZERO,
        ..local_config()
    };
    let err = Server::bind(config).await.err().unwrap();
    assert!(matches!(err, ApiError::ConfigError { .. }));
}

#[tokio::test]
async fn test_slow_request_head_is_closed_after_read_timeout() {
    let config = ServerConfig {
        read_timeout: Duration::from_secs(1),
        ..local_config()
    };
    let (addr, cancel, handle) = start(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(PARTIAL_REQUEST).await.unwrap();

    let started = std::time::Instant::now();
    let received = read_until_closed(&mut stream, Duration::from_secs(3))
        .await
        .expect("connection with an unfinished request head was not closed");
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!received.contains("200 OK"), "{received}");

    cancel.cancel();
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_idle_keep_alive_connection_is_closed() {
    let config = ServerConfig {
        idle_timeout: Duration::from_millis(300),
        read_timeout: Duration::from_secs(10),
        ..local_config()
    };
    let (addr, cancel, handle) = start(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(FULL_REQUEST).await.unwrap();

    let received = read_until_closed(&mut stream, Duration::from_secs(3))
        .await
        .expect("idle connection was not closed");
    assert!(received.starts_with("HTTP/1.1 200 OK"), "{received}");

    cancel.cancel();
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_shutdown_lets_in_flight_request_finish() {
    let config = ServerConfig {
        read_timeout: Duration::from_secs(10),
        shutdown_timeout: Duration::from_secs(5),
        ..local_config()
    };
    let (addr, cancel, handle) = start(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(PARTIAL_REQUEST).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    cancel.cancel();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!handle.is_finished());

    stream.write_all(b"\r\n").await.unwrap();
    let received = read_until_closed(&mut stream, Duration::from_secs(3))
        .await
        .expect("connection stayed open after the drained request");
    assert!(received.starts_with("HTTP/1.1 200 OK"), "{received}");

    let result = tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("server did not finish draining")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_force_closes_after_drain_window() {
    let config = ServerConfig {
        read_timeout: Duration::from_secs(10),
        shutdown_timeout: Duration::from_millis(500),
        ..local_config()
    };
    let (addr, cancel, handle) = start(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(PARTIAL_REQUEST).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = std::time::Instant::now();
    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("server did not stop after the drain window")
        .unwrap();
    assert!(result.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(450));

    // the half-sent request must not be served any more
    let _ = stream.write_all(b"\r\n").await;
    let received = read_until_closed(&mut stream, Duration::from_secs(1))
        .await
        .expect("connection survived the forced shutdown");
    assert!(!received.contains("200 OK"), "{received}");
}
