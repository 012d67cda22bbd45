//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tarot_relay::{RelayConfig, RelayServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as received by the mock upstream.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    /// Request line and headers, lowercased.
    pub head: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Read one HTTP/1.1 request.
async fn read_request(socket: &mut TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return RecordedRequest::default();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    RecordedRequest {
        head,
        body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
    }
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// `f` receives each request and returns the status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(request).await;
                        let response_str = format!(
                            "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Relay configuration pointing at a mock upstream, with fast backoff.
pub fn relay_config(upstream: SocketAddr) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.endpoint = format!("http://{}/v1/chat/completions", upstream);
    config.upstream.api_key = Some(SecretString::new("test-key".to_string()));
    config.upstream.backoff_unit_ms = 10;
    config.upstream.attempt_timeout_secs = 5;
    config.upstream.use_system_proxy = false;
    config
}

/// A relay running in the background.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a relay on an ephemeral port.
pub async fn spawn_relay(config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = RelayServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    TestRelay { addr, shutdown }
}

/// HTTP client that never pools connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap()
}
