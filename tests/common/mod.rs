//! Shared helpers for the integration tests.

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use jsonmockserver::lifecycle::{Coordinator, ServerSettings, ShutdownError};
use serde_json::Value;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    task::JoinHandle,
};

pub fn write_fixture(dir: &Path, fixture: &Value) -> PathBuf {
    let path = dir.join("fixture.json");
    fs::write(&path, serde_json::to_vec_pretty(fixture).unwrap()).unwrap();
    path
}

pub fn settings(fixture: &Path) -> ServerSettings {
    ServerSettings::new(fixture, "127.0.0.1:0")
        .drain_timeout(Duration::from_millis(200))
        .exit_delay(Duration::from_millis(100))
}

/// Sends one request and returns the status and raw body.
pub async fn send(addr: SocketAddr, method: &str, path: &str) -> std::io::Result<(u16, String)> {
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let text = String::from_utf8_lossy(&buf).to_string();
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    Ok((status, body.to_string()))
}

#[allow(dead_code)]
pub async fn get_json(addr: SocketAddr, method: &str, path: &str) -> (u16, Value) {
    let (status, body) = send(addr, method, path).await.unwrap();
    let value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, value)
}

/// Polls `path` until it answers with `status` or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_for_status(addr: SocketAddr, method: &str, path: &str, status: u16, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if let Ok((got, _)) = send(addr, method, path).await {
            if got == status {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[allow(dead_code)]
pub fn spawn_run(coordinator: Coordinator) -> JoinHandle<Result<(), ShutdownError>> {
    tokio::spawn(coordinator.run())
}
