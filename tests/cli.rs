//! Exit codes of the `jmserver` binary.

use std::{
    fs,
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    path::Path,
    process::{Command, Output, Stdio},
    thread,
    time::{Duration, Instant},
};

use serde_json::json;

fn jmserver(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jmserver"))
        .args(args)
        .current_dir(dir)
        .env_remove("JMSERVER_LOG")
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

#[test]
fn missing_file_flag_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = jmserver(dir.path(), &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--file"));
}

#[test]
fn help_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let out = jmserver(dir.path(), &["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("--devmode"));
}

#[test]
fn check_accepts_a_valid_fixture() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "users.json", r#"[{"id": 1}]"#);
    write(
        dir.path(),
        "fixture.json",
        &json!({"routes": [
            {"method": "GET", "path": "/users", "data": "json://users.json"},
            {"method": "POST", "path": "/users", "status_code": 201, "data": {"ok": true}}
        ]})
        .to_string(),
    );

    let out = jmserver(dir.path(), &["--check", "--file", "fixture.json"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("fixture is valid"));
}

#[test]
fn check_rejects_duplicate_routes() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "fixture.json",
        &json!({"routes": [
            {"method": "GET", "path": "/a", "data": 1},
            {"method": "GET", "path": "/a", "data": 2}
        ]})
        .to_string(),
    );

    let out = jmserver(dir.path(), &["--check", "--file", "fixture.json"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn check_rejects_a_missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "fixture.json",
        &json!({"routes": [{"method": "GET", "path": "/a", "data": "json://gone.json"}]}).to_string(),
    );

    let out = jmserver(dir.path(), &["--check", "--file", "fixture.json"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn serve_fails_on_a_broken_fixture() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "fixture.json", "{ not json");

    let port = free_port().to_string();
    let out = jmserver(dir.path(), &["--file", "fixture.json", "--port", &port]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn serve_fails_on_a_missing_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let port = free_port().to_string();
    let out = jmserver(dir.path(), &["--file", "absent.json", "--port", &port]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn serve_fails_when_the_port_is_taken() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "fixture.json", r#"{"routes": []}"#);
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port().to_string();

    let out = jmserver(dir.path(), &["--file", "fixture.json", "--port", &port]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn exit_endpoint_ends_the_process_with_success() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "fixture.json", r#"{"routes": []}"#);
    let port = free_port();

    let mut child = Command::new(env!("CARGO_BIN_EXE_jmserver"))
        .args(["--file", "fixture.json", "--port", &port.to_string()])
        .current_dir(dir.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut stream = loop {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(stream) => break stream,
            Err(_) if Instant::now() < deadline => thread::sleep(Duration::from_millis(50)),
            Err(e) => {
                let _ = child.kill();
                panic!("server never came up: {e}");
            }
        }
    };
    stream
        .write_all(b"GET /exit-server HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    assert!(response.starts_with("HTTP/1.1 200"));

    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("server did not exit after /exit-server");
        }
        thread::sleep(Duration::from_millis(50));
    };
    assert_eq!(status.code(), Some(0));
}
