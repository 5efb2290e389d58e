//! Integration tests for the HTTP layer
//!
//! These tests run the file server on a loopback socket and talk to it
//! with the client and with raw TCP streams.

use minihttp::http::client::{download, Destination};
use minihttp::http::{DocumentRoot, Error, FileServer};
use minihttp::shutdown::ShutdownToken;
use std::fs;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::path::Path;
use std::process::Command;
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownToken,
    handle: Option<JoinHandle<minihttp::http::Result<()>>>,
}

impl TestServer {
    fn start(root: &Path, index: &str) -> Self {
        let mut server = FileServer::bind(
            "127.0.0.1:0".parse().unwrap(),
            DocumentRoot::new(root, index),
        )
        .unwrap();
        server.set_poll_interval(Duration::from_millis(20));

        let addr = server.local_addr().unwrap();
        let shutdown = ShutdownToken::new();
        let token = shutdown.clone();
        let handle = thread::spawn(move || server.run(&token));

        TestServer {
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1/{path}")
    }

    fn raw(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(self.addr).unwrap();
        stream.write_all(request).unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).unwrap();
        response
    }

    fn stop(mut self) -> minihttp::http::Result<()> {
        self.shutdown.cancel();
        self.handle.take().unwrap().join().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn split_response(response: &[u8]) -> (String, &[u8]) {
    let end = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator")
        + 4;
    (String::from_utf8_lossy(&response[..end]).into_owned(), &response[end..])
}

#[test]
fn test_binary_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    // Larger than the stream buffer, with plenty of zero bytes and CRLFs
    let data: Vec<u8> = (0..3 * 1024 * 1024 + 17)
        .map(|i: usize| match i % 7 {
            0 => 0,
            1 => b'\r',
            2 => b'\n',
            _ => (i % 251) as u8,
        })
        .collect();
    fs::write(root.path().join("blob.bin"), &data).unwrap();

    let server = TestServer::start(root.path(), "index.html");
    let destination = Destination::Directory(out.path().to_path_buf());

    let n = download(&server.url("blob.bin"), server.addr.port(), &destination).unwrap();
    assert_eq!(n, data.len() as u64);
    assert_eq!(fs::read(out.path().join("blob.bin")).unwrap(), data);

    server.stop().unwrap();
}

#[test]
fn test_index_download() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(root.path().join("index.html"), b"<html>home</html>").unwrap();

    let server = TestServer::start(root.path(), "index.html");
    let destination = Destination::Directory(out.path().to_path_buf());

    download(&server.url(""), server.addr.port(), &destination).unwrap();
    assert_eq!(
        fs::read(out.path().join("index.html")).unwrap(),
        b"<html>home</html>"
    );
}

#[test]
fn test_custom_index_to_file() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(root.path().join("start.txt"), b"start page").unwrap();
    let target = out.path().join("saved.txt");

    let server = TestServer::start(root.path(), "start.txt");

    download(
        &server.url(""),
        server.addr.port(),
        &Destination::File(target.clone()),
    )
    .unwrap();
    assert_eq!(fs::read(&target).unwrap(), b"start page");
}

#[test]
fn test_missing_index_is_non_success() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let server = TestServer::start(root.path(), "index.html");
    let destination = Destination::Directory(out.path().to_path_buf());

    let err = download(&server.url(""), server.addr.port(), &destination).unwrap_err();
    assert!(matches!(&err, Error::NonSuccessStatus { code: 404, reason } if reason == "Not Found"));
    assert_eq!(err.exit_code(), 3);
    assert!(!out.path().join("index.html").exists());
}

#[test]
fn test_raw_not_found() {
    let root = tempfile::tempdir().unwrap();
    let server = TestServer::start(root.path(), "index.html");

    let response =
        server.raw(b"GET /missing.txt HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    assert_eq!(response, b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n");
}

#[test]
fn test_raw_not_implemented() {
    let root = tempfile::tempdir().unwrap();
    let server = TestServer::start(root.path(), "index.html");

    let response = server.raw(b"POST /x HTTP/1.1\r\n\r\n");
    assert_eq!(
        response,
        b"HTTP/1.1 501 Not Implemented\r\nConnection: close\r\n\r\n"
    );
}

#[test]
fn test_raw_success_headers() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("a.txt"), b"hello").unwrap();
    let server = TestServer::start(root.path(), "index.html");

    let response = server.raw(b"GET /a.txt HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (head, body) = split_response(&response);

    let lines: Vec<&str> = head.split("\r\n").collect();
    assert_eq!(lines[0], "HTTP/1.1 200 OK");
    assert!(lines[1].starts_with("Date: ") && lines[1].ends_with(" GMT"));
    assert_eq!(lines[2], "Content-Length: 5");
    assert_eq!(lines[3], "Connection: close");
    assert_eq!(body, b"hello");
}

#[test]
fn test_bad_requests_do_not_stop_server() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("ok.txt"), b"still here").unwrap();
    let server = TestServer::start(root.path(), "index.html");

    let bad_request = b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n";
    assert_eq!(server.raw(b"GET /ok.txt HTTP/1.0\r\n\r\n"), bad_request);
    assert_eq!(server.raw(b"garbage\r\n\r\n"), bad_request);
    assert_eq!(server.raw(b"GET /../ok.txt HTTP/1.1\r\n\r\n"), bad_request);

    // Truncated header: the peer stops sending before the blank line
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.write_all(b"GET /ok.txt HTTP/1.1\r\nHost: x\r\n").unwrap();
    stream.shutdown(Shutdown::Write).unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    assert_eq!(response, bad_request);

    let response = server.raw(b"GET /ok.txt HTTP/1.1\r\n\r\n");
    assert_eq!(split_response(&response).1, b"still here");

    server.stop().unwrap();
}

#[test]
fn test_sequential_clients() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for i in 0..5 {
        fs::write(root.path().join(format!("f{i}.txt")), format!("file {i}")).unwrap();
    }

    let server = TestServer::start(root.path(), "index.html");
    let destination = Destination::Directory(out.path().to_path_buf());

    for i in 0..5 {
        download(
            &server.url(&format!("f{i}.txt")),
            server.addr.port(),
            &destination,
        )
        .unwrap();
    }

    for i in 0..5 {
        assert_eq!(
            fs::read_to_string(out.path().join(format!("f{i}.txt"))).unwrap(),
            format!("file {i}")
        );
    }
}

#[test]
fn test_shutdown_when_idle() {
    let root = tempfile::tempdir().unwrap();
    let server = TestServer::start(root.path(), "index.html");

    thread::sleep(Duration::from_millis(50));
    server.stop().unwrap();
}

#[test]
fn test_shutdown_finishes_current_connection() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("late.txt"), b"served anyway").unwrap();
    let server = TestServer::start(root.path(), "index.html");

    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.write_all(b"GET /late.txt HTTP/1.1\r\n").unwrap();

    // Let the server accept and start reading, then ask it to stop
    thread::sleep(Duration::from_millis(200));
    server.shutdown.cancel();

    stream.write_all(b"Host: x\r\n\r\n").unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();

    let (head, body) = split_response(&response);
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"served anyway");

    server.stop().unwrap();
}

#[test]
fn test_connection_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = download("http://127.0.0.1/x", port, &Destination::Stdout).unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
    assert_eq!(err.exit_code(), 1);
}

fn run_client(port: u16, out: &Path, url: &str) -> Option<i32> {
    Command::new(env!("CARGO_BIN_EXE_client"))
        .arg("-p")
        .arg(port.to_string())
        .arg("-d")
        .arg(out)
        .arg(url)
        .output()
        .unwrap()
        .status
        .code()
}

#[test]
fn test_client_binary_exit_codes() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(root.path().join("here.txt"), b"present").unwrap();

    let server = TestServer::start(root.path(), "index.html");
    let port = server.addr.port();

    assert_eq!(run_client(port, out.path(), &server.url("here.txt")), Some(0));
    assert_eq!(fs::read(out.path().join("here.txt")).unwrap(), b"present");

    assert_eq!(run_client(port, out.path(), &server.url("gone.txt")), Some(3));
    assert!(!out.path().join("gone.txt").exists());

    server.stop().unwrap();

    // Nothing listens on the port any more
    assert_eq!(run_client(port, out.path(), "http://127.0.0.1/x"), Some(1));
}
