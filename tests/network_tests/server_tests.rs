//! Server Tests
//!
//! End-to-end tests over a real TCP socket: a server bound to an
//! ephemeral port and one or more blocking clients.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use slotkv::config::Config;
use slotkv::engine::Engine;
use slotkv::network::{Client, Server};
use slotkv::protocol::{KeyValue, Reply, Status};
use slotkv::SlotError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    _temp: TempDir,
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(|builder| builder)
    }

    fn start_with(
        tweak: impl FnOnce(slotkv::config::ConfigBuilder) -> slotkv::config::ConfigBuilder,
    ) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = tweak(
            Config::builder()
                .data_dir(temp_dir.path())
                .listen_addr("127.0.0.1:0")
                .worker_threads(4),
        )
        .build();

        let engine = Arc::new(Engine::open(config.clone()).unwrap());
        let server = Server::bind(config, engine).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || server.run().unwrap());

        Self {
            _temp: temp_dir,
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    fn client(&self) -> Client {
        let mut client = Client::connect(self.addr).unwrap();
        client.set_timeout(Some(Duration::from_secs(5))).unwrap();
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = TestServer::start();
    let mut client = server.client();

    let response = client.ping().unwrap();

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.reply, Some(Reply::Pong));
}

#[test]
fn test_put_get_over_tcp() {
    let server = TestServer::start();
    let mut client = server.client();

    let response = client.put("hello", "world").unwrap();
    assert!(response.is_success());
    assert_eq!(response.reply, Some(Reply::Stored));

    let response = client.get("hello").unwrap();
    assert_eq!(
        response.reply,
        Some(Reply::Found(KeyValue::new("hello", "world")))
    );
}

#[test]
fn test_get_missing_key() {
    let server = TestServer::start();
    let mut client = server.client();

    let response = client.get("nobody").unwrap();

    assert_eq!(response.status, Status::NotFound);
    assert!(!response.is_success());
    assert_eq!(response.reply, None);
}

#[test]
fn test_rejections_keep_connection_open() {
    let server = TestServer::start();
    let mut client = server.client();

    let response = client.put("this-key-is-too-long", "v").unwrap();
    assert_eq!(response.status, Status::Rejected);
    assert!(response.message.contains("Key too long"));

    let response = client.put("big", &"x".repeat(4 * 1024 * 1024 + 1)).unwrap();
    assert_eq!(response.status, Status::Rejected);

    assert!(client.ping().unwrap().is_success());
}

#[test]
fn test_prefix_and_reset_over_tcp() {
    let server = TestServer::start();
    let mut client = server.client();
    client.put("user:1", "alice").unwrap();
    client.put("user:2", "bob").unwrap();
    client.put("order:1", "book").unwrap();

    let response = client.get_by_prefix("user:").unwrap();
    let mut pairs = match response.reply {
        Some(Reply::Pairs(pairs)) => pairs,
        other => panic!("expected pairs, got {:?}", other),
    };
    pairs.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(
        pairs,
        vec![KeyValue::new("user:1", "alice"), KeyValue::new("user:2", "bob")]
    );

    assert_eq!(client.reset().unwrap().reply, Some(Reply::Reset));
    assert_eq!(
        client.get_by_prefix("").unwrap().reply,
        Some(Reply::Pairs(Vec::new()))
    );
}

#[test]
fn test_oversize_response_becomes_error() {
    let server = TestServer::start_with(|b| b.max_message_size(1024));
    let mut client = server.client();

    client.put("a", &"x".repeat(500)).unwrap();
    client.put("b", &"y".repeat(500)).unwrap();
    client.put("c", &"z".repeat(500)).unwrap();

    let response = client.get_by_prefix("").unwrap();

    assert_eq!(response.status, Status::Error);
    assert!(response.message.contains("Response too large"));
}

#[test]
fn test_client_limit_rejects_large_response() {
    let server = TestServer::start();
    let mut client = server.client();
    client.put("a", &"x".repeat(500)).unwrap();
    client.put("b", &"y".repeat(500)).unwrap();
    client.set_max_message_size(256);

    // Small replies still fit under the client's limit
    assert!(client.ping().unwrap().is_success());

    match client.get_by_prefix("") {
        Err(SlotError::Protocol(message)) => assert!(message.contains("too large")),
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_many_clients() {
    let server = TestServer::start();
    let addr = server.addr;

    let handles: Vec<_> = (0..8)
        .map(|t| {
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                client.set_timeout(Some(Duration::from_secs(5))).unwrap();
                let key = format!("client{}", t);
                // Retry: racing first inserts may collide on the log tail
                let mut stored = false;
                for _ in 0..100 {
                    let response = client.put(&key, "v").unwrap();
                    if response.is_success() {
                        stored = true;
                        break;
                    }
                    assert_eq!(response.status, Status::Rejected);
                    thread::sleep(Duration::from_millis(1));
                }
                assert!(stored);
                client.get(&key).unwrap()
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let response = handle.join().unwrap();
        assert_eq!(
            response.reply,
            Some(Reply::Found(KeyValue::new(format!("client{}", t), "v")))
        );
    }
}
