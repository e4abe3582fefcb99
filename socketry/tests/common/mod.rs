#![allow(dead_code)]

use socketry::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static INPROC_ENDPOINT_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Receive timeout for test sockets, so a broken test fails instead of hanging.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn test_context() -> Context {
    socketry::dev_tracing::init_tracing();
    Context::new()
}

/// Options with a bounded receive so assertions fail instead of blocking.
pub fn test_options() -> SocketOptions {
    SocketOptions::new().with_recv_timeout(TEST_TIMEOUT)
}

pub fn test_socket(context: &Context, role: Role) -> Socket {
    let socket = Socket::with_options(context, role, &test_options());
    assert!(socket.is_valid(), "failed to open {role} socket");
    socket
}

pub fn unique_inproc_endpoint(prefix: &str) -> Endpoint {
    let count = INPROC_ENDPOINT_COUNTER.fetch_add(1, Ordering::Relaxed);
    Endpoint::new("inproc", format!("{prefix}-{count}"), 0)
}

pub fn unique_tcp_endpoint() -> Endpoint {
    let port = portpicker::pick_unused_port().expect("no free tcp port");
    Endpoint::new("tcp", "127.0.0.1", port)
}

/// Receive a message and return its frames as strings.
pub fn receive_strings(socket: &Socket) -> Vec<String> {
    let mut message = Message::new();
    socket.receive(&mut message).expect("receive failed");
    drain_strings(&mut message)
}

/// Dequeue every remaining frame as a string.
pub fn drain_strings(message: &mut Message) -> Vec<String> {
    let mut parts = Vec::new();
    while let Some(part) = message.dequeue_string() {
        parts.push(part);
    }
    parts
}
