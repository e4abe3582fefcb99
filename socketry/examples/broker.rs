//! Example: ROUTER-DEALER broker driven by a worker thread
//!
//! ```text
//! Clients (REQ) → ROUTER (frontend) → DEALER (backend) → Services (REP)
//! ```
//!
//! The broker relays whole messages in both directions without looking at
//! their content. This example runs a broker, one echo service and a few
//! clients in one process, then shuts everything down.
//!
//! Run this example:
//! ```bash
//! RUST_LOG=debug cargo run --example broker
//! ```

use socketry::prelude::*;
use std::thread;
use std::time::Duration;
use tracing::info;

struct Broker {
    context: Context,
    frontend: Endpoint,
    backend: Endpoint,
}

impl Work for Broker {
    fn work(&mut self, control: &Control) {
        let frontend = Socket::new(&self.context, Role::Router);
        let backend = Socket::new(&self.context, Role::Dealer);

        let bound = frontend.bind(&self.frontend).is_ok() && backend.bind(&self.backend).is_ok();
        if !control.started(bound) {
            return;
        }

        info!(frontend = %self.frontend, backend = %self.backend, "broker relaying");
        if let Err(e) = control.relay(&frontend, &backend) {
            info!(error = %e, "broker relay failed");
        }
        control.finished(true);
    }
}

struct Echo {
    context: Context,
    backend: Endpoint,
}

impl Work for Echo {
    fn work(&mut self, control: &Control) {
        let options = SocketOptions::new().with_recv_timeout(Duration::from_millis(100));
        let socket = Socket::with_options(&self.context, Role::Replier, &options);
        if !control.started(socket.connect(&self.backend).is_ok()) {
            return;
        }

        let mut request = Message::new();
        while !control.stopped() {
            match socket.receive(&mut request) {
                Ok(()) => {
                    info!(frames = request.len(), "service echoing request");
                    if let Err(e) = socket.send(&mut request) {
                        info!(error = %e, "service reply failed");
                    }
                }
                Err(e) if e.is_retryable() => continue,
                Err(e) => {
                    info!(error = %e, "service receive failed");
                    break;
                }
            }
        }

        control.finished(true);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    socketry::dev_tracing::init_tracing();

    let port = portpicker::pick_unused_port().ok_or("no free port")?;
    let frontend = Endpoint::new("tcp", "127.0.0.1", port);
    let backend: Endpoint = "inproc://broker-backend".parse()?;
    let context = Context::new();

    let broker = Worker::new(Broker {
        context: context.clone(),
        frontend: frontend.clone(),
        backend: backend.clone(),
    })
    .with_name("broker");

    if !broker.start() {
        return Err("broker failed to bind".into());
    }

    let echo = Worker::new(Echo {
        context: context.clone(),
        backend,
    })
    .with_name("echo");

    if !echo.start() {
        return Err("echo service failed to connect".into());
    }

    let clients: Vec<_> = (0..3)
        .map(|id| {
            let context = context.clone();
            let frontend = frontend.clone();
            thread::spawn(move || -> socketry::Result<Vec<String>> {
                let options = SocketOptions::new().with_recv_timeout(Duration::from_secs(5));
                let client = Socket::with_options(&context, Role::Requester, &options);
                client.connect(&frontend)?;

                let mut request = Message::new()
                    .push_str("client")
                    .push_str(&id.to_string());
                client.send(&mut request)?;

                let mut reply = Message::new();
                client.receive(&mut reply)?;

                let mut parts = Vec::new();
                while let Some(part) = reply.dequeue_string() {
                    parts.push(part);
                }
                Ok(parts)
            })
        })
        .collect();

    for client in clients {
        match client.join() {
            Ok(Ok(parts)) => println!("reply: {parts:?}"),
            Ok(Err(e)) => println!("client failed: {e}"),
            Err(_) => println!("client panicked"),
        }
    }

    println!("echo stopped: {}", echo.stop());
    println!("broker stopped: {}", broker.stop());
    Ok(())
}
