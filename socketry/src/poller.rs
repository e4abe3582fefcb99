//! Readiness polling over a set of sockets.

use hashbrown::HashSet;
use std::time::Duration;
use tracing::{debug, trace};

use socketry_core::error::Error;
use socketry_core::identifier::Identifier;

use crate::socket::Socket;

/// Waits for input on any of a set of sockets.
///
/// Borrowing the sockets ties the poller to the thread that owns them.
#[derive(Debug, Default)]
pub struct Poller<'a> {
    sockets: Vec<&'a Socket>,
    expired: bool,
    failure: Option<Error>,
}

impl<'a> Poller<'a> {
    /// Create an empty poller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `socket` for input.
    ///
    /// Adding an invalid socket terminates the poller.
    pub fn add(&mut self, socket: &'a Socket) {
        if !socket.is_valid() {
            debug!(socket = %socket.id(), "poller given invalid socket");
            self.failure = Some(Error::InvalidSocket);
        }

        self.sockets.push(socket);
    }

    /// Wait up to `timeout` for input and return the ready socket identifiers.
    ///
    /// An empty result means the wait timed out, was interrupted or the
    /// poller is terminated; see [`Poller::expired`] and
    /// [`Poller::terminated`].
    pub fn wait(&mut self, timeout: Duration) -> HashSet<Identifier> {
        self.expired = false;
        let mut ready = HashSet::new();
        if self.terminated() {
            return ready;
        }

        let mut ids = Vec::with_capacity(self.sockets.len());
        let mut items = Vec::with_capacity(self.sockets.len());
        for socket in &self.sockets {
            let native = match socket.native() {
                Ok(native) => native,
                Err(error) => {
                    self.failure = Some(error);
                    return ready;
                }
            };
            ids.push(socket.id());
            items.push(native.as_poll_item(zmq::POLLIN));
        }

        let millis = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        match zmq::poll(&mut items, millis) {
            Ok(0) => self.expired = true,
            Ok(_) => {
                ready.extend(
                    ids.iter()
                        .zip(&items)
                        .filter(|(_, item)| item.is_readable())
                        .map(|(id, _)| *id),
                );
            }
            Err(e) => match Error::from(e) {
                Error::Interrupted => trace!("poll interrupted"),
                error => {
                    debug!(error = %error, "poll failed");
                    self.failure = Some(error);
                }
            },
        }

        ready
    }

    /// True if the last wait timed out with nothing ready.
    pub fn expired(&self) -> bool {
        self.expired
    }

    /// True once the context is gone or a watched socket is unusable.
    pub fn terminated(&self) -> bool {
        self.failure.is_some()
    }

    /// The error that terminated the poller.
    pub fn failure(&self) -> Option<Error> {
        self.failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::message::Message;
    use socketry_core::endpoint::Endpoint;
    use socketry_core::role::Role;

    #[test]
    fn test_wait_expires_without_input() {
        let context = Context::new();
        let socket = Socket::new(&context, Role::Pair);
        socket
            .bind(&Endpoint::parse("inproc://poller-idle").unwrap())
            .unwrap();

        let mut poller = Poller::new();
        poller.add(&socket);
        assert!(poller.wait(Duration::from_millis(10)).is_empty());
        assert!(poller.expired());
        assert!(!poller.terminated());
    }

    #[test]
    fn test_wait_reports_ready_socket() {
        let context = Context::new();
        let endpoint = Endpoint::parse("inproc://poller-ready").unwrap();
        let server = Socket::new(&context, Role::Pair);
        server.bind(&endpoint).unwrap();
        let client = Socket::new(&context, Role::Pair);
        client.connect(&endpoint).unwrap();

        client.send(&mut Message::new().push_str("ping")).unwrap();

        let mut poller = Poller::new();
        poller.add(&server);
        poller.add(&client);
        let ready = poller.wait(Duration::from_secs(5));
        assert!(ready.contains(&server.id()));
        assert!(!ready.contains(&client.id()));
        assert!(!poller.expired());
    }

    #[test]
    fn test_context_stop_terminates_wait() {
        let context = Context::new();
        let socket = Socket::new(&context, Role::Pair);
        socket
            .bind(&Endpoint::parse("inproc://poller-stopped").unwrap())
            .unwrap();
        assert!(context.stop());

        let mut poller = Poller::new();
        poller.add(&socket);
        assert!(poller.wait(Duration::from_secs(5)).is_empty());
        assert!(poller.terminated());
        assert_eq!(poller.failure(), Some(Error::ContextTerminated));
    }

    #[test]
    fn test_invalid_socket_terminates() {
        let context = Context::stopped(1);
        let socket = Socket::new(&context, Role::Pair);

        let mut poller = Poller::new();
        poller.add(&socket);
        assert!(poller.terminated());
        assert_eq!(poller.failure(), Some(Error::InvalidSocket));
        assert!(poller.wait(Duration::from_millis(1)).is_empty());
    }
}
