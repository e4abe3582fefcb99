//! Socket role enumeration.
//!
//! A role is the communication pattern a socket implements. Roles map one to
//! one onto the native ZeroMQ socket types.

use std::fmt;

/// The full set of socket roles defined by ZeroMQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Exclusive bidirectional peer (ZMQ_PAIR)
    Pair,

    /// Broadcasts to subscribers (ZMQ_PUB)
    Publisher,

    /// Receives filtered broadcasts (ZMQ_SUB)
    Subscriber,

    /// Synchronous request-reply client (ZMQ_REQ)
    Requester,

    /// Synchronous request-reply server (ZMQ_REP)
    Replier,

    /// Asynchronous load-balanced request-reply (ZMQ_DEALER)
    Dealer,

    /// Identity-routed request-reply (ZMQ_ROUTER)
    Router,

    /// Pipeline downstream (ZMQ_PULL)
    Puller,

    /// Pipeline upstream (ZMQ_PUSH)
    Pusher,

    /// Publisher that surfaces subscriptions (ZMQ_XPUB)
    ExtendedPublisher,

    /// Subscriber that sends subscriptions as messages (ZMQ_XSUB)
    ExtendedSubscriber,

    /// Raw TCP peer (ZMQ_STREAM)
    Streamer,
}

impl Role {
    /// All roles, in native type order.
    pub const ALL: [Role; 12] = [
        Self::Pair,
        Self::Publisher,
        Self::Subscriber,
        Self::Requester,
        Self::Replier,
        Self::Dealer,
        Self::Router,
        Self::Puller,
        Self::Pusher,
        Self::ExtendedPublisher,
        Self::ExtendedSubscriber,
        Self::Streamer,
    ];

    /// Get the role as the native socket type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Publisher => "PUB",
            Self::Subscriber => "SUB",
            Self::Requester => "REQ",
            Self::Replier => "REP",
            Self::Dealer => "DEALER",
            Self::Router => "ROUTER",
            Self::Puller => "PULL",
            Self::Pusher => "PUSH",
            Self::ExtendedPublisher => "XPUB",
            Self::ExtendedSubscriber => "XSUB",
            Self::Streamer => "STREAM",
        }
    }

    /// True for the role that accepts subscription filters as options.
    ///
    /// Extended subscribers send subscriptions as messages instead.
    pub fn is_subscriber(&self) -> bool {
        matches!(self, Self::Subscriber)
    }
}

impl From<Role> for zmq::SocketType {
    fn from(role: Role) -> Self {
        match role {
            Role::Pair => zmq::PAIR,
            Role::Publisher => zmq::PUB,
            Role::Subscriber => zmq::SUB,
            Role::Requester => zmq::REQ,
            Role::Replier => zmq::REP,
            Role::Dealer => zmq::DEALER,
            Role::Router => zmq::ROUTER,
            Role::Puller => zmq::PULL,
            Role::Pusher => zmq::PUSH,
            Role::ExtendedPublisher => zmq::XPUB,
            Role::ExtendedSubscriber => zmq::XSUB,
            Role::Streamer => zmq::STREAM,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Dealer.to_string(), "DEALER");
        assert_eq!(Role::Router.to_string(), "ROUTER");
        assert_eq!(Role::ExtendedPublisher.to_string(), "XPUB");
    }

    #[test]
    fn test_native_mapping() {
        assert_eq!(zmq::SocketType::from(Role::Pair), zmq::PAIR);
        assert_eq!(zmq::SocketType::from(Role::Streamer), zmq::STREAM);
        assert_eq!(Role::ALL.len(), 12);
    }

    #[test]
    fn test_subscriber_roles() {
        assert!(Role::Subscriber.is_subscriber());
        assert!(!Role::ExtendedSubscriber.is_subscriber());
        assert!(!Role::Publisher.is_subscriber());
    }
}
