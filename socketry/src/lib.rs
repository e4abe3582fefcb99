//! # Socketry
//!
//! Thread-affine ZeroMQ sockets, native-buffer frames and background workers
//! with start/stop handshakes.
//!
//! ## Architecture
//!
//! - **`socketry-core`**: roles, options, addressing, keys and the error
//!   domain (no native handles)
//! - **`socketry`**: context, sockets, frames, messages and workers (this
//!   crate)
//!
//! ## Threading
//!
//! A [`Socket`] is `Send` but not `Sync`. Open it on (or move it to) the
//! thread that will use it; the compiler rejects sharing it. A [`Worker`]
//! owns one thread and runs a [`Work`] loop on it, and the [`Context`] is the
//! only object shared between threads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use socketry::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = Context::new();
//! let endpoint: Endpoint = "tcp://127.0.0.1:9091".parse()?;
//!
//! let replier = Socket::new(&context, Role::Replier);
//! replier.bind(&endpoint)?;
//!
//! let requester = Socket::new(&context, Role::Requester);
//! requester.connect(&endpoint)?;
//!
//! requester.send(&mut Message::new().push_str("ping"))?;
//!
//! let mut request = Message::new();
//! replier.receive(&mut request)?;
//! assert_eq!(request.dequeue_string().as_deref(), Some("ping"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Relaying
//!
//! [`Control::relay`] shuttles whole messages between two sockets, which is
//! all a ROUTER/DEALER broker needs; see `examples/broker.rs`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod dev_tracing;
pub mod frame;
pub mod message;
pub mod poller;
pub mod priority;
pub mod socket;
pub mod worker;

// Re-export core types
pub use bytes::Bytes;
pub use socketry_core::authority::{Authority, AuthorityError};
pub use socketry_core::endpoint::{Endpoint, EndpointError};
pub use socketry_core::error::{Error, Result};
pub use socketry_core::identifier::Identifier;
pub use socketry_core::keys::{Certificate, CurveKey, KeyError};
pub use socketry_core::options::SocketOptions;
pub use socketry_core::role::Role;

pub use context::Context;
pub use frame::Frame;
pub use message::Message;
pub use poller::Poller;
pub use priority::Priority;
pub use socket::Socket;
pub use worker::{Control, Work, Worker};

/// Convenient re-exports for building services.
///
/// ```
/// use socketry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Authority, Bytes, Certificate, Context, Control, CurveKey, Endpoint, Error, Frame,
        Message, Priority, Role, Socket, SocketOptions, Work, Worker,
    };
}
