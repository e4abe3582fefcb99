//! Role-bound native socket.
//!
//! A [`Socket`] wraps one native socket handle. The type is `Send` but not
//! `Sync`: it can be handed to the thread that will own it, and from then on
//! only that thread can operate on it. Sharing a socket between threads is a
//! compile error rather than a runtime check.

use std::fmt;

use socketry_core::authority::Authority;
use socketry_core::endpoint::Endpoint;
use socketry_core::error::{Error, Result};
use socketry_core::identifier::Identifier;
use socketry_core::keys::{Certificate, CurveKey};
use socketry_core::options::{to_native_count, to_native_millis, SocketOptions};
use socketry_core::role::Role;
use tracing::{debug, trace};

use crate::context::Context;
use crate::message::Message;

/// A native socket bound to a role.
///
/// Construction never fails outright. If the context is stopped or the
/// native layer rejects the socket or one of its options, the socket is
/// invalid for its entire life and every operation on it fails fast with
/// [`Error::InvalidSocket`].
///
/// # Examples
///
/// ```no_run
/// use socketry::prelude::*;
///
/// let context = Context::new();
/// let socket = Socket::new(&context, Role::Replier);
/// socket.bind(&"tcp://127.0.0.1:9091".parse()?)?;
///
/// let mut request = Message::new();
/// socket.receive(&mut request)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Socket {
    handle: Option<zmq::Socket>,
    role: Role,
    id: Identifier,
}

impl Socket {
    /// Open a socket with default options.
    ///
    /// Subscribers are subscribed to everything.
    pub fn new(context: &Context, role: Role) -> Self {
        Self::with_options(context, role, &SocketOptions::default())
    }

    /// Open a socket and apply `options` to it.
    pub fn with_options(context: &Context, role: Role, options: &SocketOptions) -> Self {
        let id = Identifier::next();
        let handle = match context.handle() {
            Some(native) => match open(&native, role, options) {
                Ok(socket) => {
                    trace!(socket = %id, role = %role, "socket opened");
                    Some(socket)
                }
                Err(e) => {
                    debug!(socket = %id, role = %role, error = %e, "socket open failed");
                    None
                }
            },
            None => {
                debug!(socket = %id, role = %role, "socket open on stopped context");
                None
            }
        };

        Self { handle, role, id }
    }

    /// True if the native socket exists.
    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// The identifier assigned at construction.
    pub fn id(&self) -> Identifier {
        self.id
    }

    /// The socket role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Close the native socket. Idempotent.
    pub fn stop(&mut self) -> bool {
        if self.handle.take().is_some() {
            trace!(socket = %self.id, "socket closed");
        }
        true
    }

    /// Bind to a local endpoint.
    ///
    /// On failure the socket remains usable for another attempt.
    pub fn bind(&self, endpoint: &Endpoint) -> Result<()> {
        let address = endpoint.to_string();
        self.native()?.bind(&address).map_err(|e| {
            debug!(socket = %self.id, endpoint = %address, error = %e, "bind failed");
            Error::from(e)
        })
    }

    /// Connect to a remote endpoint.
    ///
    /// On failure the socket remains usable for another attempt.
    pub fn connect(&self, endpoint: &Endpoint) -> Result<()> {
        let address = endpoint.to_string();
        self.native()?.connect(&address).map_err(|e| {
            debug!(socket = %self.id, endpoint = %address, error = %e, "connect failed");
            Error::from(e)
        })
    }

    /// The endpoint most recently bound or connected, as reported natively.
    pub fn last_endpoint(&self) -> Option<String> {
        self.native().ok()?.get_last_endpoint().ok()?.ok()
    }

    // Security and proxy settings take effect for subsequent binds and
    // connects only. Changing them afterwards is not supported.

    /// Set the ZAP authentication domain.
    pub fn set_authentication_domain(&self, domain: &str) -> bool {
        self.apply("zap_domain", |s| s.set_zap_domain(domain))
    }

    /// Act as a CURVE server. Requires a private key.
    pub fn set_curve_server(&self) -> bool {
        self.apply("curve_server", |s| s.set_curve_server(true))
    }

    /// Act as a CURVE client of the server holding `server_public_key`.
    pub fn set_curve_client(&self, server_public_key: &CurveKey) -> bool {
        self.apply("curve_serverkey", |s| {
            s.set_curve_serverkey(server_public_key.as_bytes())
        })
    }

    /// Set this socket's CURVE public key.
    pub fn set_public_key(&self, key: &CurveKey) -> bool {
        self.apply("curve_publickey", |s| s.set_curve_publickey(key.as_bytes()))
    }

    /// Set this socket's CURVE secret key.
    pub fn set_private_key(&self, key: &CurveKey) -> bool {
        self.apply("curve_secretkey", |s| s.set_curve_secretkey(key.as_bytes()))
    }

    /// Set both CURVE keys from a certificate.
    ///
    /// Fails if the certificate holds no private key.
    pub fn set_certificate(&self, certificate: &Certificate) -> bool {
        match certificate.private_key() {
            Some(private_key) => {
                self.set_private_key(private_key) && self.set_public_key(certificate.public_key())
            }
            None => {
                debug!(socket = %self.id, "certificate has no private key");
                false
            }
        }
    }

    /// Route outbound connections through a SOCKS5 proxy.
    ///
    /// The authority must carry a port.
    pub fn set_socks_proxy(&self, authority: &Authority) -> bool {
        if !authority.is_valid() {
            debug!(socket = %self.id, proxy = %authority, "socks proxy without port");
            return false;
        }

        let proxy = authority.to_string();
        self.apply("socks_proxy", |s| s.set_socks_proxy(Some(&proxy)))
    }

    /// Subscribe to messages starting with `filter`; empty means everything.
    pub fn set_subscription(&self, filter: &[u8]) -> bool {
        self.apply("subscribe", |s| s.set_subscribe(filter))
    }

    /// Remove a subscription added with [`Socket::set_subscription`].
    pub fn set_unsubscription(&self, filter: &[u8]) -> bool {
        self.apply("unsubscribe", |s| s.set_unsubscribe(filter))
    }

    /// Send every frame of `message`, draining it.
    ///
    /// See [`Message::send`].
    pub fn send(&self, message: &mut Message) -> Result<()> {
        message.send(self)
    }

    /// Receive one complete message into `message`, replacing its content.
    ///
    /// See [`Message::receive`].
    pub fn receive(&self, message: &mut Message) -> Result<()> {
        message.receive(self)
    }

    pub(crate) fn native(&self) -> Result<&zmq::Socket> {
        self.handle.as_ref().ok_or(Error::InvalidSocket)
    }

    fn apply<F>(&self, option: &'static str, set: F) -> bool
    where
        F: FnOnce(&zmq::Socket) -> zmq::Result<()>,
    {
        let Ok(native) = self.native() else {
            return false;
        };

        match set(native) {
            Ok(()) => true,
            Err(e) => {
                debug!(socket = %self.id, option, error = %e, "socket option rejected");
                false
            }
        }
    }
}

fn open(context: &zmq::Context, role: Role, options: &SocketOptions) -> zmq::Result<zmq::Socket> {
    let socket = context.socket(role.into())?;

    socket.set_linger(to_native_millis(options.linger))?;
    socket.set_sndhwm(to_native_count(options.send_hwm))?;
    socket.set_rcvhwm(to_native_count(options.recv_hwm))?;
    socket.set_sndtimeo(to_native_millis(options.send_timeout))?;
    socket.set_rcvtimeo(to_native_millis(options.recv_timeout))?;
    socket.set_handshake_ivl(to_native_millis(Some(options.handshake_timeout)))?;
    socket.set_reconnect_ivl(to_native_millis(Some(options.reconnect_ivl)))?;
    socket.set_reconnect_ivl_max(to_native_millis(Some(options.reconnect_ivl_max)))?;
    socket.set_immediate(options.immediate)?;
    socket.set_ipv6(options.ipv6)?;

    if let Some(size) = options.max_msg_size {
        socket.set_maxmsgsize(i64::try_from(size).unwrap_or(i64::MAX))?;
    }

    if let Some(routing_id) = &options.routing_id {
        socket.set_identity(routing_id)?;
    }

    if role.is_subscriber() {
        socket.set_subscribe(b"")?;
    }

    Ok(socket)
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("valid", &self.is_valid())
            .finish()
    }
}
