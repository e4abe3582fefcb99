//! Socket configuration options
//!
//! This module provides the settings applied to a native socket's option
//! table when the socket is constructed (zmq_setsockopt). Options are not
//! changed after construction.

use bytes::Bytes;
use std::time::Duration;

/// Socket configuration options.
///
/// # Examples
///
/// ```
/// use socketry_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let opts = SocketOptions::default()
///     .with_recv_timeout(Duration::from_secs(5))
///     .with_send_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOptions {
    /// Receive timeout (ZMQ_RCVTIMEO)
    ///
    /// - `None`: Block indefinitely (default)
    /// - `Some(Duration::ZERO)`: Non-blocking (return immediately with EAGAIN)
    /// - `Some(duration)`: Wait up to duration before returning EAGAIN
    pub recv_timeout: Option<Duration>,

    /// Send timeout (ZMQ_SNDTIMEO)
    ///
    /// - `None`: Block indefinitely (default)
    /// - `Some(Duration::ZERO)`: Non-blocking (return immediately with EAGAIN)
    /// - `Some(duration)`: Wait up to duration before returning EAGAIN
    pub send_timeout: Option<Duration>,

    /// Handshake timeout (ZMQ_HANDSHAKE_IVL)
    ///
    /// - Default: 30 seconds
    /// - `Duration::ZERO` disables the timeout
    pub handshake_timeout: Duration,

    /// Linger period (ZMQ_LINGER)
    ///
    /// Time pending outbound messages are kept after the socket is closed.
    /// - `None`: Keep them until delivered
    /// - `Some(Duration::ZERO)`: Discard immediately (default)
    /// - `Some(duration)`: Keep them up to duration
    pub linger: Option<Duration>,

    /// Reconnect interval (ZMQ_RECONNECT_IVL)
    ///
    /// - Default: 100ms
    pub reconnect_ivl: Duration,

    /// Maximum reconnect interval (ZMQ_RECONNECT_IVL_MAX)
    ///
    /// - Default: 0 (always use `reconnect_ivl`)
    /// - When > 0: the native layer doubles `reconnect_ivl` up to this value
    pub reconnect_ivl_max: Duration,

    /// High water mark for receiving (ZMQ_RCVHWM)
    ///
    /// - Default: 1000 messages
    pub recv_hwm: usize,

    /// High water mark for sending (ZMQ_SNDHWM)
    ///
    /// - Default: 1000 messages
    pub send_hwm: usize,

    /// Queue only to completed connections (ZMQ_IMMEDIATE)
    pub immediate: bool,

    /// Maximum inbound message size (ZMQ_MAXMSGSIZE)
    ///
    /// - `None`: No limit (default)
    pub max_msg_size: Option<usize>,

    /// Enable IPv6 on the socket (ZMQ_IPV6)
    pub ipv6: bool,

    /// Socket identity / routing ID (ZMQ_ROUTING_ID)
    ///
    /// - Default: None (assigned by the peer)
    pub routing_id: Option<Bytes>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            recv_timeout: None, // Block indefinitely
            send_timeout: None, // Block indefinitely
            handshake_timeout: Duration::from_secs(30),
            linger: Some(Duration::ZERO),
            reconnect_ivl: Duration::from_millis(100),
            reconnect_ivl_max: Duration::ZERO,
            recv_hwm: 1000,
            send_hwm: 1000,
            immediate: false,
            max_msg_size: None,
            ipv6: false,
            routing_id: None,
        }
    }
}

impl SocketOptions {
    /// Create new socket options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set receive timeout.
    ///
    /// Zero makes receives non-blocking; they fail with `WouldBlock` when no
    /// message is queued.
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Set send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Set handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set linger period.
    pub fn with_linger(mut self, linger: Option<Duration>) -> Self {
        self.linger = linger;
        self
    }

    /// Set reconnection interval.
    pub fn with_reconnect_ivl(mut self, ivl: Duration) -> Self {
        self.reconnect_ivl = ivl;
        self
    }

    /// Set maximum reconnection interval.
    pub fn with_reconnect_ivl_max(mut self, max: Duration) -> Self {
        self.reconnect_ivl_max = max;
        self
    }

    /// Set receive high water mark.
    pub fn with_recv_hwm(mut self, hwm: usize) -> Self {
        self.recv_hwm = hwm;
        self
    }

    /// Set send high water mark.
    pub fn with_send_hwm(mut self, hwm: usize) -> Self {
        self.send_hwm = hwm;
        self
    }

    /// Enable or disable immediate mode.
    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Set maximum message size.
    pub fn with_max_msg_size(mut self, size: Option<usize>) -> Self {
        self.max_msg_size = size;
        self
    }

    /// Enable or disable IPv6.
    pub fn with_ipv6(mut self, enabled: bool) -> Self {
        self.ipv6 = enabled;
        self
    }

    /// Set socket routing ID / identity.
    ///
    /// ```
    /// use socketry_core::options::SocketOptions;
    /// use bytes::Bytes;
    ///
    /// let opts = SocketOptions::new()
    ///     .with_routing_id(Bytes::from_static(b"worker-01"));
    /// ```
    pub fn with_routing_id(mut self, id: Bytes) -> Self {
        self.routing_id = Some(id);
        self
    }
}

/// Convert an optional duration to the native millisecond form.
///
/// `None` maps to -1 (infinite); values beyond `i32::MAX` milliseconds
/// saturate.
pub fn to_native_millis(duration: Option<Duration>) -> i32 {
    match duration {
        None => -1,
        Some(d) => i32::try_from(d.as_millis()).unwrap_or(i32::MAX),
    }
}

/// Convert a count to the native `i32` form, saturating.
pub fn to_native_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
