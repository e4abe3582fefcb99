//! Single message part backed by a native buffer.

use bytes::Bytes;
use std::fmt;

use socketry_core::error::{Error, Result};

use crate::socket::Socket;

/// One payload plus its continuation flag.
///
/// The buffer is owned by the native layer and released when the frame is
/// dropped. A frame serves one operation: a receive fills it (and may be
/// repeated on the same frame), a send hands the buffer to the transport and
/// leaves the frame spent.
pub struct Frame {
    message: Option<zmq::Message>,
    more: bool,
}

impl Frame {
    /// Empty frame, ready to receive into.
    pub fn new() -> Self {
        Self {
            message: Some(zmq::Message::new()),
            more: false,
        }
    }

    /// Frame holding a copy of `payload`, ready to send.
    pub fn from_payload(payload: impl AsRef<[u8]>) -> Self {
        Self {
            message: Some(zmq::Message::from(payload.as_ref())),
            more: false,
        }
    }

    /// False once the frame has been spent by a send.
    pub fn is_valid(&self) -> bool {
        self.message.is_some()
    }

    /// True if the last receive reported further frames in the same message.
    pub fn more(&self) -> bool {
        self.more
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.message.as_deref().map_or(0, <[u8]>::len)
    }

    /// True if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the payload.
    pub fn payload(&self) -> Bytes {
        self.message
            .as_deref()
            .map(Bytes::copy_from_slice)
            .unwrap_or_default()
    }

    /// Receive one frame from `socket`, then record its continuation flag.
    ///
    /// Blocks or times out according to the socket's receive timeout.
    pub fn receive(&mut self, socket: &Socket) -> Result<()> {
        let message = self.message.as_mut().ok_or(Error::InvalidMessage)?;
        let native = socket.native()?;

        self.more = false;
        native.recv(message, 0)?;
        self.more = native.get_rcvmore()?;
        Ok(())
    }

    /// Send this frame to `socket`, flagged as a continuation unless `is_last`.
    ///
    /// The buffer is handed to the transport whether or not the send
    /// succeeds, so the frame is spent afterwards.
    pub fn send(&mut self, socket: &Socket, is_last: bool) -> Result<()> {
        self.send_with(socket, is_last, 0)
    }

    /// Send without blocking; fails with `WouldBlock` when the socket cannot
    /// queue the frame.
    pub(crate) fn send_nonblocking(&mut self, socket: &Socket, is_last: bool) -> Result<()> {
        self.send_with(socket, is_last, zmq::DONTWAIT)
    }

    fn send_with(&mut self, socket: &Socket, is_last: bool, flags: i32) -> Result<()> {
        let native = socket.native()?;
        let message = self.message.take().ok_or(Error::InvalidMessage)?;
        let flags = if is_last { flags } else { flags | zmq::SNDMORE };

        native.send(message, flags)?;
        Ok(())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[u8]> for Frame {
    fn from(payload: &[u8]) -> Self {
        Self::from_payload(payload)
    }
}

impl From<&str> for Frame {
    fn from(payload: &str) -> Self {
        Self::from_payload(payload)
    }
}

impl From<Bytes> for Frame {
    fn from(payload: Bytes) -> Self {
        Self::from_payload(payload)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("len", &self.len())
            .field("more", &self.more)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use socketry_core::endpoint::Endpoint;
    use socketry_core::options::SocketOptions;
    use socketry_core::role::Role;
    use std::time::Duration;

    fn pair(context: &Context, name: &str) -> (Socket, Socket) {
        let options = SocketOptions::new().with_recv_timeout(Duration::from_secs(5));
        let endpoint = Endpoint::new("inproc", name, 0);

        let server = Socket::with_options(context, Role::Pair, &options);
        server.bind(&endpoint).unwrap();
        let client = Socket::with_options(context, Role::Pair, &options);
        client.connect(&endpoint).unwrap();
        (server, client)
    }

    #[test]
    fn test_payload_copies() {
        let payloads: [&[u8]; 4] = [b"", b"a", b"hello world", &[0, 255, 7]];
        for payload in payloads {
            let frame = Frame::from_payload(payload);
            assert_eq!(&frame.payload()[..], payload);
            assert_eq!(frame.payload(), frame.payload());
            assert_eq!(frame.len(), payload.len());
        }
    }

    #[test]
    fn test_new_frame_is_empty_and_valid() {
        let frame = Frame::new();
        assert!(frame.is_valid());
        assert!(frame.is_empty());
        assert!(!frame.more());
    }

    #[test]
    fn test_send_spends_frame() {
        let context = Context::new();
        let (server, client) = pair(&context, "frame-spent");

        let mut frame = Frame::from_payload(b"once");
        frame.send(&client, true).unwrap();
        assert!(!frame.is_valid());
        assert_eq!(frame.send(&client, true), Err(Error::InvalidMessage));

        let mut spent = frame;
        assert_eq!(spent.receive(&server), Err(Error::InvalidMessage));

        let mut received = Frame::new();
        received.receive(&server).unwrap();
        assert_eq!(&received.payload()[..], b"once");
        assert!(!received.more());
    }

    #[test]
    fn test_more_flag_follows_wire() {
        let context = Context::new();
        let (server, client) = pair(&context, "frame-more");

        Frame::from_payload(b"head").send(&client, false).unwrap();
        Frame::from_payload(b"tail").send(&client, true).unwrap();

        let mut frame = Frame::new();
        frame.receive(&server).unwrap();
        assert_eq!(&frame.payload()[..], b"head");
        assert!(frame.more());

        // Same frame reused as scratch for the next part.
        frame.receive(&server).unwrap();
        assert_eq!(&frame.payload()[..], b"tail");
        assert!(!frame.more());
    }

    #[test]
    fn test_failed_receive_clears_more() {
        let context = Context::new();
        let (server, client) = pair(&context, "frame-more-reset");
        let options = SocketOptions::new().with_recv_timeout(Duration::from_millis(20));
        let idle = Socket::with_options(&context, Role::Pair, &options);
        idle.bind(&Endpoint::new("inproc", "frame-more-idle", 0))
            .unwrap();

        Frame::from_payload(b"head").send(&client, false).unwrap();
        Frame::from_payload(b"tail").send(&client, true).unwrap();

        let mut frame = Frame::new();
        frame.receive(&server).unwrap();
        assert!(frame.more());

        assert_eq!(frame.receive(&idle), Err(Error::WouldBlock));
        assert!(!frame.more());
    }

    #[test]
    fn test_nonblocking_send_without_peer() {
        let context = Context::new();
        let dealer = Socket::new(&context, Role::Dealer);
        dealer
            .bind(&Endpoint::new("inproc", "frame-no-peer", 0))
            .unwrap();

        let mut frame = Frame::from_payload(b"lost");
        assert_eq!(frame.send_nonblocking(&dealer, true), Err(Error::WouldBlock));
        assert!(!frame.is_valid());
    }

    #[test]
    fn test_invalid_socket_fails_fast() {
        let context = Context::stopped(1);
        let socket = Socket::new(&context, Role::Pair);

        let mut frame = Frame::from_payload(b"x");
        assert_eq!(frame.send(&socket, true), Err(Error::InvalidSocket));
        assert!(frame.is_valid());
        assert_eq!(frame.receive(&socket), Err(Error::InvalidSocket));
    }
}
