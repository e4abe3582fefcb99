//! Multipart message: an ordered queue of frames.
//!
//! Producers enqueue parts and send the whole message; consumers receive a
//! whole message and dequeue its parts in arrival order.

use bytes::Bytes;
use std::collections::VecDeque;

use socketry_core::error::Result;

use crate::frame::Frame;
use crate::socket::Socket;

/// Ordered sequence of frames forming one logical message.
///
/// # Examples
///
/// ```
/// use socketry::message::Message;
///
/// // ROUTER envelope: [identity, empty, body]
/// let mut message = Message::new()
///     .push(b"client-123")
///     .push_empty()
///     .push_str("Hello");
///
/// assert_eq!(message.len(), 3);
/// assert_eq!(message.dequeue_payload().as_deref(), Some(&b"client-123"[..]));
/// ```
#[derive(Debug, Default)]
pub struct Message {
    frames: VecDeque<Frame>,
}

impl Message {
    /// Create an empty message.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: VecDeque::new(),
        }
    }

    /// Create an empty message with room for `capacity` frames.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop all frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Iterate over the frames in order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Append a frame.
    pub fn enqueue_frame(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    /// Append a frame holding a copy of `payload`.
    pub fn enqueue(&mut self, payload: impl AsRef<[u8]>) {
        self.enqueue_frame(Frame::from_payload(payload));
    }

    /// Append a UTF-8 string frame.
    pub fn enqueue_str(&mut self, value: &str) {
        self.enqueue(value);
    }

    /// Append an empty delimiter frame.
    pub fn enqueue_empty(&mut self) {
        self.enqueue(b"");
    }

    /// Append a little-endian `u32` frame.
    pub fn enqueue_u32(&mut self, value: u32) {
        self.enqueue(value.to_le_bytes());
    }

    /// Append a little-endian `u64` frame.
    pub fn enqueue_u64(&mut self, value: u64) {
        self.enqueue(value.to_le_bytes());
    }

    /// Builder form of [`Message::enqueue`].
    #[must_use]
    pub fn push(mut self, payload: impl AsRef<[u8]>) -> Self {
        self.enqueue(payload);
        self
    }

    /// Builder form of [`Message::enqueue_str`].
    #[must_use]
    pub fn push_str(mut self, value: &str) -> Self {
        self.enqueue_str(value);
        self
    }

    /// Builder form of [`Message::enqueue_empty`].
    #[must_use]
    pub fn push_empty(mut self) -> Self {
        self.enqueue_empty();
        self
    }

    /// Remove and return the first frame.
    pub fn dequeue(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Remove the first frame and return a copy of its payload.
    pub fn dequeue_payload(&mut self) -> Option<Bytes> {
        self.dequeue().map(|frame| frame.payload())
    }

    /// Remove the first frame and decode it as UTF-8.
    ///
    /// The frame is consumed even if it is not valid UTF-8.
    pub fn dequeue_string(&mut self) -> Option<String> {
        let payload = self.dequeue_payload()?;
        String::from_utf8(payload.to_vec()).ok()
    }

    /// Remove the first frame and decode it as a little-endian `u32`.
    ///
    /// The frame is consumed even if its length is wrong.
    pub fn dequeue_u32(&mut self) -> Option<u32> {
        let payload = self.dequeue_payload()?;
        let bytes: [u8; 4] = payload[..].try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// Remove the first frame and decode it as a little-endian `u64`.
    ///
    /// The frame is consumed even if its length is wrong.
    pub fn dequeue_u64(&mut self) -> Option<u64> {
        let payload = self.dequeue_payload()?;
        let bytes: [u8; 8] = payload[..].try_into().ok()?;
        Some(u64::from_le_bytes(bytes))
    }

    /// Send all frames to `socket` in order, the last one terminal.
    ///
    /// Sent frames are removed as they go. On error the failed frame is lost
    /// and the unsent remainder stays queued; the message as a whole should
    /// be considered failed. An empty message sends nothing.
    pub fn send(&mut self, socket: &Socket) -> Result<()> {
        while let Some(mut frame) = self.frames.pop_front() {
            let is_last = self.frames.is_empty();
            frame.send(socket, is_last)?;
        }

        Ok(())
    }

    /// Like [`Message::send`], but fails with `WouldBlock` instead of waiting
    /// for the socket to accept the first frame. Once the first frame is
    /// queued the remaining frames are accepted as well.
    pub(crate) fn send_nonblocking(&mut self, socket: &Socket) -> Result<()> {
        while let Some(mut frame) = self.frames.pop_front() {
            let is_last = self.frames.is_empty();
            frame.send_nonblocking(socket, is_last)?;
        }

        Ok(())
    }

    /// Replace the content with one complete message received from `socket`.
    ///
    /// On error the frames received so far are left in place and the
    /// message must be discarded.
    pub fn receive(&mut self, socket: &Socket) -> Result<()> {
        self.clear();

        loop {
            let mut frame = Frame::new();
            frame.receive(socket)?;

            let more = frame.more();
            self.frames.push_back(frame);
            if !more {
                return Ok(());
            }
        }
    }

    /// Payload copies of all frames.
    pub fn to_payloads(&self) -> Vec<Bytes> {
        self.frames.iter().map(Frame::payload).collect()
    }
}

impl<T: AsRef<[u8]>> FromIterator<T> for Message {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut message = Self::new();
        for payload in iter {
            message.enqueue(payload);
        }
        message
    }
}
