//! Socketry Error Types
//!
//! Structured error domain for socket, frame and message operations. Every
//! error the native transport can report is translated into one of these
//! variants so callers never have to inspect raw errno values.

use thiserror::Error;

/// Main error type for socket operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Frame was never initialized or was already consumed by a send
    #[error("Invalid message frame")]
    InvalidMessage,

    /// Socket construction failed or the socket was stopped
    #[error("Invalid socket")]
    InvalidSocket,

    /// Non-blocking operation could not complete (EAGAIN)
    #[error("Resource temporarily unavailable")]
    WouldBlock,

    /// Blocking call interrupted by a signal (EINTR)
    #[error("Operation interrupted")]
    Interrupted,

    /// The context owning the socket was terminated (ETERM)
    #[error("Context terminated")]
    ContextTerminated,

    /// Operation not valid in the socket's current state (EFSM)
    #[error("Operation cannot be accomplished in current socket state")]
    SocketState,

    /// Invalid argument or malformed endpoint (EINVAL)
    #[error("Invalid argument")]
    InvalidArgument,

    /// Endpoint already bound (EADDRINUSE)
    #[error("Address already in use")]
    AddressInUse,

    /// Endpoint is not local (EADDRNOTAVAIL)
    #[error("Address not available")]
    AddressNotAvailable,

    /// Endpoint names a nonexistent interface (ENODEV)
    #[error("No such device")]
    NoDevice,

    /// Transport scheme not supported (EPROTONOSUPPORT)
    #[error("Protocol not supported")]
    ProtocolNotSupported,

    /// Transport not compatible with the socket role (ENOCOMPATPROTO)
    #[error("Protocol not compatible with socket type")]
    IncompatibleProtocol,

    /// Peer host unreachable (EHOSTUNREACH)
    #[error("Host unreachable")]
    HostUnreachable,

    /// Peer refused the connection (ECONNREFUSED)
    #[error("Connection refused")]
    ConnectionRefused,

    /// Operation not supported by the socket role (ENOTSUP)
    #[error("Operation not supported")]
    NotSupported,

    /// Message exceeds the configured maximum (EMSGSIZE)
    #[error("Message too large")]
    MessageTooLarge,

    /// Native allocation failed (ENOMEM)
    #[error("Out of memory")]
    OutOfMemory,

    /// No I/O thread available for the operation (EMTHREAD)
    #[error("No I/O thread available")]
    NoThread,

    /// Too many open sockets or files (EMFILE)
    #[error("Too many open files")]
    TooManyFiles,

    /// Native error without a dedicated variant
    #[error("Transport error: {0}")]
    Native(zmq::Error),
}

/// Result type alias for socket operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the operation may succeed when repeated unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::WouldBlock | Self::Interrupted)
    }

    /// Check if the socket should be considered unusable after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidSocket
                | Self::ContextTerminated
                | Self::OutOfMemory
                | Self::NoThread
                | Self::TooManyFiles
        )
    }

    /// The native error this value was translated from, if any.
    #[must_use]
    pub fn to_native(&self) -> Option<zmq::Error> {
        let native = match self {
            Self::InvalidMessage | Self::InvalidSocket => return None,
            Self::WouldBlock => zmq::Error::EAGAIN,
            Self::Interrupted => zmq::Error::EINTR,
            Self::ContextTerminated => zmq::Error::ETERM,
            Self::SocketState => zmq::Error::EFSM,
            Self::InvalidArgument => zmq::Error::EINVAL,
            Self::AddressInUse => zmq::Error::EADDRINUSE,
            Self::AddressNotAvailable => zmq::Error::EADDRNOTAVAIL,
            Self::NoDevice => zmq::Error::ENODEV,
            Self::ProtocolNotSupported => zmq::Error::EPROTONOSUPPORT,
            Self::IncompatibleProtocol => zmq::Error::ENOCOMPATPROTO,
            Self::HostUnreachable => zmq::Error::EHOSTUNREACH,
            Self::ConnectionRefused => zmq::Error::ECONNREFUSED,
            Self::NotSupported => zmq::Error::ENOTSUP,
            Self::MessageTooLarge => zmq::Error::EMSGSIZE,
            Self::OutOfMemory => zmq::Error::ENOMEM,
            Self::NoThread => zmq::Error::EMTHREAD,
            Self::TooManyFiles => zmq::Error::EMFILE,
            Self::Native(e) => *e,
        };
        Some(native)
    }
}

impl From<zmq::Error> for Error {
    fn from(e: zmq::Error) -> Self {
        match e {
            zmq::Error::EAGAIN => Self::WouldBlock,
            zmq::Error::EINTR => Self::Interrupted,
            zmq::Error::ETERM => Self::ContextTerminated,
            zmq::Error::ENOTSOCK => Self::InvalidSocket,
            zmq::Error::EFSM => Self::SocketState,
            zmq::Error::EINVAL => Self::InvalidArgument,
            zmq::Error::EADDRINUSE => Self::AddressInUse,
            zmq::Error::EADDRNOTAVAIL => Self::AddressNotAvailable,
            zmq::Error::ENODEV => Self::NoDevice,
            zmq::Error::EPROTONOSUPPORT => Self::ProtocolNotSupported,
            zmq::Error::ENOCOMPATPROTO => Self::IncompatibleProtocol,
            zmq::Error::EHOSTUNREACH => Self::HostUnreachable,
            zmq::Error::ECONNREFUSED => Self::ConnectionRefused,
            zmq::Error::ENOTSUP => Self::NotSupported,
            zmq::Error::EMSGSIZE => Self::MessageTooLarge,
            zmq::Error::ENOMEM => Self::OutOfMemory,
            zmq::Error::EMTHREAD => Self::NoThread,
            zmq::Error::EMFILE => Self::TooManyFiles,
            other => Self::Native(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(Error::from(zmq::Error::EAGAIN).is_retryable());
        assert!(Error::from(zmq::Error::EINTR).is_retryable());
        assert!(!Error::from(zmq::Error::ETERM).is_retryable());
        assert!(!Error::InvalidMessage.is_retryable());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::from(zmq::Error::ETERM).is_fatal());
        assert!(Error::from(zmq::Error::ENOTSOCK).is_fatal());
        assert!(!Error::WouldBlock.is_fatal());
        assert!(!Error::AddressInUse.is_fatal());
    }

    #[test]
    fn test_native_translation() {
        assert_eq!(Error::from(zmq::Error::EADDRINUSE), Error::AddressInUse);
        assert_eq!(Error::from(zmq::Error::EFSM), Error::SocketState);
        assert_eq!(
            Error::from(zmq::Error::ENOENT),
            Error::Native(zmq::Error::ENOENT)
        );
    }

    #[test]
    fn test_to_native() {
        assert_eq!(Error::WouldBlock.to_native(), Some(zmq::Error::EAGAIN));
        assert_eq!(Error::InvalidMessage.to_native(), None);
        assert_eq!(
            Error::Native(zmq::Error::EBUSY).to_native(),
            Some(zmq::Error::EBUSY)
        );

        let original = zmq::Error::EHOSTUNREACH;
        assert_eq!(Error::from(original).to_native(), Some(original));
    }
}
