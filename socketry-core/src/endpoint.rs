//! Endpoint abstraction for socket addressing.
//!
//! An endpoint is a `{scheme, host, port}` tuple written as
//! `[scheme://]host[:port]`. Sockets only ever format endpoints; parsing is
//! confined to this module.

use std::fmt;
use std::str::FromStr;

use crate::authority::Authority;

/// Schemes accepted when parsing an endpoint.
pub const SCHEMES: [&str; 6] = ["tcp", "udp", "http", "https", "inproc", "ipc"];

const SCHEME_SEPARATOR: &str = "://";
const MAX_PORT_DIGITS: usize = 5;

/// Transport endpoint address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parse an endpoint from a string.
    ///
    /// Supported formats:
    /// - `tcp://127.0.0.1:5555`
    /// - `tcp://[::1]:5555` (IPv6)
    /// - `inproc://name`
    /// - `localhost:8080` (no scheme)
    ///
    /// # Examples
    ///
    /// ```
    /// use socketry_core::endpoint::Endpoint;
    ///
    /// let endpoint = Endpoint::parse("tcp://127.0.0.1:5555").unwrap();
    /// assert_eq!(endpoint.scheme(), "tcp");
    /// assert_eq!(endpoint.host(), "127.0.0.1");
    /// assert_eq!(endpoint.port(), 5555);
    /// ```
    pub fn parse(s: &str) -> Result<Self, EndpointError> {
        s.parse()
    }

    /// Endpoint without a scheme.
    pub fn from_host(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: String::new(),
            host: host.into(),
            port,
        }
    }

    /// Fully specified endpoint.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// The scheme, or an empty string.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host name or IP address (IPv6 hosts keep their brackets).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port, zero if not specified.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// True if the endpoint carries a scheme.
    pub fn is_valid(&self) -> bool {
        !self.scheme.is_empty()
    }

    /// Copy of this endpoint with a `*` host replaced by `localhost`.
    ///
    /// Intended for clients connecting to a service configured to bind to
    /// all interfaces.
    pub fn to_local(&self) -> Self {
        let host = if self.host == "*" {
            "localhost".to_string()
        } else {
            self.host.clone()
        };

        Self::new(self.scheme.clone(), host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::from_host("localhost", 0)
    }
}

impl From<&Authority> for Endpoint {
    fn from(authority: &Authority) -> Self {
        let host = if authority.is_ipv4() {
            authority.to_hostname()
        } else {
            format!("[{}]", authority.to_hostname())
        };

        Self::from_host(host, authority.port())
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();

        let (scheme, rest) = match value.split_once(SCHEME_SEPARATOR) {
            Some((scheme, rest)) => {
                if !SCHEMES.contains(&scheme) {
                    return Err(EndpointError::InvalidScheme(value.to_string()));
                }
                (scheme, rest)
            }
            None => ("", value),
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (address, tail) = bracketed
                .split_once(']')
                .ok_or_else(|| EndpointError::InvalidHost(value.to_string()))?;

            let address_ok = !address.is_empty()
                && address
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.');
            if !address_ok {
                return Err(EndpointError::InvalidHost(value.to_string()));
            }

            (&rest[..address.len() + 2], tail)
        } else {
            let end = rest.find(':').unwrap_or(rest.len());
            if end == 0 {
                return Err(EndpointError::InvalidHost(value.to_string()));
            }
            (&rest[..end], &rest[end..])
        };

        let port = if port.is_empty() {
            0
        } else {
            parse_port(port.strip_prefix(':'))
                .ok_or_else(|| EndpointError::InvalidPort(value.to_string()))?
        };

        Ok(Self::new(scheme, host, port))
    }
}

fn parse_port(digits: Option<&str>) -> Option<u16> {
    let digits = digits?;
    if digits.is_empty()
        || digits.len() > MAX_PORT_DIGITS
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    digits.parse().ok()
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}{}", self.scheme, SCHEME_SEPARATOR)?;
        }

        write!(f, "{}", self.host)?;

        if self.port != 0 {
            write!(f, ":{}", self.port)?;
        }

        Ok(())
    }
}

/// Errors that can occur when parsing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid scheme in endpoint: {0} (expected one of tcp, udp, http, https, inproc, ipc)")]
    InvalidScheme(String),

    #[error("Invalid host in endpoint: {0}")]
    InvalidHost(String),

    #[error("Invalid port in endpoint: {0}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_ipv4() {
        let endpoint = Endpoint::parse("tcp://127.0.0.1:5555").unwrap();
        assert_eq!(endpoint.scheme(), "tcp");
        assert_eq!(endpoint.host(), "127.0.0.1");
        assert_eq!(endpoint.port(), 5555);
        assert_eq!(endpoint.to_string(), "tcp://127.0.0.1:5555");
    }

    #[test]
    fn test_parse_tcp_ipv6() {
        let endpoint = Endpoint::parse("tcp://[::1]:5555").unwrap();
        assert_eq!(endpoint.host(), "[::1]");
        assert_eq!(endpoint.port(), 5555);
        assert_eq!(endpoint.to_string(), "tcp://[::1]:5555");
    }

    #[test]
    fn test_parse_inproc() {
        let endpoint = Endpoint::parse("inproc://my-endpoint").unwrap();
        assert_eq!(endpoint.scheme(), "inproc");
        assert_eq!(endpoint.host(), "my-endpoint");
        assert_eq!(endpoint.port(), 0);
        assert_eq!(endpoint.to_string(), "inproc://my-endpoint");
    }

    #[test]
    fn test_parse_without_scheme() {
        let endpoint = Endpoint::parse("localhost:8080").unwrap();
        assert!(!endpoint.is_valid());
        assert_eq!(endpoint.host(), "localhost");
        assert_eq!(endpoint.to_string(), "localhost:8080");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = Endpoint::parse("ftp://127.0.0.1:5555");
        assert!(matches!(result, Err(EndpointError::InvalidScheme(_))));
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            Endpoint::parse("tcp://127.0.0.1:99999"),
            Err(EndpointError::InvalidPort(_))
        ));
        assert!(matches!(
            Endpoint::parse("tcp://127.0.0.1:123456"),
            Err(EndpointError::InvalidPort(_))
        ));
        assert!(matches!(
            Endpoint::parse("tcp://127.0.0.1:*"),
            Err(EndpointError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_invalid_host() {
        assert!(matches!(
            Endpoint::parse("tcp://:5555"),
            Err(EndpointError::InvalidHost(_))
        ));
        assert!(matches!(
            Endpoint::parse("tcp://[zz::1]:5555"),
            Err(EndpointError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_to_local() {
        let endpoint = Endpoint::parse("tcp://*:9091").unwrap();
        assert_eq!(endpoint.to_local().to_string(), "tcp://localhost:9091");

        let endpoint = Endpoint::parse("tcp://10.0.0.1:9091").unwrap();
        assert_eq!(endpoint.to_local(), endpoint);
    }

    #[test]
    fn test_default_endpoint() {
        let endpoint = Endpoint::default();
        assert_eq!(endpoint.to_string(), "localhost");
        assert!(!endpoint.is_valid());
    }
}
