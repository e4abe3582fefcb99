//! Network authority: an `{ip address, port}` tuple.
//!
//! IPv4 addresses are held as IPv4-mapped IPv6 addresses so a single
//! representation covers both families.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

/// Container for an `{ip address, port}` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Authority {
    ip: Ipv6Addr,
    port: u16,
}

impl Authority {
    /// Parse `[2001:db8::2]:port` or `1.2.240.1:port`; the port is optional.
    pub fn parse(s: &str) -> Result<Self, AuthorityError> {
        s.parse()
    }

    /// Build from a host in one of the forms `[2001:db8::2]`, `2001:db8::2`
    /// or `1.2.240.1`.
    pub fn from_host(host: &str, port: u16) -> Result<Self, AuthorityError> {
        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        let ip = bare
            .parse::<IpAddr>()
            .map_err(|_| AuthorityError::InvalidAddress(host.to_string()))?;

        Ok(Self::new(ip, port))
    }

    /// Build from an IP address of either family.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        let ip = match ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };

        Self { ip, port }
    }

    /// The address as IPv6 (IPv4 addresses are mapped).
    pub fn ip(&self) -> Ipv6Addr {
        self.ip
    }

    /// The tcp port, zero if unspecified.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// True if the port is non-zero.
    pub fn is_valid(&self) -> bool {
        self.port != 0
    }

    /// True if the address is an IPv4-mapped address.
    pub fn is_ipv4(&self) -> bool {
        self.to_ipv4().is_some()
    }

    /// The host as text: `2001:db8::2` or `1.2.240.1`, never bracketed.
    pub fn to_hostname(&self) -> String {
        match self.to_ipv4() {
            Some(v4) => v4.to_string(),
            None => self.ip.to_string(),
        }
    }

    /// The authority as a socket address.
    pub fn to_socket_addr(&self) -> SocketAddr {
        match self.to_ipv4() {
            Some(v4) => SocketAddr::from((v4, self.port)),
            None => SocketAddr::from((self.ip, self.port)),
        }
    }

    fn to_ipv4(&self) -> Option<Ipv4Addr> {
        self.ip.to_ipv4_mapped()
    }
}

impl Default for Authority {
    fn default() -> Self {
        Self {
            ip: Ipv6Addr::UNSPECIFIED,
            port: 0,
        }
    }
}

impl From<SocketAddr> for Authority {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl FromStr for Authority {
    type Err = AuthorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();

        let (host, port) = if value.starts_with('[') {
            let close = value
                .find(']')
                .ok_or_else(|| AuthorityError::InvalidAddress(value.to_string()))?;
            (&value[..=close], &value[close + 1..])
        } else {
            match value.split_once(':') {
                Some((host, port)) => (host, &value[host.len()..]),
                None => (value, ""),
            }
        };

        let port = if port.is_empty() {
            0
        } else {
            port.strip_prefix(':')
                .filter(|p| !p.is_empty() && p.len() <= 5 && p.chars().all(|c| c.is_ascii_digit()))
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| AuthorityError::InvalidPort(value.to_string()))?
        };

        Self::from_host(host, port)
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_ipv4() {
            Some(v4) => write!(f, "{v4}")?,
            None => write!(f, "[{}]", self.ip)?,
        }

        if self.port != 0 {
            write!(f, ":{}", self.port)?;
        }

        Ok(())
    }
}

/// Errors that can occur when parsing authorities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    #[error("Invalid IP address in authority: {0}")]
    InvalidAddress(String),

    #[error("Invalid port in authority: {0}")]
    InvalidPort(String),
}
