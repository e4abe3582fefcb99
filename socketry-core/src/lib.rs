//! Socketry Core
//!
//! Transport-independent building blocks shared by the `socketry` crate:
//! - Error domain and native error translation (`error`)
//! - Socket roles (`role`)
//! - Socket identifiers (`identifier`)
//! - Socket configuration (`options`)
//! - Endpoint and authority addressing (`endpoint`, `authority`)
//! - CURVE keys and certificates (`keys`)

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::match_same_arms)]

pub mod authority;
pub mod endpoint;
pub mod error;
pub mod identifier;
pub mod keys;
pub mod options;
pub mod role;

// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::authority::{Authority, AuthorityError};
    pub use crate::endpoint::{Endpoint, EndpointError};
    pub use crate::error::{Error, Result};
    pub use crate::identifier::Identifier;
    pub use crate::keys::{Certificate, CurveKey, KeyError};
    pub use crate::options::SocketOptions;
    pub use crate::role::Role;
}
