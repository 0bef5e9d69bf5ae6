//! Username/password authentication against the host PAM stack.
//!
//! One blocking entry point, [`authenticate`], runs a full PAM
//! transaction: start, authenticate, account validation, end. Prompts
//! raised by the configured modules are answered from the supplied
//! credentials, never interactively.

#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

mod conv;
mod error;
mod ffi;
mod session;

pub use crate::conv::Credentials;
pub use crate::error::AuthError;
pub use crate::session::authenticate;
