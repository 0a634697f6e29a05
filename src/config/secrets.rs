//! Secret handling utilities.
//!
//! Re-exports secrecy types so callers holding the Slack token don't need
//! a direct secrecy dependency.

pub use secrecy::{ExposeSecret, SecretString};
