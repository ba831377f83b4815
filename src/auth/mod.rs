//! Authentication module for the Bybit API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Millisecond timestamp generation with server clock-offset correction
//! - HMAC-SHA256 signature generation for authenticated requests

mod credentials;
mod signature;
mod timestamp;

pub use credentials::{Credentials, CredentialsProvider, EnvCredentials, StaticCredentials};
pub use signature::{sign_request, sign_ws_auth};
pub use timestamp::{FixedTimestamp, SystemTimestamp, TimestampProvider};
