//! Common types used across the Bybit client library.

pub mod common;

pub use common::*;
