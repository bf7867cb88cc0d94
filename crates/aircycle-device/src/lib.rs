//! Vendor cloud client for the air-conditioning unit.
//!
//! Keeps one authenticated session, reads and writes device properties and
//! recovers from expired or rejected tokens.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::DeviceApiClient;
pub use error::DeviceError;
pub use session::Session;
pub use types::{DeviceProperty, PropertyName, TokenResponse};
