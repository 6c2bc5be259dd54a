//! Core types shared by waste collection calendar clients.

/// Default HTTP transport.
pub mod http;
/// Collection events and waste streams.
pub mod model;
/// Errors, query parameters and the transport trait.
pub mod ports;
/// Decoding of the upstream timestamp formats.
pub mod timestamp;

pub use http::*;
pub use model::*;
pub use ports::*;

// Re-exported so callers can hand in a pre-configured client.
pub use reqwest;
