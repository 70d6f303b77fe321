//! HTTP transport implementations.
//!
//! - TLS via BoringSSL with a browser ClientHello
//! - HTTP/1.1 and HTTP/2 via hyper, chosen by ALPN

use std::future::Future;

use crate::error::Result;
use crate::response::Response;

pub mod client;
pub mod connector;

pub use client::{Client, ClientBuilder, RequestBuilder};
pub use connector::{AlpnProtocol, BoringConnector, MaybeHttpsStream};

/// Anything able to GET an upstream asset with browser headers.
///
/// Implemented by [`Client`]; tests substitute in-memory fixtures.
pub trait Fetch: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        headers: Vec<(String, String)>,
    ) -> impl Future<Output = Result<Response>> + Send;
}
