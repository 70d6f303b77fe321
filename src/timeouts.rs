//! Timeout configuration for fingerprinted requests.
//!
//! # Timeout Types
//!
//! - **connect**: TCP + TLS handshake
//! - **ttfb**: request sent to response headers received
//! - **total**: absolute deadline for dial, request and body collection
//!
//! # Usage
//!
//! ```rust,ignore
//! use masquerade::{Client, Timeouts};
//! use std::time::Duration;
//!
//! let client = Client::builder()
//!     .timeouts(Timeouts::api_defaults().connect(Duration::from_secs(5)))
//!     .build()?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Timeout configuration for HTTP requests.
///
/// All timeouts are optional. When `None`, no timeout is applied for that phase.
/// None of them reset: each is a deadline for its phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timeouts {
    /// Timeout for establishing connection (DNS + TCP + TLS handshake).
    pub connect: Option<Duration>,

    /// Time-to-first-byte timeout: time from request sent until response headers received.
    pub ttfb: Option<Duration>,

    /// Total request deadline, connect included.
    pub total: Option<Duration>,
}

impl Timeouts {
    /// Create a new Timeouts with all timeouts set to None.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for page, script and API calls.
    ///
    /// - connect: 10s
    /// - ttfb: 30s
    /// - total: 120s
    pub fn api_defaults() -> Self {
        Self {
            connect: Some(Duration::from_secs(10)),
            ttfb: Some(Duration::from_secs(30)),
            total: Some(Duration::from_secs(120)),
        }
    }

    /// Set connect timeout.
    pub fn connect(mut self, timeout: Duration) -> Self {
        self.connect = Some(timeout);
        self
    }

    /// Set TTFB (time-to-first-byte) timeout.
    pub fn ttfb(mut self, timeout: Duration) -> Self {
        self.ttfb = Some(timeout);
        self
    }

    /// Set total request deadline.
    pub fn total(mut self, timeout: Duration) -> Self {
        self.total = Some(timeout);
        self
    }
}

/// Await `fut`, failing with `on_elapsed(limit)` when `limit` passes first.
pub(crate) async fn with_deadline<T, F>(
    limit: Option<Duration>,
    fut: F,
    on_elapsed: impl FnOnce(Duration) -> Error,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| on_elapsed(limit))?,
        None => fut.await,
    }
}
