//! Error types for masquerade crate.

use std::fmt;
use std::io;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching, signing or solving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection could not be established or spoken over.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid HTTP status code.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// A scraped asset lacked a pattern the signer depends on.
    #[error("could not find {step}: {detail}")]
    Extraction { step: ScrapeStep, detail: String },

    /// A scraping step failed to download its asset.
    #[error("{step} fetch failed: {source}")]
    Fetch {
        step: ScrapeStep,
        #[source]
        source: Box<Error>,
    },

    /// Malformed base64 or similar encoded material.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Decompression error.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The OS random source failed.
    #[error("RNG error: {0}")]
    Rng(String),

    /// Total request deadline exceeded.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

/// Dial, handshake and protocol failures of a single request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// TCP connect failed.
    #[error("failed to connect to {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Connect timeout (TCP + TLS handshake).
    #[error("connect timeout after {0:?}")]
    ConnectTimeout(Duration),

    /// TLS configuration or handshake failure.
    #[error("TLS error: {0}")]
    Handshake(String),

    /// HTTP/1.1 or HTTP/2 framing failure after the handshake.
    #[error("HTTP protocol error: {0}")]
    Protocol(String),
}

/// Named steps of transaction-material scraping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStep {
    Homepage,
    OndemandReference,
    OndemandScript,
    KeyIndices,
    VerificationKey,
    AnimationFrames,
}

impl ScrapeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::OndemandReference => "ondemand.s reference",
            Self::OndemandScript => "ondemand.s script",
            Self::KeyIndices => "KEY_BYTE indices",
            Self::VerificationKey => "site verification key",
            Self::AnimationFrames => "loading animation frames",
        }
    }
}

impl fmt::Display for ScrapeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create an HTTP status error.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Create an extraction error for a scraping step.
    pub fn extraction(step: ScrapeStep, detail: impl Into<String>) -> Self {
        Self::Extraction {
            step,
            detail: detail.into(),
        }
    }

    /// Wrap a failure that happened while a scraping step was fetching.
    pub fn fetch(step: ScrapeStep, source: Error) -> Self {
        Self::Fetch {
            step,
            source: Box::new(source),
        }
    }

    /// Create a TLS error.
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Transport(TransportError::Handshake(message.into()))
    }

    /// Create an HTTP protocol error.
    pub fn http_protocol(message: impl Into<String>) -> Self {
        Self::Transport(TransportError::Protocol(message.into()))
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// The scraping step this error belongs to, if any.
    pub fn scrape_step(&self) -> Option<ScrapeStep> {
        match self {
            Self::Extraction { step, .. } | Self::Fetch { step, .. } => Some(*step),
            _ => None,
        }
    }
}
