//! # Masquerade
//!
//! Browser impersonation for chat web apps without a public API.
//!
//! - [`transport`]: HTTP/1.1 and HTTP/2 over BoringSSL with a Chrome ClientHello
//! - [`transaction`]: `x-client-transaction-id` signing from scraped page material
//! - [`sentinel`]: SHA3-512 proof-of-work for sentinel challenges

pub mod error;
pub mod headers;
pub mod response;
pub mod timeouts;

pub mod fingerprint;

pub mod transport;

pub mod sentinel;
pub mod transaction;

// Re-exports
pub use error::{Error, Result, ScrapeStep, TransportError};
pub use fingerprint::FingerprintProfile;
pub use response::Response;
pub use sentinel::{FingerprintConfig, ProofOfWorkChallenge, SolveResult};
pub use timeouts::Timeouts;
pub use transaction::{random_transaction_id, SignatureMaterial, TransactionIdGenerator};
pub use transport::{Client, ClientBuilder, Fetch};
