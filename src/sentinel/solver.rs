//! SHA3-512 proof-of-work search.
//!
//! The loop is synchronous and never yields. [`solve_detached`] bounds it
//! from the outside.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha3::{Digest, Sha3_512};

use super::config::FingerprintConfig;

pub const MAX_ITERATIONS: u64 = 1_000_000;

/// Prefix of a solved token.
pub const RESULT_PREFIX: &str = "gAAAAAB";

/// Prefix of the fallback token sent when no nonce was found.
pub const ERROR_PREFIX: &str = "gAAAAABwQ8Lk5FbGpA2NcR9dShT6gYjU7VxZ4D";

/// Outcome of a search; `solved == false` carries the fallback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub token: String,
    pub solved: bool,
}

/// Search up to [`MAX_ITERATIONS`] nonces for `difficulty`.
pub fn solve(config: &FingerprintConfig, seed: &str, difficulty: &str) -> SolveResult {
    solve_with_limit(config, seed, difficulty, MAX_ITERATIONS)
}

/// [`solve`] with a custom iteration budget.
pub fn solve_with_limit(
    config: &FingerprintConfig,
    seed: &str,
    difficulty: &str,
    max_iterations: u64,
) -> SolveResult {
    let start = Instant::now();
    search(config, seed, difficulty, max_iterations, || {
        start.elapsed().as_millis() as u64
    })
}

fn search(
    config: &FingerprintConfig,
    seed: &str,
    difficulty: &str,
    max_iterations: u64,
    mut elapsed_ms: impl FnMut() -> u64,
) -> SolveResult {
    let byte_len = (difficulty.len() / 2).max(1);
    let mut config = config.clone();
    let mut json = Vec::with_capacity(512);

    for i in 0..max_iterations {
        config.iteration = i;
        config.elapsed_ms = elapsed_ms();

        json.clear();
        if let Err(e) = serde_json::to_writer(&mut json, &config) {
            tracing::error!("failed to serialize fingerprint config: {}", e);
            break;
        }
        let b64 = STANDARD.encode(&json);

        let hash = Sha3_512::new()
            .chain_update(seed.as_bytes())
            .chain_update(b64.as_bytes())
            .finalize();
        let prefix = hex::encode(&hash[..byte_len.min(hash.len())]);
        if prefix.as_str() <= difficulty {
            tracing::debug!("proof of work solved after {} iterations", i + 1);
            return SolveResult {
                token: format!("{}{}", RESULT_PREFIX, b64),
                solved: true,
            };
        }
    }

    tracing::debug!(
        "proof of work exhausted {} iterations for difficulty {}",
        max_iterations,
        difficulty
    );
    SolveResult {
        token: fallback_token(seed),
        solved: false,
    }
}

fn fallback_token(seed: &str) -> String {
    format!("{}{}", ERROR_PREFIX, STANDARD.encode(format!("\"{}\"", seed)))
}

/// Run [`solve`] on the blocking pool and stop waiting after `deadline`.
///
/// On timeout the worker is abandoned and finishes unobserved; `None` is
/// returned.
pub async fn solve_detached(
    config: FingerprintConfig,
    seed: String,
    difficulty: String,
    deadline: Duration,
) -> Option<SolveResult> {
    let worker = tokio::task::spawn_blocking(move || solve(&config, &seed, &difficulty));
    match tokio::time::timeout(deadline, worker).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            tracing::error!("proof of work worker failed: {}", e);
            None
        }
        Err(_) => {
            tracing::warn!("proof of work abandoned after {:?}", deadline);
            None
        }
    }
}
