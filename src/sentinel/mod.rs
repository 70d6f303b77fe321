//! Sentinel proof-of-work.
//!
//! The chat-requirements response may carry a challenge `{seed, difficulty,
//! required}`. Solving it means finding an iteration count for which
//! `SHA3-512(seed ++ base64(json(config)))` starts at or below `difficulty`.

pub mod config;
pub mod solver;

use serde::{Deserialize, Serialize};

pub use config::{format_parse_time, FingerprintConfig};
pub use solver::{
    solve, solve_detached, solve_with_limit, SolveResult, ERROR_PREFIX, MAX_ITERATIONS,
    RESULT_PREFIX,
};

/// Challenge as delivered in the `proofofwork` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfWorkChallenge {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub seed: String,
    #[serde(default)]
    pub difficulty: String,
}

impl ProofOfWorkChallenge {
    /// Solve in place; `None` when no proof is required.
    pub fn solve(&self, config: &FingerprintConfig) -> Option<SolveResult> {
        if !self.required {
            return None;
        }
        tracing::debug!(
            "proof of work required: seed={} difficulty={}",
            self.seed,
            self.difficulty
        );
        Some(solve(config, &self.seed, &self.difficulty))
    }
}
