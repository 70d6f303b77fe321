//! Browser fingerprint tuple hashed by the sentinel proof-of-work.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::ser::{Serialize, SerializeTuple, Serializer};

const CORES: [u32; 7] = [1, 2, 4, 8, 12, 16, 24];
const SCREENS: [u32; 3] = [3000, 4000, 6000];

const DEFAULT_MEMORY: u64 = 4294705152;
const DEFAULT_SCRIPT: &str = "https://cdn.oaistatic.com/_next/static/chunks/app/layout-BuaxVDeh.js";
const DEFAULT_DEPLOYMENT: &str = "4811fd1c94b550c8f03fcc863ee6c1a99940efc5";
const NAVIGATOR_KEY: &str =
    "updateAdInterestGroups\u{2212}function updateAdInterestGroups() { [native code] }";
const DOCUMENT_KEY: &str = "location";
const WINDOW_KEY: &str = "__NEXT_PRELOADREADY";
const DEFAULT_PERFORMANCE_NOW: f64 = 885.6999999880791;

/// Fourteen positional values serialized as a JSON array.
///
/// `iteration` (index 3) and `elapsed_ms` (index 9) change on every attempt;
/// everything else is fixed for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintConfig {
    /// Cores plus screen bucket.
    pub hardware: u32,
    pub parse_time: String,
    pub memory: u64,
    pub iteration: u64,
    pub user_agent: String,
    pub script_src: String,
    pub deployment_id: String,
    pub language: String,
    pub languages: String,
    pub elapsed_ms: u64,
    pub navigator_key: String,
    pub document_key: String,
    pub window_key: String,
    pub performance_now: f64,
}

impl FingerprintConfig {
    /// Tuple for `user_agent` with a random hardware bucket and the current
    /// Pacific time.
    pub fn browser(user_agent: impl Into<String>) -> Self {
        let mut rng = rand::thread_rng();
        let cores = CORES.choose(&mut rng).copied().unwrap_or(8);
        let screen = SCREENS.choose(&mut rng).copied().unwrap_or(4000);
        Self::new(cores + screen, format_parse_time(Utc::now()), user_agent)
    }

    /// Tuple with explicit hardware bucket and timestamp, zeroed counters.
    pub fn new(hardware: u32, parse_time: String, user_agent: impl Into<String>) -> Self {
        Self {
            hardware,
            parse_time,
            memory: DEFAULT_MEMORY,
            iteration: 0,
            user_agent: user_agent.into(),
            script_src: DEFAULT_SCRIPT.to_string(),
            deployment_id: DEFAULT_DEPLOYMENT.to_string(),
            language: "en-US".to_string(),
            languages: "en-US,en".to_string(),
            elapsed_ms: 0,
            navigator_key: NAVIGATOR_KEY.to_string(),
            document_key: DOCUMENT_KEY.to_string(),
            window_key: WINDOW_KEY.to_string(),
            performance_now: DEFAULT_PERFORMANCE_NOW,
        }
    }
}

/// `Date.toString()` as a browser in US Pacific time renders it.
///
/// The offset is a fixed UTC-8 all year so the wall-clock time always agrees
/// with the `GMT-0800` suffix; daylight saving is not applied.
pub fn format_parse_time(now: DateTime<Utc>) -> String {
    let pacific = now - chrono::Duration::hours(8);
    format!(
        "{} GMT-0800 (Pacific Time)",
        pacific.format("%a %b %d %Y %H:%M:%S")
    )
}

impl Serialize for FingerprintConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(14)?;
        tuple.serialize_element(&self.hardware)?;
        tuple.serialize_element(&self.parse_time)?;
        tuple.serialize_element(&self.memory)?;
        tuple.serialize_element(&self.iteration)?;
        tuple.serialize_element(&self.user_agent)?;
        tuple.serialize_element(&self.script_src)?;
        tuple.serialize_element(&self.deployment_id)?;
        tuple.serialize_element(&self.language)?;
        tuple.serialize_element(&self.languages)?;
        tuple.serialize_element(&self.elapsed_ms)?;
        tuple.serialize_element(&self.navigator_key)?;
        tuple.serialize_element(&self.document_key)?;
        tuple.serialize_element(&self.window_key)?;
        tuple.serialize_element(&self.performance_now)?;
        tuple.end()
    }
}
