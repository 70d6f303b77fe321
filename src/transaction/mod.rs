//! `x-client-transaction-id` generation.
//!
//! Signing material is scraped from the X homepage and its `ondemand.s`
//! script, cached for [`DEFAULT_TTL`], and used to sign `(method, path)`
//! pairs. Initialization runs under an async mutex so a burst of callers on
//! a cold cache results in a single pair of fetches.

pub mod animation;
pub mod bezier;
pub mod scrape;

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Error, Result, ScrapeStep};
use crate::fingerprint::FingerprintProfile;
use crate::headers::{chrome_131_navigation_headers, chrome_131_script_headers};
use crate::transport::{Client, Fetch};

pub const DEFAULT_HOMEPAGE_URL: &str = "https://x.com";
pub const DEFAULT_ONDEMAND_BASE_URL: &str = "https://abs.twimg.com/responsive-web/client-web/";

/// Seconds subtracted from the Unix time before signing.
pub const EPOCH_OFFSET: i64 = 1682924400;
pub const TRANSACTION_KEYWORD: &str = "obfiowerehiring";
/// Trailing byte of every signed payload.
pub const ADDITIONAL_RANDOM_NUMBER: u8 = 3;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Everything scraped for one TTL window. Replaced whole on refresh.
#[derive(Debug, Clone)]
pub struct SignatureMaterial {
    homepage_markup: String,
    row_index: usize,
    key_indices: Vec<usize>,
    verification_key: String,
    key_bytes: Vec<u8>,
    animation_key: String,
    fetched_at: Instant,
}

impl SignatureMaterial {
    /// Run every extraction step over already fetched homepage and script text.
    pub fn from_assets(homepage_markup: String, script: &str) -> Result<Self> {
        let (row_index, key_indices) = scrape::key_indices(script)?;
        let verification_key = scrape::verification_key(&homepage_markup)?.to_string();
        let key_bytes = scrape::key_bytes(&verification_key);
        let frames = scrape::animation_frames(&homepage_markup)?;
        let animation_key =
            animation::animation_key(&key_bytes, row_index, &key_indices, &frames);
        if animation_key.is_empty() {
            tracing::debug!(
                "animation key is empty ({} frames, {} key bytes)",
                frames.len(),
                key_bytes.len()
            );
        }

        Ok(Self {
            homepage_markup,
            row_index,
            key_indices,
            verification_key,
            key_bytes,
            animation_key,
            fetched_at: Instant::now(),
        })
    }

    pub fn homepage_markup(&self) -> &str {
        &self.homepage_markup
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn key_indices(&self) -> &[usize] {
        &self.key_indices
    }

    pub fn verification_key(&self) -> &str {
        &self.verification_key
    }

    pub fn key_bytes(&self) -> &[u8] {
        &self.key_bytes
    }

    pub fn animation_key(&self) -> &str {
        &self.animation_key
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }

    /// Sign a request at `now` (seconds since [`EPOCH_OFFSET`]) with the
    /// obfuscation byte `random_byte`.
    pub fn sign(&self, method: &str, path: &str, now: i64, random_byte: u8) -> String {
        let time_bytes = (now as u32).to_le_bytes();
        let digest = Sha256::digest(
            format!(
                "{}!{}!{}{}{}",
                method, path, now, TRANSACTION_KEYWORD, self.animation_key
            )
            .as_bytes(),
        );

        let mut out = Vec::with_capacity(self.key_bytes.len() + 4 + 16 + 2);
        out.push(random_byte);
        out.extend(
            self.key_bytes
                .iter()
                .chain(time_bytes.iter())
                .chain(digest[..16].iter())
                .chain(std::iter::once(&ADDITIONAL_RANDOM_NUMBER))
                .map(|b| b ^ random_byte),
        );
        STANDARD_NO_PAD.encode(out)
    }
}

#[derive(Debug, Clone)]
struct GeneratorConfig {
    homepage_url: String,
    ondemand_base_url: String,
    user_agent: String,
    ttl: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            homepage_url: DEFAULT_HOMEPAGE_URL.to_string(),
            ondemand_base_url: DEFAULT_ONDEMAND_BASE_URL.to_string(),
            user_agent: FingerprintProfile::Chrome131.user_agent().to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

/// Builder for [`TransactionIdGenerator`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorBuilder {
    config: GeneratorConfig,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page scraped for the verification key and animation frames.
    pub fn homepage_url(mut self, url: impl Into<String>) -> Self {
        self.config.homepage_url = url.into();
        self
    }

    /// Directory holding `ondemand.s.<hash>a.js`; a missing trailing `/` is added.
    pub fn ondemand_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.config.ondemand_base_url = url;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = ttl;
        self
    }

    pub fn build<F: Fetch>(self, fetcher: F) -> TransactionIdGenerator<F> {
        TransactionIdGenerator {
            fetcher,
            config: self.config,
            state: Mutex::new(None),
        }
    }
}

/// Signs requests with `x-client-transaction-id` tokens.
///
/// One instance per target service. Cheap to share behind an `Arc`.
pub struct TransactionIdGenerator<F: Fetch = Client> {
    fetcher: F,
    config: GeneratorConfig,
    state: Mutex<Option<Arc<SignatureMaterial>>>,
}

impl TransactionIdGenerator<Client> {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }
}

impl<F: Fetch> TransactionIdGenerator<F> {
    /// Generator with default URLs, User-Agent and TTL.
    pub fn new(fetcher: F) -> Self {
        GeneratorBuilder::new().build(fetcher)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Token for `method` and `path` (e.g. `"POST"`, `"/i/api/graphql/x/CreateGrokConversation"`).
    pub async fn generate_id(&self, method: &str, path: &str) -> Result<String> {
        let material = self.ensure_ready().await?;
        let now = chrono::Utc::now().timestamp() - EPOCH_OFFSET;
        let mut random_byte = [0u8; 1];
        OsRng
            .try_fill_bytes(&mut random_byte)
            .map_err(|e| Error::Rng(e.to_string()))?;
        Ok(material.sign(method, path, now, random_byte[0]))
    }

    /// Current material, fetching it first if absent or older than the TTL.
    ///
    /// Callers arriving during initialization wait for its outcome. A failed
    /// initialization leaves nothing cached.
    pub async fn ensure_ready(&self) -> Result<Arc<SignatureMaterial>> {
        let mut state = self.state.lock().await;
        if let Some(material) = state.as_ref() {
            if material.is_fresh(self.config.ttl) {
                return Ok(Arc::clone(material));
            }
            tracing::debug!(
                "signature material expired after {:?}",
                material.fetched_at.elapsed()
            );
        }
        *state = None;

        match self.initialize().await {
            Ok(material) => {
                tracing::info!(
                    "refreshed signature material ({} key bytes, {} key indices)",
                    material.key_bytes.len(),
                    material.key_indices.len()
                );
                let material = Arc::new(material);
                *state = Some(Arc::clone(&material));
                Ok(material)
            }
            Err(e) => {
                match e.scrape_step() {
                    Some(step) => tracing::warn!("transaction init failed at {}: {}", step, e),
                    None => tracing::warn!("transaction init failed: {}", e),
                }
                Err(e)
            }
        }
    }

    /// Drop cached material so the next call scrapes again.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    async fn initialize(&self) -> Result<SignatureMaterial> {
        let user_agent = &self.config.user_agent;
        let homepage_url = &self.config.homepage_url;

        tracing::debug!("fetching homepage {}", homepage_url);
        let homepage = self
            .fetch_text(
                ScrapeStep::Homepage,
                homepage_url,
                chrome_131_navigation_headers(user_agent),
            )
            .await?;

        let hash = scrape::ondemand_hash(&homepage)?;
        let script_url = scrape::ondemand_script_url(&self.config.ondemand_base_url, hash);
        tracing::debug!("fetching ondemand script {}", script_url);
        let referer = url::Url::parse(homepage_url)?.join("/")?;
        let script = self
            .fetch_text(
                ScrapeStep::OndemandScript,
                &script_url,
                chrome_131_script_headers(user_agent, referer.as_str()),
            )
            .await?;

        SignatureMaterial::from_assets(homepage, &script)
    }

    async fn fetch_text(
        &self,
        step: ScrapeStep,
        url: &str,
        headers: Vec<(String, String)>,
    ) -> Result<String> {
        self.fetcher
            .fetch(url, headers)
            .await
            .and_then(|response| response.expect_status(200))
            .and_then(|response| response.text())
            .map_err(|e| Error::fetch(step, e))
    }
}

/// 16 random bytes as lowercase hex, for endpoints that do not verify
/// signatures.
pub fn random_transaction_id() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Rng(e.to_string()))?;
    Ok(hex::encode(bytes))
}
