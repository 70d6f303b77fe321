use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Version};
use masquerade::transport::Fetch;
use masquerade::{Response, Result};

/// Decodes to bytes 1..=16.
pub const VERIFICATION_KEY: &str = "AQIDBAUGBwgJCgsMDQ4PEA";
pub const ONDEMAND_HASH: &str = "3c2b1a0f";
pub const HOMEPAGE_URL: &str = "https://x.com";
pub const SCRIPT_URL: &str =
    "https://abs.twimg.com/responsive-web/client-web/ondemand.s.3c2b1a0fa.js";

/// Row 15, key indices [1, 2].
pub const ONDEMAND_SCRIPT: &str = "(self.webpackChunk_twitter_responsive_web=self.webpackChunk_twitter_responsive_web||[]).push([[7],{83914:(e,t,n)=>{\"use strict\";const r=parseInt(e[15], 16),o=parseInt(e[1], 16),a=parseInt(e[2], 16);t.Z=[r,o,a]}}]);";

/// With the fixture key, byte 5 selects frame 2 and byte 15 selects row 0,
/// at frame time 0. The derived animation key is `"ff100100100"`.
pub const EXPECTED_ANIMATION_KEY: &str = "ff100100100";

pub fn homepage_html() -> String {
    let frames = [
        "M 10,30 C 9 9 9",
        "M 10,30 C 9 9 9",
        "M 10,30 C 255 16 0 0 0 0 0 0 128 255 255",
        "M 10,30 C 9 9 9",
    ];
    let svgs: String = frames
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                r#"<svg id="loading-x-anim-{}" width="0" height="0"><path d="M0 0h24v24H0z"></path><path d="{}"></path></svg>"#,
                i, d
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html dir="ltr" lang="en"><head><meta charset="utf-8"/><meta name="twitter-site-verification" content="{}"/></head><body>{}<script>window.__SCRIPTS__={{"main":"a1b2c3","ondemand.s":"{}","vendor":"9f"}};</script></body></html>"#,
        VERIFICATION_KEY, svgs, ONDEMAND_HASH
    )
}

/// In-memory [`Fetch`] that counts hits per URL.
pub struct FixtureFetcher {
    routes: Mutex<HashMap<String, (u16, String)>>,
    hits: Mutex<HashMap<String, usize>>,
    last_headers: Mutex<HashMap<String, Vec<(String, String)>>>,
    delay: Option<Duration>,
    offline: AtomicBool,
}

#[allow(dead_code)]
impl FixtureFetcher {
    /// Serves the fixture homepage and script at their default URLs.
    pub fn new() -> Self {
        let fetcher = Self::empty();
        fetcher.serve(HOMEPAGE_URL, 200, homepage_html());
        fetcher.serve(SCRIPT_URL, 200, ONDEMAND_SCRIPT);
        fetcher
    }

    pub fn empty() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            hits: Mutex::new(HashMap::new()),
            last_headers: Mutex::new(HashMap::new()),
            delay: None,
            offline: AtomicBool::new(false),
        }
    }

    /// Sleep before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn serve(&self, url: &str, status: u16, body: impl Into<String>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.into()));
    }

    /// While set, every fetch fails as a dial error would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn last_header(&self, url: &str, name: &str) -> Option<String> {
        self.last_headers.lock().unwrap().get(url).and_then(|headers| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        })
    }
}

impl Fetch for FixtureFetcher {
    async fn fetch(&self, url: &str, headers: Vec<(String, String)>) -> Result<Response> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        self.last_headers
            .lock()
            .unwrap()
            .insert(url.to_string(), headers);

        if self.offline.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "fixture offline",
            )
            .into());
        }

        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        Ok(Response::new(
            status,
            HeaderMap::new(),
            Bytes::from(body),
            Version::HTTP_2,
        ))
    }
}
