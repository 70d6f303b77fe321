//! Extraction of signing material from the X homepage and ondemand.s script.
//!
//! Each function is one named step so a layout change upstream is reported
//! as the step that stopped matching.

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::{general_purpose::GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use regex::Regex;

use crate::error::{Error, Result, ScrapeStep};

static ONDEMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]ondemand\.s['"]:\s*['"]([0-9A-Za-z_]*)['"]"#).unwrap()
});

static INDICES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9A-Za-z_]\[([0-9]{1,2})\],\s*16\)").unwrap());

/// Looser form tried when minification changes spacing or identifier length.
static INDICES_FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*[0-9A-Za-z_$]+\[\s*([0-9]{1,2})\s*\]\s*,\s*16\s*\)").unwrap()
});

static META_NAME_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\b[^>]*\bname=['"]twitter-site-verification['"][^>]*\bcontent=['"]([^'"]+)['"][^>]*>"#)
        .unwrap()
});

static META_CONTENT_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\b[^>]*\bcontent=['"]([^'"]+)['"][^>]*\bname=['"]twitter-site-verification['"][^>]*>"#)
        .unwrap()
});

static LOADING_ANIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<svg\b[^>]*\bid=['"]loading-x-anim[^'"]*['"][^>]*>(.*?)</svg>"#).unwrap()
});

static PATH_D_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<path\b[^>]*\bd=['"]([^'"]+)['"][^>]*>"#).unwrap());

/// Standard alphabet, lenient about non-zero trailing bits.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Hash of the versioned `ondemand.s` chunk referenced by the homepage.
pub fn ondemand_hash(html: &str) -> Result<&str> {
    ONDEMAND_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|hash| !hash.is_empty())
        .ok_or_else(|| {
            Error::extraction(
                ScrapeStep::OndemandReference,
                format!("no \"ondemand.s\" entry in {} bytes of homepage markup", html.len()),
            )
        })
}

/// Script URL for an ondemand hash under `base` (which ends in `/`).
pub fn ondemand_script_url(base: &str, hash: &str) -> String {
    format!("{}ondemand.s.{}a.js", base, hash)
}

/// Row index and key-byte indices from `(x[NN], 16)` accesses in the script.
///
/// The first match is the row index, the remainder are the key indices.
pub fn key_indices(script: &str) -> Result<(usize, Vec<usize>)> {
    let mut indices = collect_indices(&INDICES_RE, script)?;
    if indices.len() < 2 {
        tracing::debug!(
            "strict index pattern matched {} times, trying fallback",
            indices.len()
        );
        indices = collect_indices(&INDICES_FALLBACK_RE, script)?;
    }
    if indices.len() < 2 {
        return Err(Error::extraction(
            ScrapeStep::KeyIndices,
            format!(
                "expected at least 2 \"(x[N], 16)\" accesses, found {} in {} bytes of script",
                indices.len(),
                script.len()
            ),
        ));
    }
    let row_index = indices.remove(0);
    Ok((row_index, indices))
}

fn collect_indices(re: &Regex, script: &str) -> Result<Vec<usize>> {
    re.captures_iter(script)
        .map(|c| {
            c[1].parse::<usize>()
                .map_err(|e| Error::Decode(format!("invalid key index {:?}: {}", &c[1], e)))
        })
        .collect()
}

/// Content of `<meta name="twitter-site-verification">`, either attribute order.
pub fn verification_key(html: &str) -> Result<&str> {
    [&*META_NAME_FIRST_RE, &*META_CONTENT_FIRST_RE]
        .into_iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str()))
        .ok_or_else(|| {
            Error::extraction(
                ScrapeStep::VerificationKey,
                "no <meta name=\"twitter-site-verification\"> tag",
            )
        })
}

/// Base64-decode the verification key, falling back to its raw bytes.
pub fn key_bytes(key: &str) -> Vec<u8> {
    let mut padded = key.to_string();
    let rem = padded.len() % 4;
    if rem != 0 {
        padded.push_str(&"=".repeat(4 - rem));
    }
    match LENIENT_STANDARD.decode(padded.as_bytes()) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("verification key is not base64 ({}), using raw bytes", e);
            key.as_bytes().to_vec()
        }
    }
}

/// One path `d` attribute per loading-animation SVG: the second path when
/// present, else the first.
pub fn animation_frames(html: &str) -> Result<Vec<String>> {
    let frames: Vec<String> = LOADING_ANIM_RE
        .captures_iter(html)
        .filter_map(|svg| {
            let inner = svg.get(1)?.as_str();
            let ds: Vec<&str> = PATH_D_RE
                .captures_iter(inner)
                .filter_map(|p| p.get(1).map(|m| m.as_str()))
                .collect();
            ds.get(1).or_else(|| ds.first()).map(|d| d.to_string())
        })
        .collect();

    if frames.is_empty() {
        return Err(Error::extraction(
            ScrapeStep::AnimationFrames,
            "no <svg id=\"loading-x-anim-*\"> block with a <path d=...>",
        ));
    }
    Ok(frames)
}
