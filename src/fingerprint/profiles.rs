//! Browser fingerprint profiles.

use super::http2::Http2Settings;
use super::tls::TlsFingerprint;

/// ALPN list offered by every browser profile.
pub const BROWSER_ALPN: &[&str] = &["h2", "http/1.1"];

/// Browser fingerprint profile for impersonation.
///
/// Chrome randomizes TLS extension order since v110, so the JA3 hash of a
/// correctly impersonated connection changes per handshake; JA4 stays stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintProfile {
    /// Chrome 131 on macOS.
    #[default]
    Chrome131,
    /// No fingerprinting - use default TLS settings
    None,
}

impl FingerprintProfile {
    /// Get the User-Agent string for this profile.
    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::Chrome131 => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
            }
            Self::None => "masquerade/0.1",
        }
    }

    /// Get the TLS fingerprint for this profile.
    pub fn tls_fingerprint(&self) -> TlsFingerprint {
        match self {
            Self::Chrome131 => TlsFingerprint::chrome_131(),
            Self::None => TlsFingerprint::default(),
        }
    }

    /// HTTP/2 SETTINGS sent once ALPN selects `h2`.
    pub fn http2_settings(&self) -> Http2Settings {
        Http2Settings::default()
    }

    /// ALPN protocols in preference order.
    pub fn alpn_protocols(&self) -> &'static [&'static str] {
        BROWSER_ALPN
    }
}
