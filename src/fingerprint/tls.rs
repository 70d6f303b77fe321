//! TLS fingerprint configuration (JA3/JA4).

/// Chrome 131 cipher suites in exact order.
///
/// BoringSSL always offers the TLS 1.3 suites first and ignores them in the
/// cipher string, so only the TLS 1.2 entries below affect the handshake.
pub const CHROME_131_CIPHER_SUITES: &[&str] = &[
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
    "ECDHE-ECDSA-AES128-GCM-SHA256",
    "ECDHE-RSA-AES128-GCM-SHA256",
    "ECDHE-ECDSA-AES256-GCM-SHA384",
    "ECDHE-RSA-AES256-GCM-SHA384",
    "ECDHE-ECDSA-CHACHA20-POLY1305",
    "ECDHE-RSA-CHACHA20-POLY1305",
    "ECDHE-RSA-AES128-SHA",
    "ECDHE-RSA-AES256-SHA",
    "AES128-GCM-SHA256",
    "AES256-GCM-SHA384",
    "AES128-SHA",
    "AES256-SHA",
];

/// Chrome 131 signature algorithms.
pub const CHROME_131_SIGNATURE_ALGORITHMS: &[&str] = &[
    "ecdsa_secp256r1_sha256",
    "rsa_pss_rsae_sha256",
    "rsa_pkcs1_sha256",
    "ecdsa_secp384r1_sha384",
    "rsa_pss_rsae_sha384",
    "rsa_pkcs1_sha384",
    "rsa_pss_rsae_sha512",
    "rsa_pkcs1_sha512",
];

/// Chrome 131 supported groups, hybrid post-quantum first.
pub const CHROME_131_CURVES: &[&str] = &["X25519MLKEM768", "X25519", "P-256", "P-384"];

/// Chrome 131 extension IDs before permutation, GREASE excluded.
///
/// The ML-KEM key share pushes the ClientHello past 512 bytes, so BoringSSL
/// adds no padding extension (21), same as Chrome.
pub const CHROME_131_EXTENSION_IDS: &[u16] =
    &[0, 23, 65281, 10, 11, 35, 16, 5, 13, 18, 51, 45, 43, 27];

/// Certificate compression algorithm advertised in `compress_certificate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertCompression {
    /// Chrome
    Brotli,
    #[default]
    None,
}

/// TLS fingerprint configuration.
#[derive(Debug, Clone)]
pub struct TlsFingerprint {
    /// Cipher suites in order.
    pub cipher_list: Vec<&'static str>,
    /// Signature algorithms.
    pub sigalgs: Vec<&'static str>,
    /// Supported curves/groups.
    pub curves: Vec<&'static str>,
    /// Extension IDs the ClientHello carries; BoringSSL permutes the order.
    pub extensions: Vec<u16>,
    /// Enable GREASE values.
    pub grease: bool,
    /// Randomize extension order per connection (Chrome 110+).
    pub permute_extensions: bool,
    pub cert_compression: CertCompression,
    /// Send `status_request` (5).
    pub ocsp_stapling: bool,
    /// Send `signed_certificate_timestamp` (18).
    pub signed_cert_timestamps: bool,
}

impl Default for TlsFingerprint {
    fn default() -> Self {
        Self {
            cipher_list: vec![],
            sigalgs: vec![],
            curves: vec![],
            extensions: vec![],
            grease: false,
            permute_extensions: false,
            cert_compression: CertCompression::None,
            ocsp_stapling: false,
            signed_cert_timestamps: false,
        }
    }
}

impl TlsFingerprint {
    /// Create a TLS fingerprint for Chrome 131.
    pub fn chrome_131() -> Self {
        Self {
            cipher_list: CHROME_131_CIPHER_SUITES.to_vec(),
            sigalgs: CHROME_131_SIGNATURE_ALGORITHMS.to_vec(),
            curves: CHROME_131_CURVES.to_vec(),
            extensions: CHROME_131_EXTENSION_IDS.to_vec(),
            grease: true,
            permute_extensions: true,
            cert_compression: CertCompression::Brotli,
            ocsp_stapling: true,
            signed_cert_timestamps: true,
        }
    }

    /// Cipher string for `set_cipher_list`, TLS 1.2 suites only.
    pub fn tls12_cipher_string(&self) -> String {
        self.cipher_list
            .iter()
            .filter(|c| !c.starts_with("TLS_"))
            .copied()
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Encode ALPN protocol names in wire format (length-prefixed).
pub fn alpn_wire_format(protocols: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for proto in protocols {
        out.push(proto.len() as u8);
        out.extend_from_slice(proto.as_bytes());
    }
    out
}
