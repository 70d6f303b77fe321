//! BoringSSL TLS connector.

use std::io;
use std::io::Read;
use std::os::raw::c_int;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use boring::ssl::{SslConnector, SslMethod, SslSessionCacheMode, SslVersion};
use boring::x509::X509;
use boring_sys::{CRYPTO_BUFFER, SSL, SSL_CTX};
use http::Uri;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

use crate::error::{Error, Result, TransportError};
use crate::fingerprint::tls::{alpn_wire_format, TlsFingerprint};
use crate::fingerprint::{CertCompression, FingerprintProfile};
use crate::timeouts::with_deadline;

/// Copy `decompressed` into a fresh CRYPTO_BUFFER for BoringSSL.
///
/// # Safety
/// `out` must be the output pointer handed to a decompression callback.
unsafe fn emit_crypto_buffer(
    decompressed: &[u8],
    uncompressed_len: usize,
    out: *mut *mut CRYPTO_BUFFER,
) -> c_int {
    if decompressed.len() != uncompressed_len {
        return 0;
    }
    // CRYPTO_BUFFER_new copies, the Vec is dropped normally by the caller.
    let buffer = boring_sys::CRYPTO_BUFFER_new(
        decompressed.as_ptr(),
        decompressed.len(),
        std::ptr::null_mut(),
    );
    if buffer.is_null() {
        return 0;
    }
    *out = buffer;
    1
}

/// Brotli certificate decompression callback (RFC 8879), as Chrome advertises.
unsafe extern "C" fn decompress_brotli_cert(
    _ssl: *mut SSL,
    out: *mut *mut CRYPTO_BUFFER,
    uncompressed_len: usize,
    in_: *const u8,
    in_len: usize,
) -> c_int {
    let compressed = std::slice::from_raw_parts(in_, in_len);
    let mut decompressed = Vec::with_capacity(uncompressed_len);
    let mut decoder = brotli::Decompressor::new(compressed, uncompressed_len.max(1));
    match decoder.read_to_end(&mut decompressed) {
        Ok(_) => emit_crypto_buffer(&decompressed, uncompressed_len, out),
        Err(_) => 0,
    }
}

/// BoringSSL-based connector producing one fresh connection per call.
#[derive(Debug, Clone)]
pub struct BoringConnector {
    tls_config: TlsFingerprint,
    alpn: Vec<u8>,
    root_certs: Vec<Vec<u8>>,
    connect_timeout: Option<Duration>,
}

impl BoringConnector {
    /// Create a connector for a browser profile.
    pub fn new(profile: FingerprintProfile) -> Self {
        Self {
            tls_config: profile.tls_fingerprint(),
            alpn: alpn_wire_format(profile.alpn_protocols()),
            root_certs: Vec::new(),
            connect_timeout: None,
        }
    }

    /// Add custom root certificates (DER or PEM).
    pub fn with_root_certificates(mut self, certs: Vec<Vec<u8>>) -> Self {
        self.root_certs = certs;
        self
    }

    /// Bound TCP connect plus TLS handshake.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn configure_ssl(&self) -> Result<SslConnector> {
        let mut builder = SslConnector::builder(SslMethod::tls_client())
            .map_err(|e| Error::tls(format!("Failed to create SSL connector: {}", e)))?;

        for cert_bytes in &self.root_certs {
            let cert = X509::from_der(cert_bytes)
                .or_else(|_| X509::from_pem(cert_bytes))
                .map_err(|e| Error::tls(format!("Invalid root certificate: {}", e)))?;
            builder
                .cert_store_mut()
                .add_cert(cert)
                .map_err(|e| Error::tls(format!("Failed to add root certificate: {}", e)))?;
        }

        let fp = &self.tls_config;
        let cipher_str = fp.tls12_cipher_string();
        if !cipher_str.is_empty() {
            builder
                .set_cipher_list(&cipher_str)
                .map_err(|e| Error::tls(format!("Failed to set cipher list: {}", e)))?;
        }
        if !fp.curves.is_empty() {
            builder
                .set_curves_list(&fp.curves.join(":"))
                .map_err(|e| Error::tls(format!("Failed to set curves: {}", e)))?;
        }
        if !fp.sigalgs.is_empty() {
            builder
                .set_sigalgs_list(&fp.sigalgs.join(":"))
                .map_err(|e| Error::tls(format!("Failed to set signature algorithms: {}", e)))?;
        }

        builder.set_grease_enabled(fp.grease);
        builder.set_permute_extensions(fp.permute_extensions);
        if fp.ocsp_stapling {
            builder.enable_ocsp_stapling();
        }
        if fp.signed_cert_timestamps {
            builder.enable_signed_cert_timestamps();
        }

        if fp.cert_compression == CertCompression::Brotli {
            // Client side only decompresses; no compression callback.
            unsafe {
                let ctx = builder.as_ptr() as *mut SSL_CTX;
                boring_sys::SSL_CTX_add_cert_compression_alg(
                    ctx,
                    boring_sys::TLSEXT_cert_compression_brotli as u16,
                    None,
                    Some(decompress_brotli_cert),
                );
            }
        }

        builder
            .set_min_proto_version(Some(SslVersion::TLS1_2))
            .map_err(|e| Error::tls(format!("Failed to set min TLS version: {}", e)))?;
        builder
            .set_max_proto_version(Some(SslVersion::TLS1_3))
            .map_err(|e| Error::tls(format!("Failed to set max TLS version: {}", e)))?;

        builder.set_session_cache_mode(SslSessionCacheMode::CLIENT);
        builder
            .set_alpn_protos(&self.alpn)
            .map_err(|e| Error::tls(format!("Failed to set ALPN: {}", e)))?;

        Ok(builder.build())
    }

    /// Connect to a URI, returning either a plain TCP or TLS stream.
    pub async fn connect(&self, uri: &Uri) -> Result<MaybeHttpsStream> {
        let host = uri
            .host()
            .ok_or_else(|| Error::http_protocol(format!("Missing host in {}", uri)))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let https = uri.scheme_str() == Some("https");
        let port = uri.port_u16().unwrap_or(if https { 443 } else { 80 });
        let addr = if host.contains(':') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };

        with_deadline(self.connect_timeout, self.dial(&addr, &host, https), |d| {
            TransportError::ConnectTimeout(d).into()
        })
        .await
    }

    async fn dial(&self, addr: &str, host: &str, https: bool) -> Result<MaybeHttpsStream> {
        let tcp_stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::Dial {
                addr: addr.to_string(),
                source,
            })?;
        let _ = tcp_stream.set_nodelay(true);

        if !https {
            return Ok(MaybeHttpsStream::Http(tcp_stream));
        }

        let ssl_config = self
            .configure_ssl()?
            .configure()
            .map_err(|e| Error::tls(format!("Failed to configure SSL: {}", e)))?;
        let ssl_stream = tokio_boring::connect(ssl_config, host, tcp_stream)
            .await
            .map_err(|e| Error::tls(format!("TLS handshake with {} failed: {}", addr, e)))?;
        Ok(MaybeHttpsStream::Https(ssl_stream))
    }
}

impl Default for BoringConnector {
    fn default() -> Self {
        Self::new(FingerprintProfile::default())
    }
}

/// Negotiated ALPN protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlpnProtocol {
    /// HTTP/2 ("h2")
    H2,
    /// HTTP/1.1 ("http/1.1")
    Http1,
    /// No ALPN negotiated or unknown protocol
    Unknown,
}

/// Stream that can be either HTTP (plain TCP) or HTTPS (TLS).
#[derive(Debug)]
pub enum MaybeHttpsStream {
    /// Plain TCP stream for HTTP.
    Http(TcpStream),
    /// TLS-wrapped stream for HTTPS.
    Https(SslStream<TcpStream>),
}

impl MaybeHttpsStream {
    /// Get the negotiated ALPN protocol; `Unknown` for plain TCP.
    pub fn alpn_protocol(&self) -> AlpnProtocol {
        match self {
            MaybeHttpsStream::Http(_) => AlpnProtocol::Unknown,
            MaybeHttpsStream::Https(stream) => match stream.ssl().selected_alpn_protocol() {
                Some(b"h2") => AlpnProtocol::H2,
                Some(b"http/1.1") => AlpnProtocol::Http1,
                _ => AlpnProtocol::Unknown,
            },
        }
    }
}

impl AsyncRead for MaybeHttpsStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_read(cx, buf),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeHttpsStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_write(cx, buf),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_flush(cx),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            MaybeHttpsStream::Http(stream) => Pin::new(stream).poll_shutdown(cx),
            MaybeHttpsStream::Https(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
