//! Fingerprinted HTTP/1.1 and HTTP/2 client via hyper.
//!
//! Every request dials a fresh connection and drops it afterwards, so each
//! call performs its own TLS handshake. There is no pool.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper::header::{HeaderName, HeaderValue, HOST, USER_AGENT};
use hyper::{Method, Request as HyperRequest, Uri};
use hyper_util::rt::{TokioExecutor, TokioIo};

use crate::error::{Error, Result};
use crate::fingerprint::{FingerprintProfile, Http2Settings};
use crate::response::Response;
use crate::timeouts::{with_deadline, Timeouts};
use crate::transport::connector::{AlpnProtocol, BoringConnector, MaybeHttpsStream};
use crate::transport::Fetch;

/// HTTP client whose TLS handshake looks like the configured browser.
#[derive(Debug, Clone)]
pub struct Client {
    connector: BoringConnector,
    profile: FingerprintProfile,
    http2_settings: Http2Settings,
    timeouts: Timeouts,
}

/// Builder for HTTP requests.
pub struct RequestBuilder<'a> {
    client: &'a Client,
    uri: String,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

/// Builder for creating HTTP clients.
pub struct ClientBuilder {
    profile: FingerprintProfile,
    http2_settings: Option<Http2Settings>,
    timeouts: Timeouts,
    root_certs: Vec<Vec<u8>>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Fingerprint profile chosen at construction.
    pub fn profile(&self) -> FingerprintProfile {
        self.profile
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::GET, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::POST, url)
    }

    /// Create a custom method request builder.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder {
            client: self,
            uri: url.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    async fn execute(&self, req: RequestBuilder<'_>) -> Result<Response> {
        let uri: Uri = req
            .uri
            .parse()
            .map_err(|e| Error::http_protocol(format!("Invalid URI {}: {}", req.uri, e)))?;
        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            other => {
                return Err(Error::http_protocol(format!(
                    "Unsupported scheme: {}",
                    other.unwrap_or("<none>")
                )))
            }
        }

        let stream = self.connector.connect(&uri).await?;
        let alpn = stream.alpn_protocol();
        tracing::debug!("{} {} negotiated {:?}", req.method, uri, alpn);

        let request = build_request(&req, &uri, alpn, self.profile.user_agent())?;
        let ttfb = self.timeouts.ttfb;
        let response = if alpn == AlpnProtocol::H2 {
            with_deadline(ttfb, self.send_http2(stream, request), ttfb_elapsed).await?
        } else {
            with_deadline(ttfb, send_http1(stream, request), ttfb_elapsed).await?
        };

        let (parts, body) = response.into_parts();
        let body_bytes = body
            .collect()
            .await
            .map_err(|e| Error::http_protocol(format!("Failed to read body: {}", e)))?
            .to_bytes();

        Ok(Response::new(
            parts.status.as_u16(),
            parts.headers,
            body_bytes,
            parts.version,
        ))
    }

    async fn send_http2(
        &self,
        stream: MaybeHttpsStream,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<hyper::Response<Incoming>> {
        let settings = &self.http2_settings;
        tracing::debug!("HTTP/2 SETTINGS {}", settings.akamai_settings());
        let mut builder = http2::Builder::new(TokioExecutor::new());
        builder
            .header_table_size(settings.header_table_size)
            .max_concurrent_streams(settings.max_concurrent_streams)
            .initial_stream_window_size(settings.initial_window_size)
            .initial_connection_window_size(settings.initial_connection_window_size)
            .max_frame_size(settings.max_frame_size)
            .max_header_list_size(settings.max_header_list_size);

        let (mut sender, conn) = builder
            .handshake(TokioIo::new(stream))
            .await
            .map_err(|e| Error::http_protocol(format!("HTTP/2 handshake failed: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::error!("HTTP/2 connection error: {}", e);
            }
        });

        sender
            .send_request(request)
            .await
            .map_err(|e| Error::http_protocol(format!("HTTP/2 request failed: {}", e)))
    }
}

fn ttfb_elapsed(d: Duration) -> Error {
    Error::timeout(format!("no response headers within {:?}", d))
}

async fn send_http1(
    stream: MaybeHttpsStream,
    request: HyperRequest<Full<Bytes>>,
) -> Result<hyper::Response<Incoming>> {
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| Error::http_protocol(format!("HTTP/1.1 handshake failed: {}", e)))?;

    // The connection ends once `sender` is dropped with the response.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::error!("HTTP/1.1 connection error: {}", e);
        }
    });

    sender
        .send_request(request)
        .await
        .map_err(|e| Error::http_protocol(format!("HTTP/1.1 request failed: {}", e)))
}

/// HTTP/2 takes the absolute URI for its pseudo-headers; HTTP/1.1 wants
/// origin-form plus an explicit Host header.
fn build_request(
    req: &RequestBuilder<'_>,
    uri: &Uri,
    alpn: AlpnProtocol,
    default_user_agent: &str,
) -> Result<HyperRequest<Full<Bytes>>> {
    let is_h2 = alpn == AlpnProtocol::H2;
    let target: Uri = if is_h2 {
        uri.clone()
    } else {
        uri.path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
            .parse()
            .map_err(|e| Error::http_protocol(format!("Invalid request target: {}", e)))?
    };

    let mut builder = HyperRequest::builder()
        .method(req.method.clone())
        .uri(target);
    let header_map = builder
        .headers_mut()
        .ok_or_else(|| Error::http_protocol("Failed to get headers mut"))?;

    for (key, value) in &req.headers {
        header_map.append(
            HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::http_protocol(format!("Invalid header name: {}", e)))?,
            HeaderValue::from_str(value)
                .map_err(|e| Error::http_protocol(format!("Invalid header value: {}", e)))?,
        );
    }
    if !header_map.contains_key(USER_AGENT) {
        header_map.insert(
            USER_AGENT,
            HeaderValue::from_str(default_user_agent)
                .map_err(|e| Error::http_protocol(format!("Invalid user agent: {}", e)))?,
        );
    }
    if !is_h2 && !header_map.contains_key(HOST) {
        let authority = uri
            .authority()
            .ok_or_else(|| Error::http_protocol("Missing authority"))?;
        header_map.insert(
            HOST,
            HeaderValue::from_str(authority.as_str())
                .map_err(|e| Error::http_protocol(format!("Invalid host: {}", e)))?,
        );
    }

    let body = match &req.body {
        Some(bytes) => Full::new(Bytes::from(bytes.clone())),
        None => Full::new(Bytes::new()),
    };
    builder
        .body(body)
        .map_err(|e| Error::http_protocol(format!("Failed to build request: {}", e)))
}

impl<'a> RequestBuilder<'a> {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set all headers (replaces existing headers).
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Send the request and return the response.
    ///
    /// Dropping the future cancels the request and closes its connection.
    pub async fn send(self) -> Result<Response> {
        let client = self.client;
        let total = client.timeouts.total;
        with_deadline(total, client.execute(self), |d| {
            Error::timeout(format!("request exceeded {:?}", d))
        })
        .await
    }
}

impl Fetch for Client {
    async fn fetch(&self, url: &str, headers: Vec<(String, String)>) -> Result<Response> {
        self.get(url).headers(headers).send().await
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self {
            profile: FingerprintProfile::default(),
            http2_settings: None,
            timeouts: Timeouts::api_defaults(),
            root_certs: Vec::new(),
        }
    }

    /// Set the fingerprint profile.
    pub fn fingerprint(mut self, profile: FingerprintProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Override the profile's HTTP/2 settings.
    pub fn http2_settings(mut self, settings: Http2Settings) -> Self {
        self.http2_settings = Some(settings);
        self
    }

    /// Replace all timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set connect timeout (TCP + TLS handshake).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect = Some(timeout);
        self
    }

    /// Set total request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.total = Some(timeout);
        self
    }

    /// Trust an extra root certificate (DER or PEM).
    pub fn add_root_certificate(mut self, cert: Vec<u8>) -> Self {
        self.root_certs.push(cert);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let connector = BoringConnector::new(self.profile)
            .with_root_certificates(self.root_certs)
            .with_connect_timeout(self.timeouts.connect);
        let http2_settings = self
            .http2_settings
            .unwrap_or_else(|| self.profile.http2_settings());

        Ok(Client {
            connector,
            profile: self.profile,
            http2_settings,
            timeouts: self.timeouts,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
