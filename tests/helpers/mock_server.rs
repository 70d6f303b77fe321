use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use boring::ssl::SslAcceptor;
use bytes::Bytes;
use http::{HeaderMap, Request, Response, Version};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

/// A canned response for one path.
#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[allow(dead_code)]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// What the server saw for one request.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub version: Version,
    pub headers: HeaderMap,
}

type Routes = Arc<HashMap<String, Route>>;
type Log = Arc<Mutex<Vec<RecordedRequest>>>;

/// hyper-backed mock server: plain HTTP/1.1, or TLS with HTTP/1.1 or HTTP/2
/// chosen by the negotiated ALPN. Unknown paths get 404.
pub struct MockServer {
    addr: SocketAddr,
    tls: bool,
    requests: Log,
}

impl MockServer {
    /// Plain-text HTTP/1.1 server.
    pub async fn start(routes: Vec<(&str, Route)>) -> Self {
        Self::spawn(routes, None).await
    }

    /// TLS server using `acceptor`.
    #[allow(dead_code)]
    pub async fn start_tls(routes: Vec<(&str, Route)>, acceptor: SslAcceptor) -> Self {
        Self::spawn(routes, Some(acceptor)).await
    }

    async fn spawn(routes: Vec<(&str, Route)>, acceptor: Option<SslAcceptor>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let tls = acceptor.is_some();
        let routes: Routes = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let requests: Log = Arc::new(Mutex::new(Vec::new()));
        let acceptor = acceptor.map(Arc::new);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let (tcp, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!("Accept error: {}", e);
                        break;
                    }
                };
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    let Some(acceptor) = acceptor else {
                        serve_http1(tcp, routes, log).await;
                        return;
                    };
                    let stream = match tokio_boring::accept(&acceptor, tcp).await {
                        Ok(stream) => stream,
                        Err(e) => {
                            tracing::debug!("TLS accept failed: {:?}", e);
                            return;
                        }
                    };
                    if stream.ssl().selected_alpn_protocol() == Some(b"h2") {
                        serve_http2(stream, routes, log).await;
                    } else {
                        serve_http1(stream, routes, log).await;
                    }
                });
            }
        });

        Self {
            addr,
            tls,
            requests,
        }
    }

    #[allow(dead_code)]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL without a trailing slash.
    pub fn url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://127.0.0.1:{}", scheme, self.addr.port())
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

async fn serve_http1<I>(io: I, routes: Routes, log: Log)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |req| handle(req, Arc::clone(&routes), Arc::clone(&log)));
    if let Err(e) = hyper::server::conn::http1::Builder::new()
        .serve_connection(TokioIo::new(io), service)
        .await
    {
        tracing::debug!("HTTP/1.1 connection ended: {}", e);
    }
}

async fn serve_http2<I>(io: I, routes: Routes, log: Log)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |req| handle(req, Arc::clone(&routes), Arc::clone(&log)));
    if let Err(e) = hyper::server::conn::http2::Builder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(io), service)
        .await
    {
        tracing::debug!("HTTP/2 connection ended: {}", e);
    }
}

async fn handle(
    req: Request<Incoming>,
    routes: Routes,
    log: Log,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    log.lock().unwrap().push(RecordedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        version: req.version(),
        headers: req.headers().clone(),
    });

    let route = routes
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::ok("not found").status(404));
    let mut builder = Response::builder().status(route.status);
    for (name, value) in &route.headers {
        builder = builder.header(*name, value.as_str());
    }
    Ok(builder.body(Full::new(Bytes::from(route.body))).unwrap())
}
