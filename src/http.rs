// ABOUTME: Minimal HTTP/1.1 client over TCP built on hyper's connection API.
// ABOUTME: One connection per request, with a hard timeout around connect, send and body read.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::types::HostName;

/// Errors from a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("HTTP handshake with {addr} failed: {reason}")]
    Handshake { addr: String, reason: String },

    #[error("request to {addr} failed: {reason}")]
    Request { addr: String, reason: String },

    #[error("request to {addr} timed out after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },

    #[error("failed to build request: {0}")]
    Build(String),
}

impl HttpError {
    /// The server was never reached (refused, unresolvable, timed out).
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            HttpError::Connect { .. } | HttpError::Handshake { .. } | HttpError::Timeout { .. }
        )
    }
}

/// Host and port of an HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: HostName,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: HostName, port: u16) -> Self {
        Self { host, port }
    }

    /// `host:port`, used for the Host header and in messages.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `http://host:port` followed by `path_and_query`.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.authority(), path_and_query)
    }
}

/// Status and fully-read body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build a request with the Host header set and the given extra headers.
pub fn build_request(
    endpoint: &Endpoint,
    method: &str,
    path_and_query: &str,
    headers: &[(&str, String)],
    body: Bytes,
) -> Result<Request<Full<Bytes>>, HttpError> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path_and_query)
        .header("Host", endpoint.authority())
        .header("User-Agent", concat!("warship/", env!("CARGO_PKG_VERSION")));
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }
    builder
        .body(Full::new(body))
        .map_err(|e| HttpError::Build(e.to_string()))
}

/// Send one request and read the whole response within `timeout`.
pub async fn send(
    endpoint: &Endpoint,
    req: Request<Full<Bytes>>,
    timeout: Duration,
) -> Result<HttpResponse, HttpError> {
    match tokio::time::timeout(timeout, send_inner(endpoint, req)).await {
        Ok(result) => result,
        Err(_) => Err(HttpError::Timeout {
            addr: endpoint.authority(),
            timeout,
        }),
    }
}

async fn send_inner(
    endpoint: &Endpoint,
    req: Request<Full<Bytes>>,
) -> Result<HttpResponse, HttpError> {
    let addr = endpoint.authority();

    let stream = TcpStream::connect((endpoint.host.connect_host(), endpoint.port))
        .await
        .map_err(|source| HttpError::Connect {
            addr: addr.clone(),
            source,
        })?;

    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| HttpError::Handshake {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("HTTP connection error: {}", e);
        }
    });

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| HttpError::Request {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

    let status = resp.status().as_u16();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| HttpError::Request {
            addr,
            reason: format!("failed to read response body: {}", e),
        })?
        .to_bytes();

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_formats_authority_and_url() {
        let endpoint = Endpoint::new(HostName::new("app.example.com").unwrap(), 8080);
        assert_eq!(endpoint.authority(), "app.example.com:8080");
        assert_eq!(
            endpoint.url("/shop/index.jsp"),
            "http://app.example.com:8080/shop/index.jsp"
        );
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = Endpoint::new(HostName::new("127.0.0.1").unwrap(), port);
        let req = build_request(&endpoint, "HEAD", "/", &[], Bytes::new()).unwrap();
        let err = send(&endpoint, req, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_unreachable(), "got {err:?}");
    }
}
