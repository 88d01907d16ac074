//! Access log record built for every request

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, OriginalUri, Request},
    http::{
        header::{self, HeaderMap},
        StatusCode, Uri,
    },
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{ROOT_PATH, X_FORWARDED_FOR, X_REAL_IP};
use crate::utils::{format_latency, latency_ticks};

/// One access log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    pub remote_ip: String,
    pub status: u16,
    pub host: String,
    pub uri: String,
    pub user_agent: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub referer: String,
    /// Latency in nanoseconds
    pub latency: i64,
    pub latency_human: String,
    /// `Content-Length` of the request, if the client sent one
    pub bytes_in: Option<String>,
    /// Bytes of response body delivered to the client
    pub bytes_out: i64,
}

impl RequestRecord {
    /// Combine the request metadata with the status left by the pipeline.
    ///
    /// `bytes_out` starts at zero and is filled in once the body has been sent.
    pub(crate) fn new(request: RequestSnapshot, status: StatusCode, latency: Duration) -> Self {
        Self {
            remote_ip: request.remote_ip,
            status: status.as_u16(),
            host: request.host,
            uri: request.uri,
            user_agent: request.user_agent,
            method: request.method,
            path: normalize_path(&request.path),
            protocol: request.protocol,
            referer: request.referer,
            latency: latency_ticks(latency),
            latency_human: format_latency(latency),
            bytes_in: request.bytes_in,
            bytes_out: 0,
        }
    }

    /// The record as a field-name to value mapping
    pub fn fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

/// Request metadata read before the request is handed down the pipeline
#[derive(Debug, Clone)]
pub(crate) struct RequestSnapshot {
    remote_ip: String,
    host: String,
    uri: String,
    user_agent: String,
    method: String,
    path: String,
    protocol: String,
    referer: String,
    bytes_in: Option<String>,
}

impl RequestSnapshot {
    pub(crate) fn capture(request: &Request) -> Self {
        // Nested routers strip their prefix from the request URI
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or_else(|| request.uri());
        let headers = request.headers();

        Self {
            remote_ip: client_ip(request),
            host: header_str(headers, header::HOST.as_str())
                .map(str::to_string)
                .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
                .unwrap_or_default(),
            uri: request_target(uri),
            user_agent: header_value(headers, header::USER_AGENT.as_str()),
            method: request.method().to_string(),
            path: uri.path().to_string(),
            protocol: format!("{:?}", request.version()),
            referer: header_value(headers, header::REFERER.as_str()),
            bytes_in: header_str(headers, header::CONTENT_LENGTH.as_str()).map(str::to_string),
        }
    }
}

/// Substitute `/` for an empty request path
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-Ip`, then the peer address
fn client_ip(request: &Request) -> String {
    let headers = request.headers();

    header_str(headers, X_FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            header_str(headers, X_REAL_IP)
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        })
        .map(str::to_string)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_default()
}

/// The request target as sent on the request line
fn request_target(uri: &Uri) -> String {
    match uri.path_and_query() {
        Some(target) => target.as_str().to_string(),
        None => uri.to_string(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    header_str(headers, name).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Method};

    fn request(uri: &str) -> axum::http::request::Builder {
        Request::builder().uri(uri)
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/orders"), "/orders");
    }

    #[test]
    fn test_snapshot_reads_request_line_and_headers() {
        let req = request("/orders?page=2")
            .method(Method::POST)
            .header(header::HOST, "shop.example")
            .header(header::USER_AGENT, "curl/8.5.0")
            .header(header::REFERER, "https://shop.example/cart")
            .header(header::CONTENT_LENGTH, "12")
            .body(Body::from("{\"qty\": 10}"))
            .unwrap();

        let snapshot = RequestSnapshot::capture(&req);
        assert_eq!(snapshot.method, "POST");
        assert_eq!(snapshot.uri, "/orders?page=2");
        assert_eq!(snapshot.path, "/orders");
        assert_eq!(snapshot.host, "shop.example");
        assert_eq!(snapshot.user_agent, "curl/8.5.0");
        assert_eq!(snapshot.referer, "https://shop.example/cart");
        assert_eq!(snapshot.protocol, "HTTP/1.1");
        assert_eq!(snapshot.bytes_in.as_deref(), Some("12"));
    }

    #[test]
    fn test_snapshot_missing_headers_are_empty() {
        let req = request("/").body(Body::empty()).unwrap();

        let snapshot = RequestSnapshot::capture(&req);
        assert_eq!(snapshot.user_agent, "");
        assert_eq!(snapshot.referer, "");
        assert_eq!(snapshot.host, "");
        assert_eq!(snapshot.remote_ip, "");
        assert!(snapshot.bytes_in.is_none());
    }

    #[test]
    fn test_snapshot_prefers_original_uri() {
        let mut req = request("/42").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(OriginalUri("/api/v1/orders/42".parse().unwrap()));

        let snapshot = RequestSnapshot::capture(&req);
        assert_eq!(snapshot.path, "/api/v1/orders/42");
        assert_eq!(snapshot.uri, "/api/v1/orders/42");
    }

    #[test]
    fn test_client_ip_sources() {
        let peer = SocketAddr::from(([127, 0, 0, 1], 40_000));

        let mut req = request("/")
            .header(X_FORWARDED_FOR, "203.0.113.7, 10.0.0.1")
            .header(X_REAL_IP, "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&req), "203.0.113.7");

        let mut req = request("/")
            .header(X_REAL_IP, "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&req), "198.51.100.2");

        let mut req = request("/").body(Body::empty()).unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&req), "127.0.0.1");
    }

    #[test]
    fn test_record_from_authority_form_request() {
        let req = Request::builder()
            .method(Method::CONNECT)
            .uri("example.com:443")
            .body(Body::empty())
            .unwrap();
        let snapshot = RequestSnapshot::capture(&req);

        let record = RequestRecord::new(snapshot, StatusCode::OK, Duration::from_millis(2));
        assert_eq!(record.path, "/");
        assert_eq!(record.uri, "example.com:443");
        assert_eq!(record.host, "example.com:443");
        assert_eq!(record.latency, 2_000_000);
        assert_eq!(record.latency_human, "2ms");
    }

    #[test]
    fn test_record_fields() {
        let req = request("/orders").body(Body::empty()).unwrap();

        let record = RequestRecord::new(
            RequestSnapshot::capture(&req),
            StatusCode::CREATED,
            Duration::from_micros(15),
        );
        assert_eq!(record.status, 201);
        assert_eq!(record.bytes_out, 0);

        let fields = record.fields();
        assert_eq!(fields["path"], "/orders");
        assert_eq!(fields["status"], 201);
        assert_eq!(fields["latency"], 15_000);
        assert_eq!(fields["latency_human"], "15µs");
        assert!(fields["bytes_in"].is_null());
        assert_eq!(fields.len(), 13);
    }
}
