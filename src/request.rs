use crate::constants::{header, method};
use crate::headers::HeaderMap;
use crate::response::Response;
use crate::trust::UNSPECIFIED_PEER;
use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Transport-side handle on the underlying connection.
pub trait Connection: Send {
    /// Closes the connection immediately, without writing a response.
    fn force_close(&mut self);

    /// Writes `response` as it stands. Called before closing on `end()`.
    fn flush(&mut self, response: &Response) -> io::Result<()>;
}

/// Request as delivered by the transport.
pub struct RawRequest {
    pub method: String,
    /// Origin-form request target, `/path?query`.
    pub target: String,
    pub host: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub peer: SocketAddr,
    pub tls: bool,
    pub protocol: String,
    pub connection: Option<Box<dyn Connection>>,
}

impl Default for RawRequest {
    fn default() -> Self {
        Self {
            method: method::GET.to_string(),
            target: "/".to_string(),
            host: String::new(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            peer: SocketAddr::new(UNSPECIFIED_PEER, 0),
            tls: false,
            protocol: "HTTP/1.1".to_string(),
            connection: None,
        }
    }
}

impl fmt::Debug for RawRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawRequest")
            .field("method", &self.method)
            .field("target", &self.target)
            .field("host", &self.host)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("peer", &self.peer)
            .field("tls", &self.tls)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

impl RawRequest {
    /// Builds a request from a method and a target in origin or absolute form.
    ///
    /// An absolute target (`https://example.com/a?b`) also sets the host and
    /// the TLS flag.
    pub fn new<M: Into<String>, T: AsRef<str>>(method: M, target: T) -> Self {
        let mut request = Self {
            method: method.into(),
            ..Self::default()
        };
        request.set_target(target.as_ref());
        request
    }

    fn set_target(&mut self, target: &str) {
        if target.starts_with('/') || target == "*" {
            self.target = target.to_string();
            return;
        }

        match url::Url::parse(target) {
            Ok(url) if url.has_host() => {
                let host = url.host_str().unwrap_or_default();
                self.host = match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                self.tls = url.scheme() == "https";
                self.target = match url.query() {
                    Some(query) => format!("{}?{query}", url.path()),
                    None => url.path().to_string(),
                };
                if !self.headers.contains(header::HOST) {
                    self.headers.insert(header::HOST, self.host.clone());
                }
            }
            _ => self.target = format!("/{target}"),
        }
    }

    pub fn with_header<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_host<H: Into<String>>(mut self, host: H) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = peer;
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_connection<C: Connection + 'static>(mut self, connection: C) -> Self {
        self.connection = Some(Box::new(connection));
        self
    }

    /// Path part of the target, without the query.
    pub fn path(&self) -> &str {
        match self.target.find('?') {
            Some(idx) => &self.target[..idx],
            None => &self.target,
        }
    }

    /// Raw query string, without the `?`.
    pub fn query(&self) -> &str {
        match self.target.find('?') {
            Some(idx) => &self.target[idx + 1..],
            None => "",
        }
    }
}

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;
