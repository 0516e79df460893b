use bunner_ctx_rs::constants::header;
use bunner_ctx_rs::{App, Config, Context, RawRequest, RouteStack, TrustProxyConfig};
use super::connection::RecordingConnection;
use std::net::SocketAddr;

pub type Routes = RouteStack<Context>;

pub fn routes() -> Routes {
    RouteStack::new()
}

pub fn app(routes: Routes) -> App {
    App::new(Config::default(), routes).expect("default config is valid")
}

pub fn app_with(config: Config, routes: Routes) -> App {
    App::new(config, routes).expect("test config is valid")
}

/// Config trusting `proxies` and reading client addresses from `X-Forwarded-For`.
pub fn trusting<I, S>(proxies: I) -> Config
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Config {
        trust_proxy: true,
        trust_proxy_config: TrustProxyConfig {
            proxies: proxies.into_iter().map(Into::into).collect(),
            ..TrustProxyConfig::default()
        },
        proxy_header: Some(header::X_FORWARDED_FOR.to_string()),
        ..Config::default()
    }
}

pub struct RequestBuilder {
    raw: RawRequest,
}

pub fn get(target: &str) -> RequestBuilder {
    request("GET", target)
}

pub fn post(target: &str) -> RequestBuilder {
    request("POST", target)
}

pub fn request(method: &str, target: &str) -> RequestBuilder {
    RequestBuilder {
        raw: RawRequest::new(method, target),
    }
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.raw = self.raw.with_header(name, value);
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.raw = self.raw.with_host(host);
        self
    }

    pub fn peer(mut self, ip: &str) -> Self {
        let addr: SocketAddr = SocketAddr::new(ip.parse().expect("valid peer ip"), 5000);
        self.raw = self.raw.with_peer(addr);
        self
    }

    pub fn tls(mut self) -> Self {
        self.raw = self.raw.with_tls(true);
        self
    }

    pub fn body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.raw = self.raw.with_body(body);
        self
    }

    pub fn connection(mut self, connection: RecordingConnection) -> Self {
        self.raw = self.raw.with_connection(connection);
        self
    }

    pub fn build(self) -> RawRequest {
        self.raw
    }
}
