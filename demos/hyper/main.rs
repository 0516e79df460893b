mod bridge;
mod routes;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use bunner_ctx_rs::{App, Config, TrustProxyConfig};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config {
        trust_proxy: true,
        trust_proxy_config: TrustProxyConfig {
            loopback: true,
            ..TrustProxyConfig::default()
        },
        proxy_header: Some("X-Forwarded-For".to_string()),
        ..Config::default()
    };
    let app = Arc::new(App::new(config, routes::routes())?);

    let addr: SocketAddr = "127.0.0.1:5003".parse()?;
    let listener = TcpListener::bind(addr).await?;

    println!("Hyper example running on http://{addr}");

    loop {
        let (stream, peer) = listener.accept().await?;
        let app = Arc::clone(&app);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            let service = bridge::CtxService::new(app, peer);

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                eprintln!("connection error: {err}");
            }
        });
    }
}
