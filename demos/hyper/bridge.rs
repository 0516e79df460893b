use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bunner_ctx_rs::{App, Connection, RawRequest, Response as CtxResponse, Termination};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::http::header::{CONNECTION, HeaderName, HeaderValue};
use hyper::http::StatusCode;
use hyper::service::Service;
use hyper::{Request, Response};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type CtxBody = Full<Bytes>;

/// Hyper service that feeds each request through the context pool.
#[derive(Clone)]
pub struct CtxService {
    app: Arc<App>,
    peer: SocketAddr,
}

impl CtxService {
    pub fn new(app: Arc<App>, peer: SocketAddr) -> Self {
        Self { app, peer }
    }
}

/// The bridge writes the response itself once dispatch returns, so flushing
/// and closing are left to hyper.
struct HyperConnection;

impl Connection for HyperConnection {
    fn force_close(&mut self) {}

    fn flush(&mut self, _response: &CtxResponse) -> io::Result<()> {
        Ok(())
    }
}

impl Service<Request<Incoming>> for CtxService {
    type Response = Response<CtxBody>;
    type Error = BoxError;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let app = Arc::clone(&self.app);
        let peer = self.peer;

        Box::pin(async move {
            let raw = into_raw_request(req, peer).await?;
            let dispatched = app.handle(raw);

            match dispatched.termination {
                Termination::Dropped => Err("connection dropped by handler".into()),
                Termination::Ended => {
                    let mut response = into_hyper_response(dispatched.response);
                    response
                        .headers_mut()
                        .insert(CONNECTION, HeaderValue::from_static("close"));
                    Ok(response)
                }
                Termination::Completed => Ok(into_hyper_response(dispatched.response)),
            }
        })
    }
}

async fn into_raw_request(req: Request<Incoming>, peer: SocketAddr) -> Result<RawRequest, BoxError> {
    let (parts, body) = req.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map(|value| value.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let mut raw = RawRequest::new(parts.method.as_str(), target)
        .with_peer(peer)
        .with_connection(HyperConnection);
    raw.protocol = format!("{:?}", parts.version);

    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            raw = raw.with_header(name.as_str(), value);
        }
    }
    if let Some(host) = parts.headers.get(hyper::http::header::HOST) {
        raw = raw.with_host(host.to_str()?);
    }

    let body = body.collect().await?.to_bytes();
    Ok(raw.with_body(body.to_vec()))
}

fn into_hyper_response(mut response: CtxResponse) -> Response<CtxBody> {
    let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = Response::builder().status(status);
    if let Some(map) = out.headers_mut() {
        for (name, value) in response.headers().iter() {
            if let (Ok(header_name), Ok(header_value)) =
                (HeaderName::try_from(name), HeaderValue::from_str(value))
            {
                map.append(header_name, header_value);
            }
        }
    }

    let mut body = Vec::new();
    response.write_body_to(&mut body);
    out.body(Full::new(Bytes::from(body)))
        .expect("valid response")
}
