pub mod constants;

mod app;
mod conditional;
mod config;
mod context;
mod cookie;
mod decode;
mod dispatch;
mod error;
mod format;
mod headers;
mod locals;
mod mime;
mod multipart;
mod negotiate;
mod network;
mod params;
mod pool;
mod range;
mod render;
mod request;
mod response;
mod routing;
mod storage;
mod trust;
mod util;

pub use app::{App, Dispatched};
pub use config::{
    Config, ConfigError, DEFAULT_BODY_LIMIT, DEFAULT_MAX_IDLE_CONTEXTS, DEFAULT_SUBDOMAIN_OFFSET,
    ErrorHandler, TrustProxyConfig,
};
pub use context::{Context, CustomContext};
pub use cookie::{Cookie, SameSite};
pub use decode::{DecodeError, decode_body};
pub use dispatch::{DispatchState, Phase, Termination, Transition};
pub use error::{BoxError, Error};
pub use format::{BodyEncoder, JsonEncoder, ResFmt};
pub use headers::HeaderMap;
pub use locals::{Closable, LocalKey, Locals};
pub use mime::{by_extension, resolve_offer};
pub use negotiate::{AcceptEntry, Family, negotiate, parse_accept};
pub use params::ParamValues;
pub use pool::CtxPool;
pub use range::{BYTES_UNIT, Range, RangeError, RangeSet, parse_range};
pub use render::ViewEngine;
pub use request::{Connection, RawRequest};
pub use response::{Response, StreamProducer, StreamSink};
pub use routing::{Handler, RouteStack, Router};
pub use storage::{MemoryStorage, Storage};
pub use trust::{CidrRange, TrustPolicy};
pub use util::{equals_ignore_case, normalize_lower};
