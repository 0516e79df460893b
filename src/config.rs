use crate::context::Context;
use crate::error::Error;
use crate::format::{BodyEncoder, JsonEncoder};
use crate::render::ViewEngine;
use crate::util::is_http_token;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_MAX_IDLE_CONTEXTS: usize = 1024;
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;
pub const DEFAULT_SUBDOMAIN_OFFSET: i32 = 2;

/// Callback that turns a handler error into the final response.
pub type ErrorHandler = Arc<dyn Fn(&mut Context, Error) -> Result<(), Error> + Send + Sync>;

/// Addresses whose forwarded-identity headers are honored.
///
/// `proxies` accepts single addresses (`10.0.0.1`, `::1`) and CIDR blocks
/// (`10.0.0.0/8`). Entries that fail to parse never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustProxyConfig {
    pub proxies: Vec<String>,
    pub loopback: bool,
    pub link_local: bool,
    pub private: bool,
}

#[derive(Clone)]
pub struct Config {
    pub trust_proxy: bool,
    pub trust_proxy_config: TrustProxyConfig,
    /// Header carrying the client address, e.g. `X-Forwarded-For`.
    pub proxy_header: Option<String>,
    pub enable_ip_validation: bool,
    pub case_sensitive: bool,
    pub strict_routing: bool,
    pub max_idle_contexts: usize,
    /// Upper bound on a decoded request body, in bytes.
    pub body_limit: usize,
    pub subdomain_offset: i32,
    pub error_handler: Option<ErrorHandler>,
    pub views: Option<Arc<dyn ViewEngine>>,
    pub json_encoder: Arc<dyn BodyEncoder>,
    pub xml_encoder: Option<Arc<dyn BodyEncoder>>,
    pub msgpack_encoder: Option<Arc<dyn BodyEncoder>>,
    pub cbor_encoder: Option<Arc<dyn BodyEncoder>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trust_proxy: false,
            trust_proxy_config: TrustProxyConfig::default(),
            proxy_header: None,
            enable_ip_validation: false,
            case_sensitive: false,
            strict_routing: false,
            max_idle_contexts: DEFAULT_MAX_IDLE_CONTEXTS,
            body_limit: DEFAULT_BODY_LIMIT,
            subdomain_offset: DEFAULT_SUBDOMAIN_OFFSET,
            error_handler: None,
            views: None,
            json_encoder: Arc::new(JsonEncoder),
            xml_encoder: None,
            msgpack_encoder: None,
            cbor_encoder: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("trust_proxy", &self.trust_proxy)
            .field("trust_proxy_config", &self.trust_proxy_config)
            .field("proxy_header", &self.proxy_header)
            .field("enable_ip_validation", &self.enable_ip_validation)
            .field("case_sensitive", &self.case_sensitive)
            .field("strict_routing", &self.strict_routing)
            .field("max_idle_contexts", &self.max_idle_contexts)
            .field("body_limit", &self.body_limit)
            .field("subdomain_offset", &self.subdomain_offset)
            .field("error_handler", &self.error_handler.is_some())
            .field("views", &self.views.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_idle_contexts == 0 {
            return Err(ConfigError::ZeroIdleContexts);
        }

        if let Some(name) = &self.proxy_header {
            if !is_http_token(name.trim()) {
                return Err(ConfigError::InvalidProxyHeader(name.clone()));
            }
        }

        if self.body_limit == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }

        if self.subdomain_offset < 0 {
            return Err(ConfigError::NegativeSubdomainOffset(self.subdomain_offset));
        }

        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_idle_contexts must be greater than zero")]
    ZeroIdleContexts,
    #[error("proxy_header '{0}' is not a valid HTTP header name")]
    InvalidProxyHeader(String),
    #[error("body_limit must be greater than zero")]
    ZeroBodyLimit,
    #[error("subdomain_offset must not be negative (got {0})")]
    NegativeSubdomainOffset(i32),
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
