use crate::conditional;
use crate::config::{Config, ConfigError};
use crate::cookie::Cookie;
use crate::constants::{header, method, mime, scheme, status};
use crate::decode::decode_body;
use crate::dispatch::{DispatchState, Phase, Transition};
use crate::error::Error;
use crate::headers::HeaderMap;
use crate::locals::{Closable, LocalKey, Locals};
use crate::mime::{essence, by_extension, resolve_offer};
use crate::multipart;
use crate::negotiate::{Family, negotiate};
use crate::network;
use crate::params::ParamValues;
use crate::range::{Range, RangeError, parse_range};
use crate::request::RawRequest;
use crate::response::{Response, StreamSink};
use crate::trust::TrustPolicy;
use crate::util::{equals_ignore_case, trim_ows};
use serde::Serialize;
use std::any::Any;
use std::borrow::Cow;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tracing::debug;

pub(crate) struct Shared {
    pub(crate) config: Config,
    pub(crate) trust: TrustPolicy,
    pub(crate) max_params: usize,
    no_params: Arc<[String]>,
}

impl Shared {
    pub(crate) fn new(config: Config, max_params: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let trust = TrustPolicy::compile(config.trust_proxy, &config.trust_proxy_config);
        Ok(Self {
            config,
            trust,
            max_params,
            no_params: Arc::from(Vec::new()),
        })
    }
}

/// Capability set the dispatcher and pool need from a context type.
///
/// Applications embed a [`Context`] in their own type and expose it through
/// `core`/`core_mut`. Overrides of `reset`/`release` must call the default
/// behavior on the embedded context.
pub trait CustomContext: Send + 'static {
    fn core(&self) -> &Context;

    fn core_mut(&mut self) -> &mut Context;

    fn reset(&mut self, raw: RawRequest) {
        self.core_mut().reset(raw);
    }

    fn release(&mut self) {
        self.core_mut().release();
    }
}

pub struct Context {
    shared: Arc<Shared>,
    pub(crate) request: RawRequest,
    pub(crate) response: Response,
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) detection_path: String,
    pub(crate) params: ParamValues,
    pub(crate) param_names: Arc<[String]>,
    pub(crate) dispatch: DispatchState,
    locals: Locals,
    trusted: OnceCell<bool>,
    base_url: OnceCell<String>,
}

impl CustomContext for Context {
    fn core(&self) -> &Context {
        self
    }

    fn core_mut(&mut self) -> &mut Context {
        self
    }
}

impl Context {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self::from_shared(Arc::new(Shared::new(config, 0)?)))
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        let params = ParamValues::with_capacity(shared.max_params);
        let param_names = Arc::clone(&shared.no_params);
        Self {
            shared,
            request: RawRequest::default(),
            response: Response::default(),
            method: String::new(),
            path: String::new(),
            detection_path: String::new(),
            params,
            param_names,
            dispatch: DispatchState::default(),
            locals: Locals::new(),
            trusted: OnceCell::new(),
            base_url: OnceCell::new(),
        }
    }

    pub fn reset(&mut self, raw: RawRequest) {
        self.request = raw;
        self.response.reset();

        self.method.clear();
        match method::canonical(&self.request.method) {
            Some(known) => self.method.push_str(known),
            None => self.method.push_str(&self.request.method),
        }

        self.path.clear();
        self.path.push_str(self.request.path());
        if self.path.is_empty() {
            self.path.push('/');
        }
        self.refresh_detection_path();

        self.params.ensure_capacity(self.shared.max_params);
        self.params.clear();
        self.param_names = Arc::clone(&self.shared.no_params);
        self.locals.release();
        self.dispatch.reset();
        self.trusted = OnceCell::new();
        self.base_url = OnceCell::new();
    }

    pub fn release(&mut self) {
        self.locals.release();
        self.params.clear();
        self.param_names = Arc::clone(&self.shared.no_params);
        self.response.reset();
        self.request.connection = None;
        self.request.headers.clear();
        self.request.body.clear();
        self.dispatch.release();
        self.trusted = OnceCell::new();
        self.base_url = OnceCell::new();
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn raw_request(&self) -> &RawRequest {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub(crate) fn take_response(&mut self) -> Response {
        std::mem::take(&mut self.response)
    }

    pub fn dispatch_state(&self) -> &DispatchState {
        &self.dispatch
    }

    pub fn phase(&self) -> Phase {
        self.dispatch.phase()
    }

    // ---- dispatch transitions ----

    pub fn next(&mut self) -> Result<(), Error> {
        self.dispatch.request(Transition::Next);
        Ok(())
    }

    pub fn restart_routing(&mut self) -> Result<(), Error> {
        debug!(path = %self.path, "restart routing requested");
        self.dispatch.request(Transition::Restart);
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), Error> {
        debug!(path = %self.path, "end requested");
        self.dispatch.request(Transition::End);
        Ok(())
    }

    pub fn drop_connection(&mut self) -> Result<(), Error> {
        debug!(path = %self.path, "connection drop requested");
        self.dispatch.request(Transition::Drop);
        Ok(())
    }

    // ---- request line ----

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, value: &str) -> bool {
        match method::canonical(value) {
            Some(known) => {
                self.method.clear();
                self.method.push_str(known);
                true
            }
            None => false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path<P: AsRef<str>>(&mut self, path: P) {
        self.path.clear();
        self.path.push_str(path.as_ref());
        if !self.path.starts_with('/') {
            self.path.insert(0, '/');
        }
        self.refresh_detection_path();
    }

    pub(crate) fn refresh_detection_path(&mut self) {
        let config = &self.shared.config;
        self.detection_path.clear();
        if config.case_sensitive {
            self.detection_path.push_str(&self.path);
        } else {
            self.detection_path
                .extend(self.path.chars().map(|ch| ch.to_ascii_lowercase()));
        }
        if !config.strict_routing {
            while self.detection_path.len() > 1 && self.detection_path.ends_with('/') {
                self.detection_path.pop();
            }
        }
    }

    pub fn detection_path(&self) -> &str {
        &self.detection_path
    }

    pub fn original_path(&self) -> &str {
        self.request.path()
    }

    pub fn original_url(&self) -> &str {
        &self.request.target
    }

    pub fn protocol(&self) -> &str {
        &self.request.protocol
    }

    // ---- network facts ----

    pub fn is_proxy_trusted(&self) -> bool {
        *self
            .trusted
            .get_or_init(|| self.shared.trust.is_trusted(self.request.peer.ip()))
    }

    fn uri_host(&self) -> &str {
        if self.request.host.is_empty() {
            self.request.headers.get(header::HOST).unwrap_or_default()
        } else {
            &self.request.host
        }
    }

    pub fn host(&self) -> &str {
        network::resolve_host(self.is_proxy_trusted(), &self.request.headers, self.uri_host())
    }

    pub fn hostname(&self) -> &str {
        network::strip_port(self.host())
    }

    pub fn port(&self) -> u16 {
        self.request.peer.port()
    }

    pub fn scheme(&self) -> &'static str {
        network::resolve_scheme(
            self.request.tls,
            self.is_proxy_trusted(),
            &self.request.headers,
        )
    }

    pub fn secure(&self) -> bool {
        self.scheme() == scheme::HTTPS
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .get_or_init(|| format!("{}://{}", self.scheme(), self.host()))
    }

    /// Client address: first entry of the proxy header when configured and
    /// trusted, otherwise the peer address.
    pub fn ip(&self) -> Cow<'_, str> {
        if self.is_proxy_trusted() {
            if let Some(name) = self.shared.config.proxy_header.as_deref() {
                if let Some(value) = self.request.headers.joined(trim_ows(name)) {
                    let validate = self.shared.config.enable_ip_validation;
                    let first = match &value {
                        Cow::Borrowed(value) => network::first_ip(value, validate).map(Cow::Borrowed),
                        Cow::Owned(value) => network::first_ip(value, validate)
                            .map(|first| Cow::Owned(first.to_string())),
                    };
                    if let Some(first) = first {
                        return first;
                    }
                }
            }
        }
        Cow::Owned(self.request.peer.ip().to_string())
    }

    pub fn ips(&self) -> Vec<String> {
        if !self.is_proxy_trusted() {
            return Vec::new();
        }
        let name = self
            .shared
            .config
            .proxy_header
            .as_deref()
            .map(trim_ows)
            .unwrap_or(header::X_FORWARDED_FOR);
        match self.request.headers.joined(name) {
            Some(value) => network::collect_ips(&value, self.shared.config.enable_ip_validation),
            None => Vec::new(),
        }
    }

    pub fn is_from_local(&self) -> bool {
        self.request.peer.ip().is_loopback()
    }

    pub fn subdomains(&self) -> Vec<String> {
        self.subdomains_with(i64::from(self.shared.config.subdomain_offset))
    }

    pub fn subdomains_with(&self, offset: i64) -> Vec<String> {
        network::subdomains(self.host(), offset)
    }

    // ---- request headers ----

    pub fn get(&self, name: &str) -> Option<&str> {
        self.request.headers.get(name)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    pub fn xhr(&self) -> bool {
        self.get(header::X_REQUESTED_WITH)
            .is_some_and(|value| equals_ignore_case(value.trim(), "xmlhttprequest"))
    }

    pub fn is(&self, extension: &str) -> bool {
        let Some(expected) = by_extension(extension) else {
            return false;
        };
        self.get(header::CONTENT_TYPE)
            .is_some_and(|value| essence(value) == expected)
    }

    pub fn cookies(&self, key: &str) -> Option<&str> {
        self.request_cookies()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    fn request_cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.request
            .headers
            .get_all(header::COOKIE)
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim().trim_matches('"')))
    }

    pub fn fresh(&self) -> bool {
        conditional::is_fresh(&self.request.headers, self.response.headers())
    }

    pub fn stale(&self) -> bool {
        !self.fresh()
    }

    // ---- query and params ----

    /// Decoded query value; the last occurrence wins.
    pub fn query(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.request.query().as_bytes())
            .filter(|(name, _)| name == key)
            .last()
            .map(|(_, value)| value.into_owned())
    }

    pub fn query_or(&self, key: &str, default: &str) -> String {
        self.query(key).unwrap_or_else(|| default.to_string())
    }

    pub fn queries(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.request.query().as_bytes())
            .into_owned()
            .collect()
    }

    /// First value of a form field, looked up in the query, then an
    /// urlencoded body, then the text parts of a multipart body.
    pub fn form_value(&self, key: &str) -> Option<String> {
        let from_query = url::form_urlencoded::parse(self.request.query().as_bytes())
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned());
        if from_query.is_some() {
            return from_query;
        }

        let content_type = self.get(header::CONTENT_TYPE)?;
        let media = essence(content_type);
        if media != mime::APPLICATION_FORM && media != mime::MULTIPART_FORM {
            return None;
        }

        let encoding = self
            .request
            .headers
            .joined(header::CONTENT_ENCODING)
            .unwrap_or_default();
        let body = match decode_body(&self.request.body, &encoding, self.shared.config.body_limit) {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "form body not decodable");
                return None;
            }
        };

        if media == mime::APPLICATION_FORM {
            return url::form_urlencoded::parse(&body)
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.into_owned());
        }
        let boundary = multipart::boundary(content_type)?;
        multipart::find_field(&body, boundary, key)
    }

    pub fn params(&self, name: &str) -> Option<&str> {
        self.param_names
            .iter()
            .position(|candidate| candidate == name)
            .and_then(|index| self.params.get(index))
    }

    pub fn params_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.params(name).unwrap_or(default)
    }

    pub fn all_params(&self) -> Vec<(&str, &str)> {
        self.param_names
            .iter()
            .map(String::as_str)
            .zip(self.params.iter())
            .collect()
    }

    // ---- body ----

    pub fn body_raw(&self) -> &[u8] {
        &self.request.body
    }

    /// Body with every `Content-Encoding` undone.
    ///
    /// On failure the error text is returned instead and the response status
    /// is set to 415, 413 or 501; corrupt streams leave the status untouched.
    pub fn body(&mut self) -> Cow<'_, [u8]> {
        let encoding = self
            .request
            .headers
            .joined(header::CONTENT_ENCODING)
            .unwrap_or_default();
        match decode_body(&self.request.body, &encoding, self.shared.config.body_limit) {
            Ok(decoded) => decoded,
            Err(err) => {
                if let Some(code) = err.status() {
                    if !self.dispatch.is_frozen() {
                        self.response.set_status(code);
                    }
                }
                Cow::Owned(err.to_string().into_bytes())
            }
        }
    }

    // ---- negotiation ----

    pub fn accepts<'o>(&self, offers: &[&'o str]) -> Option<&'o str> {
        self.negotiate(header::ACCEPT, Family::MediaType, offers)
    }

    pub fn accepts_charsets<'o>(&self, offers: &[&'o str]) -> Option<&'o str> {
        self.negotiate(header::ACCEPT_CHARSET, Family::Charset, offers)
    }

    pub fn accepts_encodings<'o>(&self, offers: &[&'o str]) -> Option<&'o str> {
        self.negotiate(header::ACCEPT_ENCODING, Family::Encoding, offers)
    }

    pub fn accepts_languages<'o>(&self, offers: &[&'o str]) -> Option<&'o str> {
        self.negotiate(header::ACCEPT_LANGUAGE, Family::Language, offers)
    }

    fn negotiate<'o>(&self, name: &str, family: Family, offers: &[&'o str]) -> Option<&'o str> {
        let value = self.request.headers.joined(name);
        negotiate(value.as_deref(), family, offers)
    }

    // ---- ranges ----

    /// Parses `Range` for a resource of `size` bytes. When nothing is
    /// satisfiable the response gets 416 and `Content-Range: bytes */size`.
    pub fn range(&mut self, size: u64) -> Result<Range, Error> {
        let value = self.get(header::RANGE).unwrap_or_default();
        match parse_range(value, size) {
            Ok(range) => Ok(range),
            Err(RangeError::Unsatisfiable) => {
                if let Some(response) = self.writable() {
                    response.set_status(status::RANGE_NOT_SATISFIABLE);
                    response
                        .headers_mut()
                        .insert(header::CONTENT_RANGE, format!("bytes */{size}"));
                }
                Err(RangeError::Unsatisfiable.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    // ---- locals ----

    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    pub fn set_local<K: Into<LocalKey>, T: Any + Send>(&mut self, key: K, value: T) {
        self.locals.set(key, value);
    }

    pub fn set_closable_local<K, T>(&mut self, key: K, value: T)
    where
        K: Into<LocalKey>,
        T: Any + Send + Closable,
    {
        self.locals.set_closable(key, value);
    }

    pub fn local<T: Any, K: Into<LocalKey>>(&self, key: K) -> Option<&T> {
        self.locals.get::<K, T>(key)
    }

    pub fn local_mut<T: Any, K: Into<LocalKey>>(&mut self, key: K) -> Option<&mut T> {
        self.locals.get_mut::<K, T>(key)
    }

    pub fn local_or_default<T: Any + Clone + Default, K: Into<LocalKey>>(&self, key: K) -> T {
        self.local::<T, K>(key).cloned().unwrap_or_default()
    }

    pub fn value<K: Into<LocalKey>>(&self, key: K) -> Option<&(dyn Any + Send)> {
        self.locals.value(key)
    }

    pub fn remove_local<K: Into<LocalKey>>(&mut self, key: K) -> Option<Box<dyn Any + Send>> {
        self.locals.remove(key)
    }

    // ---- response ----

    pub(crate) fn writable(&mut self) -> Option<&mut Response> {
        if self.dispatch.is_frozen() {
            None
        } else {
            Some(&mut self.response)
        }
    }

    pub fn status(&self) -> u16 {
        self.response.status()
    }

    pub fn set_status(&mut self, code: u16) -> &mut Self {
        if let Some(response) = self.writable() {
            response.set_status(code);
        }
        self
    }

    pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
        if let Some(response) = self.writable() {
            response.headers_mut().insert(name, value);
        }
        self
    }

    pub fn append(&mut self, name: &str, value: &str) -> &mut Self {
        if let Some(response) = self.writable() {
            response.headers_mut().merge_list(name, value);
        }
        self
    }

    /// Adds a `Set-Cookie` header, replacing one already queued for the
    /// same name. Cookies with an invalid name or value are skipped.
    pub fn cookie(&mut self, cookie: &Cookie) -> &mut Self {
        if !cookie.is_valid() {
            debug!(name = %cookie.name, "skipping invalid cookie");
            return self;
        }
        if let Some(response) = self.writable() {
            let prefix = format!("{}=", cookie.name);
            let headers = response.headers_mut();
            headers.retain(header::SET_COOKIE, |value| !value.starts_with(&prefix));
            headers.append(header::SET_COOKIE, cookie.to_string());
        }
        self
    }

    /// With no names, expires every cookie the request carried.
    pub fn clear_cookie(&mut self, names: &[&str]) -> &mut Self {
        let names: Vec<String> = if names.is_empty() {
            self.request_cookies()
                .map(|(name, _)| name.to_string())
                .collect()
        } else {
            names.iter().map(|name| name.to_string()).collect()
        };
        for name in names {
            self.cookie(&Cookie::expired(name));
        }
        self
    }

    pub fn vary(&mut self, fields: &[&str]) -> &mut Self {
        for field in fields {
            self.append(header::VARY, field);
        }
        self
    }

    pub fn get_resp_header(&self, name: &str) -> Option<&str> {
        self.response.headers().get(name)
    }

    /// Sets `Content-Type` from an extension or media type. Unknown
    /// extensions fall back to `application/octet-stream`.
    pub fn content_type(&mut self, extension: &str, charset: Option<&str>) -> &mut Self {
        let media = resolve_offer(extension).unwrap_or(mime::OCTET_STREAM);
        let value = match charset {
            Some(charset) => format!("{media}; charset={charset}"),
            None => media.to_string(),
        };
        self.set(header::CONTENT_TYPE, &value)
    }

    pub fn send<B: AsRef<[u8]>>(&mut self, body: B) -> Result<(), Error> {
        if let Some(response) = self.writable() {
            response.set_body(body.as_ref());
        }
        Ok(())
    }

    pub fn send_string<S: AsRef<str>>(&mut self, body: S) -> Result<(), Error> {
        self.send(body.as_ref().as_bytes())
    }

    pub fn send_status(&mut self, code: u16) -> Result<(), Error> {
        if let Some(response) = self.writable() {
            response.set_status(code);
            if response.body().is_empty() && !response.is_streaming() {
                response.set_body(status::reason(code).as_bytes());
            }
        }
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let value = serde_json::to_value(value)?;
        let encoded = self
            .shared
            .config
            .json_encoder
            .encode(&value)
            .map_err(Error::Codec)?;
        self.set(header::CONTENT_TYPE, mime::APPLICATION_JSON);
        self.send(encoded)
    }

    pub fn location(&mut self, url: &str) -> &mut Self {
        self.set(header::LOCATION, url)
    }

    /// Sets `Location` and a redirect status (303 when none is given).
    pub fn redirect(&mut self, url: &str, code: Option<u16>) -> Result<(), Error> {
        self.location(url);
        self.set_status(code.unwrap_or(status::SEE_OTHER));
        Ok(())
    }

    pub fn links(&mut self, links: &[(&str, &str)]) -> &mut Self {
        if links.is_empty() {
            return self;
        }
        let mut value = self.get_resp_header(header::LINK).unwrap_or_default().to_string();
        for (url, rel) in links {
            if !value.is_empty() {
                value.push_str(", ");
            }
            value.push_str(&format!("<{url}>; rel=\"{rel}\""));
        }
        self.set(header::LINK, &value)
    }

    pub fn attachment(&mut self, filename: Option<&str>) -> &mut Self {
        let Some(filename) = filename else {
            return self.set(header::CONTENT_DISPOSITION, "attachment");
        };
        let base = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename);
        if let Some((_, extension)) = base.rsplit_once('.') {
            self.content_type(extension, None);
        }
        let quoted = base.replace('"', "\\\"");
        self.set(
            header::CONTENT_DISPOSITION,
            &format!("attachment; filename=\"{quoted}\""),
        )
    }

    pub fn render<T: Serialize + ?Sized>(&mut self, name: &str, data: &T) -> Result<(), Error> {
        let Some(views) = self.shared.config.views.clone() else {
            return Err(Error::Render("no view engine configured".into()));
        };
        let data = serde_json::to_value(data)?;
        let rendered = views.render(name, &data).map_err(Error::Render)?;
        self.set(header::CONTENT_TYPE, mime::TEXT_HTML_UTF8);
        self.send(rendered)
    }

    pub fn send_stream_writer<F>(&mut self, producer: F) -> Result<(), Error>
    where
        F: FnOnce(&mut StreamSink<'_>) + Send + 'static,
    {
        if let Some(response) = self.writable() {
            response.set_stream(Box::new(producer));
        }
        Ok(())
    }
}

impl io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(response) = self.writable() {
            response.body_mut().extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
