use crate::constants::method;
use crate::error::Error;
use crate::params::ParamValues;
use std::sync::Arc;

pub trait Handler<C>: Send + Sync {
    fn call(&self, ctx: &mut C) -> Result<(), Error>;
}

impl<C, F> Handler<C> for F
where
    F: Fn(&mut C) -> Result<(), Error> + Send + Sync,
{
    fn call(&self, ctx: &mut C) -> Result<(), Error> {
        self(ctx)
    }
}

/// Route table consumed by the dispatcher.
///
/// Routes are addressed by index in registration order. `find` resumes at
/// `from`, which is how a chain falls through to the next matching route.
pub trait Router<C>: Send + Sync {
    fn configure(&mut self, _case_sensitive: bool, _strict_routing: bool) {}

    /// First route at or after `from` matching `method` and `detection`.
    fn find(
        &self,
        method: &str,
        detection: &str,
        path: &str,
        from: usize,
        params: &mut ParamValues,
    ) -> Option<usize>;

    fn handler(&self, route: usize, index: usize) -> Option<&dyn Handler<C>>;

    fn param_names(&self, route: usize) -> Arc<[String]>;

    fn max_params(&self) -> usize;

    /// Whether an endpoint exists for `detection` under a method other than
    /// `method`.
    fn path_exists(&self, method: &str, detection: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param,
    Wildcard,
}

struct Route<C> {
    method: Option<String>,
    pattern: String,
    prefix: bool,
    segments: Vec<Segment>,
    param_names: Arc<[String]>,
    handlers: Vec<Box<dyn Handler<C>>>,
}

impl<C> Route<C> {
    fn new(
        method: Option<String>,
        pattern: &str,
        prefix: bool,
        handlers: Vec<Box<dyn Handler<C>>>,
    ) -> Self {
        let pattern = if pattern.starts_with('/') {
            pattern.to_string()
        } else {
            format!("/{pattern}")
        };
        let mut route = Self {
            method,
            pattern,
            prefix,
            segments: Vec::new(),
            param_names: Arc::from(Vec::new()),
            handlers,
        };
        route.compile(true, true);
        route
    }

    fn compile(&mut self, case_sensitive: bool, strict_routing: bool) {
        let mut pattern = self.pattern.as_str();
        if (!strict_routing || self.prefix) && pattern.len() > 1 {
            pattern = pattern.trim_end_matches('/');
            if pattern.is_empty() {
                pattern = "/";
            }
        }

        let mut names = Vec::new();
        self.segments = split_segments(pattern)
            .map(|(start, end)| {
                let raw = &pattern[start..end];
                if raw == "*" {
                    names.push("*".to_string());
                    Segment::Wildcard
                } else if let Some(name) = raw.strip_prefix(':') {
                    names.push(name.to_string());
                    Segment::Param
                } else if case_sensitive {
                    Segment::Static(raw.to_string())
                } else {
                    Segment::Static(raw.to_ascii_lowercase())
                }
            })
            .collect();
        self.param_names = Arc::from(names);
    }

    fn accepts_method(&self, request_method: &str) -> bool {
        match self.method.as_deref() {
            None => true,
            Some(route_method) => {
                route_method == request_method
                    || (route_method == method::GET && request_method == method::HEAD)
            }
        }
    }

    fn matches(&self, detection: &str, path: &str, mut params: Option<&mut ParamValues>) -> bool {
        let spans: Vec<(usize, usize)> = split_segments(detection).collect();
        let mut index = 0;

        if let Some(params) = params.as_deref_mut() {
            params.clear();
        }

        for segment in &self.segments {
            match segment {
                Segment::Wildcard => {
                    let start = spans.get(index).map_or(detection.len(), |span| span.0);
                    if let Some(params) = params.as_deref_mut() {
                        params.push(path.get(start..detection.len()).unwrap_or_default());
                    }
                    return true;
                }
                Segment::Param => {
                    let Some(&(start, end)) = spans.get(index) else {
                        return false;
                    };
                    if start == end {
                        return false;
                    }
                    if let Some(params) = params.as_deref_mut() {
                        params.push(path.get(start..end).unwrap_or_default());
                    }
                }
                Segment::Static(expected) => {
                    let Some(&(start, end)) = spans.get(index) else {
                        return false;
                    };
                    if &detection[start..end] != expected.as_str() {
                        return false;
                    }
                }
            }
            index += 1;
        }

        self.prefix || index == spans.len()
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let body = match path {
        "" | "/" => "",
        _ => path.strip_prefix('/').unwrap_or(path),
    };
    let base = path.len() - body.len();
    let mut offset = base;
    body.split('/')
        .filter(move |_| !body.is_empty())
        .map(move |segment| {
            let start = offset;
            offset += segment.len() + 1;
            (start, start + segment.len())
        })
}

/// Ordered route list: first registered, first matched.
pub struct RouteStack<C> {
    routes: Vec<Route<C>>,
}

impl<C> Default for RouteStack<C> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<C: 'static> RouteStack<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn chain(mut self, verb: &str, path: &str, handlers: Vec<Box<dyn Handler<C>>>) -> Self {
        let verb = match method::canonical(verb) {
            Some(known) => known.to_string(),
            None => verb.to_ascii_uppercase(),
        };
        self.routes
            .push(Route::new(Some(verb), path, false, handlers));
        self
    }

    pub fn add<H: Handler<C> + 'static>(self, verb: &str, path: &str, handler: H) -> Self {
        self.chain(verb, path, vec![Box::new(handler)])
    }

    pub fn get<H: Handler<C> + 'static>(self, path: &str, handler: H) -> Self {
        self.add(method::GET, path, handler)
    }

    pub fn post<H: Handler<C> + 'static>(self, path: &str, handler: H) -> Self {
        self.add(method::POST, path, handler)
    }

    pub fn put<H: Handler<C> + 'static>(self, path: &str, handler: H) -> Self {
        self.add(method::PUT, path, handler)
    }

    pub fn delete<H: Handler<C> + 'static>(self, path: &str, handler: H) -> Self {
        self.add(method::DELETE, path, handler)
    }

    pub fn all<H: Handler<C> + 'static>(mut self, path: &str, handler: H) -> Self {
        self.routes
            .push(Route::new(None, path, false, vec![Box::new(handler)]));
        self
    }

    pub fn use_middleware<H: Handler<C> + 'static>(mut self, prefix: &str, handler: H) -> Self {
        self.routes
            .push(Route::new(None, prefix, true, vec![Box::new(handler)]));
        self
    }
}

impl<C: 'static> Router<C> for RouteStack<C> {
    fn configure(&mut self, case_sensitive: bool, strict_routing: bool) {
        for route in &mut self.routes {
            route.compile(case_sensitive, strict_routing);
        }
    }

    fn find(
        &self,
        method: &str,
        detection: &str,
        path: &str,
        from: usize,
        params: &mut ParamValues,
    ) -> Option<usize> {
        let found = self
            .routes
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, route)| {
                route.accepts_method(method) && route.matches(detection, path, Some(&mut *params))
            })
            .map(|(index, _)| index);
        if found.is_none() {
            params.clear();
        }
        found
    }

    fn handler(&self, route: usize, index: usize) -> Option<&dyn Handler<C>> {
        self.routes
            .get(route)
            .and_then(|route| route.handlers.get(index))
            .map(|handler| &**handler)
    }

    fn param_names(&self, route: usize) -> Arc<[String]> {
        self.routes
            .get(route)
            .map(|route| Arc::clone(&route.param_names))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    fn max_params(&self) -> usize {
        self.routes
            .iter()
            .map(|route| route.param_names.len())
            .max()
            .unwrap_or(0)
    }

    fn path_exists(&self, method: &str, detection: &str) -> bool {
        self.routes.iter().any(|route| {
            !route.prefix
                && !route.accepts_method(method)
                && route.matches(detection, detection, None)
        })
    }
}

#[cfg(test)]
#[path = "routing_test.rs"]
mod routing_test;
