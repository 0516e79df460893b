use crate::config::{Config, ConfigError};
use crate::constants::{header, mime, status};
use crate::context::{Context, CustomContext, Shared};
use crate::dispatch::{Termination, Transition};
use crate::error::Error;
use crate::pool::CtxPool;
use crate::request::RawRequest;
use crate::response::Response;
use crate::routing::Router;
use crate::util::escape_html;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Outcome of one request handled by [`App::handle`].
#[derive(Debug)]
pub struct Dispatched {
    pub termination: Termination,
    /// Final response. Already flushed when `termination` is `Ended`, and
    /// never to be written when it is `Dropped`.
    pub response: Response,
}

/// Application: validated configuration, compiled trust policy, route table
/// and context pool, all immutable once built.
pub struct App<C: CustomContext = Context> {
    shared: Arc<Shared>,
    router: Box<dyn Router<C>>,
    pool: CtxPool<C>,
}

impl App<Context> {
    pub fn new<R>(config: Config, router: R) -> Result<Self, ConfigError>
    where
        R: Router<Context> + 'static,
    {
        Self::with_custom_context(config, router, |ctx| ctx)
    }
}

impl<C: CustomContext> App<C> {
    /// Builds an application whose pool recycles the user type `C`, made by
    /// wrapping a fresh [`Context`] with `factory`.
    pub fn with_custom_context<R, F>(config: Config, mut router: R, factory: F) -> Result<Self, ConfigError>
    where
        R: Router<C> + 'static,
        F: Fn(Context) -> C + Send + Sync + 'static,
    {
        router.configure(config.case_sensitive, config.strict_routing);
        let capacity = config.max_idle_contexts;
        let shared = Arc::new(Shared::new(config, router.max_params())?);

        let pool_shared = Arc::clone(&shared);
        let pool = CtxPool::new(capacity, move || {
            factory(Context::from_shared(Arc::clone(&pool_shared)))
        });

        Ok(Self {
            shared,
            router: Box::new(router),
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn pool(&self) -> &CtxPool<C> {
        &self.pool
    }

    pub fn acquire(&self, raw: RawRequest) -> Box<C> {
        self.pool.acquire(raw)
    }

    pub fn release(&self, ctx: Box<C>) {
        self.pool.release(ctx);
    }

    /// Acquires a context for `raw`, runs the matching chain and returns the
    /// context to the pool.
    pub fn handle(&self, raw: RawRequest) -> Dispatched {
        let mut ctx = self.pool.acquire(raw);
        let termination = self.dispatch(&mut ctx);
        let response = ctx.core_mut().take_response();
        self.pool.release(ctx);
        Dispatched {
            termination,
            response,
        }
    }

    /// Runs handlers until the chain stops, then applies `end`/`drop`
    /// against the connection.
    pub fn dispatch(&self, ctx: &mut C) -> Termination {
        loop {
            let Some((route, index)) = self.next_step(ctx.core_mut()) else {
                let err = self.not_found(ctx.core());
                self.handle_error(ctx.core_mut(), err);
                break;
            };

            let Some(handler) = self.router.handler(route, index) else {
                break;
            };
            ctx.core_mut().dispatch.enter_handler();

            if let Err(err) = handler.call(ctx) {
                debug!(route, handler = index, error = %err, "handler failed");
                self.handle_error(ctx.core_mut(), err);
                break;
            }

            match ctx.core_mut().dispatch.take_pending() {
                Some(Transition::Next) => continue,
                Some(Transition::Restart) => ctx.core_mut().dispatch.restart(),
                Some(Transition::End) | Some(Transition::Drop) | None => break,
            }
        }

        let core = ctx.core_mut();
        let termination = core.dispatch.terminate();
        match termination {
            Termination::Completed => {}
            Termination::Ended => {
                if let Some(connection) = core.request.connection.as_mut() {
                    if let Err(err) = connection.flush(&core.response) {
                        debug!(error = %err, "flush on end failed");
                    }
                    connection.force_close();
                }
            }
            Termination::Dropped => {
                if let Some(connection) = core.request.connection.as_mut() {
                    connection.force_close();
                }
            }
        }
        termination
    }

    /// Next handler to run: the following one in the matched chain, else the
    /// first handler of the next matching route.
    fn next_step(&self, core: &mut Context) -> Option<(usize, usize)> {
        if let Some(route) = core.dispatch.route() {
            let index = core.dispatch.next_handler_index();
            if self.router.handler(route, index).is_some() {
                return Some((route, index));
            }
        }

        loop {
            let from = core.dispatch.search_from();
            let route = self.router.find(
                &core.method,
                &core.detection_path,
                &core.path,
                from,
                &mut core.params,
            )?;
            core.dispatch.match_route(route);
            core.param_names = self.router.param_names(route);
            if self.router.handler(route, 0).is_some() {
                return Some((route, 0));
            }
        }
    }

    fn not_found(&self, core: &Context) -> Error {
        debug!(method = %core.method, path = %core.path, "no route matched");
        if self.router.path_exists(&core.method, &core.detection_path) {
            return Error::from_status(status::METHOD_NOT_ALLOWED);
        }
        Error::new(
            status::NOT_FOUND,
            format!("Cannot {} {}", core.method, escape_html(core.original_path())),
        )
    }

    fn handle_error(&self, core: &mut Context, err: Error) {
        let Some(handler) = self.shared.config.error_handler.clone() else {
            write_error(core, &err);
            return;
        };
        if let Err(failure) = handler(core, err) {
            debug!(error = %failure, "error handler failed");
            write_error(core, &Error::from_status(status::INTERNAL_SERVER_ERROR));
        }
    }
}

fn write_error(core: &mut Context, err: &Error) {
    core.set(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF8);
    core.set_status(err.status());
    let _ = core.send_string(err.to_string());
}

impl<C: CustomContext> fmt::Debug for App<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.shared.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;
