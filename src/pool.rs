use crate::context::CustomContext;
use crate::request::RawRequest;
use crossbeam::queue::ArrayQueue;
use std::fmt;
use tracing::trace;

type Factory<C> = Box<dyn Fn() -> C + Send + Sync>;

/// Bounded free-list of boxed contexts.
///
/// Contexts are allocated lazily when the list is empty and dropped when it
/// is full. Release takes the box by value, so a context cannot be returned
/// twice.
pub struct CtxPool<C> {
    idle: ArrayQueue<Box<C>>,
    factory: Factory<C>,
}

impl<C: CustomContext> CtxPool<C> {
    pub fn new<F>(capacity: usize, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            idle: ArrayQueue::new(capacity.max(1)),
            factory: Box::new(factory),
        }
    }

    /// Context bound to `raw`, recycled when one is idle.
    pub fn acquire(&self, raw: RawRequest) -> Box<C> {
        let mut ctx = match self.idle.pop() {
            Some(ctx) => {
                trace!(idle = self.idle.len(), "context recycled");
                ctx
            }
            None => {
                trace!("context allocated");
                Box::new((self.factory)())
            }
        };
        ctx.reset(raw);
        ctx
    }

    /// Tears `ctx` down and keeps it for the next request.
    pub fn release(&self, mut ctx: Box<C>) {
        ctx.release();
        if self.idle.push(ctx).is_err() {
            trace!(capacity = self.idle.capacity(), "idle pool full, context dropped");
        }
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    pub fn capacity(&self) -> usize {
        self.idle.capacity()
    }
}

impl<C> fmt::Debug for CtxPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtxPool")
            .field("idle", &self.idle.len())
            .field("capacity", &self.idle.capacity())
            .finish()
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
