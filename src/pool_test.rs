use super::*;
use crate::config::Config;
use crate::context::Context;
use crate::dispatch::Phase;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn pool(capacity: usize) -> CtxPool<Context> {
    CtxPool::new(capacity, || Context::new(Config::default()).unwrap())
}

struct Tenant {
    core: Context,
    resets: usize,
}

impl CustomContext for Tenant {
    fn core(&self) -> &Context {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Context {
        &mut self.core
    }

    fn reset(&mut self, raw: RawRequest) {
        self.resets += 1;
        self.core.reset(raw);
    }
}

mod acquire {
    use super::*;

    #[test]
    fn should_bind_context_to_request() {
        // Arrange
        let pool = pool(4);

        // Act
        let ctx = pool.acquire(RawRequest::new("POST", "/users?id=1"));

        // Assert
        assert_eq!(ctx.method(), "POST");
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.phase(), Phase::Unmatched);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn should_hand_out_clean_context_after_release() {
        // Arrange
        let pool = pool(4);
        let mut first = pool.acquire(RawRequest::new("GET", "/first"));
        first.set_local("user", 42_u32);
        first.set_status(500);
        first.end().unwrap();
        pool.release(first);
        assert_eq!(pool.idle(), 1);

        // Act
        let second = pool.acquire(RawRequest::new("GET", "/second"));

        // Assert
        assert_eq!(pool.idle(), 0);
        assert!(second.locals().is_empty());
        assert_eq!(second.status(), 200);
        assert_eq!(second.phase(), Phase::Unmatched);
        assert!(!second.dispatch_state().is_frozen());
        assert_eq!(second.path(), "/second");
    }

    #[test]
    fn should_recycle_custom_context_type() {
        let allocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&allocations);
        let pool = CtxPool::new(2, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Tenant {
                core: Context::new(Config::default()).unwrap(),
                resets: 0,
            }
        });

        let ctx = pool.acquire(RawRequest::new("GET", "/"));
        pool.release(ctx);
        let ctx = pool.acquire(RawRequest::new("GET", "/again"));

        assert_eq!(allocations.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.resets, 2);
        assert_eq!(ctx.core().path(), "/again");
    }
}

mod release {
    use super::*;

    #[test]
    fn should_drop_contexts_beyond_capacity() {
        let pool = pool(1);
        let a = pool.acquire(RawRequest::new("GET", "/a"));
        let b = pool.acquire(RawRequest::new("GET", "/b"));

        pool.release(a);
        pool.release(b);

        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn should_allow_concurrent_use() {
        let pool = Arc::new(pool(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let mut ctx = pool.acquire(RawRequest::new("GET", format!("/{i}")));
                        ctx.set_local("worker", i);
                        assert_eq!(ctx.local::<i32, _>("worker"), Some(&i));
                        pool.release(ctx);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(pool.idle() <= 8);
    }
}
