mod common;

use bunner_ctx_rs::constants::status;
use bunner_ctx_rs::{App, Config, Context};
use common::asserts::{assert_completed, header_value};
use common::builders::{get, routes, trusting};
use std::sync::Arc;
use std::thread;

#[test]
fn app_can_be_shared_across_threads() {
    let config = Config {
        max_idle_contexts: 4,
        ..trusting(["10.0.0.0/8"])
    };
    let app = Arc::new(
        App::new(
            config,
            routes()
                .use_middleware("/", |ctx: &mut Context| {
                    let ip = ctx.ip().into_owned();
                    ctx.set("X-Client", &ip);
                    ctx.next()
                })
                .get("/users/:id", |ctx: &mut Context| {
                    let id = ctx.params("id").unwrap_or_default().to_string();
                    let page = ctx.query_or("page", "1");
                    ctx.send_string(format!("{id}:{page}"))
                }),
        )
        .expect("valid config"),
    );

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = Arc::clone(&app);
        handles.push(thread::spawn(move || {
            for round in 0..50 {
                let client = format!("203.0.113.{i}");
                let dispatched = app.handle(
                    get(&format!("/users/{i}?page={round}"))
                        .peer("10.1.2.3")
                        .header("X-Forwarded-For", &client)
                        .build(),
                );

                let (code, body) = assert_completed(&dispatched);
                assert_eq!(code, status::OK);
                assert_eq!(body, format!("{i}:{round}"));
                assert_eq!(header_value(&dispatched, "X-Client"), Some(client.as_str()));
            }
        }));
    }

    for handle in handles {
        handle.join().expect("thread panic");
    }

    assert!(app.pool().idle() <= app.pool().capacity());
}
