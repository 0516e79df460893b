mod common;

use bunner_ctx_rs::{Context, Dispatched, Error, RawRequest, ResFmt};
use common::builders::{app, get, post, routes, Routes};
use insta::assert_yaml_snapshot;
use serde::Serialize;

#[derive(Serialize)]
struct HeaderSnapshot {
    name: String,
    value: String,
}

#[derive(Serialize)]
struct ResponseSnapshot {
    termination: String,
    status: u16,
    headers: Vec<HeaderSnapshot>,
    body: String,
}

fn capture(routes: Routes, raw: RawRequest) -> ResponseSnapshot {
    let Dispatched {
        termination,
        response,
    } = app(routes).handle(raw);
    let mut headers: Vec<_> = response
        .headers()
        .iter()
        .map(|(name, value)| HeaderSnapshot {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect();
    headers.sort_by(|a, b| a.name.cmp(&b.name));
    ResponseSnapshot {
        termination: format!("{termination:?}"),
        status: response.status(),
        headers,
        body: String::from_utf8_lossy(response.body()).into_owned(),
    }
}

#[test]
fn not_found_snapshot() {
    let snapshot = capture(
        routes().get("/items", |ctx: &mut Context| ctx.send_string("items")),
        get("/missing").build(),
    );

    assert_yaml_snapshot!("not_found_snapshot", snapshot);
}

#[test]
fn method_not_allowed_snapshot() {
    let snapshot = capture(
        routes().get("/items", |ctx: &mut Context| ctx.send_string("items")),
        post("/items").build(),
    );

    assert_yaml_snapshot!("method_not_allowed_snapshot", snapshot);
}

#[test]
fn negotiated_format_snapshot() {
    let routes = routes().get("/greeting", |ctx: &mut Context| {
        ctx.format(vec![
            ResFmt::new("text/plain", |ctx: &mut Context| ctx.send_string("hello")),
            ResFmt::new("text/html", |ctx: &mut Context| ctx.send_string("hello in html")),
        ])
    });

    let snapshot = capture(
        routes,
        get("/greeting")
            .header("Accept", "text/plain;q=0.5, text/html")
            .build(),
    );

    assert_yaml_snapshot!("negotiated_format_snapshot", snapshot);
}

#[test]
fn ended_response_snapshot() {
    let routes = routes().get("/bye", |ctx: &mut Context| -> Result<(), Error> {
        ctx.set("X-Request-Id", "req-42");
        ctx.send_string("bye")?;
        ctx.end()
    });

    let snapshot = capture(routes, get("/bye").build());

    assert_yaml_snapshot!("ended_response_snapshot", snapshot);
}
