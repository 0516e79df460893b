mod common;

use bunner_ctx_rs::constants::{header, status};
use bunner_ctx_rs::{Context, Error};
use common::asserts::{assert_completed, header_value};
use common::builders::{app, get, routes, Routes};

/// Serves the first range of a generated resource of `size` bytes.
fn file_routes(size: usize) -> Routes {
    let resource: Vec<u8> = (0..size).map(|i| b'a' + (i % 26) as u8).collect();
    routes().get("/file", move |ctx: &mut Context| -> Result<(), Error> {
        let range = ctx.range(resource.len() as u64)?;
        let first = range.ranges[0];
        ctx.set(header::CONTENT_RANGE, &first.content_range(resource.len() as u64));
        ctx.set_status(status::PARTIAL_CONTENT);
        ctx.send(&resource[first.start as usize..=first.end as usize])
    })
}

#[test]
fn serves_first_interval_of_multi_range_request() {
    let app = app(file_routes(1000));

    let dispatched = app.handle(get("/file").header("Range", "bytes=500-700, 601-999").build());

    let (code, body) = assert_completed(&dispatched);
    assert_eq!(code, status::PARTIAL_CONTENT);
    assert_eq!(body.len(), 201);
    assert_eq!(header_value(&dispatched, "Content-Range"), Some("bytes 500-700/1000"));
}

#[test]
fn suffix_range_selects_trailing_bytes() {
    let app = app(file_routes(26));

    let dispatched = app.handle(get("/file").header("Range", "bytes=-3").build());

    let (code, body) = assert_completed(&dispatched);
    assert_eq!(code, status::PARTIAL_CONTENT);
    assert_eq!(body, "xyz");
    assert_eq!(header_value(&dispatched, "Content-Range"), Some("bytes 23-25/26"));
}

#[test]
fn open_ended_range_runs_to_last_byte() {
    let app = app(file_routes(26));

    let dispatched = app.handle(get("/file").header("Range", "bytes=20-").build());

    assert_eq!(assert_completed(&dispatched).1, "uvwxyz");
}

#[test]
fn unsatisfiable_range_answers_416_with_resource_size() {
    let app = app(file_routes(10));

    let dispatched = app.handle(get("/file").header("Range", "bytes=20-30").build());

    let (code, _) = assert_completed(&dispatched);
    assert_eq!(code, status::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_value(&dispatched, "Content-Range"), Some("bytes */10"));
}

#[test]
fn malformed_range_answers_400() {
    let app = app(file_routes(10));

    let dispatched = app.handle(get("/file").header("Range", "items=0-5").build());

    let (code, _) = assert_completed(&dispatched);
    assert_eq!(code, 400);
    assert_eq!(header_value(&dispatched, "Content-Range"), None);
}
