use bunner_ctx_rs::constants::status;
use bunner_ctx_rs::{Context, Error, ResFmt, RouteStack};
use serde::Serialize;

#[derive(Serialize)]
struct Visitor<'a> {
    ip: &'a str,
    host: &'a str,
    scheme: &'a str,
    subdomains: Vec<String>,
}

pub fn routes() -> RouteStack<Context> {
    RouteStack::new()
        .use_middleware("/", |ctx: &mut Context| {
            ctx.set("X-Powered-By", "bunner-ctx-rs");
            ctx.next()
        })
        .get("/greet", |ctx: &mut Context| {
            let name = ctx.query_or("name", "world");
            ctx.format(vec![
                ResFmt::new("html", |ctx: &mut Context| {
                    ctx.send_string(format!("<h1>Hello, {name}!</h1>"))
                }),
                ResFmt::new("json", |ctx: &mut Context| {
                    ctx.json(&serde_json::json!({ "greeting": format!("Hello, {name}!") }))
                }),
                ResFmt::fallback(|ctx: &mut Context| ctx.send_string(format!("Hello, {name}!"))),
            ])
        })
        .get("/whoami", |ctx: &mut Context| -> Result<(), Error> {
            let ip = ctx.ip().into_owned();
            let visitor = Visitor {
                ip: &ip,
                host: ctx.hostname(),
                scheme: ctx.scheme(),
                subdomains: ctx.subdomains(),
            };
            let body = serde_json::to_value(&visitor)?;
            ctx.json(&body)
        })
        .get("/files/:name", |ctx: &mut Context| -> Result<(), Error> {
            let content = format!("contents of {}\n", ctx.params("name").unwrap_or_default()).repeat(64);
            let range = ctx.range(content.len() as u64)?;
            let first = range.ranges[0];
            ctx.set("Content-Range", &first.content_range(content.len() as u64));
            ctx.set_status(206);
            ctx.send(&content.as_bytes()[first.start as usize..=first.end as usize])
        })
        .post("/echo", |ctx: &mut Context| {
            let body = ctx.body().into_owned();
            ctx.send(body)
        })
        .get("/stream", |ctx: &mut Context| {
            ctx.send_stream_writer(|sink| {
                for line in 0..10 {
                    if !sink.send(format!("line {line}\n").as_bytes()) {
                        break;
                    }
                }
            })
        })
        .get("/bye", |ctx: &mut Context| -> Result<(), Error> {
            ctx.send_status(status::OK)?;
            ctx.end()
        })
        .get("/drop", |ctx: &mut Context| ctx.drop_connection())
}
