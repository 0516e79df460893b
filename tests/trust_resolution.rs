mod common;

use bunner_ctx_rs::constants::header;
use bunner_ctx_rs::{App, Config, Context, TrustProxyConfig};
use common::asserts::body_text;
use common::builders::{app, app_with, get, routes, trusting};

/// Echoes every network fact the context derives.
fn echo_app(config: Config) -> App {
    app_with(
        config,
        routes().get("/", |ctx: &mut Context| {
            let report = format!(
                "host={} hostname={} scheme={} ip={} ips={} trusted={} base={} subdomains={}",
                ctx.host(),
                ctx.hostname(),
                ctx.scheme(),
                ctx.ip(),
                ctx.ips().join("|"),
                ctx.is_proxy_trusted(),
                ctx.base_url(),
                ctx.subdomains().join("."),
            );
            ctx.send_string(report)
        }),
    )
}

fn field(report: &str, name: &str) -> String {
    report
        .split(' ')
        .find_map(|part| part.strip_prefix(&format!("{name}=")).map(str::to_string))
        .unwrap_or_default()
}

#[test]
fn trusted_cidr_peer_forwards_host() {
    let app = echo_app(trusting(["0.0.0.0/30"]));

    let dispatched = app.handle(
        get("/")
            .host("google.com")
            .header(header::X_FORWARDED_HOST, "google1.com")
            .peer("0.0.0.0")
            .build(),
    );

    let report = body_text(&dispatched);
    assert_eq!(field(&report, "hostname"), "google1.com");
    assert_eq!(field(&report, "trusted"), "true");
}

#[test]
fn peer_outside_cidr_keeps_literal_host() {
    let app = echo_app(trusting(["0.0.0.0/30"]));

    let dispatched = app.handle(
        get("/")
            .host("google.com")
            .header(header::X_FORWARDED_HOST, "google1.com")
            .peer("1.1.1.1")
            .build(),
    );

    let report = body_text(&dispatched);
    assert_eq!(field(&report, "hostname"), "google.com");
    assert_eq!(field(&report, "trusted"), "false");
}

#[test]
fn disabled_trust_ignores_every_forwarded_header() {
    let app = echo_app(Config {
        proxy_header: Some(header::X_FORWARDED_FOR.to_string()),
        ..Config::default()
    });

    let dispatched = app.handle(
        get("/")
            .host("origin.internal")
            .header(header::X_FORWARDED_HOST, "public.example.com")
            .header(header::X_FORWARDED_PROTO, "https")
            .header(header::X_FORWARDED_FOR, "203.0.113.9")
            .peer("10.1.2.3")
            .build(),
    );

    let report = body_text(&dispatched);
    assert_eq!(field(&report, "host"), "origin.internal");
    assert_eq!(field(&report, "scheme"), "http");
    assert_eq!(field(&report, "ip"), "10.1.2.3");
    assert_eq!(field(&report, "ips"), "");
}

#[test]
fn loopback_flag_trusts_local_proxy() {
    let app = echo_app(Config {
        trust_proxy: true,
        trust_proxy_config: TrustProxyConfig {
            loopback: true,
            ..TrustProxyConfig::default()
        },
        proxy_header: Some(header::X_FORWARDED_FOR.to_string()),
        ..Config::default()
    });

    let dispatched = app.handle(
        get("/")
            .host("localhost:3000")
            .header(header::X_FORWARDED_HOST, "shop.eu.example.com")
            .header(header::X_FORWARDED_SSL, "on")
            .header(header::X_FORWARDED_FOR, "198.51.100.4, 10.0.0.2")
            .peer("127.0.0.1")
            .build(),
    );

    let report = body_text(&dispatched);
    assert_eq!(field(&report, "scheme"), "https");
    assert_eq!(field(&report, "base"), "https://shop.eu.example.com");
    assert_eq!(field(&report, "ip"), "198.51.100.4");
    assert_eq!(field(&report, "ips"), "198.51.100.4|10.0.0.2");
    assert_eq!(field(&report, "subdomains"), "shop.eu");
}

#[test]
fn malformed_proxy_entry_never_matches() {
    let app = echo_app(trusting(["not-an-ip", "10.0.0.0/99"]));

    let dispatched = app.handle(
        get("/")
            .host("example.com")
            .header(header::X_FORWARDED_HOST, "evil.example.com")
            .peer("10.0.0.1")
            .build(),
    );

    assert_eq!(field(&body_text(&dispatched), "hostname"), "example.com");
}

#[test]
fn ipv6_peer_matches_ipv6_range() {
    let app = echo_app(trusting(["fd00::/8"]));

    let dispatched = app.handle(
        get("/")
            .host("example.com")
            .header(header::X_FORWARDED_HOST, "api.example.com")
            .peer("fd12::1")
            .build(),
    );

    assert_eq!(field(&body_text(&dispatched), "hostname"), "api.example.com");
}

#[test]
fn tls_connection_is_https_without_trust() {
    let app = app(routes().get("/", |ctx: &mut Context| {
        let secure = ctx.secure();
        ctx.send_string(secure.to_string())
    }));

    let dispatched = app.handle(get("/").tls().build());

    assert_eq!(body_text(&dispatched), "true");
}

#[test]
fn punycode_labels_are_decoded_in_subdomains() {
    let app = app(routes().get("/", |ctx: &mut Context| {
        let labels = ctx.subdomains_with(2).join(",");
        ctx.send_string(labels)
    }));

    let dispatched = app.handle(get("/").host("xn--mnchen-3ya.Example.COM.").build());

    assert_eq!(body_text(&dispatched), "münchen");
}
