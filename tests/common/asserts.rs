use bunner_ctx_rs::{Dispatched, Termination};

pub fn body_text(dispatched: &Dispatched) -> String {
    String::from_utf8(dispatched.response.body().to_vec()).expect("utf-8 body")
}

pub fn header_value<'a>(dispatched: &'a Dispatched, name: &str) -> Option<&'a str> {
    dispatched.response.headers().get(name)
}

/// Asserts a normally completed response and returns `(status, body)`.
pub fn assert_completed(dispatched: &Dispatched) -> (u16, String) {
    assert_eq!(
        dispatched.termination,
        Termination::Completed,
        "expected completed dispatch, got {:?}",
        dispatched.termination
    );
    (dispatched.response.status(), body_text(dispatched))
}
