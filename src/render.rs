use crate::error::BoxError;

/// Template backend used by [`Context::render`](crate::Context::render).
///
/// `data` is the serialized bind value; the returned bytes are sent as HTML.
pub trait ViewEngine: Send + Sync {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<Vec<u8>, BoxError>;
}

impl<F> ViewEngine for F
where
    F: Fn(&str, &serde_json::Value) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<Vec<u8>, BoxError> {
        self(name, data)
    }
}
