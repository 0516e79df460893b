use crate::constants::{header, mime, status};
use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::mime::resolve_offer;
use crate::util::escape_html;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Serializer plugged into the context for one wire format.
pub trait BodyEncoder: Send + Sync {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, BoxError>;
}

impl<F> BodyEncoder for F
where
    F: Fn(&serde_json::Value) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, BoxError> {
        self(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl BodyEncoder for JsonEncoder {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, BoxError> {
        Ok(serde_json::to_vec(value)?)
    }
}

type FormatHandler<'a> = Box<dyn FnOnce(&mut Context) -> Result<(), Error> + 'a>;

/// Handler for one media type in [`Context::format`].
pub struct ResFmt<'a> {
    media_type: String,
    handler: FormatHandler<'a>,
}

impl<'a> ResFmt<'a> {
    pub fn new<M, F>(media_type: M, handler: F) -> Self
    where
        M: Into<String>,
        F: FnOnce(&mut Context) -> Result<(), Error> + 'a,
    {
        Self {
            media_type: media_type.into(),
            handler: Box::new(handler),
        }
    }

    pub fn fallback<F>(handler: F) -> Self
    where
        F: FnOnce(&mut Context) -> Result<(), Error> + 'a,
    {
        Self::new(mime::DEFAULT, handler)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    fn is_fallback(&self) -> bool {
        self.media_type == mime::DEFAULT
    }
}

impl fmt::Debug for ResFmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResFmt")
            .field("media_type", &self.media_type)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Runs the handler whose media type best matches `Accept`.
    ///
    /// The winner's media type becomes `Content-Type`. With no acceptable
    /// type the fallback handler runs, or 406 is sent when there is none.
    pub fn format(&mut self, mut handlers: Vec<ResFmt<'_>>) -> Result<(), Error> {
        if handlers.is_empty() {
            return Err(Error::NoHandlers);
        }
        self.vary(&[header::ACCEPT]);

        let chosen = {
            let offers: Vec<&str> = handlers
                .iter()
                .filter(|handler| !handler.is_fallback())
                .map(ResFmt::media_type)
                .collect();
            self.accepts(&offers).and_then(|winner| {
                handlers
                    .iter()
                    .position(|handler| !handler.is_fallback() && handler.media_type == winner)
            })
        };

        match chosen {
            Some(index) => {
                let handler = handlers.swap_remove(index);
                let content_type = resolve_offer(&handler.media_type)
                    .unwrap_or(handler.media_type.as_str())
                    .to_string();
                self.set(header::CONTENT_TYPE, &content_type);
                (handler.handler)(self)
            }
            None => match handlers.into_iter().find(ResFmt::is_fallback) {
                Some(fallback) => (fallback.handler)(self),
                None => self.send_status(status::NOT_ACCEPTABLE),
            },
        }
    }

    /// Sends `body` in whichever of HTML, JSON, plain text or a configured
    /// XML/MessagePack/CBOR encoding the client prefers.
    pub fn auto_format<T: Serialize + fmt::Display + ?Sized>(&mut self, body: &T) -> Result<(), Error> {
        let config = self.config();
        let mut offers = vec!["html", "json", "txt"];
        let extra: [(&str, Option<Arc<dyn BodyEncoder>>, &str); 3] = [
            ("xml", config.xml_encoder.clone(), mime::APPLICATION_XML_UTF8),
            ("msgpack", config.msgpack_encoder.clone(), mime::APPLICATION_MSGPACK),
            ("cbor", config.cbor_encoder.clone(), mime::APPLICATION_CBOR),
        ];
        offers.extend(
            extra
                .iter()
                .filter(|(_, encoder, _)| encoder.is_some())
                .map(|(name, _, _)| *name),
        );

        let accepted = self.accepts(&offers);
        self.vary(&[header::ACCEPT]);
        let text = body.to_string();

        match accepted {
            Some("html") => {
                self.set(header::CONTENT_TYPE, mime::TEXT_HTML_UTF8);
                self.send_string(format!("<p>{}</p>", escape_html(&text)))
            }
            Some("json") => self.json(body),
            Some(name) => {
                let encoder = extra.into_iter().find(|(candidate, _, _)| *candidate == name);
                match encoder {
                    Some((_, Some(encoder), content_type)) => {
                        let value = serde_json::to_value(body)?;
                        let encoded = encoder.encode(&value).map_err(Error::Codec)?;
                        self.set(header::CONTENT_TYPE, content_type);
                        self.send(encoded)
                    }
                    _ => self.send_text(&text),
                }
            }
            None => self.send_text(&text),
        }
    }

    fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.set(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF8);
        self.send_string(text)
    }
}

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;
