use crate::constants::{encoding, status};
use crate::util::{normalize_lower, split_list};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::borrow::Cow;
use std::io::{self, Read};
use thiserror::Error;
use tracing::debug;

const BROTLI_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported Media Type")]
    UnsupportedEncoding(String),
    #[error("Not Implemented")]
    NotImplemented,
    #[error("Request Entity Too Large")]
    TooLarge { limit: usize },
    #[error(transparent)]
    Corrupt(io::Error),
}

impl DecodeError {
    /// Status the response should carry, when the failure dictates one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DecodeError::UnsupportedEncoding(_) => Some(status::UNSUPPORTED_MEDIA_TYPE),
            DecodeError::NotImplemented => Some(status::NOT_IMPLEMENTED),
            DecodeError::TooLarge { .. } => Some(status::PAYLOAD_TOO_LARGE),
            DecodeError::Corrupt(_) => None,
        }
    }
}

/// Undoes every coding listed in `content_encoding`, in the listed order.
///
/// Returns the raw bytes untouched when nothing (or only `identity`) is
/// listed. Stops at the first failing coding and drops intermediate output.
pub fn decode_body<'a>(
    raw: &'a [u8],
    content_encoding: &str,
    limit: usize,
) -> Result<Cow<'a, [u8]>, DecodeError> {
    let mut body: Cow<'a, [u8]> = Cow::Borrowed(raw);

    for token in split_list(content_encoding) {
        let token = normalize_lower(token);
        let decoded = match token.as_ref() {
            encoding::IDENTITY => continue,
            encoding::GZIP => read_limited(GzDecoder::new(body.as_ref()), limit),
            encoding::DEFLATE => read_limited(ZlibDecoder::new(body.as_ref()), limit),
            encoding::BROTLI => read_limited(
                brotli::Decompressor::new(body.as_ref(), BROTLI_BUFFER_SIZE),
                limit,
            ),
            encoding::ZSTD => zstd::stream::read::Decoder::new(body.as_ref())
                .map_err(DecodeError::Corrupt)
                .and_then(|decoder| read_limited(decoder, limit)),
            encoding::COMPRESS => Err(DecodeError::NotImplemented),
            other => Err(DecodeError::UnsupportedEncoding(other.to_string())),
        };

        match decoded {
            Ok(bytes) => body = Cow::Owned(bytes),
            Err(err) => {
                debug!(coding = %token, error = %err, "request body decoding failed");
                return Err(err);
            }
        }
    }

    Ok(body)
}

fn read_limited<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader
        .take(cap)
        .read_to_end(&mut out)
        .map_err(DecodeError::Corrupt)?;

    if out.len() > limit {
        return Err(DecodeError::TooLarge { limit });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;
