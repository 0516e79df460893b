use super::*;
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::Write;

const PLAIN: &[u8] = b"john=doe";
const LIMIT: usize = 1024 * 1024;

fn gzip(input: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input).unwrap();
    encoder.finish().unwrap()
}

fn zlib(input: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input).unwrap();
    encoder.finish().unwrap()
}

fn brotli_compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let params = brotli::enc::BrotliEncoderParams::default();
    brotli::BrotliCompress(&mut io::Cursor::new(input), &mut out, &params).unwrap();
    out
}

fn zstd_compress(input: &[u8]) -> Vec<u8> {
    zstd::encode_all(io::Cursor::new(input), 3).unwrap()
}

mod decode_body {
    use super::*;

    #[test]
    fn should_borrow_raw_body_when_header_empty_or_identity() {
        // Arrange & Act
        let empty = decode_body(PLAIN, "", LIMIT).unwrap();
        let identity = decode_body(PLAIN, "identity", LIMIT).unwrap();

        // Assert
        assert!(matches!(empty, Cow::Borrowed(PLAIN)));
        assert!(matches!(identity, Cow::Borrowed(PLAIN)));
    }

    #[test]
    fn should_decode_each_supported_coding() {
        for (coding, compressed) in [
            ("gzip", gzip(PLAIN)),
            ("deflate", zlib(PLAIN)),
            ("br", brotli_compress(PLAIN)),
            ("zstd", zstd_compress(PLAIN)),
        ] {
            let decoded = decode_body(&compressed, coding, LIMIT).unwrap();

            assert_eq!(decoded.as_ref(), PLAIN, "{coding}");
        }
    }

    #[test]
    fn should_undo_layers_when_gzip_applied_twice() {
        // Arrange
        let twice = gzip(&gzip(PLAIN));

        // Act
        let decoded = decode_body(&twice, "gzip, gzip", LIMIT).unwrap();

        // Assert
        assert_eq!(decoded.as_ref(), PLAIN);
    }

    #[test]
    fn should_process_tokens_in_listed_order() {
        // Arrange
        let layered = zstd_compress(&gzip(PLAIN));

        // Act
        let decoded = decode_body(&layered, " ZSTD ,identity, Gzip", LIMIT).unwrap();

        // Assert
        assert_eq!(decoded.as_ref(), PLAIN);
    }

    #[test]
    fn should_report_unsupported_media_type_when_token_unknown() {
        // Arrange
        let compressed = gzip(PLAIN);

        // Act
        let err = decode_body(&compressed, "gzip, undefined", LIMIT).unwrap_err();

        // Assert
        assert!(matches!(err, DecodeError::UnsupportedEncoding(ref token) if token == "undefined"));
        assert_eq!(err.to_string(), "Unsupported Media Type");
        assert_eq!(err.status(), Some(415));
    }

    #[test]
    fn should_report_not_implemented_when_compress() {
        let err = decode_body(PLAIN, "compress", LIMIT).unwrap_err();

        assert_eq!(err.to_string(), "Not Implemented");
        assert_eq!(err.status(), Some(501));
    }

    #[test]
    fn should_surface_codec_error_verbatim_when_stream_corrupt() {
        // Arrange & Act
        let err = decode_body(b"definitely not gzip", "gzip", LIMIT).unwrap_err();

        // Assert
        assert!(matches!(err, DecodeError::Corrupt(_)));
        assert!(!err.to_string().is_empty());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn should_reject_output_above_limit() {
        // Arrange
        let big = vec![b'a'; 4096];
        let compressed = gzip(&big);

        // Act
        let err = decode_body(&compressed, "gzip", 1024).unwrap_err();

        // Assert
        assert!(matches!(err, DecodeError::TooLarge { limit: 1024 }));
        assert_eq!(err.status(), Some(413));
    }

    #[test]
    fn should_accept_output_exactly_at_limit() {
        let exact = vec![b'a'; 1024];

        let compressed = gzip(&exact);
        let decoded = decode_body(&compressed, "gzip", 1024).unwrap();

        assert_eq!(decoded.len(), 1024);
    }
}
