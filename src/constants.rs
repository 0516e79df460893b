pub mod header {
    pub const ACCEPT: &str = "Accept";
    pub const ACCEPT_CHARSET: &str = "Accept-Charset";
    pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
    pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
    pub const CACHE_CONTROL: &str = "Cache-Control";
    pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
    pub const CONTENT_RANGE: &str = "Content-Range";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const COOKIE: &str = "Cookie";
    pub const ETAG: &str = "ETag";
    pub const HOST: &str = "Host";
    pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
    pub const IF_NONE_MATCH: &str = "If-None-Match";
    pub const LAST_MODIFIED: &str = "Last-Modified";
    pub const LINK: &str = "Link";
    pub const LOCATION: &str = "Location";
    pub const RANGE: &str = "Range";
    pub const SET_COOKIE: &str = "Set-Cookie";
    pub const VARY: &str = "Vary";
    pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
    pub const X_FORWARDED_HOST: &str = "X-Forwarded-Host";
    pub const X_FORWARDED_PROTO: &str = "X-Forwarded-Proto";
    pub const X_FORWARDED_PROTOCOL: &str = "X-Forwarded-Protocol";
    pub const X_FORWARDED_SSL: &str = "X-Forwarded-Ssl";
    pub const X_REQUESTED_WITH: &str = "X-Requested-With";
    pub const X_URL_SCHEME: &str = "X-Url-Scheme";
}

pub mod method {
    pub const CONNECT: &str = "CONNECT";
    pub const DELETE: &str = "DELETE";
    pub const GET: &str = "GET";
    pub const HEAD: &str = "HEAD";
    pub const OPTIONS: &str = "OPTIONS";
    pub const PATCH: &str = "PATCH";
    pub const POST: &str = "POST";
    pub const PUT: &str = "PUT";
    pub const TRACE: &str = "TRACE";

    pub const ALL: [&str; 9] = [GET, HEAD, POST, PUT, DELETE, CONNECT, OPTIONS, TRACE, PATCH];

    /// Returns the canonical spelling of a known method, matched case-insensitively.
    pub fn canonical(value: &str) -> Option<&'static str> {
        ALL.iter()
            .copied()
            .find(|method| method.eq_ignore_ascii_case(value))
    }
}

pub mod mime {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const TEXT_HTML: &str = "text/html";
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_XML: &str = "application/xml";
    pub const APPLICATION_MSGPACK: &str = "application/vnd.msgpack";
    pub const APPLICATION_CBOR: &str = "application/cbor";
    pub const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";
    pub const MULTIPART_FORM: &str = "multipart/form-data";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
    pub const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";
    pub const APPLICATION_JSON_UTF8: &str = "application/json; charset=utf-8";
    pub const APPLICATION_XML_UTF8: &str = "application/xml; charset=utf-8";

    /// Pseudo media type used by `Context::format` for the fallback handler.
    pub const DEFAULT: &str = "default";
}

pub mod encoding {
    pub const BROTLI: &str = "br";
    pub const COMPRESS: &str = "compress";
    pub const DEFLATE: &str = "deflate";
    pub const GZIP: &str = "gzip";
    pub const IDENTITY: &str = "identity";
    pub const ZSTD: &str = "zstd";
}

pub mod scheme {
    pub const HTTP: &str = "http";
    pub const HTTPS: &str = "https";
}

pub mod status {
    pub const OK: u16 = 200;
    pub const PARTIAL_CONTENT: u16 = 206;
    pub const SEE_OTHER: u16 = 303;
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    pub const NOT_ACCEPTABLE: u16 = 406;
    pub const PAYLOAD_TOO_LARGE: u16 = 413;
    pub const UNSUPPORTED_MEDIA_TYPE: u16 = 415;
    pub const RANGE_NOT_SATISFIABLE: u16 = 416;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
    pub const NOT_IMPLEMENTED: u16 = 501;

    /// Reason phrase used as the body by `Context::send_status`.
    pub fn reason(code: u16) -> &'static str {
        match code {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            206 => "Partial Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            413 => "Request Entity Too Large",
            415 => "Unsupported Media Type",
            416 => "Requested Range Not Satisfiable",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "",
        }
    }
}
