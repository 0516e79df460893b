use crate::conditional::format_http_date;
use crate::util::is_http_token;
use chrono::{DateTime, Datelike, Utc};
use std::fmt;

/// Seconds since the epoch at which cleared cookies expire.
const DELETION_TIMESTAMP: i64 = 1_257_894_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
    /// Omits the attribute.
    Disabled,
}

impl SameSite {
    fn as_str(self) -> Option<&'static str> {
        match self {
            SameSite::Lax => Some("Lax"),
            SameSite::Strict => Some("Strict"),
            SameSite::None => Some("None"),
            SameSite::Disabled => None,
        }
    }
}

/// Response cookie rendered into one `Set-Cookie` value.
///
/// `max_age` wins over `expires` when both are set and `session_only` drops
/// both. An empty path is written as `/`. `SameSite=None` forces `Secure`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: String,
    pub max_age: i64,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub partitioned: bool,
    pub session_only: bool,
}

impl Cookie {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Empty cookie that tells the client to drop `name`.
    pub fn expired<N: Into<String>>(name: N) -> Self {
        Self {
            expires: Some(DateTime::from_timestamp(DELETION_TIMESTAMP, 0).unwrap_or_default()),
            ..Self::new(name, "")
        }
    }

    fn is_secure(&self) -> bool {
        self.secure || self.same_site == SameSite::None
    }

    /// Whether the cookie can be sent as is. Partitioned cookies must be
    /// secure and dates before 1601 are rejected.
    pub fn is_valid(&self) -> bool {
        is_http_token(&self.name)
            && self.value.bytes().all(is_cookie_octet)
            && is_valid_domain(&self.domain)
            && self.path.bytes().all(|byte| !byte.is_ascii_control() && byte != b';')
            && self.expires.is_none_or(|expires| expires.year() >= 1601)
            && (!self.partitioned || self.is_secure())
    }
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() {
        return true;
    }
    let domain = domain.strip_prefix('.').unwrap_or(domain);
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label
                    .bytes()
                    .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
        })
}

// RFC 6265 cookie-octet.
fn is_cookie_octet(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        if !self.session_only {
            if self.max_age > 0 {
                write!(f, "; max-age={}", self.max_age)?;
            } else if let Some(expires) = &self.expires {
                write!(f, "; expires={}", format_http_date(expires))?;
            }
        }
        if !self.domain.is_empty() {
            write!(f, "; domain={}", self.domain)?;
        }
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "; path={path}")?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.is_secure() {
            f.write_str("; secure")?;
        }
        if let Some(same_site) = self.same_site.as_str() {
            write!(f, "; SameSite={same_site}")?;
        }
        if self.partitioned {
            f.write_str("; Partitioned")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cookie_test.rs"]
mod cookie_test;
