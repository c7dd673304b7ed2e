//! Set-Cookie header construction and Cookie header lookup

use std::fmt;

use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderValue, header::COOKIE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("invalid cookie name: {0:?}")]
    InvalidName(String),

    #[error("invalid cookie value for {0}")]
    InvalidValue(String),

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),
}

/// One `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    path: Option<String>,
    expires: Option<DateTime<Utc>>,
    max_age: Option<i64>,
    http_only: bool,
    secure: bool,
    same_site_strict: bool,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            expires: None,
            max_age: None,
            http_only: false,
            secure: false,
            same_site_strict: false,
        }
    }

    /// Cookie that makes the browser drop `name` immediately
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "")
            .expires(DateTime::<Utc>::UNIX_EPOCH)
            .max_age(0)
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    /// Lifetime in seconds; negative values are clamped to 0
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds.max(0));
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }

    /// `SameSite=Strict`: never sent on cross-site requests
    pub fn same_site_strict(mut self, on: bool) -> Self {
        self.same_site_strict = on;
        self
    }

    /// Validate and render as a header value
    pub fn to_header_value(&self) -> Result<HeaderValue, CookieError> {
        if self.name.is_empty() || !self.name.bytes().all(is_token_byte) {
            return Err(CookieError::InvalidName(self.name.clone()));
        }
        if !self.value.bytes().all(is_cookie_octet) {
            return Err(CookieError::InvalidValue(self.name.clone()));
        }
        Ok(HeaderValue::from_str(&self.to_string())?)
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", http_date(expires))?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.same_site_strict {
            write!(f, "; SameSite=Strict")?;
        }
        Ok(())
    }
}

/// IMF-fixdate, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`
pub fn http_date(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Look up a cookie sent by the client
///
/// Every `Cookie` header is searched; the first pair named `name` wins.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

// RFC 6265 token characters
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic()
        && !matches!(
            b,
            b'(' | b')'
                | b'<'
                | b'>'
                | b'@'
                | b','
                | b';'
                | b':'
                | b'\\'
                | b'"'
                | b'/'
                | b'['
                | b']'
                | b'?'
                | b'='
                | b'{'
                | b'}'
        )
}

fn is_cookie_octet(b: u8) -> bool {
    b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\')
}
