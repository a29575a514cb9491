//! Web origin values (`scheme://host[:port]`).
//!
//! Origins arrive as raw `Origin` header strings and as persisted client
//! registrations. Both are funneled through `Origin::parse` so registry
//! lookups always compare the same serialized form.
use std::fmt;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OriginError {
    #[error("empty origin")]
    Empty,
    #[error("opaque origin (\"null\")")]
    Opaque,
    #[error("invalid origin url: {0}")]
    Parse(String),
    #[error("unsupported origin scheme: {0}")]
    UnsupportedScheme(String),
    #[error("origin must not contain a {0}")]
    Unexpected(&'static str),
}

/// Serialized tuple origin. Host is lowercased and default ports are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Origin(String);

impl Origin {
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OriginError::Empty);
        }
        if raw.eq_ignore_ascii_case("null") {
            return Err(OriginError::Opaque);
        }
        // `Url` normalizes "https://a.example" to path "/", so a literal
        // trailing slash has to be rejected before parsing.
        if raw.ends_with('/') {
            return Err(OriginError::Unexpected("path"));
        }

        let url = Url::parse(raw).map_err(|e| OriginError::Parse(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(OriginError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(OriginError::Unexpected("missing host"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(OriginError::Unexpected("userinfo"));
        }
        if url.path() != "/" {
            return Err(OriginError::Unexpected("path"));
        }
        if url.query().is_some() {
            return Err(OriginError::Unexpected("query"));
        }
        if url.fragment().is_some() {
            return Err(OriginError::Unexpected("fragment"));
        }

        Ok(Self(url.origin().ascii_serialization()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An origin registered by a client. Lives as long as the client registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin {
    pub client_id: String,
    pub origin: Origin,
}

impl ClientOrigin {
    pub fn new(client_id: impl Into<String>, origin: &str) -> Result<Self, OriginError> {
        Ok(Self {
            client_id: client_id.into(),
            origin: Origin::parse(origin)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_host_case_and_default_port() {
        let origin = Origin::parse("HTTPS://App.Example:443").unwrap();
        assert_eq!(origin.as_str(), "https://app.example");

        let origin = Origin::parse("http://localhost:8080").unwrap();
        assert_eq!(origin.as_str(), "http://localhost:8080");
    }

    #[test]
    fn rejects_values_that_are_not_tuple_origins() {
        assert_eq!(Origin::parse(""), Err(OriginError::Empty));
        assert_eq!(Origin::parse("null"), Err(OriginError::Opaque));
        assert_eq!(
            Origin::parse("https://app.example/"),
            Err(OriginError::Unexpected("path"))
        );
        assert_eq!(
            Origin::parse("https://app.example/login"),
            Err(OriginError::Unexpected("path"))
        );
        assert_eq!(
            Origin::parse("https://app.example?x=1"),
            Err(OriginError::Unexpected("query"))
        );
        assert_eq!(
            Origin::parse("https://user:pw@app.example"),
            Err(OriginError::Unexpected("userinfo"))
        );
        assert!(matches!(
            Origin::parse("ftp://files.example"),
            Err(OriginError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            Origin::parse("not an origin"),
            Err(OriginError::Parse(_))
        ));
    }

    #[test]
    fn client_origin_keeps_owner() {
        let co = ClientOrigin::new("spa", "https://spa.example").unwrap();
        assert_eq!(co.client_id, "spa");
        assert_eq!(co.origin.to_string(), "https://spa.example");
    }
}
