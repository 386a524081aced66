//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; the caller (host) executes the actual I/O.
//!
//! `Headers` keeps the wire order of header fields and looks names up
//! case-insensitively, which is all the uri-list codec needs from a request.

/// Media type handled by the uri-list codec.
pub const URI_LIST: &str = "text/uri-list";

/// Request header overriding the relation of every decoded link.
pub const URILIST_REL_HEADER: &str = "x-spring-data-urilist-rel";

pub const CONTENT_TYPE: &str = "content-type";
pub const ACCEPT: &str = "accept";

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Ordered header fields with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value of `name`, if present.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Headers {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// True when `candidate` names `media_type`, ignoring case and parameters
/// (`text/uri-list; charset=utf-8` matches `text/uri-list`).
pub fn media_type_matches(candidate: &str, media_type: &str) -> bool {
    let essence = candidate.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case(media_type)
}

/// True when an `Accept` header value names `media_type` in one of its
/// ranges. Wildcard ranges do not count as asking for it.
pub fn accepts(accept: &str, media_type: &str) -> bool {
    accept
        .split(',')
        .any(|range| media_type_matches(range, media_type))
}

/// An HTTP request described as plain data.
///
/// Built by `AddressClient::build_*` methods. The caller is responsible for
/// executing this request and returning the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Headers,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}
