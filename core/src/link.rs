//! Hyperlink model: a relation label paired with an absolute target URI.
//!
//! # Design
//! `Link` is immutable once built. The relation is optional because a decoded
//! uri-list has no relation when neither the override header nor a request
//! path is available. `Links` is the dedicated ordered container; it keeps
//! insertion order and allows duplicate relations and targets.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// A single hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    rel: Option<String>,
    href: Url,
}

impl Link {
    pub fn new(rel: Option<String>, href: Url) -> Self {
        Self { rel, href }
    }

    /// Build a link with a relation.
    pub fn with_rel(rel: impl Into<String>, href: Url) -> Self {
        Self::new(Some(rel.into()), href)
    }

    pub fn rel(&self) -> Option<&str> {
        self.rel.as_deref()
    }

    pub fn href(&self) -> &Url {
        &self.href
    }

    /// The target in its ASCII serialization (IDNA hosts, percent-encoded
    /// path and query).
    pub fn href_ascii(&self) -> &str {
        self.href.as_str()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href_ascii())
    }
}

/// Ordered collection of links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links {
    links: Vec<Link>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.links
    }

    /// Keep only the links matching `f`, preserving order.
    pub fn retain(&mut self, f: impl FnMut(&Link) -> bool) {
        self.links.retain(f);
    }
}

impl From<Vec<Link>> for Links {
    fn from(links: Vec<Link>) -> Self {
        Self { links }
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl Extend<Link> for Links {
    fn extend<I: IntoIterator<Item = Link>>(&mut self, iter: I) {
        self.links.extend(iter);
    }
}

impl IntoIterator for Links {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
