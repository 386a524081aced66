//! In-memory shapes a uri-list payload can be read into or written from.
//!
//! # Design
//! Call sites hold links in one of four shapes: the dedicated `Links`
//! container, a generic sequence of `Value`s, a keyed `ResourceMap` whose
//! links live under `"_links"`, or a `RepositoryMethodResponse` wrapping a
//! `Links`. `Carrier` closes over exactly these shapes, so the codec matches
//! on it once per call instead of inspecting element types as it goes, and an
//! unsupported shape cannot be handed to the codec at all.
//!
//! Decoding needs an empty carrier to fill. The caller supplies it through
//! `CarrierFactory`; `CarrierKind` is the stock factory that builds empty
//! shapes, and any `Fn() -> Result<Carrier, String>` closure works too.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::link::{Link, Links};

/// Key under which a `ResourceMap` holds its link sequence.
pub const LINKS_KEY: &str = "_links";

/// Keyed mapping carrier.
pub type ResourceMap = BTreeMap<String, Value>;

/// Element of a generic sequence or value of a `ResourceMap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Link(Link),
    Text(String),
    List(Vec<Value>),
    Map(ResourceMap),
    Links(Links),
}

impl From<Link> for Value {
    fn from(link: Link) -> Self {
        Value::Link(link)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<Links> for Value {
    fn from(links: Links) -> Self {
        Value::Links(links)
    }
}

/// Textual form used when a sequence element is not a `Link`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Link(link) => f.write_str(link.href_ascii()),
            Value::Text(text) => f.write_str(text),
            Value::List(items) => write_joined(f, items.iter()),
            Value::Links(links) => write_joined(f, links.iter()),
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

/// Result of a repository method invocation, exposing its links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryMethodResponse {
    links: Links,
}

impl RepositoryMethodResponse {
    pub fn new(links: Links) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }

    pub fn into_links(self) -> Links {
        self.links
    }
}

/// Names a carrier shape without holding data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierKind {
    Links,
    Sequence,
    Mapping,
    Response,
}

impl CarrierKind {
    pub const ALL: [CarrierKind; 4] = [
        CarrierKind::Links,
        CarrierKind::Sequence,
        CarrierKind::Mapping,
        CarrierKind::Response,
    ];

    /// An empty carrier of this shape.
    pub fn empty(self) -> Carrier {
        match self {
            CarrierKind::Links => Carrier::Links(Links::new()),
            CarrierKind::Sequence => Carrier::Sequence(Vec::new()),
            CarrierKind::Mapping => Carrier::Mapping(ResourceMap::new()),
            CarrierKind::Response => Carrier::Response(RepositoryMethodResponse::default()),
        }
    }
}

/// A value the uri-list codec can read into or write from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Carrier {
    Links(Links),
    Sequence(Vec<Value>),
    Mapping(ResourceMap),
    Response(RepositoryMethodResponse),
}

impl Carrier {
    pub fn kind(&self) -> CarrierKind {
        match self {
            Carrier::Links(_) => CarrierKind::Links,
            Carrier::Sequence(_) => CarrierKind::Sequence,
            Carrier::Mapping(_) => CarrierKind::Mapping,
            Carrier::Response(_) => CarrierKind::Response,
        }
    }

    /// Number of `Link`s reachable in this carrier, without recursing
    /// into nested maps.
    pub fn link_count(&self) -> usize {
        match self {
            Carrier::Links(links) => links.len(),
            Carrier::Response(response) => response.links().len(),
            Carrier::Sequence(items) => count_links(items),
            Carrier::Mapping(map) => match map.get(LINKS_KEY) {
                Some(Value::List(items)) => count_links(items),
                Some(Value::Links(links)) => links.len(),
                _ => 0,
            },
        }
    }

    /// Collect every `Link` in this carrier into a dedicated container,
    /// dropping non-link sequence elements.
    pub fn into_links(self) -> Links {
        match self {
            Carrier::Links(links) => links,
            Carrier::Response(response) => response.into_links(),
            Carrier::Sequence(items) => only_links(items),
            Carrier::Mapping(mut map) => match map.remove(LINKS_KEY) {
                Some(Value::List(items)) => only_links(items),
                Some(Value::Links(links)) => links,
                _ => Links::new(),
            },
        }
    }
}

fn count_links(items: &[Value]) -> usize {
    items
        .iter()
        .filter(|item| matches!(item, Value::Link(_)))
        .count()
}

fn only_links(items: Vec<Value>) -> Links {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Link(link) => Some(link),
            _ => None,
        })
        .collect()
}

impl From<Links> for Carrier {
    fn from(links: Links) -> Self {
        Carrier::Links(links)
    }
}

impl From<Vec<Value>> for Carrier {
    fn from(items: Vec<Value>) -> Self {
        Carrier::Sequence(items)
    }
}

impl From<ResourceMap> for Carrier {
    fn from(map: ResourceMap) -> Self {
        Carrier::Mapping(map)
    }
}

impl From<RepositoryMethodResponse> for Carrier {
    fn from(response: RepositoryMethodResponse) -> Self {
        Carrier::Response(response)
    }
}

/// Produces the empty carrier a decode fills.
pub trait CarrierFactory {
    /// Build the target, or describe why it cannot be built.
    fn instantiate(&self) -> Result<Carrier, String>;
}

impl CarrierFactory for CarrierKind {
    fn instantiate(&self) -> Result<Carrier, String> {
        Ok(self.empty())
    }
}

impl<F> CarrierFactory for F
where
    F: Fn() -> Result<Carrier, String>,
{
    fn instantiate(&self) -> Result<Carrier, String> {
        self()
    }
}
