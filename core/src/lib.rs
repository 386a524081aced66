//! `text/uri-list` codec for a hypermedia REST layer.
//!
//! # Overview
//! Converts between a newline-delimited list of absolute URIs and an ordered
//! collection of relation-labelled links. The in-memory side can be any of
//! four carrier shapes (see `carrier`), and the codec reads from any
//! `BufRead` and writes to any `Write` owned by the caller.
//!
//! # Design
//! - `UriListCodec` is stateless; share one instance freely.
//! - Decoding is all-or-nothing: the first malformed line rejects the body.
//! - `ResponsePostProcessor` is the hook hosts use to adjust outgoing links
//!   before they are encoded.
//! - `AddressClient` follows the host-does-IO pattern: it builds
//!   `HttpRequest` values and parses `HttpResponse` values, and the caller
//!   performs the round-trip.

pub mod carrier;
pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod link;
pub mod post_process;
pub mod types;

pub use carrier::{
    Carrier, CarrierFactory, CarrierKind, RepositoryMethodResponse, ResourceMap, Value, LINKS_KEY,
};
pub use client::{AddressClient, LinkMode};
pub use codec::{derive_relation, UriListCodec, MAX_NESTING};
pub use error::{ApiError, CodecError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, URILIST_REL_HEADER, URI_LIST};
pub use link::{Link, Links};
pub use post_process::{PostProcessors, ResponsePostProcessor};
pub use types::{Address, CreateAddress};
