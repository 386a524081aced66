//! Bidirectional `text/uri-list` codec.
//!
//! # Design
//! `UriListCodec` holds no state: every decode or encode keeps its working
//! data on the stack, so one instance can serve concurrent calls. The codec
//! borrows the caller's streams and never closes them.
//!
//! Decoding collects every link before touching the target carrier, so a
//! malformed line aborts the read with no partially filled result. Encoding
//! streams straight into the writer, one `\n`-terminated line per entry.

use std::io::{self, BufRead, Write};

use url::Url;

use crate::carrier::{Carrier, CarrierFactory, CarrierKind, ResourceMap, Value, LINKS_KEY};
use crate::error::CodecError;
use crate::http::{media_type_matches, Headers, URILIST_REL_HEADER, URI_LIST};
use crate::link::{Link, Links};

/// How many mappings may nest under `"_links"` below the outermost one.
pub const MAX_NESTING: usize = 1;

/// Relation for links decoded from a request.
///
/// The `x-spring-data-urilist-rel` header wins. Otherwise the request path
/// becomes a dotted relation (`/orders/items` -> `orders.items`). An empty
/// derived relation is treated as absent.
pub fn derive_relation(headers: &Headers, path: Option<&str>) -> Option<String> {
    if let Some(rel) = headers.first(URILIST_REL_HEADER) {
        return Some(rel.to_string());
    }
    let path = path?;
    let rel = path.strip_prefix('/').unwrap_or(path).replace('/', ".");
    (!rel.is_empty()).then_some(rel)
}

/// Schemes whose WHATWG parsing would rewrite a missing `//` authority.
const SPECIAL_SCHEMES: [&str; 6] = ["http", "https", "ws", "wss", "ftp", "file"];

/// Check `input` against RFC 3986 absolute-URI syntax.
///
/// `Url::parse` follows the WHATWG rules and repairs what it can (escaping
/// spaces, flipping backslashes, inserting `//`). A uri-list line must
/// already be well formed, so it is checked here first.
fn check_uri_syntax(input: &str) -> Result<(), String> {
    let colon = input.find(':').ok_or("missing scheme")?;
    let scheme = &input[..colon];
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok {
        return Err(format!("invalid scheme '{scheme}'"));
    }

    let rest = &input[colon + 1..];
    let special = SPECIAL_SCHEMES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(scheme));
    if special && !rest.starts_with("//") {
        return Err(format!("'{scheme}:' must be followed by '//'"));
    }

    // Brackets are only legal around an IP literal in the authority.
    let authority_end = match rest.strip_prefix("//") {
        Some(after) => 2 + after.find(['/', '?', '#']).unwrap_or(after.len()),
        None => 0,
    };

    let bytes = rest.as_bytes();
    let mut fragment = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'%' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit));
                if !escaped {
                    return Err(format!("bad percent-escape at byte {}", colon + 1 + i));
                }
                i += 3;
                continue;
            }
            b'[' | b']' if i >= authority_end => {
                return Err(format!("'{}' outside the authority", b as char));
            }
            b'#' if fragment => return Err("more than one '#'".to_string()),
            b'#' => fragment = true,
            b if b.is_ascii_alphanumeric() => {}
            b'-' | b'.' | b'_' | b'~' | b':' | b'/' | b'?' | b'[' | b']' | b'@' | b'!' | b'$'
            | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            _ => {
                let c = rest[i..].chars().next().unwrap_or('?');
                return Err(format!("character {c:?} is not allowed in a URI"));
            }
        }
        i += 1;
    }
    Ok(())
}

/// Reads and writes `text/uri-list` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriListCodec;

const _: fn() = || {
    fn assert_shareable<T: Send + Sync + Copy>() {}
    assert_shareable::<UriListCodec>();
};

impl UriListCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn media_type(&self) -> &'static str {
        URI_LIST
    }

    /// Every `CarrierKind` is a supported value category.
    pub fn supports(&self, kind: CarrierKind) -> bool {
        CarrierKind::ALL.contains(&kind)
    }

    /// `media_type` of `None` stands for "any".
    pub fn can_read(&self, kind: CarrierKind, media_type: Option<&str>) -> bool {
        self.supports(kind) && media_type.map_or(true, |m| media_type_matches(m, URI_LIST))
    }

    pub fn can_write(&self, kind: CarrierKind, media_type: Option<&str>) -> bool {
        self.can_read(kind, media_type)
    }

    /// Decode a uri-list body into the carrier built by `factory`.
    ///
    /// Blank lines are skipped. Every other line, trimmed, must be an
    /// absolute URI in strict RFC 3986 syntax; the first one that is not
    /// fails the whole read. Relative references such as `/addresses/1` are
    /// rejected, as are lines a browser would repair (unescaped spaces or
    /// `<>{}|`, backslashes, `http:host` without `//`).
    pub fn read<R: BufRead>(
        &self,
        headers: &Headers,
        path: Option<&str>,
        mut body: R,
        factory: impl CarrierFactory,
    ) -> Result<Carrier, CodecError> {
        let rel = derive_relation(headers, path);
        let mut carrier = factory.instantiate().map_err(CodecError::Instantiation)?;

        let mut links = Vec::new();
        let mut line = String::new();
        let mut number = 0;
        loop {
            line.clear();
            if body.read_line(&mut line)? == 0 {
                break;
            }
            number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let malformed = |reason: String| CodecError::MalformedUri {
                line: number,
                input: trimmed.to_string(),
                reason,
            };
            check_uri_syntax(trimmed).map_err(malformed)?;
            let href = Url::parse(trimmed).map_err(|e| malformed(e.to_string()))?;
            links.push(Link::new(rel.clone(), href));
        }

        fill(&mut carrier, links)?;
        Ok(carrier)
    }

    /// Decode an in-memory body.
    pub fn read_str(
        &self,
        headers: &Headers,
        path: Option<&str>,
        body: &str,
        factory: impl CarrierFactory,
    ) -> Result<Carrier, CodecError> {
        self.read(headers, path, body.as_bytes(), factory)
    }

    /// Encode `carrier` as uri-list lines into `out`.
    pub fn write<W: Write + ?Sized>(&self, carrier: &Carrier, out: &mut W) -> Result<(), CodecError> {
        match carrier {
            Carrier::Links(links) => write_links(links, out),
            Carrier::Sequence(items) => write_sequence(items, out),
            Carrier::Mapping(map) => write_mapping(map, out, 0),
            Carrier::Response(response) => write_links(response.links(), out),
        }
    }

    pub fn write_to_string(&self, carrier: &Carrier) -> Result<String, CodecError> {
        let mut buf = Vec::new();
        self.write(carrier, &mut buf)?;
        String::from_utf8(buf).map_err(|e| CodecError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

fn fill(carrier: &mut Carrier, links: Vec<Link>) -> Result<(), CodecError> {
    match carrier {
        Carrier::Links(target) => target.extend(links),
        Carrier::Response(response) => response.links_mut().extend(links),
        Carrier::Sequence(items) => items.extend(links.into_iter().map(Value::Link)),
        Carrier::Mapping(map) => {
            if links.is_empty() {
                return Ok(());
            }
            match map
                .entry(LINKS_KEY.to_string())
                .or_insert_with(|| Value::List(Vec::new()))
            {
                Value::List(items) => items.extend(links.into_iter().map(Value::Link)),
                Value::Links(target) => target.extend(links),
                _ => {
                    return Err(CodecError::Instantiation(format!(
                        "'{LINKS_KEY}' entry of the target mapping is not a sequence"
                    )))
                }
            }
        }
    }
    Ok(())
}

fn write_links<W: Write + ?Sized>(links: &Links, out: &mut W) -> Result<(), CodecError> {
    for link in links {
        out.write_all(link.href_ascii().as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn write_sequence<W: Write + ?Sized>(items: &[Value], out: &mut W) -> Result<(), CodecError> {
    for item in items {
        match item {
            Value::Link(link) => out.write_all(link.href_ascii().as_bytes())?,
            other => write!(out, "{other}")?,
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn write_mapping<W: Write + ?Sized>(
    map: &ResourceMap,
    out: &mut W,
    nested: usize,
) -> Result<(), CodecError> {
    match map.get(LINKS_KEY) {
        Some(Value::Links(links)) => write_links(links, out),
        Some(Value::List(items)) => write_sequence(items, out),
        Some(Value::Map(inner)) => {
            if nested >= MAX_NESTING {
                return Err(CodecError::NestingTooDeep { max: MAX_NESTING });
            }
            write_mapping(inner, out, nested + 1)
        }
        // Absent, or a scalar that is not a carrier: nothing to write.
        Some(Value::Link(_)) | Some(Value::Text(_)) | None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::RepositoryMethodResponse;

    fn codec() -> UriListCodec {
        UriListCodec::new()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn rel_header(value: &str) -> Headers {
        [(URILIST_REL_HEADER, value)].into_iter().collect()
    }

    #[test]
    fn supports_every_carrier_kind() {
        for kind in CarrierKind::ALL {
            assert!(codec().supports(kind));
            assert!(codec().can_read(kind, Some("text/uri-list")));
            assert!(codec().can_write(kind, None));
            assert!(!codec().can_read(kind, Some("application/json")));
        }
        assert_eq!(codec().media_type(), "text/uri-list");
    }

    #[test]
    fn header_relation_beats_path() {
        let carrier = codec()
            .read_str(&rel_header("foo"), Some("/a/b"), "http://example.com/1\n", CarrierKind::Links)
            .unwrap();
        let links = carrier.into_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links.as_slice()[0].rel(), Some("foo"));
    }

    #[test]
    fn relation_derived_from_path() {
        let carrier = codec()
            .read_str(
                &Headers::new(),
                Some("/orders/items"),
                "http://example.com/1\nhttp://example.com/2\n",
                CarrierKind::Links,
            )
            .unwrap();
        for link in carrier.into_links() {
            assert_eq!(link.rel(), Some("orders.items"));
        }
    }

    #[test]
    fn relation_absent_without_header_or_path() {
        assert_eq!(derive_relation(&Headers::new(), None), None);
        assert_eq!(derive_relation(&Headers::new(), Some("/")), None);
        assert_eq!(derive_relation(&rel_header(""), Some("/x")), Some(String::new()));
    }

    #[test]
    fn malformed_line_fails_whole_read() {
        let body = "http://example.com/ok\nnot a uri\nhttp://example.com/later\n";
        let err = codec()
            .read_str(&Headers::new(), Some("/x"), body, CarrierKind::Links)
            .unwrap_err();
        match err {
            CodecError::MalformedUri { line, input, .. } => {
                assert_eq!(line, 2);
                assert_eq!(input, "not a uri");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn relative_reference_is_malformed() {
        let err = codec()
            .read_str(&Headers::new(), None, "/relative/path\n", CarrierKind::Sequence)
            .unwrap_err();
        assert!(err.is_not_readable());
    }

    #[test]
    fn lines_a_browser_would_repair_are_malformed() {
        for line in [
            "http://example.com/a b",
            "http://example.com/<x>|{y}",
            "http:example.com",
            "http:\\\\example.com\\p",
            "http://example.com/%zz",
            "http://example.com/a#b#c",
            "http://example.com/[x]",
            "1http://example.com/",
        ] {
            let body = format!("http://example.com/ok\n{line}\n");
            let err = codec()
                .read_str(&Headers::new(), None, &body, CarrierKind::Links)
                .unwrap_err();
            assert!(
                matches!(err, CodecError::MalformedUri { line: 2, .. }),
                "{line:?} was accepted or failed oddly: {err}"
            );
        }
    }

    #[test]
    fn strict_syntax_still_accepts_valid_uris() {
        let body = "http://[::1]:8080/a%20b?q=1&r=(2)#frag\nurn:isbn:0451450523\nmailto:someone@example.com\nHTTPS://Example.com/~x\n";
        let carrier = codec()
            .read_str(&Headers::new(), None, body, CarrierKind::Links)
            .unwrap();
        assert_eq!(carrier.link_count(), 4);
    }

    #[test]
    fn codec_is_shareable_across_threads() {
        let codec = codec();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let body = format!("http://example.com/{i}\n");
                    codec
                        .read_str(&Headers::new(), None, &body, CarrierKind::Links)
                        .unwrap()
                        .link_count()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }

    #[test]
    fn mapping_target_collects_under_links_key() {
        let body = "  http://example.com/1  \r\n\nhttp://example.com/2\n\n";
        let carrier = codec()
            .read_str(&Headers::new(), Some("/x"), body, CarrierKind::Mapping)
            .unwrap();
        let Carrier::Mapping(map) = carrier else {
            panic!("expected mapping");
        };
        assert_eq!(map.len(), 1);
        let Some(Value::List(items)) = map.get(LINKS_KEY) else {
            panic!("expected list under _links");
        };
        let expected = vec![
            Value::Link(Link::with_rel("x", url("http://example.com/1"))),
            Value::Link(Link::with_rel("x", url("http://example.com/2"))),
        ];
        assert_eq!(items, &expected);
    }

    #[test]
    fn mapping_target_appends_to_existing_links() {
        let factory = || -> Result<Carrier, String> {
            let mut map = ResourceMap::new();
            map.insert(
                LINKS_KEY.to_string(),
                Value::List(vec![Value::from("existing")]),
            );
            Ok(Carrier::Mapping(map))
        };
        let carrier = codec()
            .read_str(&Headers::new(), None, "http://example.com/1\n", factory)
            .unwrap();
        assert_eq!(carrier.link_count(), 1);
        let Carrier::Mapping(map) = carrier else {
            panic!("expected mapping");
        };
        let Some(Value::List(items)) = map.get(LINKS_KEY) else {
            panic!("expected list under _links");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn mapping_target_with_scalar_links_entry_is_rejected() {
        let factory = || -> Result<Carrier, String> {
            let mut map = ResourceMap::new();
            map.insert(LINKS_KEY.to_string(), Value::from("scalar"));
            Ok(Carrier::Mapping(map))
        };
        let err = codec()
            .read_str(&Headers::new(), None, "http://example.com/1\n", factory)
            .unwrap_err();
        assert!(matches!(err, CodecError::Instantiation(_)));
    }

    #[test]
    fn empty_body_yields_empty_carrier_of_each_kind() {
        for kind in CarrierKind::ALL {
            let carrier = codec().read_str(&Headers::new(), Some("/x"), "", kind).unwrap();
            assert_eq!(carrier, kind.empty());
        }
    }

    #[test]
    fn instantiation_failure_is_reported() {
        let factory = || -> Result<Carrier, String> { Err("abstract type".to_string()) };
        let err = codec()
            .read_str(&Headers::new(), None, "http://example.com/1\n", factory)
            .unwrap_err();
        assert!(err.is_not_readable());
        assert_eq!(err.to_string(), "cannot instantiate uri-list target: abstract type");
    }

    #[test]
    fn response_target_fills_embedded_links() {
        let carrier = codec()
            .read_str(&Headers::new(), Some("/people"), "http://example.com/p/1\n", CarrierKind::Response)
            .unwrap();
        let Carrier::Response(response) = carrier else {
            panic!("expected response");
        };
        assert_eq!(response.links().as_slice()[0].rel(), Some("people"));
    }

    #[test]
    fn invalid_utf8_surfaces_as_io_error() {
        let body: &[u8] = b"http://example.com/\xff\n";
        let err = codec()
            .read(&Headers::new(), None, body, CarrierKind::Links)
            .unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn write_links_terminates_every_line() {
        let links: Links = vec![
            Link::with_rel("a", url("http://example.com/1")),
            Link::with_rel("b", url("http://bücher.example/2")),
        ]
        .into();
        let out = codec().write_to_string(&Carrier::Links(links)).unwrap();
        assert_eq!(out, "http://example.com/1\nhttp://xn--bcher-kva.example/2\n");
    }

    #[test]
    fn write_mixed_sequence_falls_back_to_text() {
        let items = vec![
            Value::Link(Link::with_rel("a", url("http://example.com/1"))),
            Value::from("plain string"),
        ];
        let out = codec().write_to_string(&Carrier::Sequence(items)).unwrap();
        assert_eq!(out, "http://example.com/1\nplain string\n");
    }

    #[test]
    fn write_mapping_without_links_writes_nothing() {
        let mut map = ResourceMap::new();
        map.insert("name".to_string(), Value::from("ignored"));
        let out = codec().write_to_string(&Carrier::Mapping(map)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn write_mapping_delegates_to_links_entry() {
        let mut map = ResourceMap::new();
        map.insert(
            LINKS_KEY.to_string(),
            Value::Links(vec![Link::with_rel("a", url("http://example.com/1"))].into()),
        );
        let out = codec().write_to_string(&Carrier::Mapping(map)).unwrap();
        assert_eq!(out, "http://example.com/1\n");
    }

    #[test]
    fn write_mapping_rejects_deep_nesting() {
        let mut innermost = ResourceMap::new();
        innermost.insert(LINKS_KEY.to_string(), Value::List(Vec::new()));
        let mut inner = ResourceMap::new();
        inner.insert(LINKS_KEY.to_string(), Value::Map(innermost));
        let mut outer = ResourceMap::new();
        outer.insert(LINKS_KEY.to_string(), Value::Map(inner));

        // One nested mapping is fine, two is not.
        let mut one_level = ResourceMap::new();
        one_level.insert(
            LINKS_KEY.to_string(),
            Value::Map(ResourceMap::from([(
                LINKS_KEY.to_string(),
                Value::List(vec![Value::from("x")]),
            )])),
        );
        assert_eq!(codec().write_to_string(&Carrier::Mapping(one_level)).unwrap(), "x\n");

        let err = codec().write_to_string(&Carrier::Mapping(outer)).unwrap_err();
        assert!(matches!(err, CodecError::NestingTooDeep { max: MAX_NESTING }));
    }

    #[test]
    fn write_response_delegates_to_links() {
        let response = RepositoryMethodResponse::new(
            vec![Link::with_rel("a", url("http://example.com/1"))].into(),
        );
        let out = codec().write_to_string(&Carrier::Response(response)).unwrap();
        assert_eq!(out, "http://example.com/1\n");
    }

    #[test]
    fn write_appends_to_existing_output() {
        let mut out = b"prefix\n".to_vec();
        let links: Links = vec![Link::with_rel("a", url("http://example.com/1"))].into();
        codec().write(&Carrier::Links(links), &mut out).unwrap();
        assert_eq!(out, b"prefix\nhttp://example.com/1\n");
    }
}
