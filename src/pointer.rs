//! JSON Pointer (RFC 6901) and Relative JSON Pointer support
//!
//! A [`JsonPointer`] identifies a single value within a JSON document. Pointers can be
//! parsed from strings, built from parts, or derived from the nodes produced by a JSONPath
//! query. A [`RelativeJsonPointer`] adjusts an existing pointer following the
//! [Relative JSON Pointer draft][rel].
//!
//! Beyond RFC 6901, resolution supports the conveniences of the JSONPath engine: negative
//! array indices count from the end, integer parts fall back to numeric-string keys on
//! objects, and the `~name`/`#name` name-of parts produced for keys-selector nodes resolve
//! to the key itself.
//!
//! [rel]: https://www.ietf.org/id/draft-hha-relative-json-pointer-00.html
use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::Visitor, Deserialize, Serialize};
use serde_json::Value;

use crate::node::Node;
use crate::spec::path::PathElement;

/// The maximum integer allowed when resolving array items by index, (2^53) - 1
const MAX_INT_INDEX: i64 = 9_007_199_254_740_991;
/// The minimum integer allowed when resolving array items by index, -(2^53) + 1
const MIN_INT_INDEX: i64 = -9_007_199_254_740_991;

/// Error produced when parsing or resolving a JSON Pointer
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// Malformed pointer syntax
    #[error("invalid pointer: {0}")]
    Syntax(String),
    /// A mapping along the path did not contain the requested key
    #[error("key not found: '{0}'")]
    Key(String),
    /// A sequence index was out of range, or otherwise invalid
    #[error("index out of range: {0}")]
    Index(String),
    /// A part could not be applied to the value it addressed
    #[error("cannot resolve '{part}' against a {target}")]
    Type {
        /// The offending pointer part
        part: String,
        /// A short description of the addressed value
        target: &'static str,
    },
}

/// One part of a JSON Pointer: an array index or an object key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerPart {
    /// An array index
    ///
    /// Negative indices are a non-standard convenience and count from the end of the
    /// array during resolution.
    Index(i64),
    /// An object key
    Name(String),
}

impl PointerPart {
    fn escaped(&self) -> String {
        match self {
            PointerPart::Index(i) => i.to_string(),
            PointerPart::Name(s) => s.replace('~', "~0").replace('/', "~1"),
        }
    }
}

impl Display for PointerPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointerPart::Index(i) => write!(f, "{i}"),
            PointerPart::Name(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for PointerPart {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<usize> for PointerPart {
    fn from(i: usize) -> Self {
        Self::Index(i as i64)
    }
}

impl From<&str> for PointerPart {
    fn from(s: &str) -> Self {
        Self::Name(s.to_owned())
    }
}

impl From<String> for PointerPart {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

/// Options applied before parsing a pointer string
#[derive(Debug, Clone, Copy)]
pub struct PointerOptions {
    /// Decode UTF-16 escape sequences, possibly surrogate pairs, before parsing
    pub unicode_escape: bool,
    /// Percent-decode the pointer before parsing
    pub uri_decode: bool,
}

impl Default for PointerOptions {
    fn default() -> Self {
        Self {
            unicode_escape: true,
            uri_decode: false,
        }
    }
}

/// Identify a single, specific value in JSON-like data, as per RFC 6901
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    parts: Vec<PointerPart>,
    repr: String,
}

impl JsonPointer {
    /// Parse a pointer from its string form, decoding UTF-16 escape sequences
    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        Self::parse_with_options(pointer, PointerOptions::default())
    }

    /// Parse a pointer from its string form with explicit decoding options
    pub fn parse_with_options(pointer: &str, opts: PointerOptions) -> Result<Self, PointerError> {
        let decoded: Cow<'_, str> = if opts.uri_decode {
            urlencoding::decode(pointer).map_err(|e| PointerError::Syntax(e.to_string()))?
        } else {
            Cow::Borrowed(pointer)
        };
        let decoded = if opts.unicode_escape {
            Cow::Owned(decode_unicode_escape(&decoded)?)
        } else {
            decoded
        };
        let s = decoded.trim_start();
        if s.is_empty() {
            return Ok(Self::default());
        }
        if !s.starts_with('/') {
            return Err(PointerError::Syntax(String::from(
                "pointer must start with a slash or be the empty string",
            )));
        }
        let parts = s
            .split('/')
            .skip(1)
            .map(|p| classify_part(&p.replace("~1", "/").replace("~0", "~")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_part_list(parts))
    }

    /// Build a pointer from pre-parsed parts
    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PointerPart>,
    {
        Self::from_part_list(parts.into_iter().map(Into::into).collect())
    }

    /// Build a pointer addressing the location of a JSONPath query result
    pub fn from_node(node: &Node<'_>) -> Self {
        Self::from_part_list(
            node.location()
                .iter()
                .map(|elem| match elem {
                    PathElement::Name(s) => PointerPart::Name((*s).to_owned()),
                    PathElement::Index(i) => PointerPart::Index(*i as i64),
                    PathElement::Key(k) => PointerPart::Name(format!("~{k}")),
                })
                .collect(),
        )
    }

    fn from_part_list(parts: Vec<PointerPart>) -> Self {
        let repr = encode(&parts);
        Self { parts, repr }
    }

    /// The parts making up this pointer
    pub fn parts(&self) -> &[PointerPart] {
        &self.parts
    }

    /// Resolve this pointer against a document
    ///
    /// The result is borrowed from the document except when the final part is a
    /// non-standard name-of part (`~name` or `#name`), whose result is the key itself.
    pub fn resolve<'v>(&self, value: &'v Value) -> Result<Cow<'v, Value>, PointerError> {
        let mut current = Cow::Borrowed(value);
        for part in &self.parts {
            current = match current {
                Cow::Borrowed(v) => get_part(v, part)?,
                Cow::Owned(_) => {
                    return Err(PointerError::Type {
                        part: part.to_string(),
                        target: "scalar",
                    })
                }
            };
        }
        Ok(current)
    }

    /// Resolve this pointer against a document, or `None` if it does not resolve
    pub fn get<'v>(&self, value: &'v Value) -> Option<Cow<'v, Value>> {
        self.resolve(value).ok()
    }

    /// Resolve this pointer against a document, falling back to a default
    pub fn resolve_or(&self, value: &Value, default: Value) -> Value {
        self.get(value)
            .map(Cow::into_owned)
            .unwrap_or(default)
    }

    /// Resolve this pointer against a document, returning the parent of the addressed
    /// value together with the value itself
    ///
    /// The parent is `None` when this pointer addresses the document root. The value is
    /// `None` when its parent exists but the final part does not resolve.
    pub fn resolve_parent<'v>(
        &self,
        value: &'v Value,
    ) -> Result<(Option<&'v Value>, Option<Cow<'v, Value>>), PointerError> {
        let Some((last, front)) = self.parts.split_last() else {
            return Ok((None, Some(Cow::Borrowed(value))));
        };
        let mut parent = value;
        for part in front {
            match get_part(parent, part)? {
                Cow::Borrowed(v) => parent = v,
                Cow::Owned(_) => {
                    return Err(PointerError::Type {
                        part: part.to_string(),
                        target: "scalar",
                    })
                }
            }
        }
        match get_part(parent, last) {
            Ok(v) => Ok((Some(parent), Some(v))),
            Err(PointerError::Key(_)) | Err(PointerError::Index(_)) => Ok((Some(parent), None)),
            Err(e) => Err(e),
        }
    }

    /// Return `true` if this pointer can be resolved against the document
    ///
    /// Note that [`resolve`][JsonPointer::resolve] can return legitimate falsy values;
    /// this returns `true` for those too.
    pub fn exists(&self, value: &Value) -> bool {
        self.resolve(value).is_ok()
    }

    /// This pointer's parent, as a new pointer
    ///
    /// The parent of the root pointer is the root pointer itself.
    pub fn parent(&self) -> JsonPointer {
        let mut parts = self.parts.clone();
        parts.pop();
        Self::from_part_list(parts)
    }

    /// Join this pointer with additional, possibly relative, pointer strings
    ///
    /// Each part is a JSON Pointer string, possibly without a leading slash. A part with
    /// a leading slash replaces the pointer built so far.
    pub fn join(&self, parts: &[&str]) -> Result<JsonPointer, PointerError> {
        let mut pointer = self.clone();
        for part in parts {
            let other = decode_unicode_escape(part.trim_start())?;
            if other.starts_with('/') {
                pointer = JsonPointer::parse_with_options(
                    &other,
                    PointerOptions {
                        unicode_escape: false,
                        uri_decode: false,
                    },
                )?;
            } else {
                let mut new_parts = pointer.parts.clone();
                for p in other.split('/') {
                    new_parts.push(classify_part(&p.replace("~1", "/").replace("~0", "~"))?);
                }
                pointer = JsonPointer::from_part_list(new_parts);
            }
        }
        Ok(pointer)
    }

    /// Apply a Relative JSON Pointer string to this pointer
    pub fn to(&self, rel: &str) -> Result<JsonPointer, PointerError> {
        RelativeJsonPointer::parse(rel)?.to(self)
    }

    /// Return `true` if this pointer addresses a descendant of `other`
    pub fn is_relative_to(&self, other: &JsonPointer) -> bool {
        other.parts.len() < self.parts.len()
            && self.parts[..other.parts.len()] == other.parts[..]
    }
}

fn encode(parts: &[PointerPart]) -> String {
    if parts.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for part in parts {
        out.push('/');
        out.push_str(&part.escaped());
    }
    out
}

/// Classify an unescaped pointer token as an index or a key
///
/// Integer-looking tokens become indices, except those with leading zeros, which remain
/// keys, per RFC 6901. Indices outside the interoperable range are an error.
fn classify_part(s: &str) -> Result<PointerPart, PointerError> {
    if (s.len() > 1 && s.starts_with('0')) || s.starts_with('+') {
        return Ok(PointerPart::Name(s.to_owned()));
    }
    match s.parse::<i64>() {
        Ok(index) => {
            if !(MIN_INT_INDEX..=MAX_INT_INDEX).contains(&index) {
                return Err(PointerError::Index(format!(
                    "{index} is outside the interoperable range"
                )));
            }
            Ok(PointerPart::Index(index))
        }
        Err(_) => Ok(PointerPart::Name(s.to_owned())),
    }
}

/// Apply one pointer part to a value
fn get_part<'v>(value: &'v Value, part: &PointerPart) -> Result<Cow<'v, Value>, PointerError> {
    match value {
        Value::Object(obj) => match part {
            PointerPart::Name(name) => {
                if let Some(v) = obj.get(name) {
                    return Ok(Cow::Borrowed(v));
                }
                // Non-standard: a `~name` or `#name` part resolves to the key itself,
                // so that pointers built from keys-selector nodes round trip.
                if let Some(stripped) = name
                    .strip_prefix('~')
                    .or_else(|| name.strip_prefix('#'))
                {
                    if obj.contains_key(stripped) {
                        return Ok(Cow::Owned(Value::String(stripped.to_owned())));
                    }
                }
                Err(PointerError::Key(name.clone()))
            }
            PointerPart::Index(index) => obj
                .get(&index.to_string())
                .map(Cow::Borrowed)
                .ok_or_else(|| PointerError::Key(index.to_string())),
        },
        Value::Array(list) => match part {
            PointerPart::Index(index) => {
                let idx = if *index < 0 {
                    list.len() as i64 + index
                } else {
                    *index
                };
                usize::try_from(idx)
                    .ok()
                    .and_then(|i| list.get(i))
                    .map(Cow::Borrowed)
                    .ok_or_else(|| PointerError::Index(index.to_string()))
            }
            PointerPart::Name(name) => {
                if name == "-" {
                    // "-" is a valid index when appending with JSON Patch, but not
                    // when resolving a pointer
                    return Err(PointerError::Index(String::from("'-'")));
                }
                if let Some(idx) = name
                    .strip_prefix('#')
                    .and_then(|s| s.parse::<usize>().ok())
                {
                    return if idx < list.len() {
                        Ok(Cow::Owned(Value::from(idx)))
                    } else {
                        Err(PointerError::Index(idx.to_string()))
                    };
                }
                Err(PointerError::Type {
                    part: name.clone(),
                    target: "sequence",
                })
            }
        },
        _ => Err(PointerError::Type {
            part: part.to_string(),
            target: "scalar",
        }),
    }
}

/// Decode UTF-16 escape sequences, possibly surrogate pairs, inside a pointer string
fn decode_unicode_escape(s: &str) -> Result<String, PointerError> {
    let s = s.replace("\\/", "/");
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'u') {
            chars.next();
            let first = read_hex4(&mut chars)?;
            match first {
                0xD800..=0xDBFF => {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(PointerError::Syntax(String::from(
                            "unpaired high surrogate",
                        )));
                    }
                    let second = read_hex4(&mut chars)?;
                    if !(0xDC00..=0xDFFF).contains(&second) {
                        return Err(PointerError::Syntax(String::from(
                            "unpaired high surrogate",
                        )));
                    }
                    let code =
                        0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                    out.push(char::from_u32(code).ok_or_else(|| {
                        PointerError::Syntax(String::from("invalid surrogate pair"))
                    })?);
                }
                0xDC00..=0xDFFF => {
                    return Err(PointerError::Syntax(String::from(
                        "unpaired low surrogate",
                    )))
                }
                code => out.push(char::from_u32(code).ok_or_else(|| {
                    PointerError::Syntax(String::from("invalid escape sequence"))
                })?),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn read_hex4(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<u32, PointerError> {
    let mut code = 0u32;
    for _ in 0..4 {
        let c = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| PointerError::Syntax(String::from("invalid escape sequence")))?;
        code = code * 16 + c;
    }
    Ok(code)
}

impl Display for JsonPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.repr)
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPointer::parse(s)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct JsonPointerVisitor;

        impl<'de> Visitor<'de> for JsonPointerVisitor {
            type Value = JsonPointer;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a string representing a JSON Pointer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                JsonPointer::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(JsonPointerVisitor)
    }
}

/// The tail of a Relative JSON Pointer: either a pointer to follow, or `#` to reference
/// the name or index of the addressed location
#[derive(Debug, Clone, PartialEq, Eq)]
enum RelativeTail {
    Pointer(JsonPointer),
    Key,
}

static RE_RELATIVE_POINTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?P<origin>\d+)(?:(?P<sign>[+-])(?P<index>\d+))?(?P<pointer>.*)$")
        .expect("valid relative pointer pattern")
});

/// A Relative JSON Pointer
///
/// See the [Relative JSON Pointer draft][rel]. Apply one to a [`JsonPointer`] with
/// [`RelativeJsonPointer::to`] or [`JsonPointer::to`].
///
/// [rel]: https://www.ietf.org/id/draft-hha-relative-json-pointer-00.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeJsonPointer {
    origin: u64,
    index: i64,
    pointer: RelativeTail,
}

impl RelativeJsonPointer {
    /// Parse a relative pointer from its string form
    pub fn parse(rel: &str) -> Result<Self, PointerError> {
        let rel = rel.trim_start();
        let captures = RE_RELATIVE_POINTER
            .captures(rel)
            .ok_or_else(|| PointerError::Syntax(format!("invalid relative pointer {rel:?}")))?;
        let origin = zero_or_positive(&captures["origin"])?;
        let index = match captures.name("index") {
            Some(m) => {
                let index = zero_or_positive(m.as_str())? as i64;
                if index == 0 {
                    return Err(PointerError::Syntax(String::from(
                        "index offset can't be zero",
                    )));
                }
                if &captures["sign"] == "-" {
                    -index
                } else {
                    index
                }
            }
            None => 0,
        };
        let tail = captures["pointer"].trim();
        let pointer = if tail == "#" {
            RelativeTail::Key
        } else {
            RelativeTail::Pointer(JsonPointer::parse(tail)?)
        };
        Ok(Self {
            origin,
            index,
            pointer,
        })
    }

    /// Return a new pointer: `pointer` adjusted by this relative pointer
    pub fn to(&self, pointer: &JsonPointer) -> Result<JsonPointer, PointerError> {
        if self.origin as usize > pointer.parts.len() {
            return Err(PointerError::Index(format!(
                "origin ({}) exceeds root ({})",
                self.origin,
                pointer.parts.len()
            )));
        }
        let mut parts: Vec<PointerPart> = pointer.parts
            [..pointer.parts.len() - self.origin as usize]
            .to_vec();
        if self.index != 0 {
            if let Some(PointerPart::Index(i)) = parts.last() {
                let new_index = i + self.index;
                if new_index < 0 {
                    return Err(PointerError::Index(format!(
                        "index offset out of range: {new_index}"
                    )));
                }
                let last = parts.len() - 1;
                parts[last] = PointerPart::Index(new_index);
            }
        }
        match &self.pointer {
            RelativeTail::Pointer(p) => parts.extend(p.parts.iter().cloned()),
            RelativeTail::Key => match parts.pop() {
                Some(part) => parts.push(PointerPart::Name(format!("#{part}"))),
                None => {
                    return Err(PointerError::Syntax(String::from(
                        "no part to reference with '#'",
                    )))
                }
            },
        }
        Ok(JsonPointer::from_part_list(parts))
    }
}

fn zero_or_positive(s: &str) -> Result<u64, PointerError> {
    if s.len() > 1 && s.starts_with('0') {
        return Err(PointerError::Syntax(String::from("unexpected leading zero")));
    }
    s.parse::<u64>()
        .map_err(|_| PointerError::Syntax(String::from("expected positive int or zero")))
}

impl Display for RelativeJsonPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.origin)?;
        if self.index != 0 {
            write!(f, "{:+}", self.index)?;
        }
        match &self.pointer {
            RelativeTail::Pointer(p) => write!(f, "{p}"),
            RelativeTail::Key => write!(f, "#"),
        }
    }
}

/// Resolve a JSON Pointer string against a document
pub(crate) fn resolve<'v>(pointer: &str, value: &'v Value) -> Result<Cow<'v, Value>, PointerError> {
    JsonPointer::parse(pointer)?.resolve(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{JsonPointer, PointerError, PointerPart, RelativeJsonPointer};

    #[test]
    fn rfc_6901_examples() {
        let value = json!({
            "foo": ["bar", "baz"],
            "": 0,
            "a/b": 1,
            "c%d": 2,
            "e^f": 3,
            "g|h": 4,
            "i\\j": 5,
            "k\"l": 6,
            " ": 7,
            "m~n": 8
        });
        let cases = [
            ("", value.clone()),
            ("/foo", json!(["bar", "baz"])),
            ("/foo/0", json!("bar")),
            ("/", json!(0)),
            ("/a~1b", json!(1)),
            ("/c%25d", json!(2)),
            ("/e^f", json!(3)),
            ("/g|h", json!(4)),
            ("/i\\j", json!(5)),
            ("/k\"l", json!(6)),
            ("/ ", json!(7)),
            ("/m~0n", json!(8)),
        ];
        for (s, expect) in cases {
            let pointer = if s == "/c%25d" {
                JsonPointer::parse_with_options(
                    s,
                    super::PointerOptions {
                        unicode_escape: false,
                        uri_decode: true,
                    },
                )
                .unwrap()
            } else {
                JsonPointer::parse(s).unwrap()
            };
            assert_eq!(pointer.resolve(&value).unwrap().as_ref(), &expect, "{s}");
        }
    }

    #[test]
    fn parse_and_encode_round_trip() {
        for s in ["", "/foo", "/foo/0", "/a~1b/~0k", "/-"] {
            assert_eq!(JsonPointer::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn relative_pointers() {
        let base = JsonPointer::parse("/foo/1").unwrap();
        assert_eq!(base.to("0").unwrap().to_string(), "/foo/1");
        assert_eq!(base.to("1/0").unwrap().to_string(), "/foo/0");
        assert_eq!(base.to("2/highly/nested/objects").unwrap().to_string(), "/highly/nested/objects");
        assert_eq!(base.to("0#").unwrap().to_string(), "/foo/#1");
        assert_eq!(base.to("0-1").unwrap().to_string(), "/foo/0");
        assert_eq!(base.to("0+1").unwrap().to_string(), "/foo/2");
    }

    #[test]
    fn relative_pointer_errors() {
        assert!(RelativeJsonPointer::parse("01/a").is_err());
        assert!(RelativeJsonPointer::parse("1+0").is_err());
        let base = JsonPointer::parse("/foo").unwrap();
        assert!(matches!(base.to("2/a"), Err(PointerError::Index(_))));
    }

    #[test]
    fn name_of_parts_resolve_to_keys() {
        let value = json!({"foo": {"bar": 1}});
        let pointer = JsonPointer::from_parts(["foo", "~bar"]);
        assert_eq!(pointer.resolve(&value).unwrap().as_ref(), &json!("bar"));
        let pointer = JsonPointer::parse("/foo/#bar").unwrap();
        assert_eq!(pointer.resolve(&value).unwrap().as_ref(), &json!("bar"));
    }

    #[test]
    fn numeric_string_keys() {
        let value = json!({"m": {"0": "zero"}});
        let pointer = JsonPointer::parse("/m/0").unwrap();
        assert_eq!(pointer.resolve(&value).unwrap().as_ref(), &json!("zero"));
    }

    #[test]
    fn negative_indices() {
        let value = json!([1, 2, 3]);
        assert_eq!(
            JsonPointer::parse("/-1").unwrap().resolve(&value).unwrap().as_ref(),
            &json!(3)
        );
    }

    #[test]
    fn resolve_parent() {
        let value = json!({"foo": {"bar": 1}});
        let pointer = JsonPointer::parse("/foo/bar").unwrap();
        let (parent, child) = pointer.resolve_parent(&value).unwrap();
        assert_eq!(parent.unwrap(), &json!({"bar": 1}));
        assert_eq!(child.unwrap().as_ref(), &json!(1));
        let pointer = JsonPointer::parse("/foo/baz").unwrap();
        let (parent, child) = pointer.resolve_parent(&value).unwrap();
        assert!(parent.is_some());
        assert!(child.is_none());
    }

    #[test]
    fn join_and_parent() {
        let pointer = JsonPointer::parse("/foo").unwrap();
        assert_eq!(pointer.join(&["bar", "0"]).unwrap().to_string(), "/foo/bar/0");
        assert_eq!(pointer.join(&["/other"]).unwrap().to_string(), "/other");
        assert_eq!(
            JsonPointer::parse("/foo/bar").unwrap().parent().to_string(),
            "/foo"
        );
        assert!(JsonPointer::default().parent().parts().is_empty());
    }

    #[test]
    fn is_relative_to() {
        let parent = JsonPointer::parse("/foo").unwrap();
        let child = JsonPointer::parse("/foo/bar").unwrap();
        assert!(child.is_relative_to(&parent));
        assert!(!parent.is_relative_to(&child));
        assert!(!parent.is_relative_to(&parent));
    }

    #[test]
    fn leading_zeros_stay_keys() {
        let pointer = JsonPointer::parse("/01").unwrap();
        assert_eq!(pointer.parts()[0], PointerPart::Name(String::from("01")));
    }

    #[test]
    fn unicode_escapes() {
        let value = json!({"☺": 1});
        let pointer = JsonPointer::parse("/\\u263A").unwrap();
        assert_eq!(pointer.resolve(&value).unwrap().as_ref(), &json!(1));
    }
}
