//! Types for representing [Normalized Paths][norm-paths] from the JSONPath specification
//!
//! [norm-paths]: https://www.rfc-editor.org/rfc/rfc9535.html#name-normalized-paths
use std::{fmt::Display, slice::Iter};

use serde::Serialize;

/// The location of a node within a JSON document, as a sequence of object names and array
/// indices
///
/// The `Display` implementation produces the canonical string form, e.g. `$['foo'][0]`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct NormalizedPath<'a>(Vec<PathElement<'a>>);

impl<'a> NormalizedPath<'a> {
    pub(crate) fn push<T: Into<PathElement<'a>>>(&mut self, elem: T) {
        self.0.push(elem.into())
    }

    pub(crate) fn clone_and_push<T: Into<PathElement<'a>>>(&self, elem: T) -> Self {
        let mut new_path = self.clone();
        new_path.push(elem.into());
        new_path
    }

    /// Get the [`NormalizedPath`] as a [JSON Pointer][json-pointer] string
    ///
    /// This can be used with the [`serde_json::Value::pointer`] or
    /// [`serde_json::Value::pointer_mut`] methods.
    ///
    /// [json-pointer]: https://datatracker.ietf.org/doc/html/rfc6901
    pub fn as_json_pointer(&self) -> String {
        self.0
            .iter()
            .map(PathElement::as_json_pointer)
            .fold(String::new(), |mut acc, s| {
                acc.push('/');
                acc.push_str(&s);
                acc
            })
    }

    /// Check if the [`NormalizedPath`] is empty
    ///
    /// An empty normalized path represents the location of the root node, i.e., `$`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the length of the [`NormalizedPath`]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get an iterator over the [`PathElement`]s of the [`NormalizedPath`]
    pub fn iter(&self) -> Iter<'_, PathElement<'a>> {
        self.0.iter()
    }

    /// Get the [`PathElement`] at `index`, or `None` if the index is out of bounds
    pub fn get(&self, index: usize) -> Option<&PathElement<'a>> {
        self.0.get(index)
    }

    /// Get the first [`PathElement`], or `None` if the path is empty
    pub fn first(&self) -> Option<&PathElement<'a>> {
        self.0.first()
    }

    /// Get the last [`PathElement`], or `None` if the path is empty
    pub fn last(&self) -> Option<&PathElement<'a>> {
        self.0.last()
    }

    /// The location of the parent node, i.e., this path with its last element removed
    ///
    /// The parent of the root location is the root location itself.
    pub fn parent(&self) -> NormalizedPath<'a> {
        let mut parent = self.clone();
        parent.0.pop();
        parent
    }
}

impl<'a> IntoIterator for NormalizedPath<'a> {
    type Item = PathElement<'a>;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> Display for NormalizedPath<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for elem in &self.0 {
            match elem {
                PathElement::Name(name) => write!(f, "['{}']", escape_name(name))?,
                PathElement::Index(index) => write!(f, "[{index}]")?,
                PathElement::Key(name) => write!(f, "[~'{}']", escape_name(name))?,
            }
        }
        Ok(())
    }
}

impl<'a> Serialize for NormalizedPath<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Escape a name for use in a single-quoted name selector
///
/// Follows the normal-path escaping rules: `'` and `\` are escaped, the RFC-named control
/// characters use their short escapes, all other control characters use `\u00XX`, and
/// everything else is preserved as-is.
fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if ('\u{0000}'..='\u{001F}').contains(&c) => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// An element within a [`NormalizedPath`]
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum PathElement<'a> {
    /// A key within a JSON object
    Name(&'a str),
    /// An index of a JSON array
    Index(usize),
    /// A key within a JSON object, selected by the non-standard keys selector (`~`)
    ///
    /// Distinguished from [`Name`][PathElement::Name] because the node it locates is the key
    /// string itself rather than the member value.
    Key(&'a str),
}

impl<'a> PathElement<'a> {
    fn as_json_pointer(&self) -> String {
        match self {
            PathElement::Name(s) => s.replace('~', "~0").replace('/', "~1"),
            PathElement::Index(i) => i.to_string(),
            PathElement::Key(s) => format!("~0{}", s.replace('~', "~0").replace('/', "~1")),
        }
    }

    /// Get the element as a name, if it is one
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PathElement::Name(s) | PathElement::Key(s) => Some(s),
            PathElement::Index(_) => None,
        }
    }

    /// Get the element as an index, if it is one
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathElement::Index(i) => Some(*i),
            _ => None,
        }
    }
}

impl<'a> PartialEq<str> for PathElement<'a> {
    fn eq(&self, other: &str) -> bool {
        match self {
            PathElement::Name(s) | PathElement::Key(s) => (*s).eq(other),
            PathElement::Index(_) => false,
        }
    }
}

impl<'a> PartialEq<&str> for PathElement<'a> {
    fn eq(&self, other: &&str) -> bool {
        match self {
            PathElement::Name(s) | PathElement::Key(s) => s.eq(other),
            PathElement::Index(_) => false,
        }
    }
}

impl<'a> PartialEq<usize> for PathElement<'a> {
    fn eq(&self, other: &usize) -> bool {
        match self {
            PathElement::Index(i) => i.eq(other),
            _ => false,
        }
    }
}

impl<'a> Display for PathElement<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathElement::Name(n) => write!(f, "{n}"),
            PathElement::Index(i) => write!(f, "{i}"),
            PathElement::Key(n) => write!(f, "~{n}"),
        }
    }
}

impl<'a> From<&'a String> for PathElement<'a> {
    fn from(s: &'a String) -> Self {
        Self::Name(s.as_str())
    }
}

impl<'a> From<&'a str> for PathElement<'a> {
    fn from(s: &'a str) -> Self {
        Self::Name(s)
    }
}

impl<'a> From<usize> for PathElement<'a> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a> Serialize for PathElement<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            PathElement::Name(s) => serializer.serialize_str(s),
            PathElement::Index(i) => serializer.serialize_u64(*i as u64),
            PathElement::Key(s) => serializer.serialize_str(&format!("~{s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NormalizedPath, PathElement};

    #[test]
    fn normalized_path_to_json_pointer() {
        let np = NormalizedPath(vec![
            PathElement::Name("foo"),
            PathElement::Index(42),
            PathElement::Name("bar"),
        ]);
        assert_eq!(np.as_json_pointer(), "/foo/42/bar");
    }

    #[test]
    fn normalized_path_to_json_pointer_with_escapes() {
        let np = NormalizedPath(vec![
            PathElement::Name("foo~bar"),
            PathElement::Index(42),
            PathElement::Name("baz/bop"),
        ]);
        assert_eq!(np.as_json_pointer(), "/foo~0bar/42/baz~1bop");
    }

    #[test]
    fn canonical_string_form() {
        let np = NormalizedPath(vec![
            PathElement::Name("foo"),
            PathElement::Index(0),
            PathElement::Name("it's"),
        ]);
        assert_eq!(np.to_string(), r"$['foo'][0]['it\'s']");
    }

    #[test]
    fn control_characters_are_escaped() {
        let np = NormalizedPath(vec![PathElement::Name("a\nb\u{0001}c")]);
        assert_eq!(np.to_string(), "$['a\\nb\\u0001c']");
    }

    #[test]
    fn parent_of_root_is_root() {
        let np = NormalizedPath::default();
        assert!(np.parent().is_empty());
    }
}
