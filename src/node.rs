//! Types representing the nodes produced by JSONPath queries
use std::borrow::Cow;
use std::slice::Iter;

use serde::Serialize;
use serde_json::Value;

use crate::pointer::JsonPointer;
use crate::spec::path::{NormalizedPath, PathElement};

/// A node produced by a JSONPath query: a value paired with its location in the queried
/// document
///
/// For all standard selectors the value is a borrowed reference into the original
/// [`serde_json::Value`]. Nodes produced by the non-standard keys selector (`~`) carry the
/// key string as an owned value, since object keys are not themselves `Value`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub(crate) value: Cow<'a, Value>,
    pub(crate) location: NormalizedPath<'a>,
    pub(crate) root: &'a Value,
}

impl<'a> Node<'a> {
    pub(crate) fn new_root(value: &'a Value, root: &'a Value) -> Self {
        Self {
            value: Cow::Borrowed(value),
            location: NormalizedPath::default(),
            root,
        }
    }

    pub(crate) fn child(&self, value: &'a Value, elem: PathElement<'a>) -> Self {
        Self {
            value: Cow::Borrowed(value),
            location: self.location.clone_and_push(elem),
            root: self.root,
        }
    }

    pub(crate) fn key_child(&self, key: &'a str) -> Self {
        Self {
            value: Cow::Owned(Value::String(key.to_owned())),
            location: self.location.clone_and_push(PathElement::Key(key)),
            root: self.root,
        }
    }

    /// The matched value when it is a borrowed reference into the queried document
    ///
    /// `None` only for keys-selector nodes, whose value is the key string itself.
    pub(crate) fn as_borrowed(&self) -> Option<&'a Value> {
        match &self.value {
            Cow::Borrowed(v) => Some(v),
            Cow::Owned(_) => None,
        }
    }

    /// Get the matched value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Take ownership of the matched value, cloning if it is borrowed
    pub fn into_value(self) -> Value {
        self.value.into_owned()
    }

    /// Get the location of the node within the queried document
    pub fn location(&self) -> &NormalizedPath<'a> {
        &self.location
    }

    /// Take the location of the node within the queried document
    pub fn to_location(self) -> NormalizedPath<'a> {
        self.location
    }

    /// The canonical string form of the node's location, e.g. `$['store']['book'][0]`
    pub fn path(&self) -> String {
        self.location.to_string()
    }

    /// A reference to the root of the queried document
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// A [`JsonPointer`] addressing this node within the queried document
    pub fn pointer(&self) -> JsonPointer {
        JsonPointer::from_node(self)
    }
}

impl<'a> Serialize for Node<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

/// A list of nodes resulting from a JSONPath query
///
/// The list preserves the order in which nodes were produced by the query.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct NodeList<'a>(pub(crate) Vec<Node<'a>>);

impl<'a> NodeList<'a> {
    /// References to all matched values, in query order
    pub fn all(&self) -> Vec<&Value> {
        self.0.iter().map(Node::value).collect()
    }

    /// Owned clones of all matched values, in query order
    pub fn values(&self) -> Vec<Value> {
        self.0.iter().map(|n| n.value().clone()).collect()
    }

    /// The single matched value if there is exactly one match, otherwise an array of the
    /// matched values
    pub fn values_or_singular(&self) -> Value {
        if self.0.len() == 1 {
            self.0[0].value().clone()
        } else {
            Value::Array(self.values())
        }
    }

    /// The canonical location strings of all matched nodes, in query order
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(Node::path).collect()
    }

    /// The locations of all matched nodes, in query order
    pub fn locations(&self) -> impl Iterator<Item = &NormalizedPath<'a>> {
        self.0.iter().map(Node::location)
    }

    /// Extract _at most_ one node from a [`NodeList`]
    ///
    /// This is intended for queries that are expected to optionally yield a single node.
    pub fn at_most_one(&self) -> Result<Option<&Node<'a>>, AtMostOneError> {
        if self.0.len() > 1 {
            Err(AtMostOneError(self.0.len()))
        } else {
            Ok(self.0.first())
        }
    }

    /// Extract _exactly_ one node from a [`NodeList`]
    ///
    /// This is intended for queries that are expected to yield exactly one node.
    pub fn exactly_one(&self) -> Result<&Node<'a>, ExactlyOneError> {
        if self.0.is_empty() {
            Err(ExactlyOneError::Empty)
        } else if self.0.len() > 1 {
            Err(ExactlyOneError::MoreThanOne(self.0.len()))
        } else {
            Ok(&self.0[0])
        }
    }

    /// Get the length of a [`NodeList`]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if a [`NodeList`] is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over a [`NodeList`]
    ///
    /// Note that [`NodeList`] also implements [`IntoIterator`].
    pub fn iter(&self) -> Iter<'_, Node<'a>> {
        self.0.iter()
    }

    /// Returns the first node in the [`NodeList`], or `None` if it is empty
    pub fn first(&self) -> Option<&Node<'a>> {
        self.0.first()
    }

    /// Returns the last node in the [`NodeList`], or `None` if it is empty
    pub fn last(&self) -> Option<&Node<'a>> {
        self.0.last()
    }

    /// Returns the node at the given index in the [`NodeList`], or `None` if the given
    /// index is out of bounds
    pub fn get(&self, index: usize) -> Option<&Node<'a>> {
        self.0.get(index)
    }

    /// Convert the list into an asynchronous [`Stream`][futures::Stream] of nodes
    ///
    /// Dropping the stream abandons the remaining nodes, which is the host's cancellation
    /// point. The stream yields nodes in query order.
    #[cfg(feature = "stream")]
    pub fn into_stream(self) -> impl futures::Stream<Item = Node<'a>> {
        futures::stream::iter(self.0)
    }
}

/// Error produced when expecting no more than one node from a query
#[derive(Debug, thiserror::Error)]
#[error("nodelist expected to contain at most one entry, but instead contains {0} entries")]
pub struct AtMostOneError(pub usize);

/// Error produced when expecting exactly one node from a query
#[derive(Debug, thiserror::Error)]
pub enum ExactlyOneError {
    /// The query resulted in an empty [`NodeList`]
    #[error("nodelist expected to contain one entry, but is empty")]
    Empty,
    /// The query resulted in a [`NodeList`] containing more than one node
    #[error("nodelist expected to contain one entry, but instead contains {0} entries")]
    MoreThanOne(usize),
}

impl ExactlyOneError {
    /// Check that it is the `Empty` variant
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Extract the number of nodes, if it was more than one, or `None` otherwise
    pub fn as_more_than_one(&self) -> Option<usize> {
        match self {
            ExactlyOneError::Empty => None,
            ExactlyOneError::MoreThanOne(u) => Some(*u),
        }
    }
}

impl<'a> From<Vec<Node<'a>>> for NodeList<'a> {
    fn from(nodes: Vec<Node<'a>>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = Node<'a>;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b NodeList<'a> {
    type Item = &'b Node<'a>;

    type IntoIter = Iter<'b, Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
