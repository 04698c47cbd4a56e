//! A fluent API for working with query results
use serde_json::Value;

use crate::env::Environment;
use crate::error::Error;
use crate::node::{Node, NodeList};
use crate::pointer::JsonPointer;
use crate::spec::path::PathElement;

/// Projection style used by [`Query::select`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// The default projection: selections keep the arrays and objects between each
    /// matched node and the values selected relative to it
    #[default]
    Relative,
    /// Selections keep the arrays and objects all the way up to the root of the queried
    /// document
    Root,
    /// All selected values are appended to a flat array, without surrounding structure
    Flat,
}

/// A fluent adapter over the nodes produced by a query
///
/// Create one with [`Environment::query`][crate::Environment::query] or the crate-level
/// [`query`][crate::query] function, then refine and consume it:
///
/// ```rust
/// use serde_json::json;
///
/// # fn main() -> Result<(), serde_json_query::Error> {
/// let value = json!({"some": {"thing": [1, 2, 3, 4]}});
/// let values = serde_json_query::query("$.some.thing[*]", &value)?
///     .skip(1)
///     .limit(2)
///     .values();
/// assert_eq!(values, vec![json!(2), json!(3)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Query<'a> {
    nodes: Vec<Node<'a>>,
    env: Environment,
}

impl<'a> Query<'a> {
    pub(crate) fn new(nodes: NodeList<'a>, env: Environment) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            env,
        }
    }

    /// Limit the query to at most `n` matches
    pub fn limit(mut self, n: usize) -> Self {
        self.nodes.truncate(n);
        self
    }

    /// Limit the query to at most the first `n` matches
    ///
    /// `head` is an alias for [`limit`][Query::limit].
    pub fn head(self, n: usize) -> Self {
        self.limit(n)
    }

    /// Skip up to the first `n` matches
    pub fn skip(mut self, n: usize) -> Self {
        if n >= self.nodes.len() {
            self.nodes.clear();
        } else {
            self.nodes.drain(..n);
        }
        self
    }

    /// Keep only the last `n` matches
    pub fn tail(mut self, n: usize) -> Self {
        let len = self.nodes.len();
        if n < len {
            self.nodes.drain(..len - n);
        }
        self
    }

    /// Split off the next `n` matches into a new query, leaving the rest
    ///
    /// It is safe to continue using this query after calling `take`.
    pub fn take(&mut self, n: usize) -> Query<'a> {
        let rest = self.nodes.split_off(n.min(self.nodes.len()));
        let taken = std::mem::replace(&mut self.nodes, rest);
        Query {
            nodes: taken,
            env: self.env.clone(),
        }
    }

    /// Return `n` independent copies of this query
    pub fn tee(self, n: usize) -> Vec<Query<'a>> {
        (0..n)
            .map(|_| Query {
                nodes: self.nodes.clone(),
                env: self.env.clone(),
            })
            .collect()
    }

    /// The number of matches
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no matches
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The matched values, cloned out of the queried document
    pub fn values(self) -> Vec<Value> {
        self.nodes.iter().map(|n| n.value().clone()).collect()
    }

    /// The canonical location of each match
    pub fn locations(self) -> Vec<String> {
        self.nodes.iter().map(Node::path).collect()
    }

    /// `(location, value)` pairs, one for each match
    pub fn items(self) -> Vec<(String, Value)> {
        self.nodes
            .iter()
            .map(|n| (n.path(), n.value().clone()))
            .collect()
    }

    /// A [`JsonPointer`] for each match
    pub fn pointers(self) -> Vec<JsonPointer> {
        self.nodes.iter().map(Node::pointer).collect()
    }

    /// The first match, or `None` if there were no matches
    pub fn first_one(self) -> Option<Node<'a>> {
        self.nodes.into_iter().next()
    }

    /// The first match, or `None` if there were no matches
    ///
    /// `one` is an alias for [`first_one`][Query::first_one].
    pub fn one(self) -> Option<Node<'a>> {
        self.first_one()
    }

    /// The last match, or `None` if there were no matches
    pub fn last_one(mut self) -> Option<Node<'a>> {
        self.nodes.pop()
    }

    /// Project new values out of each match using relative JSONPath expressions
    ///
    /// For each match, the given expressions are evaluated relative to the matched value
    /// and the selections are combined into one value per match, shaped according to
    /// `projection`. Matches that are not arrays or objects, and matches with no
    /// selections, are dropped.
    pub fn select(self, expressions: &[&str], projection: Projection) -> Result<Vec<Value>, Error> {
        let mut compiled = Vec::with_capacity(expressions.len());
        for expr in expressions {
            compiled.push(self.env.compile(expr)?);
        }
        let mut out = Vec::new();
        for node in &self.nodes {
            let value = node.value();
            if !(value.is_object() || value.is_array()) {
                continue;
            }
            let projected = match projection {
                Projection::Flat => {
                    let mut arr = Vec::new();
                    for path in &compiled {
                        for m in path.query(value)? {
                            arr.push(m.into_value());
                        }
                    }
                    Value::Array(arr)
                }
                Projection::Relative => {
                    let mut sparse = SparseNode::default();
                    for path in &compiled {
                        for m in path.query(value)? {
                            sparse.insert(&owned_elements(m.location().iter()), m.value().clone());
                        }
                    }
                    sparse.render()
                }
                Projection::Root => {
                    let prefix = owned_elements(node.location().iter());
                    let mut sparse = SparseNode::default();
                    for path in &compiled {
                        for m in path.query(value)? {
                            let mut parts = prefix.clone();
                            parts.extend(owned_elements(m.location().iter()));
                            sparse.insert(&parts, m.value().clone());
                        }
                    }
                    sparse.render()
                }
            };
            match &projected {
                Value::Object(o) if o.is_empty() => continue,
                Value::Array(a) if a.is_empty() => continue,
                _ => out.push(projected),
            }
        }
        Ok(out)
    }
}

impl<'a> IntoIterator for Query<'a> {
    type Item = Node<'a>;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum OwnedElement {
    Name(String),
    Index(usize),
}

fn owned_elements<'e, 'a: 'e>(
    elements: impl Iterator<Item = &'e PathElement<'a>>,
) -> Vec<OwnedElement> {
    elements
        .map(|elem| match elem {
            PathElement::Name(s) | PathElement::Key(s) => OwnedElement::Name((*s).to_owned()),
            PathElement::Index(i) => OwnedElement::Index(*i),
        })
        .collect()
}

/// A partially built projection
///
/// Array selections are held as sparse index-keyed entries so that selections can land at
/// arbitrary indices without tracking offsets; rendering compacts them in insertion order.
#[derive(Debug, Default)]
struct SparseNode {
    entries: Vec<(OwnedElement, SparseValue)>,
}

#[derive(Debug)]
enum SparseValue {
    Leaf(Value),
    Tree(SparseNode),
}

impl SparseNode {
    fn insert(&mut self, parts: &[OwnedElement], value: Value) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };
        let position = self.entries.iter().position(|(k, _)| k == first);
        if rest.is_empty() {
            match position {
                Some(i) => self.entries[i].1 = SparseValue::Leaf(value),
                None => self.entries.push((first.clone(), SparseValue::Leaf(value))),
            }
            return;
        }
        let index = match position {
            Some(i) => {
                if !matches!(self.entries[i].1, SparseValue::Tree(_)) {
                    self.entries[i].1 = SparseValue::Tree(SparseNode::default());
                }
                i
            }
            None => {
                self.entries
                    .push((first.clone(), SparseValue::Tree(SparseNode::default())));
                self.entries.len() - 1
            }
        };
        if let SparseValue::Tree(tree) = &mut self.entries[index].1 {
            tree.insert(rest, value);
        }
    }

    fn render(self) -> Value {
        let as_array = matches!(self.entries.first(), Some((OwnedElement::Index(_), _)));
        if as_array {
            Value::Array(
                self.entries
                    .into_iter()
                    .map(|(_, v)| v.render())
                    .collect(),
            )
        } else {
            let mut map = serde_json::Map::new();
            for (key, value) in self.entries {
                let key = match key {
                    OwnedElement::Name(s) => s,
                    OwnedElement::Index(i) => i.to_string(),
                };
                map.insert(key, value.render());
            }
            Value::Object(map)
        }
    }
}

impl SparseValue {
    fn render(self) -> Value {
        match self {
            SparseValue::Leaf(value) => value,
            SparseValue::Tree(tree) => tree.render(),
        }
    }
}
