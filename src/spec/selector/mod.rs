//! Types representing the different selectors in JSONPath
pub mod filter;
pub mod index;
pub mod name;
pub mod slice;

use serde_json::Value;

use crate::error::QueryError;
use crate::node::Node;
use crate::spec::path::PathElement;
use crate::spec::query::{EvalContext, Queryable};

use self::{
    filter::{Filter, SingularQuery},
    index::Index,
    name::Name,
    slice::Slice,
};

/// A JSONPath selector
#[derive(Debug, PartialEq, Clone)]
pub enum Selector {
    /// Select an object key
    Name(Name),
    /// Select all nodes
    ///
    /// For an object, this produces a nodelist of all member values; for an array, this
    /// produces a nodelist of all array elements.
    Wildcard,
    /// Select an array element
    Index(Index),
    /// Select a slice from an array
    ArraySlice(Slice),
    /// Use a filter to select nodes
    Filter(Filter),
    /// Select an object's keys (non-standard, `~`)
    ///
    /// Produces one node per key; the node value is the key string itself.
    Keys,
    /// Use a filter to select keys (non-standard, `~?`)
    ///
    /// Like [`Filter`][Selector::Filter], but emits the keys of the members that pass the
    /// filter rather than their values.
    KeysFilter(Filter),
    /// A singular query used in selector position (non-standard)
    ///
    /// Resolved at evaluation time to a name or index before being applied.
    Embedded(SingularQuery),
}

impl Selector {
    /// Will the selector select at most only a single node
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            Selector::Name(_) | Selector::Index(_) | Selector::Embedded(_)
        )
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "{name}"),
            Selector::Wildcard => write!(f, "*"),
            Selector::Index(index) => write!(f, "{index}"),
            Selector::ArraySlice(slice) => write!(f, "{slice}"),
            Selector::Filter(filter) => write!(f, "?{filter}"),
            Selector::Keys => write!(f, "~"),
            Selector::KeysFilter(filter) => write!(f, "~?{filter}"),
            Selector::Embedded(query) => write!(f, "{query}"),
        }
    }
}

impl Queryable for Selector {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Selector", level = "trace", parent = None, skip(ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let mut result = Vec::new();
        match self {
            Selector::Name(name) => result.append(&mut name.query(node, ctx)?),
            Selector::Wildcard => {
                if let Some(value) = node.as_borrowed() {
                    if let Some(list) = value.as_array() {
                        for (i, v) in list.iter().enumerate() {
                            result.push(node.child(v, PathElement::Index(i)));
                        }
                    } else if let Some(obj) = value.as_object() {
                        for (k, v) in obj {
                            result.push(node.child(v, PathElement::Name(k)));
                        }
                    }
                }
            }
            Selector::Index(index) => result.append(&mut index.query(node, ctx)?),
            Selector::ArraySlice(slice) => result.append(&mut slice.query(node, ctx)?),
            Selector::Filter(filter) => result.append(&mut filter.query(node, ctx)?),
            Selector::Keys => {
                if let Some(obj) = node.as_borrowed().and_then(Value::as_object) {
                    for (k, _) in obj {
                        result.push(node.key_child(k));
                    }
                }
            }
            Selector::KeysFilter(filter) => result.append(&mut filter.query_keys(node, ctx)?),
            Selector::Embedded(query) => {
                let Some(current) = node.as_borrowed() else {
                    return Ok(result);
                };
                match query.eval_query(current, ctx) {
                    Some(Value::String(s)) => {
                        if let Some((k, v)) =
                            current.as_object().and_then(|o| o.get_key_value(s.as_str()))
                        {
                            result.push(node.child(v, PathElement::Name(k)));
                        }
                    }
                    Some(Value::Number(n)) => {
                        if let Some((i, v)) = n
                            .as_u64()
                            .and_then(|i| usize::try_from(i).ok())
                            .and_then(|i| current.as_array().and_then(|l| l.get(i)).map(|v| (i, v)))
                        {
                            result.push(node.child(v, PathElement::Index(i)));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(result)
    }
}
