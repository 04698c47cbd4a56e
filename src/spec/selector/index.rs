//! Index selectors in JSONPath
use crate::error::QueryError;
use crate::node::Node;
use crate::spec::path::PathElement;
use crate::spec::query::{EvalContext, Queryable};

/// For selecting array elements by their index
///
/// Can use negative indices to index from the end of an array. In non-strict mode an index
/// applied to an object falls back to the index's string representation as a key, so that
/// members with numeric-string names are reachable by index.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Index(pub i64);

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{index}", index = self.0)
    }
}

impl Index {
    /// Normalize against an array length, producing a concrete non-negative index when the
    /// selector falls within bounds
    pub(crate) fn normalize(&self, len: usize) -> Option<usize> {
        if self.0 < 0 {
            self.0
                .checked_abs()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| len.checked_sub(i))
        } else {
            usize::try_from(self.0).ok().filter(|&i| i < len)
        }
    }
}

impl Queryable for Index {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Index", level = "trace", parent = None, skip(ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let Some(value) = node.as_borrowed() else {
            return Ok(Vec::new());
        };
        if let Some(list) = value.as_array() {
            Ok(self
                .normalize(list.len())
                .and_then(|i| list.get(i).map(|v| node.child(v, PathElement::Index(i))))
                .into_iter()
                .collect())
        } else if let Some(obj) = value.as_object().filter(|_| !ctx.opts.strict) {
            Ok(obj
                .get_key_value(&self.0.to_string())
                .map(|(k, v)| node.child(v, PathElement::Name(k)))
                .into_iter()
                .collect())
        } else {
            Ok(Vec::new())
        }
    }
}

impl From<i64> for Index {
    fn from(i: i64) -> Self {
        Self(i)
    }
}
