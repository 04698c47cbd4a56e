//! Name selector for selecting object keys in JSONPath
use serde_json::Value;

use crate::error::QueryError;
use crate::node::Node;
use crate::spec::path::PathElement;
use crate::spec::query::{EvalContext, Queryable};

/// Select a single JSON object key
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Name(pub String);

impl Name {
    /// Get as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{name}'", name = self.0)
    }
}

impl Queryable for Name {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Name", level = "trace", parent = None, skip(_ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        _ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        Ok(node
            .as_borrowed()
            .and_then(Value::as_object)
            .and_then(|o| o.get_key_value(&self.0))
            .map(|(k, v)| node.child(v, PathElement::Name(k)))
            .into_iter()
            .collect())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
