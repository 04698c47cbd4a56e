use serde_json::Value;

use crate::{error::QueryError, JsonPath, NodeList};

/// Extension trait that allows for JSONPath queries directly on [`serde_json::Value`]
///
/// ## Usage
/// ```rust
/// use serde_json::json;
/// use serde_json_query::{JsonPath, JsonPathExt};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let value = json!({"foo": ["bar", "baz"]});
/// let query = JsonPath::parse("$.foo[*]")?;
/// let nodes = value.json_path(&query)?;
/// assert_eq!(nodes.all(), vec!["bar", "baz"]);
/// # Ok(())
/// # }
/// ```
pub trait JsonPathExt {
    /// Query a [`serde_json::Value`] with a JSONPath query
    fn json_path(&self, path: &JsonPath) -> Result<NodeList, QueryError>;
}

impl JsonPathExt for Value {
    fn json_path(&self, path: &JsonPath) -> Result<NodeList, QueryError> {
        path.query(self)
    }
}
