//! The environment: configuration shared by compiled queries
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{Error, ParseError};
use crate::fluent;
use crate::node::{Node, NodeList};
use crate::path::JsonPath;
use crate::spec::query::EvalOptions;

pub(crate) static DEFAULT_ENVIRONMENT: Lazy<Environment> = Lazy::new(Environment::new);

/// JSONPath configuration
///
/// An `Environment` is immutable once constructed; configure it with the `with_*`
/// builder methods before compiling queries. Compiled queries snapshot the environment's
/// options, so an environment does not need to outlive the paths it compiles.
///
/// # Usage
/// ```rust
/// use serde_json::json;
/// use serde_json_query::Environment;
///
/// # fn main() -> Result<(), serde_json_query::Error> {
/// let env = Environment::new().with_strict(true);
/// let path = env.compile("$.foo[0]")?;
/// let value = json!({"foo": ["bar"]});
/// assert_eq!(path.findall(&value)?, vec![json!("bar")]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    opts: EvalOptions,
}

impl Environment {
    /// A default environment: non-strict, maximum recursion depth 100
    pub fn new() -> Self {
        Self {
            opts: EvalOptions::default(),
        }
    }

    /// Restrict the accepted grammar and semantics to RFC 9535
    ///
    /// Strict mode requires a leading `$`, disables every non-standard extension, and
    /// enforces well-typedness of comparisons.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.opts.strict = strict;
        self
    }

    /// Set the maximum depth of descendant segment recursion
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.opts.max_recursion_depth = depth;
        self
    }

    /// Propagate regular expression compilation failures in `match()` and `search()` as
    /// query errors instead of treating them as non-matches
    pub fn with_regex_debug(mut self, debug: bool) -> Self {
        self.opts.regex_debug = debug;
        self
    }

    /// Validate patterns passed to `match()` and `search()` against the I-Regexp subset
    /// before compiling them
    pub fn with_iregexp_check(mut self, check: bool) -> Self {
        self.opts.iregexp_check = check;
        self
    }

    /// Prepare an internal representation of a JSONPath string
    pub fn compile(&self, path: &str) -> Result<JsonPath, ParseError> {
        JsonPath::compile(path, self.opts)
    }

    /// Find all values in `value` matching the given JSONPath
    pub fn findall(&self, path: &str, value: &Value) -> Result<Vec<Value>, Error> {
        Ok(self.compile(path)?.query(value)?.values())
    }

    /// Produce the list of nodes matching the given JSONPath in `value`
    pub fn finditer<'b>(&self, path: &str, value: &'b Value) -> Result<NodeList<'b>, Error> {
        Ok(self.compile(path)?.query(value)?)
    }

    /// The first node matching the given JSONPath in `value`, or `None`
    pub fn match_first<'b>(&self, path: &str, value: &'b Value) -> Result<Option<Node<'b>>, Error> {
        Ok(self.compile(path)?.query(value)?.into_iter().next())
    }

    /// Run a query and wrap the results in the fluent [`Query`][fluent::Query] adapter
    pub fn query<'b>(&self, path: &str, value: &'b Value) -> Result<fluent::Query<'b>, Error> {
        Ok(fluent::Query::new(
            self.compile(path)?.query(value)?,
            self.clone(),
        ))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Environment;

    #[test]
    fn strict_environment_rejects_extensions() {
        let env = Environment::new().with_strict(true);
        assert!(env.compile("$.store.~").is_err());
        assert!(env.compile("store.bicycle").is_err());
        assert!(env.compile("$.a | $.b").is_err());
    }

    #[test]
    fn recursion_depth_is_enforced() {
        let env = Environment::new().with_max_recursion_depth(3);
        let path = env.compile("$..leaf").expect("valid query");
        let value = json!({"a": {"b": {"c": {"d": {"leaf": 1}}}}});
        assert!(path.query(&value).is_err());
        let env = Environment::new();
        let path = env.compile("$..leaf").expect("valid query");
        assert_eq!(path.findall(&value).expect("evaluates"), vec![json!(1)]);
    }
}
