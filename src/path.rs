use std::str::FromStr;

use serde::{de::Visitor, Deserialize, Serialize};
use serde_json::Value;

use crate::env::{Environment, DEFAULT_ENVIRONMENT};
use crate::error::{ParseError, QueryError};
use crate::node::{Node, NodeList};
use crate::parser::{parse_path_main, ParserOptions};
use crate::spec::query::{EvalContext, EvalOptions, Query, SetOp};
use crate::spec::selector::filter::value_equal_to;

/// A parsed JSONPath query string
///
/// This type represents a valid, parsed JSONPath query, possibly compound (the
/// non-standard `|` and `&` combinations of queries). Please refer to
/// [RFC 9535][rfc] for the details on what constitutes a valid query; the non-standard
/// extensions accepted by default are documented at the crate level.
///
/// # Usage
///
/// A `JsonPath` can be parsed directly from an `&str` using the [`parse`][JsonPath::parse]
/// method:
/// ```rust
/// # use serde_json_query::JsonPath;
/// # fn main() {
/// let path = JsonPath::parse("$.foo.*").expect("valid JSONPath");
/// # }
/// ```
/// It can then be used to query [`serde_json::Value`]'s with the
/// [`query`][JsonPath::query] method:
/// ```rust
/// # use serde_json::json;
/// # use serde_json_query::JsonPath;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let path = JsonPath::parse("$.foo.*")?;
/// let value = json!({"foo": [1, 2, 3, 4]});
/// let nodes = path.query(&value)?;
/// assert_eq!(nodes.all(), vec![1, 2, 3, 4]);
/// # Ok(())
/// # }
/// ```
///
/// [rfc]: https://www.rfc-editor.org/rfc/rfc9535.html
#[derive(Debug, PartialEq, Clone, Default)]
pub struct JsonPath {
    query: Query,
    others: Vec<(SetOp, Query)>,
    opts: EvalOptions,
}

impl JsonPath {
    /// Create a [`JsonPath`] by parsing a valid JSONPath query string
    ///
    /// Uses the default environment: extensions enabled, maximum recursion depth 100.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json_query::JsonPath;
    /// # fn main() {
    /// let path = JsonPath::parse("$.foo[1:10:2].baz").expect("valid JSONPath");
    /// # }
    /// ```
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        DEFAULT_ENVIRONMENT.compile(path_str)
    }

    /// Create a [`JsonPath`], accepting only the standard RFC 9535 grammar
    pub fn parse_strict(path_str: &str) -> Result<Self, ParseError> {
        Environment::new().with_strict(true).compile(path_str)
    }

    pub(crate) fn compile(path_str: &str, opts: EvalOptions) -> Result<Self, ParseError> {
        let (query, others) = parse_path_main(
            path_str,
            ParserOptions {
                strict: opts.strict,
            },
        )?;
        Ok(Self {
            query,
            others,
            opts,
        })
    }

    /// Query a [`serde_json::Value`] using this [`JsonPath`]
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let path = JsonPath::parse("$.foo[::2]")?;
    /// let value = json!({"foo": [1, 2, 3, 4]});
    /// let nodes = path.query(&value)?;
    /// assert_eq!(nodes.all(), vec![1, 3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query<'b>(&self, value: &'b Value) -> Result<NodeList<'b>, QueryError> {
        self.query_with(value, None)
    }

    /// Query a [`serde_json::Value`], making `filter_context` available to filter
    /// expressions through the non-standard `#` selector
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let path = JsonPath::parse("$.foo[?@ > #.limit]")?;
    /// let value = json!({"foo": [1, 5, 9]});
    /// let context = json!({"limit": 4});
    /// let nodes = path.query_with(&value, Some(&context))?;
    /// assert_eq!(nodes.all(), vec![5, 9]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query_with<'b>(
        &self,
        value: &'b Value,
        filter_context: Option<&'b Value>,
    ) -> Result<NodeList<'b>, QueryError> {
        let ctx = EvalContext {
            root: value,
            filter_context,
            opts: self.opts,
        };
        let mut nodes = self.query.query(value, &ctx)?;
        for (op, query) in &self.others {
            match op {
                SetOp::Union => nodes.append(&mut query.query(value, &ctx)?),
                SetOp::Intersect => {
                    let right = query.query_values(value, &ctx)?;
                    nodes.retain(|node| right.iter().any(|v| value_equal_to(node.value(), v)));
                }
            }
        }
        Ok(NodeList::from(nodes))
    }

    /// Query a [`serde_json::Value`], cloning out the matched values
    pub fn findall(&self, value: &Value) -> Result<Vec<Value>, QueryError> {
        Ok(self.query(value)?.values())
    }

    /// The first node matched in `value`, or `None` if there are no matches
    pub fn match_first<'b>(&self, value: &'b Value) -> Result<Option<Node<'b>>, QueryError> {
        Ok(self.query(value)?.into_iter().next())
    }

    /// Query a [`serde_json::Value`], producing an asynchronous stream of nodes
    ///
    /// Evaluation itself is synchronous; the stream yields the matched nodes in query
    /// order and can be dropped to abandon the remainder.
    #[cfg(feature = "stream")]
    pub fn query_stream<'b>(
        &self,
        value: &'b Value,
    ) -> Result<impl futures::Stream<Item = Node<'b>>, QueryError> {
        Ok(self.query(value)?.into_stream())
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{query}", query = self.query)?;
        for (op, query) in &self.others {
            write!(f, " {op} {query}")?;
        }
        Ok(())
    }
}

impl Serialize for JsonPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct JsonPathVisitor;

        impl<'de> Visitor<'de> for JsonPathVisitor {
            type Value = JsonPath;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a string representing a JSONPath query")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                JsonPath::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(JsonPathVisitor)
    }
}
