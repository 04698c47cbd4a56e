//! Types representing queries in JSONPath
use serde_json::Value;

use crate::error::QueryError;
use crate::node::Node;

use super::segment::QuerySegment;

mod sealed {
    use crate::spec::{
        segment::{QuerySegment, Segment},
        selector::{
            filter::{Filter, SingularQuery},
            index::Index,
            name::Name,
            slice::Slice,
            Selector,
        },
    };

    use super::Query;

    pub(crate) trait Sealed {}
    impl Sealed for Query {}
    impl Sealed for QuerySegment {}
    impl Sealed for Segment {}
    impl Sealed for Slice {}
    impl Sealed for Name {}
    impl Sealed for Selector {}
    impl Sealed for Index {}
    impl Sealed for Filter {}
    impl Sealed for SingularQuery {}
}

/// Options governing evaluation, snapshotted from the environment at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EvalOptions {
    pub(crate) strict: bool,
    pub(crate) max_recursion_depth: usize,
    pub(crate) regex_debug: bool,
    pub(crate) iregexp_check: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_recursion_depth: 100,
            regex_debug: false,
            iregexp_check: false,
        }
    }
}

/// Shared state for a single query evaluation
#[derive(Debug)]
pub(crate) struct EvalContext<'b> {
    pub(crate) root: &'b Value,
    pub(crate) filter_context: Option<&'b Value>,
    pub(crate) opts: EvalOptions,
}

/// A type that can be queried to produce child nodes
pub(crate) trait Queryable: sealed::Sealed {
    /// Expand `node` into the nodes this AST fragment selects from it
    fn query<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError>;
}

/// Represents a JSONPath expression
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Query {
    /// The kind of query: root (`$`), current (`@`), or filter context (`#`)
    pub kind: QueryKind,
    /// The segments constituting the query
    pub segments: Vec<QuerySegment>,
}

impl Query {
    /// Does every segment of this query select at most one node
    pub(crate) fn is_singular(&self) -> bool {
        for s in &self.segments {
            if s.is_descendent() {
                return false;
            }
            if !s.segment.is_singular() {
                return false;
            }
        }
        true
    }

    /// Evaluate the query, producing located nodes
    ///
    /// `current` is the node the query is relative to when its kind is
    /// [`QueryKind::Current`]; root and filter-context queries take their starting point
    /// from `ctx`.
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query", level = "trace", parent = None, skip(ctx), ret))]
    pub(crate) fn query<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let start = match self.kind {
            QueryKind::Root => ctx.root,
            QueryKind::Current => current,
            QueryKind::FilterContext => match ctx.filter_context {
                Some(v) => v,
                None => return Ok(Vec::new()),
            },
        };
        let mut nodes = vec![Node::new_root(start, ctx.root)];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in &nodes {
                next.append(&mut segment.query(node, ctx)?);
            }
            nodes = next;
        }
        Ok(nodes)
    }

    /// Evaluate the query, keeping only the matched values
    pub(crate) fn query_values<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<std::borrow::Cow<'b, Value>>, QueryError> {
        Ok(self
            .query(current, ctx)?
            .into_iter()
            .map(|n| n.value)
            .collect())
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            QueryKind::Root => write!(f, "$")?,
            QueryKind::Current => write!(f, "@")?,
            QueryKind::FilterContext => write!(f, "#")?,
        }
        for s in &self.segments {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// The set operation joining two queries in a compound path (non-standard)
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SetOp {
    /// `|`: concatenate the result streams
    Union,
    /// `&`: retain nodes of the left stream whose value equals some value in the right
    Intersect,
}

impl std::fmt::Display for SetOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetOp::Union => write!(f, "|"),
            SetOp::Intersect => write!(f, "&"),
        }
    }
}

/// The kind of query
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum QueryKind {
    /// A query against the root of a JSON object, i.e., with `$`
    #[default]
    Root,
    /// A query against the current node within a JSON object, i.e., with `@`
    Current,
    /// A non-standard query against the filter context mapping, i.e., with `#`
    FilterContext,
}
