//! Types representing segments in JSONPath
use serde_json::Value;

use crate::error::QueryError;
use crate::node::Node;
use crate::spec::path::PathElement;

use super::query::{EvalContext, Queryable};
use super::selector::Selector;

/// A segment of a JSONPath query
#[derive(Debug, PartialEq, Clone)]
pub struct QuerySegment {
    /// The kind of segment
    pub kind: QuerySegmentKind,
    /// The segment
    pub segment: Segment,
}

impl QuerySegment {
    /// Is this a normal child segment
    pub fn is_child(&self) -> bool {
        matches!(self.kind, QuerySegmentKind::Child)
    }

    /// Is this a recursive descent segment
    pub fn is_descendent(&self) -> bool {
        !self.is_child()
    }
}

impl std::fmt::Display for QuerySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if matches!(self.kind, QuerySegmentKind::Descendant) {
            write!(f, "..")?;
        }
        write!(f, "{segment}", segment = self.segment)
    }
}

/// The kind of query segment
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QuerySegmentKind {
    /// A normal child
    ///
    /// Addresses the direct descendents of the preceding segment
    Child,
    /// A descendant child
    ///
    /// Addresses all descendant children of the preceding segment, recursively
    Descendant,
}

impl Queryable for QuerySegment {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Path Segment", level = "trace", parent = None, skip(ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let mut result = self.segment.query(node, ctx)?;
        if matches!(self.kind, QuerySegmentKind::Descendant) {
            descend(self, node, ctx, 1, &mut result)?;
        }
        Ok(result)
    }
}

/// Apply a descendant segment below `node`, in pre-order
///
/// The segment's selectors have already been applied to `node` itself by the caller.
fn descend<'b>(
    segment: &QuerySegment,
    node: &Node<'b>,
    ctx: &EvalContext<'b>,
    depth: usize,
    out: &mut Vec<Node<'b>>,
) -> Result<(), QueryError> {
    if depth > ctx.opts.max_recursion_depth {
        return Err(QueryError::Recursion { depth });
    }
    let Some(value) = node.as_borrowed() else {
        return Ok(());
    };
    if let Some(list) = value.as_array() {
        for (i, v) in list.iter().enumerate() {
            let child = node.child(v, PathElement::Index(i));
            out.append(&mut segment.segment.query(&child, ctx)?);
            descend(segment, &child, ctx, depth + 1, out)?;
        }
    } else if let Some(obj) = value.as_object() {
        for (k, v) in obj {
            let child = node.child(v, PathElement::Name(k));
            out.append(&mut segment.segment.query(&child, ctx)?);
            descend(segment, &child, ctx, depth + 1, out)?;
        }
    }
    Ok(())
}

/// Represents the different forms of JSONPath segment
#[derive(Debug, PartialEq, Clone)]
pub enum Segment {
    /// Long hand segments contain multiple selectors inside square brackets
    LongHand(Vec<Selector>),
    /// Dot-name selectors are a short form for representing keys in an object
    DotName(String),
    /// The wildcard shorthand `.*`
    Wildcard,
}

impl Segment {
    /// Does this segment extract at most a single node
    pub fn is_singular(&self) -> bool {
        match self {
            Segment::LongHand(selectors) => {
                if selectors.len() > 1 {
                    return false;
                }
                if let Some(s) = selectors.first() {
                    s.is_singular()
                } else {
                    // if the selector list is empty, this shouldn't be a valid
                    // JSONPath, but at least, it would be selecting nothing, and
                    // that could be considered singular, i.e., None.
                    true
                }
            }
            Segment::DotName(_) => true,
            Segment::Wildcard => false,
        }
    }

    /// Optionally produce self as a slice of selectors, from a long hand segment
    pub fn as_long_hand(&self) -> Option<&[Selector]> {
        match self {
            Segment::LongHand(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Optionally produce self as a single name segment
    pub fn as_dot_name(&self) -> Option<&str> {
        match self {
            Segment::DotName(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::LongHand(selectors) => {
                write!(f, "[")?;
                for (i, s) in selectors.iter().enumerate() {
                    write!(
                        f,
                        "{s}{comma}",
                        comma = if i == selectors.len() - 1 { "" } else { "," }
                    )?;
                }
                write!(f, "]")?;
            }
            Segment::DotName(name) => write!(f, ".{name}")?,
            Segment::Wildcard => write!(f, ".*")?,
        }
        Ok(())
    }
}

impl Queryable for Segment {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Segment", level = "trace", parent = None, skip(ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let mut result = Vec::new();
        match self {
            Segment::LongHand(selectors) => {
                for selector in selectors {
                    result.append(&mut selector.query(node, ctx)?);
                }
            }
            Segment::DotName(name) => {
                if let Some((k, v)) = node
                    .as_borrowed()
                    .and_then(Value::as_object)
                    .and_then(|o| o.get_key_value(name))
                {
                    result.push(node.child(v, PathElement::Name(k)));
                }
            }
            Segment::Wildcard => {
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
        }
        Ok(result)
    }
}
