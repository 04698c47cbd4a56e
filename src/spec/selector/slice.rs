//! Slice selectors for selecting array slices in JSONPath
use serde_json::Value;

use crate::error::QueryError;
use crate::node::Node;
use crate::spec::path::PathElement;
use crate::spec::query::{EvalContext, Queryable};

/// A slice selector
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct Slice {
    /// The start of the slice
    ///
    /// This can be negative to start the slice from a position relative to the end of the
    /// array being sliced.
    pub start: Option<i64>,
    /// The end of the slice
    ///
    /// This can be negative to end the slice at a position relative to the end of the array
    /// being sliced.
    pub end: Option<i64>,
    /// The step of the slice
    ///
    /// This can be negative to step in reverse order; a step of `0` selects nothing.
    pub step: Option<i64>,
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        write!(f, ":")?;
        if let Some(step) = self.step {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[doc(hidden)]
impl Slice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }
}

impl Queryable for Slice {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Slice", level = "trace", parent = None, skip(_ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        _ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let Some(list) = node.as_borrowed().and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        let mut result = Vec::new();
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Ok(result);
        }
        let Ok(len) = i64::try_from(list.len()) else {
            return Ok(result);
        };
        if step > 0 {
            let start = normalize_slice_index(self.start.unwrap_or(0), len).max(0);
            let end = normalize_slice_index(self.end.unwrap_or(len), len).max(0);
            let lower = start.min(len);
            let upper = end.min(len);
            let mut i = lower;
            while i < upper {
                if let Some((idx, v)) = usize::try_from(i).ok().and_then(|i| {
                    list.get(i).map(|v| (i, v))
                }) {
                    result.push(node.child(v, PathElement::Index(idx)));
                }
                i += step;
            }
        } else {
            let start = normalize_slice_index(self.start.unwrap_or(len - 1), len).max(-1);
            let end = normalize_slice_index(self.end.unwrap_or(-len - 1), len).max(-1);
            let upper = start.min(len - 1);
            let lower = end.min(len - 1);
            let mut i = upper;
            while lower < i {
                if let Some((idx, v)) = usize::try_from(i).ok().and_then(|i| {
                    list.get(i).map(|v| (i, v))
                }) {
                    result.push(node.child(v, PathElement::Index(idx)));
                }
                i += step;
            }
        }
        Ok(result)
    }
}

fn normalize_slice_index(index: i64, len: i64) -> i64 {
    if index >= 0 {
        index
    } else {
        index.checked_abs().map(|i| len - i).unwrap_or(0)
    }
}
