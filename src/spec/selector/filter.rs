//! Types representing filter selectors in JSONPath
use std::borrow::Cow;

use serde_json::{Number, Value};

use crate::error::QueryError;
use crate::node::Node;
use crate::spec::functions::{FunctionExpr, TypedValue};
use crate::spec::path::PathElement;
use crate::spec::pattern::FilterRegex;
use crate::spec::query::{EvalContext, Query, QueryKind, Queryable};
use crate::spec::segment::{QuerySegment, Segment};

use super::{index::Index, name::Name, Selector};

mod sealed {
    use super::{
        BasicExpr, ComparisonExpr, ExistExpr, LogicalAndExpr, LogicalOrExpr, RegexMatchExpr,
    };
    use crate::spec::functions::FunctionExpr;

    pub(crate) trait Sealed {}
    impl Sealed for LogicalOrExpr {}
    impl Sealed for LogicalAndExpr {}
    impl Sealed for BasicExpr {}
    impl Sealed for ExistExpr {}
    impl Sealed for ComparisonExpr {}
    impl Sealed for RegexMatchExpr {}
    impl Sealed for FunctionExpr {}
}

/// Trait for testing a filter expression against the current member of the value being
/// filtered
pub(crate) trait TestFilter: sealed::Sealed {
    /// Test self against the current value, its key, and the evaluation context
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError>;
}

/// Truthiness of a JSON value, used where a filter expects a logical result from a
/// non-logical expression
///
/// Follows host-value truthiness: `null`, `false`, zero, and empty strings, arrays, and
/// objects are falsy.
pub(crate) fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The main filter type for JSONPath
#[derive(Debug, PartialEq, Clone)]
pub struct Filter(pub LogicalOrExpr);

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{expr}", expr = self.0)
    }
}

impl Queryable for Filter {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Filter", level = "trace", parent = None, skip(ctx), ret))]
    fn query<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let Some(value) = node.as_borrowed() else {
            return Ok(Vec::new());
        };
        let mut result = Vec::new();
        if let Some(list) = value.as_array() {
            for (i, v) in list.iter().enumerate() {
                let key = PathElement::Index(i);
                if self.0.test_filter(v, Some(&key), ctx)? {
                    result.push(node.child(v, key));
                }
            }
        } else if let Some(obj) = value.as_object() {
            for (k, v) in obj {
                let key = PathElement::Name(k);
                if self.0.test_filter(v, Some(&key), ctx)? {
                    result.push(node.child(v, key));
                }
            }
        }
        Ok(result)
    }
}

impl Filter {
    /// Like [`query`][Queryable::query], but emit the keys of matching object members
    /// rather than their values (the non-standard `~?` selector)
    pub(crate) fn query_keys<'b>(
        &self,
        node: &Node<'b>,
        ctx: &EvalContext<'b>,
    ) -> Result<Vec<Node<'b>>, QueryError> {
        let Some(obj) = node.as_borrowed().and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        let mut result = Vec::new();
        for (k, v) in obj {
            let key = PathElement::Name(k);
            if self.0.test_filter(v, Some(&key), ctx)? {
                result.push(node.key_child(k));
            }
        }
        Ok(result)
    }
}

/// The top level boolean expression type
///
/// This is also `logical-expression` in the JSONPath specification, but the naming was
/// chosen to make it more clear that it represents the logical OR, and to not have an extra
/// wrapping type.
#[derive(Debug, PartialEq, Clone)]
pub struct LogicalOrExpr(pub Vec<LogicalAndExpr>);

impl std::fmt::Display for LogicalOrExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, expr) in self.0.iter().enumerate() {
            write!(
                f,
                "{expr}{logic}",
                logic = if i == self.0.len() - 1 { "" } else { " || " }
            )?;
        }
        Ok(())
    }
}

impl TestFilter for LogicalOrExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Logical Or Expr", level = "trace", parent = None, skip(ctx), ret))]
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        for expr in &self.0 {
            if expr.test_filter(current, key, ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A logical AND expression
#[derive(Debug, PartialEq, Clone)]
pub struct LogicalAndExpr(pub Vec<BasicExpr>);

impl std::fmt::Display for LogicalAndExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, expr) in self.0.iter().enumerate() {
            write!(
                f,
                "{expr}{logic}",
                logic = if i == self.0.len() - 1 { "" } else { " && " }
            )?;
        }
        Ok(())
    }
}

impl TestFilter for LogicalAndExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Logical And Expr", level = "trace", parent = None, skip(ctx), ret))]
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        for expr in &self.0 {
            if !expr.test_filter(current, key, ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// The basic form of expression in a filter
#[derive(Debug, PartialEq, Clone)]
pub enum BasicExpr {
    /// An expression wrapped in parenthesis
    Paren(LogicalOrExpr),
    /// A parenthesized expression preceded with a `!`
    NotParen(LogicalOrExpr),
    /// A relationship expression which compares two JSON values
    Relation(ComparisonExpr),
    /// A regex match expression (non-standard, `=~`)
    RegexMatch(RegexMatchExpr),
    /// An existence expression
    Exist(ExistExpr),
    /// The inverse of an existence expression, i.e., preceded by `!`
    NotExist(ExistExpr),
    /// A function expression
    FuncExpr(FunctionExpr),
    /// The inverse of a function expression, i.e., preceded by `!`
    NotFuncExpr(FunctionExpr),
    /// A bare literal in a logical position (non-standard), tested for truthiness
    Literal(Literal),
}

impl std::fmt::Display for BasicExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BasicExpr::Paren(expr) => write!(f, "({expr})"),
            BasicExpr::NotParen(expr) => write!(f, "!({expr})"),
            BasicExpr::Relation(rel) => write!(f, "{rel}"),
            BasicExpr::RegexMatch(expr) => write!(f, "{expr}"),
            BasicExpr::Exist(exist) => write!(f, "{exist}"),
            BasicExpr::NotExist(exist) => write!(f, "!{exist}"),
            BasicExpr::FuncExpr(expr) => write!(f, "{expr}"),
            BasicExpr::NotFuncExpr(expr) => write!(f, "!{expr}"),
            BasicExpr::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl BasicExpr {
    /// Optionally express as a relation expression
    pub fn as_relation(&self) -> Option<&ComparisonExpr> {
        match self {
            BasicExpr::Relation(cx) => Some(cx),
            _ => None,
        }
    }
}

impl TestFilter for BasicExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Basic Expr", level = "trace", parent = None, skip(ctx), ret))]
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        match self {
            BasicExpr::Paren(expr) => expr.test_filter(current, key, ctx),
            BasicExpr::NotParen(expr) => Ok(!expr.test_filter(current, key, ctx)?),
            BasicExpr::Relation(expr) => expr.test_filter(current, key, ctx),
            BasicExpr::RegexMatch(expr) => expr.test_filter(current, key, ctx),
            BasicExpr::Exist(expr) => expr.test_filter(current, key, ctx),
            BasicExpr::NotExist(expr) => Ok(!expr.test_filter(current, key, ctx)?),
            BasicExpr::FuncExpr(expr) => expr.test_filter(current, key, ctx),
            BasicExpr::NotFuncExpr(expr) => Ok(!expr.test_filter(current, key, ctx)?),
            BasicExpr::Literal(lit) => Ok(lit.to_typed().truthy()),
        }
    }
}

/// Existence expression
#[derive(Debug, PartialEq, Clone)]
pub struct ExistExpr(pub Query);

impl std::fmt::Display for ExistExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{query}", query = self.0)
    }
}

impl TestFilter for ExistExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Exists Expr", level = "trace", parent = None, skip(ctx), ret))]
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        _key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        Ok(!self.0.query(current, ctx)?.is_empty())
    }
}

/// A comparison expression comparing two JSON values
#[derive(Debug, PartialEq, Clone)]
pub struct ComparisonExpr {
    /// The JSON value on the left of the comparison
    pub left: Comparable,
    /// The operator of comparison
    pub op: ComparisonOperator,
    /// The JSON value on the right of the comparison
    pub right: Comparable,
}

impl std::fmt::Display for ComparisonExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{left} {op} {right}",
            left = self.left,
            op = self.op,
            right = self.right
        )
    }
}

pub(crate) fn check_equal_to(left: &TypedValue, right: &TypedValue) -> bool {
    match (left.as_value(), right.as_value()) {
        (Some(l), Some(r)) => value_equal_to(l, r),
        (None, None) => left.is_nothing() && right.is_nothing(),
        _ => false,
    }
}

/// Deep structural equality between two JSON values
///
/// Objects compare by key set and per-key equality regardless of member order; arrays
/// compare elementwise in order; numbers compare numerically across integer and float
/// representations.
pub(crate) fn value_equal_to(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => number_equal_to(l, r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| value_equal_to(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(k, v)| r.get(k).map(|rv| value_equal_to(v, rv)).unwrap_or(false))
        }
        _ => left == right,
    }
}

fn number_equal_to(left: &Number, right: &Number) -> bool {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        l == r
    } else if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        l == r
    } else if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        l == r
    } else {
        false
    }
}

fn value_less_than(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(n1), Value::Number(n2)) => number_less_than(n1, n2),
        (Value::String(s1), Value::String(s2)) => s1 < s2,
        _ => false,
    }
}

fn check_less_than(left: &TypedValue, right: &TypedValue) -> bool {
    match (left.as_value(), right.as_value()) {
        (Some(l), Some(r)) => value_less_than(l, r),
        _ => false,
    }
}

/// Ordering is defined only between two numbers or two strings; every other pairing,
/// including absent operands, is unordered
fn value_orderable(left: &Value, right: &Value) -> bool {
    matches!((left, right), (Value::Number(_), Value::Number(_)))
        | matches!((left, right), (Value::String(_), Value::String(_)))
}

fn check_orderable(left: &TypedValue, right: &TypedValue) -> bool {
    match (left.as_value(), right.as_value()) {
        (Some(l), Some(r)) => value_orderable(l, r),
        _ => false,
    }
}

fn number_less_than(n1: &Number, n2: &Number) -> bool {
    if let (Some(a), Some(b)) = (n1.as_i64(), n2.as_i64()) {
        a < b
    } else if let (Some(a), Some(b)) = (n1.as_f64(), n2.as_f64()) {
        a < b
    } else {
        false
    }
}

/// Membership of `left` in `right`
///
/// Arrays are tested for an element deep-equal to `left`, strings for a substring, and
/// objects for a key equal to `left`.
fn check_in(left: &TypedValue, right: &TypedValue) -> bool {
    let (Some(l), Some(r)) = (left.as_value(), right.as_value()) else {
        return false;
    };
    match r {
        Value::Array(items) => items.iter().any(|v| value_equal_to(l, v)),
        Value::String(s) => l.as_str().map(|ls| s.contains(ls)).unwrap_or(false),
        Value::Object(o) => l.as_str().map(|ls| o.contains_key(ls)).unwrap_or(false),
        _ => false,
    }
}

impl TestFilter for ComparisonExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Comparison Expr", level = "trace", parent = None, skip(ctx), ret))]
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        let left = self.left.evaluate(current, key, ctx)?;
        let right = self.right.evaluate(current, key, ctx)?;
        Ok(match self.op {
            ComparisonOperator::EqualTo => check_equal_to(&left, &right),
            ComparisonOperator::NotEqualTo => !check_equal_to(&left, &right),
            ComparisonOperator::LessThan => {
                check_orderable(&left, &right) && check_less_than(&left, &right)
            }
            ComparisonOperator::GreaterThan => {
                check_orderable(&left, &right)
                    && !check_less_than(&left, &right)
                    && !check_equal_to(&left, &right)
            }
            ComparisonOperator::LessThanEqualTo => {
                check_orderable(&left, &right)
                    && (check_less_than(&left, &right) || check_equal_to(&left, &right))
            }
            ComparisonOperator::GreaterThanEqualTo => {
                check_orderable(&left, &right) && !check_less_than(&left, &right)
            }
            ComparisonOperator::In => check_in(&left, &right),
            ComparisonOperator::Contains => check_in(&right, &left),
        })
    }
}

/// The comparison operator
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `==`
    EqualTo,
    /// `!=` (also the non-standard alias `<>`)
    NotEqualTo,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanEqualTo,
    /// `>=`
    GreaterThanEqualTo,
    /// `in` (non-standard): the left value is a member of the right value
    In,
    /// `contains` (non-standard): the right value is a member of the left value
    Contains,
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOperator::EqualTo => write!(f, "=="),
            ComparisonOperator::NotEqualTo => write!(f, "!="),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::LessThanEqualTo => write!(f, "<="),
            ComparisonOperator::GreaterThanEqualTo => write!(f, ">="),
            ComparisonOperator::In => write!(f, "in"),
            ComparisonOperator::Contains => write!(f, "contains"),
        }
    }
}

/// A regex match expression, e.g. `@.name =~ /no[a-z]*/`
///
/// Non-standard; the pattern is compiled at parse time and must match the entire string.
#[derive(Debug, PartialEq, Clone)]
pub struct RegexMatchExpr {
    /// The value being matched
    pub left: Comparable,
    /// The compiled pattern
    pub regex: FilterRegex,
}

impl std::fmt::Display for RegexMatchExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{left} =~ {regex}", left = self.left, regex = self.regex)
    }
}

impl TestFilter for RegexMatchExpr {
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        let left = self.left.evaluate(current, key, ctx)?;
        Ok(left
            .as_value()
            .and_then(Value::as_str)
            .map(|s| self.regex.is_full_match(s))
            .unwrap_or(false))
    }
}

/// A type that is comparable
#[derive(Debug, PartialEq, Clone)]
pub enum Comparable {
    /// A literal JSON value, excluding objects and arrays
    Literal(Literal),
    /// A singular query
    ///
    /// This will only produce a single node, i.e., JSON value, or nothing
    SingularQuery(SingularQuery),
    /// A non-singular query used as a value (non-standard)
    ///
    /// Resolves to nothing, a single value, or an array of the matched values.
    Query(Box<Query>),
    /// A function expression that can only produce a `ValueType`
    FunctionExpr(FunctionExpr),
    /// The key or index of the current node (non-standard, `#`)
    CurrentKey,
    /// A list of literals (non-standard), e.g. `['a', 'b']`
    ListLiteral(Vec<Literal>),
}

impl std::fmt::Display for Comparable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparable::Literal(lit) => write!(f, "{lit}"),
            Comparable::SingularQuery(path) => write!(f, "{path}"),
            Comparable::Query(query) => write!(f, "{query}"),
            Comparable::FunctionExpr(expr) => write!(f, "{expr}"),
            Comparable::CurrentKey => write!(f, "#"),
            Comparable::ListLiteral(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    write!(
                        f,
                        "{item}{comma}",
                        comma = if i == items.len() - 1 { "" } else { ", " }
                    )?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Convert the current key binding to a value for comparisons and function arguments
pub(crate) fn key_to_typed<'b>(key: Option<&PathElement<'b>>) -> TypedValue<'b> {
    match key {
        Some(PathElement::Name(s)) | Some(PathElement::Key(s)) => {
            TypedValue::Value(Cow::Owned(Value::String((*s).to_owned())))
        }
        Some(PathElement::Index(i)) => TypedValue::Value(Cow::Owned(Value::from(*i))),
        None => TypedValue::Nothing,
    }
}

impl Comparable {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Comparable::evaluate", level = "trace", parent = None, skip(ctx), ret))]
    pub(crate) fn evaluate<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<TypedValue<'b>, QueryError> {
        match self {
            Comparable::Literal(lit) => Ok(lit.to_typed()),
            Comparable::SingularQuery(sp) => Ok(match sp.eval_query(current, ctx) {
                Some(v) => TypedValue::Value(Cow::Borrowed(v)),
                None => TypedValue::Nothing,
            }),
            Comparable::Query(query) => {
                let mut values = query.query_values(current, ctx)?;
                Ok(match values.len() {
                    0 => TypedValue::Nothing,
                    1 => TypedValue::Value(values.remove(0)),
                    _ => TypedValue::Value(Cow::Owned(Value::Array(
                        values.into_iter().map(Cow::into_owned).collect(),
                    ))),
                })
            }
            Comparable::FunctionExpr(expr) => expr.evaluate(current, key, ctx),
            Comparable::CurrentKey => Ok(key_to_typed(key)),
            Comparable::ListLiteral(items) => Ok(TypedValue::Value(Cow::Owned(Value::Array(
                items.iter().map(Literal::to_value).collect(),
            )))),
        }
    }

    #[doc(hidden)]
    pub fn as_singular_path(&self) -> Option<&SingularQuery> {
        match self {
            Comparable::SingularQuery(sp) => Some(sp),
            _ => None,
        }
    }
}

/// A literal JSON value that can be represented in a JSONPath query
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    /// A valid JSON number
    Number(Number),
    /// A string
    String(String),
    /// `true` or `false`
    Bool(bool),
    /// `null` (also the non-standard aliases `nil` and `none`)
    Null,
    /// The non-standard `undefined` (alias `missing`) literal, equal only to the absence
    /// of a value
    Undefined,
}

impl Literal {
    pub(crate) fn to_typed<'a>(&self) -> TypedValue<'a> {
        match self {
            Literal::Undefined => TypedValue::Nothing,
            lit => TypedValue::Value(Cow::Owned(lit.to_value())),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Literal::Number(n) => Value::Number(n.clone()),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null | Literal::Undefined => Value::Null,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "'{s}'"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => write!(f, "null"),
            Literal::Undefined => write!(f, "undefined"),
        }
    }
}

/// A segment in a singular query
#[derive(Debug, PartialEq, Clone)]
pub enum SingularQuerySegment {
    /// A single name segment
    Name(Name),
    /// A single index segment
    Index(Index),
}

impl std::fmt::Display for SingularQuerySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingularQuerySegment::Name(name) => write!(f, "{name}"),
            SingularQuerySegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl TryFrom<QuerySegment> for SingularQuerySegment {
    type Error = NonSingularQueryError;

    fn try_from(segment: QuerySegment) -> Result<Self, Self::Error> {
        if segment.is_descendent() {
            return Err(NonSingularQueryError::Descendant);
        }
        match segment.segment {
            Segment::LongHand(mut selectors) => {
                if selectors.len() > 1 {
                    Err(NonSingularQueryError::TooManySelectors)
                } else if let Some(sel) = selectors.pop() {
                    sel.try_into()
                } else {
                    Err(NonSingularQueryError::NoSelectors)
                }
            }
            Segment::DotName(name) => Ok(Self::Name(Name(name))),
            Segment::Wildcard => Err(NonSingularQueryError::Wildcard),
        }
    }
}

impl TryFrom<Selector> for SingularQuerySegment {
    type Error = NonSingularQueryError;

    fn try_from(selector: Selector) -> Result<Self, Self::Error> {
        match selector {
            Selector::Name(n) => Ok(Self::Name(n)),
            Selector::Index(i) => Ok(Self::Index(i)),
            Selector::Wildcard => Err(NonSingularQueryError::Wildcard),
            Selector::ArraySlice(_) => Err(NonSingularQueryError::Slice),
            Selector::Filter(_) | Selector::KeysFilter(_) => Err(NonSingularQueryError::Filter),
            Selector::Keys => Err(NonSingularQueryError::Keys),
            Selector::Embedded(_) => Err(NonSingularQueryError::Embedded),
        }
    }
}

/// Represents a singular query in JSONPath
#[derive(Debug, PartialEq, Clone)]
pub struct SingularQuery {
    /// The kind of singular query: absolute, relative, or against the filter context
    pub kind: SingularQueryKind,
    /// The segments making up the query
    pub segments: Vec<SingularQuerySegment>,
}

impl SingularQuery {
    /// Evaluate the singular query
    #[cfg_attr(feature = "trace", tracing::instrument(name = "SingularQuery::eval_query", level = "trace", parent = None, skip(ctx), ret))]
    pub(crate) fn eval_query<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
    ) -> Option<&'b Value> {
        let mut target = match self.kind {
            SingularQueryKind::Absolute => ctx.root,
            SingularQueryKind::Relative => current,
            SingularQueryKind::FilterContext => ctx.filter_context?,
        };
        for segment in &self.segments {
            match segment {
                SingularQuerySegment::Name(name) => {
                    target = target.as_object().and_then(|o| o.get(name.as_str()))?;
                }
                SingularQuerySegment::Index(index) => {
                    if let Some(list) = target.as_array() {
                        target = index.normalize(list.len()).and_then(|i| list.get(i))?;
                    } else if let Some(obj) = target.as_object().filter(|_| !ctx.opts.strict) {
                        target = obj.get(&index.0.to_string())?;
                    } else {
                        return None;
                    }
                }
            }
        }
        Some(target)
    }
}

impl TryFrom<Query> for SingularQuery {
    type Error = NonSingularQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        let kind = SingularQueryKind::from(query.kind);
        let segments = query
            .segments
            .into_iter()
            .map(TryFrom::try_from)
            .collect::<Result<Vec<SingularQuerySegment>, Self::Error>>()?;
        Ok(Self { kind, segments })
    }
}

impl std::fmt::Display for SingularQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SingularQueryKind::Absolute => write!(f, "$")?,
            SingularQueryKind::Relative => write!(f, "@")?,
            SingularQueryKind::FilterContext => write!(f, "#")?,
        }
        for s in &self.segments {
            write!(f, "[{s}]")?;
        }
        Ok(())
    }
}

/// The kind of singular query
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SingularQueryKind {
    /// Referencing the root node, i.e., `$`
    Absolute,
    /// Referencing the current node, i.e., `@`
    Relative,
    /// Referencing the filter context mapping, i.e., `#` (non-standard)
    FilterContext,
}

impl From<QueryKind> for SingularQueryKind {
    fn from(qk: QueryKind) -> Self {
        match qk {
            QueryKind::Root => Self::Absolute,
            QueryKind::Current => Self::Relative,
            QueryKind::FilterContext => Self::FilterContext,
        }
    }
}

/// Error when converting a query to a singular query
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NonSingularQueryError {
    /// Descendant segment
    #[error("descendant segments are not singular")]
    Descendant,
    /// Long hand segment with too many internal selectors
    #[error("long hand segment contained more than one selector")]
    TooManySelectors,
    /// Long hand segment with no selectors
    #[error("long hand segment contained no selectors")]
    NoSelectors,
    /// A wildcard segment
    #[error("wildcard segments are not singular")]
    Wildcard,
    /// A slice segment
    #[error("slice segments are not singular")]
    Slice,
    /// A filter segment
    #[error("filter segments are not singular")]
    Filter,
    /// A keys segment
    #[error("keys segments are not singular")]
    Keys,
    /// An embedded query segment
    #[error("embedded query segments are not singular")]
    Embedded,
}
