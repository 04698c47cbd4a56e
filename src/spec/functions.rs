//! Function extensions in JSONPath
//!
//! Function extensions serve as a way to extend the capability of filter expressions
//! beyond what the standard query syntax can support. All functions conform to a type
//! system of three types: nodelists, values, and logicals.
//!
//! The standard functions `length`, `count`, `match`, `search`, and `value` are always
//! registered, along with the non-standard `keys`, `is`, `typeof`, and `startswith`.
//! Third-party functions can be registered by submitting a [`Function`] through
//! [`inventory::submit!`]:
//!
//! ```ignore
//! static FIRST_EVALUATOR: Evaluator = Lazy::new(|| {
//!     Box::new(|mut args, _ctx| {
//!         Ok(match args.pop_front() {
//!             Some(TypedValue::Nodes(mut nodes)) if !nodes.is_empty() => {
//!                 TypedValue::Value(nodes.remove(0))
//!             }
//!             _ => TypedValue::Nothing,
//!         })
//!     })
//! });
//! static FIRST_VALIDATOR: Validator =
//!     Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Nodelist], args)));
//! inventory::submit! {
//!     Function::new("first", FunctionArgType::Value, &FIRST_EVALUATOR, &FIRST_VALIDATOR)
//! }
//! ```
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::QueryError;
use crate::spec::pattern::{lookup_pattern, PatternKind};
use crate::spec::query::{EvalContext, Query};

use super::path::PathElement;
use super::selector::filter::{
    key_to_typed, value_truthy, Literal, LogicalOrExpr, SingularQuery, TestFilter,
};

/// Validates a function's arguments at parse time
pub type Validator =
    Lazy<Box<dyn Fn(&[FunctionExprArg]) -> Result<(), FunctionValidationError> + Send + Sync>>;

/// Evaluates a function at query time
pub type Evaluator = Lazy<
    Box<
        dyn for<'a> Fn(
                VecDeque<TypedValue<'a>>,
                &FunctionContext,
            ) -> Result<TypedValue<'a>, QueryError>
            + Send
            + Sync,
    >,
>;

/// A registered filter function
#[allow(missing_debug_implementations)]
pub struct Function {
    name: &'static str,
    result_type: FunctionArgType,
    validator: &'static Validator,
    evaluator: &'static Evaluator,
}

impl Function {
    /// Define a function for registration
    pub const fn new(
        name: &'static str,
        result_type: FunctionArgType,
        evaluator: &'static Evaluator,
        validator: &'static Validator,
    ) -> Self {
        Self {
            name,
            result_type,
            evaluator,
            validator,
        }
    }
}

inventory::collect!(Function);

/// Look up a function by name, considering built-ins first and then any functions
/// registered through `inventory`
pub(crate) fn lookup(name: &str) -> Option<&'static Function> {
    if let Some(f) = REGISTRY.get(name) {
        return Some(f);
    }
    inventory::iter::<Function>
        .into_iter()
        .find(|f| f.name == name)
}

/// Evaluation-time context passed to function evaluators
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext {
    pub(crate) regex_debug: bool,
    pub(crate) iregexp_check: bool,
}

/// The runtime representation of a value in the filter expression type system
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue<'a> {
    /// A list of matched values, produced by a query
    Nodes(Vec<Cow<'a, Value>>),
    /// A logical result
    Logical(bool),
    /// A single JSON value
    Value(Cow<'a, Value>),
    /// The special result "Nothing", i.e., the absence of a value
    Nothing,
}

impl<'a> TypedValue<'a> {
    /// View as a single JSON value, when there is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            TypedValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this is the special result "Nothing"
    pub fn is_nothing(&self) -> bool {
        matches!(self, TypedValue::Nothing)
    }

    /// Coerce to a logical result
    pub fn truthy(&self) -> bool {
        match self {
            TypedValue::Nodes(nodes) => !nodes.is_empty(),
            TypedValue::Logical(b) => *b,
            TypedValue::Value(v) => value_truthy(v),
            TypedValue::Nothing => false,
        }
    }

    fn as_kind(&self) -> FunctionArgType {
        match self {
            TypedValue::Nodes(_) => FunctionArgType::Nodelist,
            TypedValue::Logical(_) => FunctionArgType::Logical,
            TypedValue::Value(_) => FunctionArgType::Value,
            TypedValue::Nothing => FunctionArgType::Nothing,
        }
    }
}

/// The declared type of a function argument or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionArgType {
    /// A nodelist, i.e., any query or a function returning `NodesType`
    Nodelist,
    /// A node: the result of a singular query
    Node,
    /// A plain value, e.g., a literal
    Value,
    /// A logical, i.e., boolean, result
    Logical,
    /// The absence of a value
    Nothing,
}

impl FunctionArgType {
    /// Can an argument of this type be used where `other` is expected
    pub fn converts_to(&self, other: Self) -> bool {
        matches!(
            (self, other),
            (
                FunctionArgType::Nodelist,
                FunctionArgType::Nodelist | FunctionArgType::Logical
            ) | (
                FunctionArgType::Node,
                FunctionArgType::Nodelist
                    | FunctionArgType::Node
                    | FunctionArgType::Value
                    | FunctionArgType::Logical
            ) | (
                FunctionArgType::Value,
                FunctionArgType::Node | FunctionArgType::Value
            ) | (FunctionArgType::Logical, FunctionArgType::Logical)
                | (
                    FunctionArgType::Nothing,
                    FunctionArgType::Node | FunctionArgType::Value | FunctionArgType::Nothing
                )
        )
    }
}

impl std::fmt::Display for FunctionArgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionArgType::Nodelist => write!(f, "NodesType"),
            FunctionArgType::Logical => write!(f, "LogicalType"),
            FunctionArgType::Node | FunctionArgType::Value | FunctionArgType::Nothing => {
                write!(f, "ValueType")
            }
        }
    }
}

/// A function call expression in a filter
#[derive(Clone)]
pub struct FunctionExpr {
    /// The name of the function
    pub name: String,
    /// The arguments it was called with
    pub args: Vec<FunctionExprArg>,
    /// The function's declared return type
    pub return_type: FunctionArgType,
    evaluator: &'static Evaluator,
}

impl std::fmt::Debug for FunctionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionExpr")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("return_type", &self.return_type)
            .finish()
    }
}

impl PartialEq for FunctionExpr {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.args == other.args
            && self.return_type == other.return_type
    }
}

impl FunctionExpr {
    /// Validate a parsed function call against the registry and produce the expression
    pub(crate) fn validate(
        name: String,
        args: Vec<FunctionExprArg>,
    ) -> Result<Self, FunctionValidationError> {
        let function = lookup(&name).ok_or(FunctionValidationError::Undefined {
            name: name.clone(),
        })?;
        (function.validator)(args.as_slice())?;
        Ok(Self {
            name,
            args,
            return_type: function.result_type,
            evaluator: function.evaluator,
        })
    }

    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Function Expr", level = "trace", parent = None, skip(ctx), ret))]
    pub(crate) fn evaluate<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<TypedValue<'b>, QueryError> {
        let mut args = VecDeque::with_capacity(self.args.len());
        for arg in &self.args {
            args.push_back(arg.evaluate(current, key, ctx)?);
        }
        let fctx = FunctionContext {
            regex_debug: ctx.opts.regex_debug,
            iregexp_check: ctx.opts.iregexp_check,
        };
        (self.evaluator)(args, &fctx)
    }
}

impl std::fmt::Display for FunctionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{name}(", name = self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            write!(
                f,
                "{arg}{comma}",
                comma = if i == self.args.len() - 1 { "" } else { "," }
            )?;
        }
        write!(f, ")")
    }
}

impl TestFilter for FunctionExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Function Expr", level = "trace", parent = None, skip(ctx), ret))]
    fn test_filter<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<bool, QueryError> {
        Ok(self.evaluate(current, key, ctx)?.truthy())
    }
}

/// An argument to a function call
#[derive(Debug, PartialEq, Clone)]
pub enum FunctionExprArg {
    /// A literal value
    Literal(Literal),
    /// A singular query
    SingularQuery(SingularQuery),
    /// Any other query
    FilterQuery(Query),
    /// A logical expression
    LogicalExpr(LogicalOrExpr),
    /// A nested function call
    FunctionExpr(FunctionExpr),
    /// The current key (non-standard, `#`)
    CurrentKey,
}

impl std::fmt::Display for FunctionExprArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionExprArg::Literal(lit) => write!(f, "{lit}"),
            FunctionExprArg::FilterQuery(query) => write!(f, "{query}"),
            FunctionExprArg::SingularQuery(sq) => write!(f, "{sq}"),
            FunctionExprArg::LogicalExpr(log) => write!(f, "{log}"),
            FunctionExprArg::FunctionExpr(func) => write!(f, "{func}"),
            FunctionExprArg::CurrentKey => write!(f, "#"),
        }
    }
}

impl FunctionExprArg {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Evaluate Function Arg", level = "trace", parent = None, skip(ctx), ret))]
    fn evaluate<'b>(
        &self,
        current: &'b Value,
        key: Option<&PathElement<'b>>,
        ctx: &EvalContext<'b>,
    ) -> Result<TypedValue<'b>, QueryError> {
        match self {
            FunctionExprArg::Literal(lit) => Ok(lit.to_typed()),
            FunctionExprArg::SingularQuery(q) => Ok(match q.eval_query(current, ctx) {
                Some(n) => TypedValue::Value(Cow::Borrowed(n)),
                None => TypedValue::Nothing,
            }),
            FunctionExprArg::FilterQuery(q) => {
                Ok(TypedValue::Nodes(q.query_values(current, ctx)?))
            }
            FunctionExprArg::LogicalExpr(l) => {
                Ok(TypedValue::Logical(l.test_filter(current, key, ctx)?))
            }
            FunctionExprArg::FunctionExpr(f) => f.evaluate(current, key, ctx),
            FunctionExprArg::CurrentKey => Ok(key_to_typed(key)),
        }
    }

    /// The static type of this argument, for well-typedness checks
    pub fn as_type_kind(&self) -> Result<FunctionArgType, FunctionValidationError> {
        match self {
            FunctionExprArg::Literal(_) => Ok(FunctionArgType::Value),
            FunctionExprArg::SingularQuery(_) => Ok(FunctionArgType::Node),
            FunctionExprArg::FilterQuery(query) => {
                if query.is_singular() {
                    Ok(FunctionArgType::Node)
                } else {
                    Ok(FunctionArgType::Nodelist)
                }
            }
            FunctionExprArg::LogicalExpr(_) => Ok(FunctionArgType::Logical),
            FunctionExprArg::FunctionExpr(func) => Ok(func.return_type),
            FunctionExprArg::CurrentKey => Ok(FunctionArgType::Value),
        }
    }
}

/// An error occurred while validating a function
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FunctionValidationError {
    /// Function not registered
    #[error("function name '{name}' is not defined")]
    Undefined {
        /// The name of the function
        name: String,
    },
    /// Mismatch in number of function arguments
    #[error("expected {expected} args, but received {received}")]
    NumberOfArgsMismatch {
        /// Expected number of arguments
        expected: usize,
        /// Received number of arguments
        received: usize,
    },
    /// The type of a received argument does not match the function definition
    #[error("in argument position {position}, expected a type that converts to {expected}, received {received}")]
    MismatchTypeKind {
        /// Expected type
        expected: FunctionArgType,
        /// Received type
        received: FunctionArgType,
        /// Argument position
        position: usize,
    },
    /// A function with an incorrect return type was used
    #[error("function with incorrect return type used")]
    IncorrectFunctionReturnType,
}

/// Validate a function's arity and argument types against its declared parameter list
pub fn validate_args(
    expected: &[FunctionArgType],
    args: &[FunctionExprArg],
) -> Result<(), FunctionValidationError> {
    if args.len() != expected.len() {
        return Err(FunctionValidationError::NumberOfArgsMismatch {
            expected: expected.len(),
            received: args.len(),
        });
    }
    for (position, (exp, arg)) in expected.iter().zip(args).enumerate() {
        let received = arg.as_type_kind()?;
        if !received.converts_to(*exp) {
            return Err(FunctionValidationError::MismatchTypeKind {
                expected: *exp,
                received,
                position,
            });
        }
    }
    Ok(())
}

fn value_length(value: &Value) -> TypedValue<'static> {
    match value {
        Value::String(s) => TypedValue::Value(Cow::Owned(Value::from(s.chars().count()))),
        Value::Array(a) => TypedValue::Value(Cow::Owned(Value::from(a.len()))),
        Value::Object(o) => TypedValue::Value(Cow::Owned(Value::from(o.len()))),
        _ => TypedValue::Nothing,
    }
}

static LENGTH_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        Ok(match args.pop_front() {
            Some(TypedValue::Value(v)) => value_length(&v),
            Some(TypedValue::Nodes(nodes)) if nodes.len() == 1 => value_length(&nodes[0]),
            _ => TypedValue::Nothing,
        })
    })
});

static LENGTH_VALIDATOR: Validator =
    Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Value], args)));

static COUNT_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        let count = match args.pop_front() {
            Some(TypedValue::Nodes(nodes)) => nodes.len(),
            Some(TypedValue::Value(_)) => 1,
            _ => 0,
        };
        Ok(TypedValue::Value(Cow::Owned(Value::from(count))))
    })
});

static COUNT_VALIDATOR: Validator =
    Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Nodelist], args)));

fn regex_test<'a>(
    mut args: VecDeque<TypedValue<'a>>,
    ctx: &FunctionContext,
    kind: PatternKind,
) -> Result<TypedValue<'a>, QueryError> {
    let haystack = args.pop_front().unwrap_or(TypedValue::Nothing);
    let pattern = args.pop_front().unwrap_or(TypedValue::Nothing);
    let (Some(haystack), Some(pattern)) = (
        haystack.as_value().and_then(Value::as_str),
        pattern.as_value().and_then(Value::as_str),
    ) else {
        return Ok(TypedValue::Logical(false));
    };
    let matched = match lookup_pattern(pattern, kind, ctx.iregexp_check, ctx.regex_debug)? {
        Some(regex) => regex.is_match(haystack),
        None => false,
    };
    Ok(TypedValue::Logical(matched))
}

static MATCH_EVALUATOR: Evaluator =
    Lazy::new(|| Box::new(|args, ctx| regex_test(args, ctx, PatternKind::FullMatch)));

static MATCH_VALIDATOR: Validator = Lazy::new(|| {
    Box::new(|args| validate_args(&[FunctionArgType::Value, FunctionArgType::Value], args))
});

static SEARCH_EVALUATOR: Evaluator =
    Lazy::new(|| Box::new(|args, ctx| regex_test(args, ctx, PatternKind::Search)));

static SEARCH_VALIDATOR: Validator = Lazy::new(|| {
    Box::new(|args| validate_args(&[FunctionArgType::Value, FunctionArgType::Value], args))
});

static VALUE_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        Ok(match args.pop_front() {
            Some(TypedValue::Nodes(mut nodes)) if nodes.len() == 1 => {
                TypedValue::Value(nodes.remove(0))
            }
            Some(value @ TypedValue::Value(_)) => value,
            _ => TypedValue::Nothing,
        })
    })
});

static VALUE_VALIDATOR: Validator =
    Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Nodelist], args)));

static KEYS_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        Ok(match args.pop_front() {
            Some(TypedValue::Value(v)) => match v.as_object() {
                Some(obj) => TypedValue::Value(Cow::Owned(Value::Array(
                    obj.keys().map(|k| Value::String(k.clone())).collect(),
                ))),
                None => TypedValue::Nothing,
            },
            _ => TypedValue::Nothing,
        })
    })
});

static KEYS_VALIDATOR: Validator =
    Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Value], args)));

/// The type name of a value, using JSON terminology
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn nodes_type_name(arg: &TypedValue) -> &'static str {
    match arg {
        TypedValue::Nodes(nodes) => match nodes.as_slice() {
            [] => "undefined",
            [node] => type_name(node),
            _ => "array",
        },
        TypedValue::Value(v) => type_name(v),
        TypedValue::Logical(_) => "boolean",
        TypedValue::Nothing => "undefined",
    }
}

static TYPEOF_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        let arg = args.pop_front().unwrap_or(TypedValue::Nothing);
        Ok(TypedValue::Value(Cow::Owned(Value::String(
            nodes_type_name(&arg).to_owned(),
        ))))
    })
});

static TYPEOF_VALIDATOR: Validator =
    Lazy::new(|| Box::new(|args| validate_args(&[FunctionArgType::Nodelist], args)));

fn type_name_matches(name: &'static str, alias: &str) -> bool {
    match name {
        "undefined" => matches!(alias, "undefined" | "missing"),
        "null" => matches!(alias, "null" | "nil" | "none"),
        "string" => matches!(alias, "string" | "str"),
        "array" => matches!(alias, "array" | "list" | "sequence"),
        "object" => matches!(alias, "object" | "mapping" | "dict"),
        "boolean" => matches!(alias, "boolean" | "bool"),
        "number" => matches!(alias, "number" | "int" | "float"),
        _ => false,
    }
}

static IS_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        let arg = args.pop_front().unwrap_or(TypedValue::Nothing);
        let alias = args.pop_front().unwrap_or(TypedValue::Nothing);
        Ok(match alias.as_value().and_then(Value::as_str) {
            Some(alias) => TypedValue::Logical(type_name_matches(nodes_type_name(&arg), alias)),
            None => TypedValue::Logical(false),
        })
    })
});

static IS_VALIDATOR: Validator = Lazy::new(|| {
    Box::new(|args| validate_args(&[FunctionArgType::Nodelist, FunctionArgType::Value], args))
});

static STARTSWITH_EVALUATOR: Evaluator = Lazy::new(|| {
    Box::new(|mut args, _ctx| {
        let value = args.pop_front().unwrap_or(TypedValue::Nothing);
        let prefix = args.pop_front().unwrap_or(TypedValue::Nothing);
        Ok(match (
            value.as_value().and_then(Value::as_str),
            prefix.as_value().and_then(Value::as_str),
        ) {
            (Some(value), Some(prefix)) => TypedValue::Logical(value.starts_with(prefix)),
            _ => TypedValue::Logical(false),
        })
    })
});

static STARTSWITH_VALIDATOR: Validator = Lazy::new(|| {
    Box::new(|args| validate_args(&[FunctionArgType::Value, FunctionArgType::Value], args))
});

static REGISTRY: Lazy<HashMap<&'static str, Function>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    for function in [
        Function::new(
            "length",
            FunctionArgType::Value,
            &LENGTH_EVALUATOR,
            &LENGTH_VALIDATOR,
        ),
        Function::new(
            "count",
            FunctionArgType::Value,
            &COUNT_EVALUATOR,
            &COUNT_VALIDATOR,
        ),
        Function::new(
            "match",
            FunctionArgType::Logical,
            &MATCH_EVALUATOR,
            &MATCH_VALIDATOR,
        ),
        Function::new(
            "search",
            FunctionArgType::Logical,
            &SEARCH_EVALUATOR,
            &SEARCH_VALIDATOR,
        ),
        Function::new(
            "value",
            FunctionArgType::Value,
            &VALUE_EVALUATOR,
            &VALUE_VALIDATOR,
        ),
        Function::new(
            "keys",
            FunctionArgType::Value,
            &KEYS_EVALUATOR,
            &KEYS_VALIDATOR,
        ),
        Function::new(
            "typeof",
            FunctionArgType::Value,
            &TYPEOF_EVALUATOR,
            &TYPEOF_VALIDATOR,
        ),
        Function::new("is", FunctionArgType::Logical, &IS_EVALUATOR, &IS_VALIDATOR),
        Function::new(
            "startswith",
            FunctionArgType::Logical,
            &STARTSWITH_EVALUATOR,
            &STARTSWITH_VALIDATOR,
        ),
    ] {
        registry.insert(function.name, function);
    }
    registry
});
