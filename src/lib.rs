//! Query and modify [`serde_json::Value`]s with JSONPath, JSON Pointer, and JSON Patch.
//!
//! The JSONPath engine intends to adhere to the IETF JSONPath standard
//! ([RFC 9535][rfc9535]), extended with a set of well-defined non-standard features that
//! can be switched off with strict mode. JSON Pointer follows [RFC 6901][rfc6901] and
//! JSON Patch follows [RFC 6902][rfc6902]; both cooperate with the JSONPath engine, so a
//! query result can be turned into a pointer and a pointer into a patch target.
//!
//! [rfc9535]: https://www.rfc-editor.org/rfc/rfc9535.html
//! [rfc6901]: https://datatracker.ietf.org/doc/html/rfc6901
//! [rfc6902]: https://datatracker.ietf.org/doc/html/rfc6902
//!
//! # Abstractions
//!
//! * The [`JsonPath`] struct: a parsed JSONPath query.
//! * The [`NodeList`] struct: the result of a query performed on a [`serde_json::Value`]
//!   using the [`JsonPath::query`] method, with each [`Node`] pairing a matched value
//!   with its [`NormalizedPath`] location.
//! * The [`Environment`] struct: configuration (strict mode, recursion limits, regular
//!   expression handling) shared by the queries it compiles.
//! * The [`Query`] struct: a fluent adapter over query results, created with the
//!   crate-level [`query`] function or [`Environment::query`].
//! * The [`JsonPointer`] and [`RelativeJsonPointer`] structs, and the [`JsonPatch`]
//!   struct built on top of them.
//!
//! # Usage
//!
//! ## Parsing and querying
//!
//! ```rust
//! use serde_json::json;
//! use serde_json_query::JsonPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({ "foo": { "bar": ["baz", 42] } });
//! let path = JsonPath::parse("$.foo.bar[0]")?;
//! let node = path.query(&value)?.exactly_one()?.value().clone();
//! assert_eq!(node, "baz");
//! # Ok(())
//! # }
//! ```
//!
//! Filter selectors allow logical expressions over the current node (`@`), the root
//! (`$`), and — non-standard — a filter context mapping (`#`) passed at query time:
//!
//! ```rust
//! # use serde_json::json;
//! # use serde_json_query::JsonPath;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({
//!     "threshold": 40,
//!     "readings": [
//!         { "val": 35, "msg": "foo" },
//!         { "val": 42, "msg": "biz" },
//!         { "val": 48, "msg": "bop" },
//!     ]
//! });
//! let path = JsonPath::parse("$.readings[? @.val > $.threshold ].msg")?;
//! let nodes = path.query(&value)?;
//! assert_eq!(nodes.all(), vec!["biz", "bop"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Node locations
//!
//! Every matched node carries its location as a [`NormalizedPath`], which converts to a
//! [`JsonPointer`]:
//!
//! ```rust
//! # use serde_json::json;
//! # use serde_json_query::JsonPath;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({"foo": {"bar": [1, 2, 3]}});
//! let path = JsonPath::parse("$..[? @ == 2]")?;
//! let nodes = path.query(&value)?;
//! let node = nodes.exactly_one()?;
//! assert_eq!(node.path(), "$['foo']['bar'][1]");
//! assert_eq!(node.pointer().to_string(), "/foo/bar/1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Patching
//!
//! ```rust
//! # use serde_json::json;
//! use serde_json_query::JsonPatch;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut value = json!({"foo": []});
//! let patch = JsonPatch::new()
//!     .add("/foo/-", json!(1))?
//!     .test("/foo/0", json!(1))?;
//! patch.apply(&mut value)?;
//! assert_eq!(value, json!({"foo": [1]}));
//! # Ok(())
//! # }
//! ```
//!
//! # Non-standard extensions
//!
//! The default (non-strict) grammar extends RFC 9535 with: a leading `$` being optional;
//! flexible whitespace after `.`; the keys selector (`~`) and keys filter (`~?`); the
//! `in`, `contains`, and `=~` filter operators with regex literals (`/pattern/flags`);
//! the `and`/`or`/`not`/`<>` operator aliases and `nil`/`none`/`undefined`/`missing`
//! literals; the current key identifier (`#`) and filter context queries (`#name`);
//! compound paths (`|` and `&`); embedded singular-query selectors; and index selectors
//! falling back to numeric-string keys on objects. [`JsonPath::parse_strict`], or an
//! [`Environment`] with strict mode enabled, rejects all of these.
//!
//! # Feature flags
//!
//! - `trace`: enable internal tracing via [tracing](https://docs.rs/tracing)
//! - `stream`: enable asynchronous `Stream` adapters over query results, via
//!   [futures](https://docs.rs/futures)

#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::todo,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::if_let_mutex,
    clippy::mismatched_target_os,
    clippy::await_holding_lock,
    clippy::match_on_vec_items,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::fn_params_excessive_bools,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    clippy::str_to_string,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    missing_debug_implementations,
    missing_docs
)]
#![deny(unreachable_pub)]
#![allow(elided_lifetimes_in_paths, clippy::type_complexity)]
#![forbid(unsafe_code)]

mod env;
mod error;
mod ext;
mod fluent;
mod node;
mod parser;
mod patch;
mod path;
mod pointer;
pub mod spec;

use serde_json::Value;

#[doc(inline)]
pub use env::Environment;
#[doc(inline)]
pub use error::{Error, ParseError, ParseErrorKind, QueryError};
#[doc(inline)]
pub use ext::JsonPathExt;
#[doc(inline)]
pub use fluent::{Projection, Query};
#[doc(inline)]
pub use node::{AtMostOneError, ExactlyOneError, Node, NodeList};
#[doc(inline)]
pub use patch::{JsonPatch, PatchError, PatchOp};
#[doc(inline)]
pub use path::JsonPath;
#[doc(inline)]
pub use pointer::{
    JsonPointer, PointerError, PointerOptions, PointerPart, RelativeJsonPointer,
};
#[doc(inline)]
pub use spec::path::{NormalizedPath, PathElement};

pub use spec::functions;

/// Prepare an internal representation of a JSONPath string, using the default environment
pub fn compile(path: &str) -> Result<JsonPath, ParseError> {
    JsonPath::parse(path)
}

/// Find all values in `value` matching the given JSONPath
///
/// # Example
/// ```rust
/// # use serde_json::json;
/// # fn main() -> Result<(), serde_json_query::Error> {
/// let value = json!({"foo": [1, 2, 3]});
/// assert_eq!(
///     serde_json_query::findall("$.foo[?@ > 1]", &value)?,
///     vec![json!(2), json!(3)],
/// );
/// # Ok(())
/// # }
/// ```
pub fn findall(path: &str, value: &Value) -> Result<Vec<Value>, Error> {
    env::DEFAULT_ENVIRONMENT.findall(path, value)
}

/// Produce the list of nodes matching the given JSONPath in `value`
pub fn finditer<'b>(path: &str, value: &'b Value) -> Result<NodeList<'b>, Error> {
    env::DEFAULT_ENVIRONMENT.finditer(path, value)
}

/// The first node matching the given JSONPath in `value`, or `None`
pub fn match_first<'b>(path: &str, value: &'b Value) -> Result<Option<Node<'b>>, Error> {
    env::DEFAULT_ENVIRONMENT.match_first(path, value)
}

/// Run a query and wrap the results in the fluent [`Query`] adapter
pub fn query<'b>(path: &str, value: &'b Value) -> Result<Query<'b>, Error> {
    env::DEFAULT_ENVIRONMENT.query(path, value)
}

/// Resolve a JSON Pointer string against a document
///
/// # Example
/// ```rust
/// # use serde_json::json;
/// # fn main() -> Result<(), serde_json_query::Error> {
/// let value = json!({"m~n": 8});
/// assert_eq!(serde_json_query::resolve("/m~0n", &value)?.as_ref(), &json!(8));
/// # Ok(())
/// # }
/// ```
pub fn resolve<'v>(
    pointer: &str,
    value: &'v Value,
) -> Result<std::borrow::Cow<'v, Value>, PointerError> {
    pointer::resolve(pointer, value)
}
