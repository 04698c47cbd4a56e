//! JSON Patch (RFC 6902) support
//!
//! A [`JsonPatch`] is a sequence of operations applied in order to a mutable
//! [`serde_json::Value`]. Patches deserialize from the standard JSON representation and
//! can also be built with the chainable [`add`][JsonPatch::add],
//! [`remove`][JsonPatch::remove], etc. methods.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pointer::{JsonPointer, PointerError, PointerPart};
use crate::spec::selector::filter::value_equal_to;

/// Error produced while building or applying a JSON Patch
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// An operation could not be applied; the message is decorated with the name and
    /// index of the failed operation
    #[error("{msg} ({op}:{index})")]
    Apply {
        /// What went wrong
        msg: String,
        /// The name of the failed operation
        op: &'static str,
        /// The position of the failed operation within the patch
        index: usize,
    },
    /// A `test` operation did not pass
    #[error("test failed (test:{index})")]
    TestFailure {
        /// The position of the failed operation within the patch
        index: usize,
    },
    /// A pointer used to build a patch operation was malformed
    #[error(transparent)]
    Pointer(#[from] PointerError),
}

/// One of the six JSON Patch operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Add a value at the target location, inserting into arrays
    Add {
        /// Where to add the value
        path: JsonPointer,
        /// The value to add
        value: Value,
    },
    /// Remove the value at the target location, which must exist
    Remove {
        /// What to remove
        path: JsonPointer,
    },
    /// Replace the value at the target location, which must exist
    Replace {
        /// What to replace
        path: JsonPointer,
        /// The replacement value
        value: Value,
    },
    /// Move the value at `from` to the target location
    Move {
        /// The location to move from
        from: JsonPointer,
        /// Where to move it to
        path: JsonPointer,
    },
    /// Copy the value at `from` to the target location
    Copy {
        /// The location to copy from
        from: JsonPointer,
        /// Where to copy it to
        path: JsonPointer,
    },
    /// Test that the value at the target location equals the given value
    Test {
        /// What to test
        path: JsonPointer,
        /// The expected value
        value: Value,
    },
}

impl PatchOp {
    fn name(&self) -> &'static str {
        match self {
            PatchOp::Add { .. } => "add",
            PatchOp::Remove { .. } => "remove",
            PatchOp::Replace { .. } => "replace",
            PatchOp::Move { .. } => "move",
            PatchOp::Copy { .. } => "copy",
            PatchOp::Test { .. } => "test",
        }
    }
}

/// A JSON Patch: a sequence of operations to apply to a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPatch(Vec<PatchOp>);

impl JsonPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// The operations making up this patch
    pub fn ops(&self) -> &[PatchOp] {
        &self.0
    }

    /// Append an `add` operation to this patch
    pub fn add(mut self, path: &str, value: Value) -> Result<Self, PatchError> {
        self.0.push(PatchOp::Add {
            path: JsonPointer::parse(path)?,
            value,
        });
        Ok(self)
    }

    /// Append a `remove` operation to this patch
    pub fn remove(mut self, path: &str) -> Result<Self, PatchError> {
        self.0.push(PatchOp::Remove {
            path: JsonPointer::parse(path)?,
        });
        Ok(self)
    }

    /// Append a `replace` operation to this patch
    pub fn replace(mut self, path: &str, value: Value) -> Result<Self, PatchError> {
        self.0.push(PatchOp::Replace {
            path: JsonPointer::parse(path)?,
            value,
        });
        Ok(self)
    }

    /// Append a `move` operation to this patch
    pub fn move_(mut self, from: &str, path: &str) -> Result<Self, PatchError> {
        self.0.push(PatchOp::Move {
            from: JsonPointer::parse(from)?,
            path: JsonPointer::parse(path)?,
        });
        Ok(self)
    }

    /// Append a `copy` operation to this patch
    pub fn copy(mut self, from: &str, path: &str) -> Result<Self, PatchError> {
        self.0.push(PatchOp::Copy {
            from: JsonPointer::parse(from)?,
            path: JsonPointer::parse(path)?,
        });
        Ok(self)
    }

    /// Append a `test` operation to this patch
    pub fn test(mut self, path: &str, value: Value) -> Result<Self, PatchError> {
        self.0.push(PatchOp::Test {
            path: JsonPointer::parse(path)?,
            value,
        });
        Ok(self)
    }

    /// Apply this patch to a document, in place
    ///
    /// Operations are applied in order; the first failure aborts the patch with an error
    /// naming the operation and its index. The document may have been partially modified
    /// when an error is returned, as per RFC 6902 the result should then be discarded.
    pub fn apply(&self, data: &mut Value) -> Result<(), PatchError> {
        for (index, op) in self.0.iter().enumerate() {
            apply_op(op, data).map_err(|e| match e {
                OpError::Test => PatchError::TestFailure { index },
                OpError::Fail(msg) => PatchError::Apply {
                    msg,
                    op: op.name(),
                    index,
                },
            })?;
        }
        Ok(())
    }

    /// Apply this patch to a clone of the document, returning the patched clone
    pub fn apply_to(&self, data: &Value) -> Result<Value, PatchError> {
        let mut patched = data.clone();
        self.apply(&mut patched)?;
        Ok(patched)
    }
}

enum OpError {
    Test,
    Fail(String),
}

impl From<PointerError> for OpError {
    fn from(e: PointerError) -> Self {
        OpError::Fail(e.to_string())
    }
}

fn apply_op(op: &PatchOp, data: &mut Value) -> Result<(), OpError> {
    match op {
        PatchOp::Add { path, value } => add_at(data, path, value.clone()),
        PatchOp::Remove { path } => remove_at(data, path).map(|_| ()),
        PatchOp::Replace { path, value } => {
            if path.parts().is_empty() {
                *data = value.clone();
                return Ok(());
            }
            let parent = resolve_parent_mut(data, path)?;
            let last = last_part(path);
            match parent {
                Value::Array(list) => {
                    let idx = existing_index(list.len(), last)
                        .ok_or_else(|| OpError::Fail(String::from("can't replace nonexistent item")))?;
                    list[idx] = value.clone();
                }
                Value::Object(obj) => {
                    let key = part_key(last);
                    let slot = obj.get_mut(key.as_ref()).ok_or_else(|| {
                        OpError::Fail(String::from("can't replace nonexistent property"))
                    })?;
                    *slot = value.clone();
                }
                _ => return Err(unexpected_target()),
            }
            Ok(())
        }
        PatchOp::Move { from, path } => {
            if path.is_relative_to(from) {
                return Err(OpError::Fail(String::from(
                    "can't move object to one of its own children",
                )));
            }
            let source = remove_at(data, from)
                .map_err(|_| OpError::Fail(String::from("source object does not exist")))?;
            add_at(data, path, source)
        }
        PatchOp::Copy { from, path } => {
            let source = from
                .resolve(data)
                .map_err(|_| OpError::Fail(String::from("source object does not exist")))?
                .into_owned();
            add_at(data, path, source)
        }
        PatchOp::Test { path, value } => {
            let found = path.resolve(data).map_err(|_| OpError::Test)?;
            if value_equal_to(&found, value) {
                Ok(())
            } else {
                Err(OpError::Test)
            }
        }
    }
}

fn unexpected_target() -> OpError {
    OpError::Fail(String::from("unexpected operation on a scalar value"))
}

fn last_part(pointer: &JsonPointer) -> &PointerPart {
    // callers check that the pointer is not empty
    &pointer.parts()[pointer.parts().len() - 1]
}

fn part_key(part: &PointerPart) -> std::borrow::Cow<'_, str> {
    match part {
        PointerPart::Name(s) => std::borrow::Cow::Borrowed(s.as_str()),
        PointerPart::Index(i) => std::borrow::Cow::Owned(i.to_string()),
    }
}

/// Normalize a part to an index of an existing array element
fn existing_index(len: usize, part: &PointerPart) -> Option<usize> {
    match part {
        PointerPart::Index(i) if *i < 0 => usize::try_from(len as i64 + i).ok().filter(|&i| i < len),
        PointerPart::Index(i) => usize::try_from(*i).ok().filter(|&i| i < len),
        PointerPart::Name(_) => None,
    }
}

/// Walk to the parent of the value a pointer addresses, mutably
fn resolve_parent_mut<'v>(
    data: &'v mut Value,
    pointer: &JsonPointer,
) -> Result<&'v mut Value, OpError> {
    let mut current = data;
    let parts = pointer.parts();
    for part in &parts[..parts.len() - 1] {
        current = match current {
            Value::Object(obj) => obj
                .get_mut(part_key(part).as_ref())
                .ok_or_else(|| OpError::from(PointerError::Key(part.to_string())))?,
            Value::Array(list) => {
                let len = list.len();
                let idx = existing_index(len, part)
                    .ok_or_else(|| OpError::from(PointerError::Index(part.to_string())))?;
                &mut list[idx]
            }
            _ => return Err(unexpected_target()),
        };
    }
    Ok(current)
}

/// Add `value` at `pointer`, with array insert and `-`/length append semantics
fn add_at(data: &mut Value, pointer: &JsonPointer, value: Value) -> Result<(), OpError> {
    if pointer.parts().is_empty() {
        *data = value;
        return Ok(());
    }
    let parent = resolve_parent_mut(data, pointer)?;
    let last = last_part(pointer);
    match parent {
        Value::Array(list) => match last {
            PointerPart::Name(name) if name == "-" => {
                list.push(value);
                Ok(())
            }
            PointerPart::Index(i) => {
                let idx = if *i < 0 { list.len() as i64 + i } else { *i };
                match usize::try_from(idx).ok().filter(|&i| i <= list.len()) {
                    Some(idx) => {
                        list.insert(idx, value);
                        Ok(())
                    }
                    None => Err(OpError::Fail(String::from("index out of range"))),
                }
            }
            PointerPart::Name(_) => Err(OpError::Fail(String::from(
                "expected an array index or '-'",
            ))),
        },
        Value::Object(obj) => {
            obj.insert(part_key(last).into_owned(), value);
            Ok(())
        }
        _ => Err(unexpected_target()),
    }
}

/// Remove and return the value at `pointer`
fn remove_at(data: &mut Value, pointer: &JsonPointer) -> Result<Value, OpError> {
    if pointer.parts().is_empty() {
        return Err(OpError::Fail(String::from("can't remove root")));
    }
    let parent = resolve_parent_mut(data, pointer)?;
    let last = last_part(pointer);
    match parent {
        Value::Array(list) => {
            let idx = existing_index(list.len(), last)
                .ok_or_else(|| OpError::Fail(String::from("can't remove nonexistent item")))?;
            Ok(list.remove(idx))
        }
        Value::Object(obj) => obj
            .shift_remove(part_key(last).as_ref())
            .ok_or_else(|| OpError::Fail(String::from("can't remove nonexistent property"))),
        _ => Err(unexpected_target()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{JsonPatch, PatchError};

    #[test]
    fn rfc_6902_appendix_examples() {
        // A.1. Adding an object member
        let mut value = json!({"foo": "bar"});
        let patch: JsonPatch =
            serde_json::from_value(json!([{"op": "add", "path": "/baz", "value": "qux"}]))
                .unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"foo": "bar", "baz": "qux"}));

        // A.2. Adding an array element
        let mut value = json!({"foo": ["bar", "baz"]});
        let patch: JsonPatch =
            serde_json::from_value(json!([{"op": "add", "path": "/foo/1", "value": "qux"}]))
                .unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"foo": ["bar", "qux", "baz"]}));

        // A.3. Removing an object member
        let mut value = json!({"baz": "qux", "foo": "bar"});
        let patch: JsonPatch =
            serde_json::from_value(json!([{"op": "remove", "path": "/baz"}])).unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"foo": "bar"}));

        // A.5. Replacing a value
        let mut value = json!({"baz": "qux", "foo": "bar"});
        let patch: JsonPatch = serde_json::from_value(
            json!([{"op": "replace", "path": "/baz", "value": "boo"}]),
        )
        .unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"baz": "boo", "foo": "bar"}));

        // A.6. Moving a value
        let mut value = json!({
            "foo": {"bar": "baz", "waldo": "fred"},
            "qux": {"corge": "grault"}
        });
        let patch: JsonPatch = serde_json::from_value(
            json!([{"op": "move", "from": "/foo/waldo", "path": "/qux/thud"}]),
        )
        .unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(
            value,
            json!({
                "foo": {"bar": "baz"},
                "qux": {"corge": "grault", "thud": "fred"}
            })
        );

        // A.7. Moving an array element
        let mut value = json!({"foo": ["all", "grass", "cows", "eat"]});
        let patch: JsonPatch = serde_json::from_value(
            json!([{"op": "move", "from": "/foo/1", "path": "/foo/3"}]),
        )
        .unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"foo": ["all", "cows", "eat", "grass"]}));
    }

    #[test]
    fn add_appends_with_dash_and_length() {
        let mut value = json!({"foo": []});
        let patch = JsonPatch::new().add("/foo/-", json!(1)).unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"foo": [1]}));

        let patch = JsonPatch::new().add("/foo/1", json!(2)).unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!({"foo": [1, 2]}));

        let patch = JsonPatch::new().add("/foo/9", json!(3)).unwrap();
        assert!(matches!(
            patch.apply(&mut value),
            Err(PatchError::Apply { op: "add", index: 0, .. })
        ));
    }

    #[test]
    fn test_op_failure_is_distinct() {
        let mut value = json!({"baz": "qux"});
        let patch = JsonPatch::new().test("/baz", json!("bar")).unwrap();
        assert_eq!(
            patch.apply(&mut value),
            Err(PatchError::TestFailure { index: 0 })
        );
        let patch = JsonPatch::new().test("/baz", json!("qux")).unwrap();
        assert!(patch.apply(&mut value).is_ok());
    }

    #[test]
    fn move_into_own_child_is_refused() {
        let mut value = json!({"foo": {"bar": 1}});
        let patch = JsonPatch::new().move_("/foo", "/foo/bar").unwrap();
        assert!(matches!(
            patch.apply(&mut value),
            Err(PatchError::Apply { op: "move", .. })
        ));
    }

    #[test]
    fn root_replacement() {
        let mut value = json!({"foo": 1});
        let patch = JsonPatch::new().add("", json!([1, 2, 3])).unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn builder_chains() {
        let mut value = json!({"some": {"other": "thing"}});
        let patch = JsonPatch::new()
            .add("/some/foo", json!({"bar": []}))
            .unwrap()
            .add("/some/foo/bar/-", json!(1))
            .unwrap()
            .copy("/some/other", "/some/foo/else")
            .unwrap()
            .move_("/some/foo", "/some/bar")
            .unwrap();
        patch.apply(&mut value).unwrap();
        assert_eq!(
            value,
            json!({"some": {"other": "thing", "bar": {"bar": [1], "else": "thing"}}})
        );
    }

    #[test]
    fn errors_carry_the_op_index() {
        let mut value = json!({});
        let patch: JsonPatch = serde_json::from_value(json!([
            {"op": "add", "path": "/a", "value": 1},
            {"op": "remove", "path": "/b"}
        ]))
        .unwrap();
        let err = patch.apply(&mut value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "can't remove nonexistent property (remove:1)"
        );
    }

    #[test]
    fn serialize_round_trip() {
        let patch = JsonPatch::new()
            .add("/foo", json!(1))
            .unwrap()
            .test("/foo", json!(1))
            .unwrap();
        let round_tripped: JsonPatch =
            serde_json::from_value(serde_json::to_value(&patch).unwrap()).unwrap();
        assert_eq!(patch, round_tripped);
    }
}
