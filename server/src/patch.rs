//! Patch documents applied to a `TodoItemDto`.
//!
//! A patch document is an ordered list of JSON-Patch-shaped operations. They
//! are applied to an in-memory DTO only; the caller decides whether to copy
//! the result back onto the stored entity. Every operation is attempted and
//! every failure is reported, keyed by the operation's `path`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::TodoItemDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// A single operation of a patch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    /// Missing and `null` are treated alike.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchOperation {
    pub fn replace(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.to_string(),
            value: Some(value.into()),
            from: None,
        }
    }

    pub fn remove(path: &str) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.to_string(),
            value: None,
            from: None,
        }
    }
}

/// Per-path error messages from a rejected patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PatchErrors(BTreeMap<String, Vec<String>>);

impl PatchErrors {
    fn push(&mut self, path: &str, message: String) {
        self.0.entry(path.to_string()).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Name,
    IsComplete,
}

impl Field {
    /// Resolve a single-segment JSON pointer. Field names match
    /// case-insensitively, so `/isComplete` and `/IsComplete` are the same.
    fn parse(pointer: &str) -> Option<Self> {
        let segment = pointer.strip_prefix('/')?;
        if segment.eq_ignore_ascii_case("id") {
            Some(Self::Id)
        } else if segment.eq_ignore_ascii_case("name") {
            Some(Self::Name)
        } else if segment.eq_ignore_ascii_case("iscomplete")
            || segment.eq_ignore_ascii_case("is_complete")
        {
            Some(Self::IsComplete)
        } else {
            None
        }
    }

    fn read(self, dto: &TodoItemDto) -> Value {
        match self {
            Self::Id => Value::from(dto.id),
            Self::Name => dto.name.clone().map_or(Value::Null, Value::String),
            Self::IsComplete => Value::Bool(dto.is_complete),
        }
    }

    fn write(self, dto: &mut TodoItemDto, value: &Value) -> Result<(), String> {
        match self {
            // Writing the current id back is a no-op; anything else is rejected.
            Self::Id => match value.as_i64() {
                Some(id) if id == dto.id => Ok(()),
                _ => Err("the id field is read-only".to_string()),
            },
            Self::Name => match value {
                Value::Null => {
                    dto.name = None;
                    Ok(())
                }
                Value::String(name) => {
                    dto.name = Some(name.clone());
                    Ok(())
                }
                other => Err(format!("expected a string or null, got {other}")),
            },
            Self::IsComplete => match value.as_bool() {
                Some(done) => {
                    dto.is_complete = done;
                    Ok(())
                }
                None => Err(format!("expected a boolean, got {value}")),
            },
        }
    }

    fn reset(self, dto: &mut TodoItemDto) -> Result<(), String> {
        match self {
            Self::Id => Err("the id field cannot be removed".to_string()),
            Self::Name => {
                dto.name = None;
                Ok(())
            }
            Self::IsComplete => {
                dto.is_complete = false;
                Ok(())
            }
        }
    }
}

/// Apply `ops` in order to `dto`.
///
/// On `Err`, `dto` may be partially modified and must be discarded.
pub fn apply(dto: &mut TodoItemDto, ops: &[PatchOperation]) -> Result<(), PatchErrors> {
    let mut errors = PatchErrors::default();
    for op in ops {
        if let Err(message) = apply_one(dto, op) {
            errors.push(&op.path, message);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn apply_one(dto: &mut TodoItemDto, op: &PatchOperation) -> Result<(), String> {
    let target = Field::parse(&op.path).ok_or_else(|| format!("unknown field '{}'", op.path))?;
    let value = op.value.as_ref().unwrap_or(&Value::Null);

    match op.op {
        PatchOp::Add | PatchOp::Replace => target.write(dto, value),
        PatchOp::Remove => target.reset(dto),
        PatchOp::Test => {
            let current = target.read(dto);
            if current == *value {
                Ok(())
            } else {
                Err(format!("expected {value}, found {current}"))
            }
        }
        PatchOp::Copy => {
            let copied = source_field(op)?.read(dto);
            target.write(dto, &copied)
        }
        PatchOp::Move => {
            let source = source_field(op)?;
            if source == target {
                return Ok(());
            }
            let moved = source.read(dto);
            source.reset(dto)?;
            target.write(dto, &moved)
        }
    }
}

fn source_field(op: &PatchOperation) -> Result<Field, String> {
    let from = op
        .from
        .as_deref()
        .ok_or_else(|| "missing 'from' pointer".to_string())?;
    Field::parse(from).ok_or_else(|| format!("unknown field '{from}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dto() -> TodoItemDto {
        TodoItemDto {
            id: 1,
            name: Some("buy milk".to_string()),
            is_complete: false,
        }
    }

    fn ops(raw: Value) -> Vec<PatchOperation> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn empty_document_is_a_no_op() {
        let mut item = dto();
        apply(&mut item, &[]).unwrap();
        assert_eq!(item, dto());
    }

    #[test]
    fn replace_and_add_set_fields() {
        let mut item = dto();
        let doc = ops(json!([
            {"op": "replace", "path": "/isComplete", "value": true},
            {"op": "add", "path": "/name", "value": "buy oat milk"}
        ]));
        apply(&mut item, &doc).unwrap();
        assert!(item.is_complete);
        assert_eq!(item.name.as_deref(), Some("buy oat milk"));
    }

    #[test]
    fn paths_are_case_insensitive() {
        let mut item = dto();
        apply(&mut item, &[PatchOperation::replace("/IsComplete", true)]).unwrap();
        assert!(item.is_complete);
    }

    #[test]
    fn remove_resets_to_defaults() {
        let mut item = TodoItemDto {
            is_complete: true,
            ..dto()
        };
        apply(
            &mut item,
            &[PatchOperation::remove("/name"), PatchOperation::remove("/isComplete")],
        )
        .unwrap();
        assert_eq!(item.name, None);
        assert!(!item.is_complete);
    }

    #[test]
    fn replace_with_null_clears_name() {
        let mut item = dto();
        let doc = ops(json!([{"op": "replace", "path": "/name", "value": null}]));
        apply(&mut item, &doc).unwrap();
        assert_eq!(item.name, None);
    }

    #[test]
    fn operations_apply_in_order() {
        let mut item = dto();
        let doc = ops(json!([
            {"op": "replace", "path": "/name", "value": "first"},
            {"op": "test", "path": "/name", "value": "first"},
            {"op": "replace", "path": "/name", "value": "second"}
        ]));
        apply(&mut item, &doc).unwrap();
        assert_eq!(item.name.as_deref(), Some("second"));
    }

    #[test]
    fn id_may_only_be_rewritten_to_itself() {
        let mut item = dto();
        apply(&mut item, &[PatchOperation::replace("/id", 1)]).unwrap();

        let errors = apply(&mut item, &[PatchOperation::replace("/id", 2)]).unwrap_err();
        assert_eq!(errors.get("/id").unwrap(), ["the id field is read-only"]);

        let errors = apply(&mut item, &[PatchOperation::remove("/id")]).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let mut item = dto();
        let errors =
            apply(&mut item, &[PatchOperation::replace("/isComplete", "yes")]).unwrap_err();
        let messages = errors.get("/isComplete").unwrap();
        assert!(messages[0].starts_with("expected a boolean"));
    }

    #[test]
    fn unknown_path_is_reported() {
        let mut item = dto();
        let errors = apply(&mut item, &[PatchOperation::replace("/secret", "x")]).unwrap_err();
        assert_eq!(errors.get("/secret").unwrap(), ["unknown field '/secret'"]);
    }

    #[test]
    fn all_failures_are_collected() {
        let mut item = dto();
        let doc = ops(json!([
            {"op": "replace", "path": "/isComplete", "value": 3},
            {"op": "replace", "path": "/name", "value": "fine"},
            {"op": "replace", "path": "/name", "value": false},
            {"op": "remove", "path": "/owner"}
        ]));
        let errors = apply(&mut item, &doc).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("/name").unwrap().len(), 1);
    }

    #[test]
    fn failed_test_op_is_reported() {
        let mut item = dto();
        let doc = ops(json!([{"op": "test", "path": "/isComplete", "value": true}]));
        let errors = apply(&mut item, &doc).unwrap_err();
        assert_eq!(errors.get("/isComplete").unwrap(), ["expected true, found false"]);
    }

    #[test]
    fn copy_and_move_between_compatible_fields() {
        let mut item = dto();
        let doc = ops(json!([{"op": "copy", "from": "/name", "path": "/name"}]));
        apply(&mut item, &doc).unwrap();
        assert_eq!(item.name.as_deref(), Some("buy milk"));

        let doc = ops(json!([{"op": "move", "from": "/isComplete", "path": "/name"}]));
        let errors = apply(&mut item, &doc).unwrap_err();
        assert!(errors.get("/name").is_some());
    }

    #[test]
    fn move_without_from_is_reported() {
        let mut item = dto();
        let doc = ops(json!([{"op": "move", "path": "/name"}]));
        let errors = apply(&mut item, &doc).unwrap_err();
        assert_eq!(errors.get("/name").unwrap(), ["missing 'from' pointer"]);
    }

    #[test]
    fn unknown_op_fails_to_deserialize() {
        let result: Result<Vec<PatchOperation>, _> =
            serde_json::from_value(json!([{"op": "merge", "path": "/name"}]));
        assert!(result.is_err());
    }
}
