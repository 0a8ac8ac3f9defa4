use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of workflow data flowing into the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub json: Map<String, Value>,
}

impl Item {
    /// Wrap a JSON object as an input item.
    pub fn new(json: Map<String, Value>) -> Self {
        Self { json }
    }

    /// Accept either the host envelope (`{"json": {...}}`) or a bare object.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut obj) => {
                if obj.len() == 1 && matches!(obj.get("json"), Some(Value::Object(_))) {
                    if let Some(Value::Object(inner)) = obj.remove("json") {
                        return Self { json: inner };
                    }
                }
                Self { json: obj }
            }
            _ => Self::default(),
        }
    }
}

/// Link from an output item back to the input it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output item: either the API response body or `{ "error": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub json: Value,
    pub paired_item: PairedItem,
}

impl ResultItem {
    pub fn success(index: usize, body: Value) -> Self {
        Self {
            json: body,
            paired_item: PairedItem { item: index },
        }
    }

    pub fn failure(index: usize, message: impl Into<String>) -> Self {
        Self {
            json: serde_json::json!({ "error": message.into() }),
            paired_item: PairedItem { item: index },
        }
    }

    /// The captured error message, if this item is a failure.
    pub fn error(&self) -> Option<&str> {
        self.json.get("error").and_then(Value::as_str)
    }
}
