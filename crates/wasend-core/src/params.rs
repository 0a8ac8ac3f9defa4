//! Node parameter surface.
//!
//! The host-facing names (`phoneNumber`, `messageText`, `useButtons`,
//! `buttons`, `advancedOptions`) are kept verbatim so a parameter object
//! produced by a workflow host deserializes as-is. Visibility conditions
//! from the declaration table become conditional parsing: `buttons` is only
//! read when `useButtons` is set.

use crate::error::WasendError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// WhatsApp accepts at most this many reply buttons.
pub const MAX_BUTTONS: usize = 3;
/// WhatsApp truncates or rejects longer button titles.
pub const MAX_BUTTON_TITLE_CHARS: usize = 20;

/// Kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    MultilineString,
    Boolean,
    Number,
    Json,
    /// Repeatable group of fixed fields.
    FixedCollection,
    /// Bag of optional fields.
    Collection,
}

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Dotted path for nested options, e.g. `advancedOptions.timeout`.
    pub name: &'static str,
    pub display_name: &'static str,
    pub kind: ParameterKind,
    /// JSON literal.
    pub default: &'static str,
    pub required: bool,
    /// Only shown (and read) when the named boolean sibling is true.
    pub show_when: Option<&'static str>,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::MultilineString => "multilineString",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Number => "number",
            ParameterKind::Json => "json",
            ParameterKind::FixedCollection => "fixedCollection",
            ParameterKind::Collection => "collection",
        }
    }
}

impl ParameterSpec {
    pub fn default_value(&self) -> Value {
        serde_json::from_str(self.default).unwrap_or(Value::Null)
    }

    pub fn is_top_level(&self) -> bool {
        !self.name.contains('.')
    }
}

pub const PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec {
        name: "phoneNumber",
        display_name: "Phone Number",
        kind: ParameterKind::String,
        default: r#""""#,
        required: true,
        show_when: None,
    },
    ParameterSpec {
        name: "messageText",
        display_name: "Message Text",
        kind: ParameterKind::MultilineString,
        default: r#""""#,
        required: true,
        show_when: None,
    },
    ParameterSpec {
        name: "useButtons",
        display_name: "Interactive Buttons",
        kind: ParameterKind::Boolean,
        default: "false",
        required: false,
        show_when: None,
    },
    ParameterSpec {
        name: "buttons",
        display_name: "Add More Buttons",
        kind: ParameterKind::FixedCollection,
        default: r#"{"values":[{"buttonId":"btn_1","buttonTitle":"Option 1"}]}"#,
        required: false,
        show_when: Some("useButtons"),
    },
    ParameterSpec {
        name: "advancedOptions",
        display_name: "Advanced Options",
        kind: ParameterKind::Collection,
        default: "{}",
        required: false,
        show_when: None,
    },
    ParameterSpec {
        name: "advancedOptions.customHeaders",
        display_name: "Custom HTTP Headers",
        kind: ParameterKind::Json,
        default: r#""{}""#,
        required: false,
        show_when: None,
    },
    ParameterSpec {
        name: "advancedOptions.timeout",
        display_name: "Request Timeout (ms)",
        kind: ParameterKind::Number,
        default: "30000",
        required: false,
        show_when: None,
    },
    ParameterSpec {
        name: "advancedOptions.retryOnFail",
        display_name: "Retry on Failure",
        kind: ParameterKind::Boolean,
        default: "false",
        required: false,
        show_when: None,
    },
    ParameterSpec {
        name: "advancedOptions.maxRetries",
        display_name: "Max Retries",
        kind: ParameterKind::Number,
        default: "3",
        required: false,
        show_when: Some("advancedOptions.retryOnFail"),
    },
];

/// Look up a declared parameter by its (dotted) name.
pub fn parameter_spec(name: &str) -> Option<&'static ParameterSpec> {
    PARAMETERS.iter().find(|p| p.name == name)
}

/// One interactive reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonConfig {
    /// Returned in the webhook when the user taps the button.
    #[serde(default)]
    pub button_id: String,
    #[serde(default)]
    pub button_title: String,
}

/// Host shape of the repeatable `buttons` group.
#[derive(Debug, Clone, Default, Deserialize)]
struct ButtonCollection {
    #[serde(default)]
    values: Vec<ButtonConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ButtonsParam {
    List(Vec<ButtonConfig>),
    Collection(ButtonCollection),
}

/// `advancedOptions` collection. Every field is optional.
///
/// Built leniently: a value of the wrong type is dropped with a warning
/// rather than failing the item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedOptions {
    /// JSON object encoded as a string.
    pub custom_headers: Option<String>,
    /// Milliseconds. `0` means the default.
    pub timeout: Option<u64>,
    /// Declared but not acted on; no retries are performed.
    pub retry_on_fail: bool,
    /// Only read when `retry_on_fail` is shown.
    pub max_retries: Option<u32>,
}

impl AdvancedOptions {
    pub fn timeout(&self) -> Duration {
        match self.timeout {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// `maxRetries` only means something when `retryOnFail` is set.
    pub fn max_retries(&self) -> Option<u32> {
        self.retry_on_fail
            .then(|| self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES))
    }

    fn from_parameters(params: &Map<String, Value>) -> Self {
        let opts = match params.get("advancedOptions") {
            None | Some(Value::Null) => return Self::default(),
            Some(Value::Object(opts)) => opts,
            Some(other) => {
                warn!("advancedOptions is not an object ({other}), ignoring");
                return Self::default();
            }
        };

        let custom_headers = match opts.get("customHeaders") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                warn!("customHeaders is not a JSON string ({other}), ignoring");
                None
            }
        };

        let timeout = match opts.get("timeout") {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_f64() {
                Some(ms) if ms.is_finite() && ms > 0.0 => Some(ms.round() as u64),
                _ => {
                    warn!("timeout {v} is not a positive number, using {DEFAULT_TIMEOUT_MS} ms");
                    None
                }
            },
        };

        let retry_on_fail = opts.get("retryOnFail").is_some_and(truthy);

        let max_retries = if is_visible("advancedOptions.maxRetries", params) {
            opts.get("maxRetries")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
        } else {
            None
        };

        Self {
            custom_headers,
            timeout,
            retry_on_fail,
            max_retries,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameters {
    phone_number: Option<String>,
    message_text: Option<String>,
    #[serde(default)]
    use_buttons: bool,
}

/// Validated parameters for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParameters {
    pub phone_number: String,
    pub message_text: String,
    pub use_buttons: bool,
    /// Empty unless `use_buttons`.
    pub buttons: Vec<ButtonConfig>,
    pub advanced_options: AdvancedOptions,
}

impl NodeParameters {
    /// Parse and validate a raw parameter object.
    pub fn from_value(value: Value) -> Result<Self, WasendError> {
        let Value::Object(obj) = value else {
            return Err(WasendError::Parameter(
                "parameters must be a JSON object".to_string(),
            ));
        };
        check_required(&obj)?;

        let raw: RawParameters = serde_json::from_value(Value::Object(obj.clone()))
            .map_err(|e| WasendError::Parameter(format!("invalid parameters: {e}")))?;

        let buttons = if is_visible("buttons", &obj) {
            parse_buttons(obj.get("buttons").cloned())?
        } else {
            Vec::new()
        };

        Ok(Self {
            phone_number: raw.phone_number.unwrap_or_default(),
            message_text: raw.message_text.unwrap_or_default(),
            use_buttons: raw.use_buttons,
            buttons,
            advanced_options: AdvancedOptions::from_parameters(&obj),
        })
    }
}

/// Resolve a dotted path such as `advancedOptions.retryOnFail`.
fn lookup<'a>(obj: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = obj.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Whether a declared parameter is shown (and therefore read) given the
/// values of its `show_when` sibling. Unset siblings use their declared
/// default.
pub fn is_visible(name: &str, params: &Map<String, Value>) -> bool {
    let Some(cond) = parameter_spec(name).and_then(|s| s.show_when) else {
        return true;
    };
    match lookup(params, cond) {
        Some(v) => truthy(v),
        None => parameter_spec(cond).is_some_and(|s| truthy(&s.default_value())),
    }
}

/// Required top-level parameters must be present, strings, and non-blank.
fn check_required(obj: &Map<String, Value>) -> Result<(), WasendError> {
    for spec in PARAMETERS.iter().filter(|p| p.required && p.is_top_level()) {
        match obj.get(spec.name) {
            None | Some(Value::Null) => {
                return Err(WasendError::Parameter(format!(
                    "missing required parameter '{}'",
                    spec.name
                )));
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(WasendError::Parameter(format!(
                    "parameter '{}' must not be empty",
                    spec.name
                )));
            }
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(WasendError::Parameter(format!(
                    "parameter '{}' must be a string, got {other}",
                    spec.name
                )));
            }
        }
    }
    Ok(())
}

fn parse_buttons(value: Option<Value>) -> Result<Vec<ButtonConfig>, WasendError> {
    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => parameter_spec("buttons")
            .map(ParameterSpec::default_value)
            .unwrap_or(Value::Null),
    };

    let buttons = match serde_json::from_value::<ButtonsParam>(value)
        .map_err(|e| WasendError::Parameter(format!("invalid 'buttons' parameter: {e}")))?
    {
        ButtonsParam::List(list) => list,
        ButtonsParam::Collection(c) => c.values,
    };

    // Advisory only; the API is the one that enforces these.
    if buttons.len() > MAX_BUTTONS {
        warn!(
            "{} buttons configured, WhatsApp accepts at most {MAX_BUTTONS}",
            buttons.len()
        );
    }
    for b in &buttons {
        if b.button_title.chars().count() > MAX_BUTTON_TITLE_CHARS {
            warn!(
                "button '{}' title exceeds {MAX_BUTTON_TITLE_CHARS} characters",
                b.button_id
            );
        }
    }

    Ok(buttons)
}
