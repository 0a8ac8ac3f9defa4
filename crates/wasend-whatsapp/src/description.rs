//! Static node metadata shown by workflow hosts.

use serde_json::{json, Value};
use wasend_core::{
    credentials::{CREDENTIAL_DISPLAY_NAME, CREDENTIAL_FIELDS, CREDENTIAL_NAME, DOCUMENTATION_URL},
    params::PARAMETERS,
};

/// Node identity and wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescription {
    pub display_name: &'static str,
    pub name: &'static str,
    pub version: u32,
    pub group: &'static str,
    pub description: &'static str,
    pub credential: &'static str,
    pub credential_required: bool,
}

pub const NODE: NodeDescription = NodeDescription {
    display_name: "WhatsApp",
    name: "whatsApp",
    version: 1,
    group: "output",
    description: "Send WhatsApp messages with buttons",
    credential: CREDENTIAL_NAME,
    credential_required: true,
};

/// Subtitle rendered under the node name.
pub fn subtitle(use_buttons: bool) -> &'static str {
    if use_buttons {
        "With Buttons"
    } else {
        "Text Message"
    }
}

/// Full declaration of the node: identity, parameter surface, and the
/// credential it needs.
pub fn describe() -> Value {
    let parameters: Vec<Value> = PARAMETERS
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "displayName": p.display_name,
                "type": p.kind.as_str(),
                "default": p.default_value(),
                "required": p.required,
                "showWhen": p.show_when,
            })
        })
        .collect();

    let fields: Vec<Value> = CREDENTIAL_FIELDS
        .iter()
        .map(|f| {
            json!({
                "name": f.name,
                "displayName": f.display_name,
                "description": f.description,
                "required": f.required,
                "secret": f.secret,
            })
        })
        .collect();

    json!({
        "displayName": NODE.display_name,
        "name": NODE.name,
        "version": NODE.version,
        "group": NODE.group,
        "description": NODE.description,
        "parameters": parameters,
        "credential": {
            "name": NODE.credential,
            "displayName": CREDENTIAL_DISPLAY_NAME,
            "documentationUrl": DOCUMENTATION_URL,
            "required": NODE.credential_required,
            "fields": fields,
        },
    })
}
