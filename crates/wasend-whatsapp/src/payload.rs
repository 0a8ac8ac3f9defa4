//! Outbound message model and its Cloud API JSON encoding.

use serde::Serialize;
use serde_json::Value;
use wasend_core::{error::WasendError, params::NodeParameters};

/// One interactive reply button as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

/// A message ready to send to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text {
        to: String,
        body: String,
    },
    InteractiveButtons {
        to: String,
        body_text: String,
        /// Send order. Not checked against the 3-button limit.
        buttons: Vec<ReplyButton>,
    },
}

impl OutboundMessage {
    pub fn from_parameters(params: &NodeParameters) -> Self {
        if params.use_buttons {
            OutboundMessage::InteractiveButtons {
                to: params.phone_number.clone(),
                body_text: params.message_text.clone(),
                buttons: params
                    .buttons
                    .iter()
                    .map(|b| ReplyButton {
                        id: b.button_id.clone(),
                        title: b.button_title.clone(),
                    })
                    .collect(),
            }
        } else {
            OutboundMessage::Text {
                to: params.phone_number.clone(),
                body: params.message_text.clone(),
            }
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            OutboundMessage::Text { to, .. } | OutboundMessage::InteractiveButtons { to, .. } => to,
        }
    }

    /// Encode as the `/messages` request body.
    pub fn to_payload(&self) -> Result<Value, WasendError> {
        let content = match self {
            OutboundMessage::Text { body, .. } => WireContent::Text {
                text: WireTextBody { body },
            },
            OutboundMessage::InteractiveButtons {
                body_text, buttons, ..
            } => WireContent::Interactive {
                interactive: WireInteractive {
                    kind: "button",
                    body: WireInteractiveBody { text: body_text },
                    action: WireAction {
                        buttons: buttons
                            .iter()
                            .map(|reply| WireButton {
                                kind: "reply",
                                reply,
                            })
                            .collect(),
                    },
                },
            },
        };

        let payload = WirePayload {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: self.recipient(),
            content,
        };
        Ok(serde_json::to_value(payload)?)
    }
}

// --- Cloud API wire types ---

#[derive(Serialize)]
struct WirePayload<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(flatten)]
    content: WireContent<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireContent<'a> {
    Text { text: WireTextBody<'a> },
    Interactive { interactive: WireInteractive<'a> },
}

#[derive(Serialize)]
struct WireInteractive<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    body: WireInteractiveBody<'a>,
    action: WireAction<'a>,
}

#[derive(Serialize)]
struct WireTextBody<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct WireInteractiveBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct WireAction<'a> {
    buttons: Vec<WireButton<'a>>,
}

#[derive(Serialize)]
struct WireButton<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: &'a ReplyButton,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wasend_core::params::{AdvancedOptions, ButtonConfig};

    fn params(use_buttons: bool, buttons: &[(&str, &str)]) -> NodeParameters {
        NodeParameters {
            phone_number: "+15551234567".to_string(),
            message_text: "What would you like to update?".to_string(),
            use_buttons,
            buttons: buttons
                .iter()
                .map(|(id, title)| ButtonConfig {
                    button_id: id.to_string(),
                    button_title: title.to_string(),
                })
                .collect(),
            advanced_options: AdvancedOptions::default(),
        }
    }

    #[test]
    fn test_text_payload() {
        let msg = OutboundMessage::from_parameters(&params(false, &[]));
        assert_eq!(
            msg.to_payload().unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "+15551234567",
                "type": "text",
                "text": { "body": "What would you like to update?" }
            })
        );
    }

    #[test]
    fn test_interactive_payload_keeps_button_order() {
        let msg = OutboundMessage::from_parameters(&params(
            true,
            &[("btn_find", "Find Attractions"), ("btn_food", "Food"), ("btn_exit", "Exit")],
        ));
        assert_eq!(
            msg.to_payload().unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "+15551234567",
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": { "text": "What would you like to update?" },
                    "action": { "buttons": [
                        { "type": "reply", "reply": { "id": "btn_find", "title": "Find Attractions" } },
                        { "type": "reply", "reply": { "id": "btn_food", "title": "Food" } },
                        { "type": "reply", "reply": { "id": "btn_exit", "title": "Exit" } }
                    ]}
                }
            })
        );
    }

    #[test]
    fn test_interactive_payload_with_no_buttons() {
        let msg = OutboundMessage::from_parameters(&params(true, &[]));
        let payload = msg.to_payload().unwrap();
        assert_eq!(payload["type"], "interactive");
        assert_eq!(payload["interactive"]["action"]["buttons"], json!([]));
    }

    #[test]
    fn test_buttons_ignored_for_text_message() {
        // NodeParameters only carries buttons when use_buttons is set, but
        // the message builder must not depend on that.
        let msg = OutboundMessage::from_parameters(&params(false, &[("a", "A")]));
        assert!(matches!(msg, OutboundMessage::Text { .. }));
        assert_eq!(msg.recipient(), "+15551234567");
    }
}
