//! WhatsApp API credential descriptor.
//!
//! Declares the stored fields, how they authenticate a request, and the
//! request used to test them.

use crate::{
    error::WasendError,
    traits::{HttpMethod, HttpRequest},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Credential type name the node asks its provider for.
pub const CREDENTIAL_NAME: &str = "whatsAppApi";
pub const CREDENTIAL_DISPLAY_NAME: &str = "WhatsApp API";
pub const DOCUMENTATION_URL: &str =
    "https://developers.facebook.com/docs/whatsapp/cloud-api/get-started";

/// Graph API host.
pub const GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";
/// Graph API version path segment.
pub const GRAPH_API_VERSION: &str = "v22.0";

/// Default timeout for the credential test request.
const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One declared credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialField {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub required: bool,
    /// Rendered as a password input, never logged.
    pub secret: bool,
}

pub const CREDENTIAL_FIELDS: &[CredentialField] = &[
    CredentialField {
        name: "phoneNumberId",
        display_name: "Phone Number ID",
        description: "Your WhatsApp Phone Number ID from Meta Business Manager",
        required: true,
        secret: false,
    },
    CredentialField {
        name: "businessAccountId",
        display_name: "Business Account ID",
        description: "Your WhatsApp Business Account ID from Meta",
        required: true,
        secret: false,
    },
    CredentialField {
        name: "accessToken",
        display_name: "Access Token",
        description: "Your Meta Access Token with WhatsApp permissions",
        required: true,
        secret: true,
    },
];

/// Stored WhatsApp Cloud API credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppCredentials {
    #[serde(default)]
    pub phone_number_id: String,
    /// Stored for reference; the sender never reads it.
    #[serde(default)]
    pub business_account_id: String,
    #[serde(default)]
    pub access_token: String,
}

impl fmt::Debug for WhatsAppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppCredentials")
            .field("phone_number_id", &self.phone_number_id)
            .field("business_account_id", &self.business_account_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl WhatsAppCredentials {
    fn field_value(&self, name: &str) -> &str {
        match name {
            "phoneNumberId" => &self.phone_number_id,
            "businessAccountId" => &self.business_account_id,
            "accessToken" => &self.access_token,
            _ => "",
        }
    }

    /// Reject credentials with an empty required field.
    pub fn validate(&self) -> Result<(), WasendError> {
        let required: Vec<&str> = CREDENTIAL_FIELDS
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        self.require_fields(&required)
    }

    /// Reject credentials where any of the named fields is empty.
    pub fn require_fields(&self, names: &[&str]) -> Result<(), WasendError> {
        for name in names {
            if self.field_value(name).trim().is_empty() {
                return Err(WasendError::Credentials(format!(
                    "credential field '{name}' is empty"
                )));
            }
        }
        Ok(())
    }

    /// `Authorization` header carried by every authenticated request.
    pub fn authorization_header(&self) -> (String, String) {
        (
            "Authorization".to_string(),
            format!("Bearer {}", self.access_token),
        )
    }

    /// Versioned Graph API root, e.g. `https://graph.facebook.com/v22.0`.
    pub fn api_root(base_url: &str) -> String {
        format!("{}/{GRAPH_API_VERSION}", base_url.trim_end_matches('/'))
    }

    /// `GET {base}/v22.0/{phoneNumberId}?fields=display_phone_number`.
    pub fn test_request(&self, base_url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!(
                "{}/{}?fields=display_phone_number",
                Self::api_root(base_url),
                self.phone_number_id
            ),
            headers: vec![self.authorization_header()],
            body: None,
            timeout: TEST_TIMEOUT,
        }
    }
}
