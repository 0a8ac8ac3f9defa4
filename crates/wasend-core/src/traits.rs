use crate::{
    credentials::WhatsAppCredentials, error::WasendError, item::Item, params::PARAMETERS,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Ordered header list. Names compare case-insensitively on merge.
pub type Headers = Vec<(String, String)>;

/// HTTP verbs the node issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully assembled outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    /// JSON body, if any.
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP transport, supplied by the host.
///
/// Implementations return the parsed response body for 2xx responses and
/// an error for everything else.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Value, WasendError>;
}

/// Credential store, supplied by the host.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Look up a stored credential by its type name (e.g. `whatsAppApi`).
    async fn credentials(&self, name: &str) -> Result<WhatsAppCredentials, WasendError>;
}

/// Per-item parameter resolution, supplied by the host.
///
/// The host evaluates any expressions against `item` and hands back the
/// raw parameter object for item `index`.
pub trait ParameterSource: Send + Sync {
    fn parameters(&self, index: usize, item: &Item) -> Result<Value, WasendError>;
}

/// Credentials fixed at startup (config file, env, flags).
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub WhatsAppCredentials);

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self, _name: &str) -> Result<WhatsAppCredentials, WasendError> {
        Ok(self.0.clone())
    }
}

/// The same parameter object for every item.
#[derive(Debug, Clone)]
pub struct StaticParameters(pub Value);

impl ParameterSource for StaticParameters {
    fn parameters(&self, _index: usize, _item: &Item) -> Result<Value, WasendError> {
        Ok(self.0.clone())
    }
}

/// Base parameters, with any top-level parameter named in an item's JSON
/// (`phoneNumber`, `messageText`, ...) taking that item's value.
#[derive(Debug, Clone)]
pub struct ItemParameters(pub Value);

impl ParameterSource for ItemParameters {
    fn parameters(&self, _index: usize, item: &Item) -> Result<Value, WasendError> {
        let mut params = match &self.0 {
            Value::Object(obj) => obj.clone(),
            Value::Null => Default::default(),
            _ => {
                return Err(WasendError::Parameter(
                    "parameters must be a JSON object".to_string(),
                ))
            }
        };
        for spec in PARAMETERS.iter().filter(|p| p.is_top_level()) {
            if let Some(v) = item.json.get(spec.name) {
                params.insert(spec.name.to_string(), v.clone());
            }
        }
        Ok(Value::Object(params))
    }
}
