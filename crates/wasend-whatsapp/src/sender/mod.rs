//! WhatsApp message sender node.
//!
//! Items are sent strictly in order, one request at a time. Each input item
//! yields exactly one output item paired to its index, unless a failure
//! aborts the batch (continue-on-fail off).


use crate::{
    credential_test::{test_credentials, CredentialTestResult},
    description::subtitle,
    headers::build_headers,
    payload::OutboundMessage,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wasend_core::{
    credentials::{WhatsAppCredentials, CREDENTIAL_NAME, GRAPH_API_BASE_URL},
    error::WasendError,
    item::{Item, ResultItem},
    params::NodeParameters,
    traits::{CredentialProvider, HttpClient, HttpMethod, HttpRequest, ParameterSource},
};

/// Credential fields the sender actually reads.
const USED_CREDENTIAL_FIELDS: &[&str] = &["phoneNumberId", "accessToken"];

/// Sends one WhatsApp message per input item.
pub struct MessageSender {
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
}

impl MessageSender {
    pub fn new(http: Arc<dyn HttpClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http,
            credentials,
            base_url: GRAPH_API_BASE_URL.to_string(),
        }
    }

    /// Point at a different Graph API host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run the node over a batch of items.
    ///
    /// With `continue_on_fail`, per-item failures become
    /// `{ "error": <message> }` items. Without it, the first failure is
    /// returned and the remaining items are not sent.
    pub async fn execute(
        &self,
        items: &[Item],
        params: &dyn ParameterSource,
        continue_on_fail: bool,
    ) -> Result<Vec<ResultItem>, WasendError> {
        info!("whatsapp: sending {} item(s)", items.len());

        let mut results = Vec::with_capacity(items.len());
        let mut retry_warned = false;

        for (i, item) in items.iter().enumerate() {
            match self.send_item(i, item, params, &mut retry_warned).await {
                Ok(body) => results.push(ResultItem::success(i, body)),
                Err(e) if continue_on_fail => {
                    warn!("whatsapp: item {i} failed: {e}");
                    results.push(ResultItem::failure(i, e.to_string()));
                }
                Err(e) => {
                    error!("whatsapp: item {i} failed, aborting batch: {e}");
                    return Err(e);
                }
            }
        }

        let failed = results.iter().filter(|r| r.error().is_some()).count();
        info!(
            "whatsapp: batch done, {} sent, {failed} failed",
            results.len() - failed
        );
        Ok(results)
    }

    /// Check the stored credentials against the Graph API.
    pub async fn test_credentials(&self) -> Result<CredentialTestResult, WasendError> {
        let creds = self.credentials.credentials(CREDENTIAL_NAME).await?;
        Ok(test_credentials(self.http.as_ref(), &creds, &self.base_url).await)
    }

    async fn send_item(
        &self,
        index: usize,
        item: &Item,
        params: &dyn ParameterSource,
        retry_warned: &mut bool,
    ) -> Result<Value, WasendError> {
        let params = NodeParameters::from_value(params.parameters(index, item)?)?;

        if params.advanced_options.retry_on_fail && !*retry_warned {
            warn!("whatsapp: retryOnFail is set but retries are not performed");
            *retry_warned = true;
        }

        let creds = self.credentials.credentials(CREDENTIAL_NAME).await?;
        creds.require_fields(USED_CREDENTIAL_FIELDS)?;

        let request = build_message_request(&params, &creds, &self.base_url)?;
        debug!(
            "whatsapp: item {index} -> {} ({})",
            params.phone_number,
            subtitle(params.use_buttons)
        );

        self.http.send(request).await
    }
}

/// `POST {base}/v22.0/{phoneNumberId}/messages` for one item.
pub fn build_message_request(
    params: &NodeParameters,
    credentials: &WhatsAppCredentials,
    base_url: &str,
) -> Result<HttpRequest, WasendError> {
    let message = OutboundMessage::from_parameters(params);
    let opts = &params.advanced_options;

    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: format!(
            "{}/{}/messages",
            WhatsAppCredentials::api_root(base_url),
            credentials.phone_number_id
        ),
        headers: build_headers(credentials, opts.custom_headers.as_deref()),
        body: Some(message.to_payload()?),
        timeout: opts.timeout(),
    })
}
