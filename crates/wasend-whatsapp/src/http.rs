//! reqwest-backed [`HttpClient`].

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use wasend_core::{
    error::WasendError,
    traits::{HttpClient, HttpMethod, HttpRequest},
};

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<Value, WasendError> {
        debug!("whatsapp: {} {}", request.method.as_str(), request.url);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // Raw bytes so the assembled Content-Type is the only one sent.
        if let Some(ref body) = request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                WasendError::Request(format!(
                    "timed out after {} ms",
                    request.timeout.as_millis()
                ))
            } else {
                WasendError::Request(e.to_string())
            }
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| WasendError::Request(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(WasendError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(parse_body(&text))
    }
}

/// JSON bodies are parsed, anything else passes through as a string.
pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn post(url: String, body: Value) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![
                ("Authorization".to_string(), "Bearer tok".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Test".to_string(), "1".to_string()),
            ],
            body: Some(body),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), json!({}));
        assert_eq!(parse_body("{\"ok\":true}"), json!({ "ok": true }));
        assert_eq!(parse_body("plain text"), json!("plain text"));
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v22.0/123/messages"))
            .and(header("authorization", "Bearer tok"))
            .and(header("content-type", "application/json"))
            .and(header("x-test", "1"))
            .and(body_json(json!({ "to": "+1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messaging_product": "whatsapp",
                "messages": [{ "id": "wamid.ABC" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestClient::new();
        let resp = client
            .send(post(
                format!("{}/v22.0/123/messages", server.uri()),
                json!({ "to": "+1" }),
            ))
            .await
            .unwrap();

        assert_eq!(resp["messages"][0]["id"], "wamid.ABC");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":{"message":"Invalid parameter"}}"#),
            )
            .mount(&server)
            .await;

        let err = ReqwestClient::new()
            .send(post(server.uri(), json!({})))
            .await
            .unwrap_err();

        match &err {
            WasendError::Http { status, body } => {
                assert_eq!(*status, 400);
                assert!(body.contains("Invalid parameter"));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("whatsapp api returned 400"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_request_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let mut req = post(server.uri(), json!({}));
        req.timeout = Duration::from_millis(50);
        let err = ReqwestClient::new().send(req).await.unwrap_err();

        assert!(matches!(err, WasendError::Request(_)), "got {err:?}");
        assert!(err.to_string().contains("timed out after 50 ms"));
    }

    #[tokio::test]
    async fn test_get_without_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v22.0/123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let req = HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/v22.0/123", server.uri()),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(5),
        };
        assert_eq!(ReqwestClient::new().send(req).await.unwrap(), json!("not json"));
    }
}
