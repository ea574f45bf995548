use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::errors::{RoverError, RoverResult};
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ContentBlock, MessagesRequest, MessagesResponse};

pub struct AnthropicProvider {
    id: String,
    api_base: String,
    api_key: String,
    version: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(id: String, api_base: String, api_key: String, version: String) -> Self {
        Self {
            id,
            api_base,
            api_key,
            version,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(cfg: &LlmConfig) -> RoverResult<Self> {
        Ok(Self::new(
            "anthropic".into(),
            cfg.api_base.clone(),
            cfg.resolve_api_key()?,
            cfg.anthropic_version.clone(),
        ))
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn create_message(&self, request: &MessagesRequest) -> RoverResult<MessagesResponse> {
        let body = serde_json::to_value(request)?;

        tracing::debug!(
            provider = %self.id,
            model = %request.model,
            tools = request.tools.len(),
            "sending decision request"
        );
        tracing::debug!(body = %sanitized_body(&body), "request body (sanitized, base64 omitted)");

        let response = self
            .client
            .post(&self.api_base)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.version)
            .json(&body)
            .send()
            .await
            .map_err(|e| RoverError::DecisionRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(RoverError::DecisionRequestFailed(format!("{status}: {err_body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RoverError::DecisionRequestFailed(format!("response decode: {e}")))?;

        tracing::info!(
            id = %parsed.id,
            blocks = parsed.content.len(),
            tools = ?parsed
                .content
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolUse(tu) => Some(tu.name.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>(),
            stop_reason = ?parsed.stop_reason,
            "decision response received"
        );

        Ok(parsed)
    }
}

/// Clone the body and blank out image payloads so debug logs stay readable.
fn sanitized_body(body: &serde_json::Value) -> String {
    let mut log_body = body.clone();
    if let Some(msgs) = log_body.get_mut("messages").and_then(|m| m.as_array_mut()) {
        for msg in msgs {
            let Some(parts) = msg.get_mut("content").and_then(|c| c.as_array_mut()) else {
                continue;
            };
            for part in parts {
                if part.get("type").and_then(|t| t.as_str()) == Some("image") {
                    if let Some(data) = part.pointer_mut("/source/data") {
                        *data = serde_json::Value::String("<omitted_base64_image>".to_string());
                    }
                }
            }
        }
    }
    serde_json::to_string(&log_body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_body_hides_image_data_only() {
        let body = serde_json::json!({
            "model": "m",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "history"},
                    {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo"}}
                ]
            }]
        });
        let out = sanitized_body(&body);
        assert!(!out.contains("iVBORw0KGgo"));
        assert!(out.contains("<omitted_base64_image>"));
        assert!(out.contains("history"));
    }
}
