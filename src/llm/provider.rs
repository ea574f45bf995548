use async_trait::async_trait;

use crate::errors::RoverResult;
use crate::llm::types::{MessagesRequest, MessagesResponse};

/// Hosted decision model. One request in, one complete response out.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's identifier (used in logs).
    fn name(&self) -> &str;

    /// Sends a single non-streaming Messages request.
    /// Transport and API failures surface as `DecisionRequestFailed`.
    async fn create_message(&self, request: &MessagesRequest) -> RoverResult<MessagesResponse>;
}
