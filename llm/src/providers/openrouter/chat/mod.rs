pub mod api;

use crate::client::Client;
use crate::{ChatMessage, ChatModel, ChatRequest};
use async_trait::async_trait;

use api::{ChatCompletionRequest, ChatCompletionResponse};

/// A chat model bound to one fixed model identifier on an
/// OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenRouterChatModel {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenRouterChatModel {
    pub fn new(client: Client, base_url: String, model: String) -> Self {
        Self {
            client,
            base_url,
            model,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenRouterChatModel {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
        let body = ChatCompletionRequest::from_request(self.model.clone(), request);
        let response: ChatCompletionResponse = self.client.post(self.chat_url(), &body).await?;
        response.into_message()
    }
}
