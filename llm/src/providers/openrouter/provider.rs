use crate::ModelProvider;
use crate::client::Client;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use super::chat::OpenRouterChatModel;
use super::chat::api::ListModelsResponse;

/// Provider for the OpenRouter chat-completion API.
///
/// OpenRouter speaks the OpenAI-compatible wire format, so the same
/// provider works against any endpoint exposing `/chat/completions`
/// and `/models` under a common base URL.
#[derive(Clone)]
pub struct OpenRouterProvider {
    client: Client,
    base_url: String,
}

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

impl OpenRouterProvider {
    pub fn default(api_key: &str) -> anyhow::Result<Self> {
        Self::new(DEFAULT_BASE_URL, api_key)
    }

    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| anyhow::anyhow!("API key contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(OpenRouterProvider {
            client: Client::with_headers(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }
}

#[async_trait]
impl ModelProvider for OpenRouterProvider {
    type ModelType = OpenRouterChatModel;

    async fn list_models(&self) -> anyhow::Result<Vec<crate::ModelDefinition>> {
        let response: ListModelsResponse = self.client.get(self.models_url()).await?;
        Ok(response.data.into_iter().map(|m| m.into()).collect())
    }

    fn create_chat_model(&self, model_name: &str) -> Self::ModelType {
        OpenRouterChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            model_name.to_string(),
        )
    }
}
