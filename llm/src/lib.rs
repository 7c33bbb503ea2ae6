use async_trait::async_trait;

pub mod api;
mod client;
pub mod providers;
pub use api::*;

#[derive(Clone, Debug)]
pub struct ModelDefinition {
    pub id: String,
}

impl ModelDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
pub trait ChatModel {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage>;
}

#[async_trait]
pub trait ModelProvider {
    type ModelType: ChatModel;

    // List available models from the provider.
    async fn list_models(&self) -> anyhow::Result<Vec<ModelDefinition>>;

    // Get a specific model by name.
    fn create_chat_model(&self, model_name: &str) -> Self::ModelType;
}
