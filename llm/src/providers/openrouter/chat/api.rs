use crate::api::{ChatMessage, ChatRequest, Role};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<&ChatMessage> for Message {
    fn from(msg: &ChatMessage) -> Self {
        Message {
            role: msg.role,
            content: Some(msg.content.clone()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

impl ChatCompletionRequest {
    pub fn from_request(model: String, request: &ChatRequest) -> Self {
        ChatCompletionRequest {
            model,
            messages: request.messages().iter().map(|m| m.into()).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionChoice {
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatCompletionChoice>,
}

impl ChatCompletionResponse {
    /// Extract the assistant message at `choices[0]`.
    ///
    /// A response with no choices or a null content is malformed and is
    /// reported as an error rather than indexed into.
    pub fn into_message(self) -> anyhow::Result<ChatMessage> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Completion response contained no choices"))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| anyhow::anyhow!("Completion response contained no message content"))?;
        Ok(ChatMessage::new(choice.message.role, content))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Model {
    pub id: String,
}

impl From<Model> for crate::ModelDefinition {
    fn from(model: Model) -> Self {
        crate::ModelDefinition::new(model.id)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListModelsResponse {
    pub data: Vec<Model>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let messages = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let request =
            ChatCompletionRequest::from_request("deepseek/deepseek-chat-v3-0324:free".into(), &ChatRequest::new(&messages));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek/deepseek-chat-v3-0324:free");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["messages"][1]["role"], "assistant");
    }

    #[test]
    fn test_response_reads_first_choice() {
        let body = serde_json::json!({
            "id": "gen-123",
            "model": "deepseek/deepseek-chat-v3-0324:free",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there."},
                "finish_reason": "stop"
            }]
        });

        let response: ChatCompletionResponse = serde_json::from_value(body).unwrap();
        let message = response.into_message().unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Hello there.");
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let body = serde_json::json!({"choices": []});
        let response: ChatCompletionResponse = serde_json::from_value(body).unwrap();
        assert!(response.into_message().is_err());
    }

    #[test]
    fn test_null_content_is_an_error() {
        let body = serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant"}, "finish_reason": null}]
        });
        let response: ChatCompletionResponse = serde_json::from_value(body).unwrap();
        assert!(response.into_message().is_err());
    }
}
