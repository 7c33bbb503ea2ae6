//! Drives one exchange at a time against a `ChatModel`

use crate::input::UserInput;
use crate::session::{EditError, Session, Turn};
use llm::{ChatMessage, ChatModel, ChatRequest};

/// A session bound to a chat model.
///
/// Owns the turn history and one boxed model; the model can be swapped at
/// runtime while the history is preserved. Every request replays the entire
/// history to date.
///
/// Completion failures are not surfaced as errors: the failure's string
/// form becomes the assistant turn, indistinguishable from a real answer in
/// the transcript. Each `send` therefore grows the session by exactly two
/// turns.
pub struct Conversation {
    session: Session,
    model: Box<dyn ChatModel + Send + Sync>,
    system_message: Option<String>,
}

impl Conversation {
    pub fn new(model: impl ChatModel + Send + Sync + 'static) -> Self {
        Conversation {
            session: Session::new(),
            model: Box::new(model),
            system_message: None,
        }
    }

    pub fn with_system_message(
        model: impl ChatModel + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Conversation {
            session: Session::new(),
            model: Box::new(model),
            system_message: Some(message.into()),
        }
    }

    /// Swap the model, preserving the conversation history.
    pub fn set_model(&mut self, model: impl ChatModel + Send + Sync + 'static) {
        self.model = Box::new(model);
    }

    pub fn turns(&self) -> &[Turn] {
        self.session.turns()
    }

    pub fn turn_count(&self) -> usize {
        self.session.len()
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// Check the edit preconditions without changing anything.
    pub fn validate_edit(&self, index: usize) -> Result<(), EditError> {
        self.session.validate_edit(index)
    }

    /// Submit one user turn and append the model's reply.
    ///
    /// The returned turn is the assistant turn just appended; on completion
    /// failure its content is the error's string form.
    pub async fn send(&mut self, input: UserInput) -> Turn {
        self.session.append(Turn::user(input));
        let reply = self.complete(self.session.turns()).await;
        let turn = Turn::assistant(reply);
        self.session.append(turn.clone());
        turn
    }

    /// Edit the user turn at `index` and regenerate its paired assistant
    /// turn.
    ///
    /// The model sees the history up to and including the edited turn; the
    /// assistant turn at `index + 1` is overwritten with the regenerated
    /// reply (or the error's string form, uniform with `send`). All other
    /// turns are untouched.
    pub async fn resend_edited(
        &mut self,
        index: usize,
        new_content: impl Into<String>,
    ) -> Result<Turn, EditError> {
        self.session.edit(index, new_content)?;
        let reply = self.complete(self.session.context_before(index + 1)).await;
        self.session.replace_assistant(index + 1, reply.clone())?;
        Ok(Turn::assistant(reply))
    }

    async fn complete(&self, turns: &[Turn]) -> String {
        let mut messages: Vec<ChatMessage> = Vec::with_capacity(turns.len() + 1);
        if let Some(system) = &self.system_message {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.extend(turns.iter().map(ChatMessage::from));

        match self.model.chat(&ChatRequest::new(&messages)).await {
            Ok(message) => message.content,
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSource;
    use async_trait::async_trait;
    use llm::Role;

    /// Replies with the content of the last message it was sent.
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
            let last = request
                .messages()
                .last()
                .ok_or_else(|| anyhow::anyhow!("empty request"))?;
            Ok(ChatMessage::assistant(last.content.clone()))
        }
    }

    /// Replies with the number of messages in the request.
    struct CountingModel;

    #[async_trait]
    impl ChatModel for CountingModel {
        async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
            Ok(ChatMessage::assistant(request.messages().len().to_string()))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn chat(&self, _request: &ChatRequest) -> anyhow::Result<ChatMessage> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let mut conversation = Conversation::new(EchoModel);
        conversation.send(UserInput::typed("hello")).await;

        let turns = conversation.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "hello");
    }

    #[tokio::test]
    async fn test_n_sends_accumulate_2n_turns_in_order() {
        let mut conversation = Conversation::new(EchoModel);
        for i in 0..5 {
            conversation.send(UserInput::typed(format!("msg {}", i))).await;
        }

        let turns = conversation.turns();
        assert_eq!(turns.len(), 10);
        for i in 0..5 {
            assert_eq!(turns[2 * i].role, Role::User);
            assert_eq!(turns[2 * i].content, format!("msg {}", i));
            assert_eq!(turns[2 * i + 1].role, Role::Assistant);
        }
    }

    #[tokio::test]
    async fn test_full_history_is_replayed_each_turn() {
        let mut conversation = Conversation::new(CountingModel);
        let first = conversation.send(UserInput::typed("a")).await;
        assert_eq!(first.content, "1");

        // Second request carries user, assistant, user.
        let second = conversation.send(UserInput::typed("b")).await;
        assert_eq!(second.content, "3");
    }

    #[tokio::test]
    async fn test_system_message_prepended_but_not_stored() {
        let mut conversation = Conversation::with_system_message(CountingModel, "be brief");
        let reply = conversation.send(UserInput::typed("a")).await;

        // system + user on the wire, but only user/assistant in the session
        assert_eq!(reply.content, "2");
        assert_eq!(conversation.turn_count(), 2);
    }

    #[tokio::test]
    async fn test_completion_failure_becomes_assistant_turn() {
        let mut conversation = Conversation::new(FailingModel);
        let reply = conversation.send(UserInput::typed("hello")).await;

        assert_eq!(conversation.turn_count(), 2);
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_resend_edited_replaces_pair_only() {
        let mut conversation = Conversation::new(EchoModel);
        conversation.send(UserInput::typed("one")).await;
        conversation.send(UserInput::typed("two")).await;

        conversation.resend_edited(0, "uno").await.unwrap();

        let turns = conversation.turns();
        assert_eq!(turns[0].content, "uno");
        assert_eq!(turns[1].content, "uno");
        assert_eq!(turns[2].content, "two");
        assert_eq!(turns[3].content, "two");
        assert_eq!(turns.len(), 4);
    }

    #[tokio::test]
    async fn test_resend_edited_sees_history_through_edited_turn() {
        let mut conversation = Conversation::new(CountingModel);
        conversation.send(UserInput::typed("a")).await;
        conversation.send(UserInput::typed("b")).await;

        // Context for the regenerated reply is turns 0..=2: user, assistant, user.
        conversation.resend_edited(2, "b2").await.unwrap();
        assert_eq!(conversation.turns()[3].content, "3");
    }

    #[tokio::test]
    async fn test_resend_edited_rejects_bad_index() {
        let mut conversation = Conversation::new(EchoModel);
        conversation.send(UserInput::typed("hello")).await;

        assert_eq!(
            conversation.resend_edited(1, "x").await,
            Err(EditError::NotAUserTurn(1))
        );
        assert_eq!(
            conversation.resend_edited(9, "x").await,
            Err(EditError::OutOfRange(9))
        );
        // Session untouched by the failed edits.
        assert_eq!(conversation.turns()[0].content, "hello");
    }

    #[tokio::test]
    async fn test_edit_failure_overwrites_assistant_with_error() {
        let mut conversation = Conversation::new(EchoModel);
        conversation.send(UserInput::typed("hello")).await;

        conversation.set_model(FailingModel);
        conversation.resend_edited(0, "hi").await.unwrap();

        let turns = conversation.turns();
        assert_eq!(turns[0].content, "hi");
        assert!(turns[1].content.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_voice_source_survives_send() {
        let mut conversation = Conversation::new(EchoModel);
        conversation.send(UserInput::voice("spoken words")).await;

        assert_eq!(conversation.turns()[0].source, InputSource::Voice);
        assert_eq!(conversation.turns()[1].source, InputSource::Text);
    }

    #[tokio::test]
    async fn test_clear_then_reuse() {
        let mut conversation = Conversation::new(EchoModel);
        conversation.send(UserInput::typed("hello")).await;
        conversation.clear();
        assert_eq!(conversation.turn_count(), 0);

        conversation.send(UserInput::typed("again")).await;
        assert_eq!(conversation.turn_count(), 2);
    }
}
