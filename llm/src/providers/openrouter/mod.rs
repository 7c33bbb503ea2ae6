pub mod chat;
mod provider;

pub use chat::OpenRouterChatModel;
pub use provider::{DEFAULT_BASE_URL, OpenRouterProvider};
