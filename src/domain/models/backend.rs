#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::sync::mpsc;

use super::Event;
use super::Message;

/// One role/content pair in the vendor's chat-completion wire format.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn new(model: &str, messages: &[Message], stream: bool) -> CompletionRequest {
        let wire_messages = messages
            .iter()
            .map(|message| {
                return WireMessage {
                    role: message.author.wire_role().to_string(),
                    content: message.text.to_string(),
                };
            })
            .collect();

        return CompletionRequest {
            model: model.to_string(),
            messages: wire_messages,
            stream,
        };
    }
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;

#[async_trait]
pub trait Backend {
    /// Used at startup to verify the API is reachable before chatting.
    async fn health_check(&self) -> Result<()>;

    /// Provides the models the `/model` and `/modellist` commands may switch
    /// between.
    async fn list_models<'a>(&'a self) -> Result<Vec<String>>;

    /// Requests one completion for the full transcript. When the request is
    /// streamed, each text fragment is forwarded through the channel as it
    /// arrives. The accumulated reply text is the return value either way;
    /// on error no partial accumulation is returned.
    async fn complete<'a>(
        &self,
        request: CompletionRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String>;
}
