#[cfg(test)]
#[path = "turn_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BackendBox;
use crate::domain::models::CompletionRequest;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::SlashCommand;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /modellist (/ml) - Lists all models you can switch between.
- /model (/m) [MODEL_NAME,MODEL_INDEX] - Sets the specified model as the active model. You can pass either the model name, or the index from /modellist.
- /stream (/s) [on,off] - Turns streamed replies on or off.
- /clear (/cl) - Clears the chat history and starts over.
- /quit /exit (/q) - Exit TechVerse.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+C - Exit.
        "#;

    return text.trim().to_string();
}

/// The configuration a turn runs with, captured once when the turn starts.
/// Changing the model or streaming toggle mid-turn affects the next turn only.
pub struct TurnConfig {
    pub model: String,
    pub fallback_model: String,
    pub stream: bool,
}

impl TurnConfig {
    pub fn from_config() -> TurnConfig {
        return TurnConfig {
            model: Config::get(ConfigKey::Model),
            fallback_model: Config::get(ConfigKey::FallbackModel),
            stream: Config::get_bool(ConfigKey::Stream),
        };
    }
}

async fn model_list(backend: &BackendBox, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let models = backend.list_models().await?;

    let res = models
        .iter()
        .enumerate()
        .map(|(idx, model)| {
            let n = idx + 1;
            return format!("- ({n}) {model}");
        })
        .collect::<Vec<String>>();

    tx.send(Event::WorkerMessage(Message::new(
        Author::Assistant,
        res.join("\n").as_str(),
    )))?;

    return Ok(());
}

async fn model_set(
    backend: &BackendBox,
    tx: &mpsc::UnboundedSender<Event>,
    text: &str,
) -> Result<()> {
    let mut model_name = text.trim().to_string();
    if model_name.is_empty() || SlashCommand::parse(&model_name).is_some() {
        let msg = Message::new_with_type(
            Author::Assistant,
            MessageType::Error,
            "You must specify a model name with `/model` or `/m`. Run `/help` for more details.",
        );
        tx.send(Event::WorkerMessage(msg))?;
        return Ok(());
    }

    let models = backend.list_models().await?;

    if let Ok(idx) = model_name.parse::<usize>() {
        if idx < 1 || idx > models.len() {
            let msg = Message::new_with_type(
                Author::Assistant,
                MessageType::Error,
                &format!("{idx} is not a valid index from the model list."),
            );
            tx.send(Event::WorkerMessage(msg))?;
            return Ok(());
        }
        model_name = models[idx - 1].to_string();
    }

    if !models.contains(&model_name) {
        let msg = Message::new_with_type(
            Author::Assistant,
            MessageType::Error,
            &format!("No model named {model_name} in the allow-list. Run `/modellist` to see what you can switch to."),
        );
        tx.send(Event::WorkerMessage(msg))?;
        return Ok(());
    }

    Config::set(ConfigKey::Model, &model_name);

    tx.send(Event::WorkerMessage(Message::new(
        Author::Assistant,
        &format!("{model_name} has entered the chat."),
    )))?;

    return Ok(());
}

/// Drives one turn to its terminal state: a primary attempt with the selected
/// model, and on failure a single non-streaming retry against the fixed
/// fallback model. Exactly one assistant message comes out either way; a
/// partially streamed reply from a failed primary attempt is discarded.
async fn run_turn(
    backend: &BackendBox,
    config: TurnConfig,
    messages: Vec<Message>,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<Message> {
    let request = CompletionRequest::new(&config.model, &messages, config.stream);
    let primary_err = match backend.complete(request, tx).await {
        Ok(text) => return Ok(Message::new(Author::Assistant, &text)),
        Err(err) => err,
    };

    tracing::warn!(
        model = config.model,
        error = ?primary_err,
        "Primary model failed, retrying once with the fallback model"
    );

    let draft = format!(
        "Model {model} failed with the following error: {primary_err}",
        model = config.model
    );
    tx.send(Event::FallbackNotice(Message::new_with_type(
        Author::Assistant,
        MessageType::Error,
        &draft,
    )))?;

    let retry = CompletionRequest::new(&config.fallback_model, &messages, false);
    match backend.complete(retry, tx).await {
        // The error draft is discarded, the retry text is the reply.
        Ok(text) => return Ok(Message::new(Author::Assistant, &text)),
        Err(fallback_err) => {
            return Ok(Message::new_with_type(
                Author::Assistant,
                MessageType::Error,
                &format!(
                    "{draft}\n\nFallback model {fallback} also failed: {fallback_err}",
                    fallback = config.fallback_model
                ),
            ));
        }
    }
}

pub struct TurnService {}

impl TurnService {
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        loop {
            let action = rx.recv().await;
            if action.is_none() {
                continue;
            }

            match action.unwrap() {
                Action::TurnRequest(messages) => {
                    let config = TurnConfig::from_config();
                    let reply = run_turn(&backend, config, messages, &tx).await?;
                    tx.send(Event::TurnCompleted(reply))?;
                }
                Action::ListModels() => {
                    model_list(&backend, &tx).await?;
                }
                Action::SetModel(name) => {
                    model_set(&backend, &tx, &name).await?;
                }
            }
        }
    }
}
