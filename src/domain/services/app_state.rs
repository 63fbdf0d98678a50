#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::turn::help_text;
use super::BubbleList;
use super::Scroll;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BackendBox;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::SlashCommand;
use crate::domain::models::Transcript;

/// The only mutable shared state of a session: the transcript, the
/// in-flight reply accumulator, and presentation state. Owned by the UI
/// task; the worker reaches it through events only.
pub struct AppState<'a> {
    pub transcript: Transcript,
    pub bubble_list: BubbleList<'a>,
    pub scroll: Scroll,
    pub waiting_for_backend: bool,
    pub last_known_height: u16,
    pub last_known_width: u16,
    /// The reply being assembled for the current turn. Presentation state
    /// only; it reaches the transcript through `handle_turn_completed` or
    /// not at all.
    pending: Option<Message>,
}

impl<'a> AppState<'a> {
    pub async fn new(backend: &BackendBox) -> Result<AppState<'a>> {
        let mut app_state = AppState {
            transcript: Transcript::default(),
            bubble_list: BubbleList::default(),
            scroll: Scroll::default(),
            waiting_for_backend: false,
            last_known_height: 0,
            last_known_width: 0,
            pending: None,
        };

        if let Err(err) = backend.health_check().await {
            app_state.transcript.append(Message::new_with_type(
                Author::Assistant,
                MessageType::Error,
                &format!("Hey, it looks like I can't reach the completions API. You should double check that before we start talking, otherwise every turn will fail.\n\nError: {err}"),
            ));
        }

        return Ok(app_state);
    }

    pub fn add_message(&mut self, message: Message) {
        self.transcript.append(message);
        self.sync_dependants();
        self.scroll.last();
    }

    pub fn handle_completion_delta(&mut self, delta: &str) {
        match self.pending.as_mut() {
            Some(pending) => pending.append(delta),
            None => self.pending = Some(Message::new(Author::Assistant, delta)),
        }

        self.sync_dependants();
    }

    pub fn handle_fallback_notice(&mut self, notice: Message) {
        self.pending = Some(notice);
        self.sync_dependants();
    }

    /// A turn reached its terminal state. Whatever was accumulated while it
    /// ran is dropped; the single message produced by the turn is the one
    /// that enters the transcript.
    pub fn handle_turn_completed(&mut self, message: Message) {
        self.pending = None;
        self.waiting_for_backend = false;
        self.add_message(message);
    }

    pub fn handle_worker_message(&mut self, message: Message) {
        self.waiting_for_backend = false;
        self.add_message(message);
    }

    pub fn handle_slash_commands(
        &mut self,
        input_str: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        if let Some(command) = SlashCommand::parse(input_str) {
            if command.is_quit() {
                return Ok((true, false));
            }

            if command.is_help() {
                self.add_message(Message::new(Author::Assistant, &help_text()));
                return Ok((false, true));
            }

            if command.is_clear() {
                self.transcript.clear();
                self.sync_dependants();
                self.scroll.last();
                return Ok((false, true));
            }

            if command.is_stream_toggle() {
                let stream = match command.args.first().map(|e| return e.as_str()) {
                    Some("on") => true,
                    Some("off") => false,
                    _ => !Config::get_bool(ConfigKey::Stream),
                };
                Config::set(ConfigKey::Stream, &stream.to_string());

                let state = if stream { "on" } else { "off" };
                self.add_message(Message::new(
                    Author::Assistant,
                    &format!("Streaming is now {state}."),
                ));
                return Ok((false, true));
            }

            if command.is_model_list() {
                self.waiting_for_backend = true;
                tx.send(Action::ListModels())?;
                return Ok((false, true));
            }

            if command.is_model_set() {
                self.waiting_for_backend = true;
                tx.send(Action::SetModel(command.args.join(" ")))?;
                return Ok((false, true));
            }
        }

        return Ok((false, false));
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn waiting_without_pending(&self) -> bool {
        return self.waiting_for_backend && self.pending.is_none();
    }

    fn sync_dependants(&mut self) {
        let mut display = self.transcript.all().to_vec();
        if let Some(pending) = &self.pending {
            let mut shown = pending.clone();
            // The streaming accumulator carries a cursor glyph until the
            // turn completes. Error drafts are shown as-is.
            if shown.message_type() == MessageType::Normal {
                shown.append("▌");
            }
            display.push(shown);
        }

        self.bubble_list
            .set_messages(&display, self.last_known_width as usize);

        self.scroll
            .set_state(self.bubble_list.len() as u16, self.last_known_height);
    }
}
