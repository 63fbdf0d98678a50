#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

/// Merges worker events and terminal input into the single event stream the
/// UI loop consumes, with a periodic tick so the screen refreshes while
/// nothing else is happening.
pub struct EventsService {
    terminal_events: EventStream,
    worker_events: mpsc::UnboundedReceiver<Event>,
}

impl EventsService {
    pub fn new(worker_events: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            terminal_events: EventStream::new(),
            worker_events,
        };
    }

    fn map_input(input: Input) -> Event {
        match input {
            Input {
                key: Key::Char('c'),
                ctrl: true,
                ..
            } => return Event::KeyboardCTRLC(),
            Input {
                key: Key::Char('u'),
                ctrl: true,
                ..
            } => return Event::UIScrollPageUp(),
            Input {
                key: Key::Char('d'),
                ctrl: true,
                ..
            } => return Event::UIScrollPageDown(),
            Input { key: Key::Up, .. }
            | Input {
                key: Key::MouseScrollUp,
                ..
            } => return Event::UIScrollUp(),
            Input { key: Key::Down, .. }
            | Input {
                key: Key::MouseScrollDown,
                ..
            } => return Event::UIScrollDown(),
            Input {
                key: Key::PageUp, ..
            } => return Event::UIScrollPageUp(),
            Input {
                key: Key::PageDown, ..
            } => return Event::UIScrollPageDown(),
            Input {
                key: Key::Enter, ..
            } => return Event::KeyboardEnter(),
            input => return Event::KeyboardCharInput(input),
        }
    }

    fn map_terminal(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(keyevent) => {
                return Some(EventsService::map_input(keyevent.into()));
            }
            CrosstermEvent::Paste(text) => return Some(Event::KeyboardPaste(text)),
            CrosstermEvent::Mouse(mouseevent) => {
                match mouseevent.kind {
                    MouseEventKind::ScrollUp => return Some(Event::UIScrollUp()),
                    MouseEventKind::ScrollDown => return Some(Event::UIScrollDown()),
                    _ => return None,
                }
            }
            // A resize invalidates every cached bubble line, so redraw now
            // instead of waiting out the tick.
            CrosstermEvent::Resize(_, _) => return Some(Event::UITick()),
            _ => return None,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.worker_events.recv() => event,
                event = self.terminal_events.next() => match event {
                    Some(Ok(input)) => EventsService::map_terminal(input),
                    _ => None,
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick())
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}
