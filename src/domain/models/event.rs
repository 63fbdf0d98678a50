use tui_textarea::Input;

use super::Message;

pub enum Event {
    /// One streamed fragment of the in-flight assistant reply.
    CompletionDelta(String),
    /// The error draft shown while the fallback request runs. Discarded when
    /// the turn completes; it never reaches the transcript by itself.
    FallbackNotice(Message),
    /// The single assistant message produced by a finished turn, success or
    /// fallback outcome alike.
    TurnCompleted(Message),
    /// An out-of-band worker message, such as a model switch notice.
    WorkerMessage(Message),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    UITick(),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
}
