use super::Message;

/// Requests sent from the UI to the background worker. A turn request carries
/// the full transcript by value so the worker stays stateless.
pub enum Action {
    TurnRequest(Vec<Message>),
    ListModels(),
    SetModel(String),
}
