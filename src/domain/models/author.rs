use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    /// The role string sent to the chat-completion API.
    pub fn wire_role(&self) -> &'static str {
        match self {
            Author::User => return "user",
            Author::Assistant => return "assistant",
        }
    }
}

impl ToString for Author {
    fn to_string(&self) -> String {
        match self {
            Author::User => return Config::get(ConfigKey::Username),
            Author::Assistant => return Config::get(ConfigKey::Model),
        }
    }
}
