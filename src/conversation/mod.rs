mod controller;
mod state;

pub use controller::{ChatController, ConversationView};
pub use state::{
    Conversation, InitTicket, Outcome, Phase, SendBlocked, SendTicket, APOLOGY_MESSAGE,
    CONNECTIVITY_MESSAGE, DEFAULT_GREETING, EMPTY_REPLY,
};
