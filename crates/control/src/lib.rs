pub mod chatbot;
pub mod commands;
pub mod migrations;
pub mod store;

pub use chatbot::Chatbot;
pub use commands::Command;
pub use store::ChatStore;
