pub mod chat;
pub mod config;
pub mod error;

pub use chat::*;
pub use config::*;
pub use error::*;
