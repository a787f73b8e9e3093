/// Interactive news chat.
pub mod chat;
