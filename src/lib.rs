//! NewsSense: routes news questions to trending, fact-check and summary specialists.

pub mod commands;
pub mod config;
pub mod news;
pub mod rchain;
pub mod session;
