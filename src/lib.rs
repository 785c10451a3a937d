pub mod config;
pub mod engine;
pub mod index;
pub mod pgn;
