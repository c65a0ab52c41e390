//! Speech endpoint client.

pub mod client;
pub mod speech;

pub use client::Credentials;
pub use speech::{synthesize, SpeechRequest};
