//! Core type definitions: chat messages, generation options, response models.

pub mod message;
pub mod options;
pub mod response;

pub use message::{Message, MessageRole};
pub use options::GenerationOptions;
pub use response::{CachedCompletion, ChatCompletion, GeneratedCode};
