//! # codegen-client
//!
//! A cacheable, retryable client for chat-completion style
//! code-generation APIs (OpenRouter-compatible).
//!
//! ## Overview
//!
//! One operation: turn a natural-language prompt into generated source
//! text. Responses are cached under a deterministic fingerprint of the
//! request's semantic inputs so identical requests within the TTL window
//! never hit the network twice; transient upstream failures are retried
//! with exponential backoff; every failure is a typed error, never an
//! empty string.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codegen_client::{ClientConfig, CodeGenClient};
//!
//! #[tokio::main]
//! async fn main() -> codegen_client::Result<()> {
//!     let config = ClientConfig::new("your-api-key", "openai/gpt-4o");
//!     let client = CodeGenClient::new(config)?;
//!
//!     let code = client
//!         .generate()
//!         .prompt("Write a binary search in Rust")
//!         .temperature(0.2)
//!         .execute()
//!         .await?;
//!
//!     println!("{}", code.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | The client, request builder, retry policy |
//! | [`cache`] | Fingerprinting, backends, TTL cache manager |
//! | [`config`] | Client configuration and env loading |
//! | [`prompt`] | Structured prompt templates |
//! | [`transport`] | HTTP transport |
//! | [`types`] | Messages, generation options, response models |

pub mod cache;
pub mod client;
pub mod config;
pub mod prompt;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{
    CallStats, CancelHandle, CodeGenClient, CodeGenClientBuilder, GenerateRequestBuilder,
    RetryPolicy,
};
pub use config::ClientConfig;
pub use prompt::PromptTemplate;
pub use types::{GeneratedCode, GenerationOptions, Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
