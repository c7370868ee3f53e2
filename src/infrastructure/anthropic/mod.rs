//! Anthropic Messages API adapter for the semantic detector port

pub mod client;
pub mod detector;
pub mod parse;
pub mod prompt;
pub mod retry;
pub mod types;

pub use client::{AnthropicClient, AnthropicClientConfig};
pub use detector::AnthropicDetector;
pub use parse::{ParsedCandidates, parse_candidates};
pub use retry::RetryPolicy;
pub use types::{ContentBlock, Message, MessagesRequest, MessagesResponse, Usage};
