//! Text-generation providers behind one interface.

pub mod gemini;
mod http;
pub mod openai;
pub mod palm;
pub mod provider;
pub mod retry;

pub use provider::{ProviderKind, TextGenerator, build_generator};
pub use retry::{DEFAULT_MAX_ATTEMPTS, Retrying, retry_with_backoff};
