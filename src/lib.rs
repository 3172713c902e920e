//! Image analyzer web service.
//!
//! An uploaded image is base64-encoded, sent to an OpenAI-compatible vision
//! model together with a prompt, and the model's markdown is handed back. When
//! the provider is unreachable or misconfigured, a clearly headed placeholder
//! document is returned instead.

pub mod analyzer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod fallback;
pub mod openai;
pub mod pipeline;
pub mod render;
pub mod server;

pub use analyzer::{analyze, AnalysisRequest, ChatTransport, ProviderFailure};
pub use config::Config;
pub use encoder::{encode, EncodedImage, ImageAsset};
pub use error::{AnalysisOutcome, AnalyzerError, ErrorKind};
pub use fallback::present;
pub use openai::OpenAiTransport;
pub use server::{create_router, AppState};
