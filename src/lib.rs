//! YAVIQ - client SDK for the YAVIQ token optimization service
//!
//! All compression happens server-side. This crate authenticates requests,
//! serializes payloads and turns responses into typed results or a
//! classified [`YaviqError`].
//!
//! ## Key Features
//!
//! - **Optimize**: shrink prompts with `safe`, `balanced` or `aggressive` compression
//! - **Optimize and run**: compress the input, call the target model and compress the reply in one round trip
//! - **TOON conversion**: translate JSON/YAML/CSV to and from the compact TOON format
//! - **RAG and history helpers**: compress retrieved documents or prior chat turns
//! - **Local estimates**: a rough offline token counter
//!
//! ```no_run
//! use yaviq::{OptimizeOptions, YaviqClient};
//!
//! # async fn run() -> yaviq::Result<()> {
//! let client = YaviqClient::new(Some("sk-..."), None)?;
//! let result = client
//!     .optimize("Please summarise the attached report", OptimizeOptions::new().mode("high"))
//!     .await?;
//! println!("saved {:?} tokens", result.tokens_saved());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod metrics;
pub mod optimization;

pub use api::{
    ChatMessage, ConvertResult, EngineResponse, ErrorKind, HistoryOptions, OptimizeOptions,
    RagDocuments, RagOptions, Result, Role, RunOptions, YaviqClient, YaviqError,
};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT};
pub use metrics::{count_tokens, TokenEstimate};
pub use optimization::{CompressionMode, InputFormat};

/// One-shot optimize call through a temporary client.
///
/// Prefer keeping a [`YaviqClient`] around when making several calls.
pub async fn optimize(
    api_key: &str,
    input: &str,
    format: InputFormat,
    mode: impl Into<CompressionMode>,
    endpoint: Option<&str>,
) -> Result<EngineResponse> {
    let client = YaviqClient::new(Some(api_key), endpoint)?;
    client
        .optimize(input, OptimizeOptions::new().format(format).mode(mode))
        .await
}

/// Offline heuristic token estimate (~0.75 words per token)
pub fn estimate_tokens(text: &str) -> u64 {
    count_tokens(text)
}
