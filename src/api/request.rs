//! Request payloads and per-call options

use crate::optimization::{CompressionMode, InputFormat};
use serde::{Deserialize, Serialize};

/// Placeholder user identifier sent with optimize-and-run calls
pub(crate) const SDK_USER_ID: &str = "sdk_user";

/// Default number of RAG chunks the service may keep
pub const DEFAULT_RAG_CHUNK_LIMIT: u32 = 10;

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Options for [`YaviqClient::optimize`](crate::YaviqClient::optimize)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizeOptions {
    pub mode: CompressionMode,
    pub format: InputFormat,
    /// Target LLM model identifier
    pub model: Option<String>,
}

impl OptimizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `CompressionMode` values or any alias such as `"high"`
    pub fn mode(mut self, mode: impl Into<CompressionMode>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Options for [`YaviqClient::optimize_and_run`](crate::YaviqClient::optimize_and_run)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub mode: CompressionMode,
    pub format: InputFormat,
    pub model: Option<String>,
    /// Compress the input as retrieved documents
    pub use_rag: bool,
    /// Compress `history` before it reaches the model
    pub use_history: bool,
    pub history: Option<Vec<ChatMessage>>,
    pub rag_chunk_limit: Option<u32>,
    /// Ask the service for detailed metrics
    pub debug: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: impl Into<CompressionMode>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn use_rag(mut self, enabled: bool) -> Self {
        self.use_rag = enabled;
        self
    }

    pub fn use_history(mut self, enabled: bool) -> Self {
        self.use_history = enabled;
        self
    }

    pub fn history(mut self, messages: Vec<ChatMessage>) -> Self {
        self.history = Some(messages);
        self
    }

    pub fn rag_chunk_limit(mut self, limit: u32) -> Self {
        self.rag_chunk_limit = Some(limit);
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

/// Options for [`YaviqClient::optimize_rag`](crate::YaviqClient::optimize_rag)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RagOptions {
    pub mode: CompressionMode,
    /// Falls back to [`DEFAULT_RAG_CHUNK_LIMIT`] when unset or zero
    pub rag_chunk_limit: Option<u32>,
    pub debug: bool,
}

impl RagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: impl Into<CompressionMode>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn rag_chunk_limit(mut self, limit: u32) -> Self {
        self.rag_chunk_limit = Some(limit);
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub(crate) fn into_run_options(self) -> RunOptions {
        let limit = self
            .rag_chunk_limit
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_RAG_CHUNK_LIMIT);

        RunOptions::new()
            .mode(self.mode)
            .use_rag(true)
            .rag_chunk_limit(limit)
            .debug(self.debug)
    }
}

/// Options for [`YaviqClient::compress_history`](crate::YaviqClient::compress_history)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryOptions {
    pub mode: CompressionMode,
    pub debug: bool,
}

impl HistoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: impl Into<CompressionMode>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub(crate) fn into_run_options(self, messages: &[ChatMessage]) -> RunOptions {
        RunOptions::new()
            .mode(self.mode)
            .use_history(true)
            .history(messages.to_vec())
            .debug(self.debug)
    }
}

/// Documents handed to [`YaviqClient::optimize_rag`](crate::YaviqClient::optimize_rag):
/// either one pre-joined string or a list joined with blank lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RagDocuments {
    Single(String),
    Many(Vec<String>),
}

impl RagDocuments {
    pub fn into_input(self) -> String {
        match self {
            RagDocuments::Single(text) => text,
            RagDocuments::Many(docs) => docs.join("\n\n"),
        }
    }
}

impl From<&str> for RagDocuments {
    fn from(text: &str) -> Self {
        RagDocuments::Single(text.to_string())
    }
}

impl From<String> for RagDocuments {
    fn from(text: String) -> Self {
        RagDocuments::Single(text)
    }
}

impl From<Vec<String>> for RagDocuments {
    fn from(docs: Vec<String>) -> Self {
        RagDocuments::Many(docs)
    }
}

impl From<Vec<&str>> for RagDocuments {
    fn from(docs: Vec<&str>) -> Self {
        RagDocuments::Many(docs.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RagDocuments {
    fn from(docs: &[&str]) -> Self {
        RagDocuments::Many(docs.iter().map(|d| d.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RagDocuments {
    fn from(docs: [&str; N]) -> Self {
        RagDocuments::Many(docs.iter().map(|d| d.to_string()).collect())
    }
}

/// Body of `POST /v1/optimize`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeRequest<'a> {
    pub input: &'a str,
    pub format: InputFormat,
    pub mode: CompressionMode,
    pub model: Option<&'a str>,
}

impl<'a> OptimizeRequest<'a> {
    pub fn new(input: &'a str, options: &'a OptimizeOptions) -> Self {
        Self {
            input,
            format: options.format,
            mode: options.mode,
            model: options.model.as_deref(),
        }
    }
}

/// Body of `POST /v1/optimize-run`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeRunRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub input: &'a str,
    pub format: InputFormat,
    pub mode: CompressionMode,
    pub model: Option<&'a str>,
    pub use_rag: bool,
    pub use_history: bool,
    pub history: Option<&'a [ChatMessage]>,
    pub rag_chunk_limit: Option<u32>,
    pub debug: bool,
}

impl<'a> OptimizeRunRequest<'a> {
    pub fn new(input: &'a str, options: &'a RunOptions) -> Self {
        Self {
            user_id: SDK_USER_ID,
            input,
            format: options.format,
            mode: options.mode,
            model: options.model.as_deref(),
            use_rag: options.use_rag,
            use_history: options.use_history,
            history: options.history.as_deref(),
            rag_chunk_limit: options.rag_chunk_limit,
            debug: options.debug,
        }
    }
}

/// Body of `POST /v1/convert-to-toon`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToToonRequest<'a> {
    pub input: &'a str,
    pub format: InputFormat,
}

/// Body of `POST /v1/convert-from-toon`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromToonRequest<'a> {
    pub toon: &'a str,
}
