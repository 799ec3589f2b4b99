//! REST client for the YAVIQ optimizer service

mod client;
mod error;
mod request;
mod response;

pub use client::YaviqClient;
pub use error::{ErrorKind, Result, YaviqError};
pub use request::{
    ChatMessage, FromToonRequest, HistoryOptions, OptimizeOptions, OptimizeRequest,
    OptimizeRunRequest, RagDocuments, RagOptions, Role, RunOptions, ToToonRequest,
    DEFAULT_RAG_CHUNK_LIMIT,
};
pub use response::{ConvertResult, EngineResponse};

pub const OPTIMIZE_PATH: &str = "/v1/optimize";
pub const OPTIMIZE_RUN_PATH: &str = "/v1/optimize-run";
pub const CONVERT_TO_TOON_PATH: &str = "/v1/convert-to-toon";
pub const CONVERT_FROM_TOON_PATH: &str = "/v1/convert-from-toon";
