//! HTTP client for the YAVIQ optimizer service

use super::error::{Result, YaviqError};
use super::request::{
    ChatMessage, FromToonRequest, HistoryOptions, OptimizeOptions, OptimizeRequest,
    OptimizeRunRequest, RagDocuments, RagOptions, RunOptions, ToToonRequest,
};
use super::response::{error_from_status, unwrap_envelope, ConvertResult, EngineResponse};
use super::{CONVERT_FROM_TOON_PATH, CONVERT_TO_TOON_PATH, OPTIMIZE_PATH, OPTIMIZE_RUN_PATH};
use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::metrics::{self, TokenEstimate};
use crate::optimization::InputFormat;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

const INPUT_REQUIRED: &str = "Input is required and must be a string";
const TOON_REQUIRED: &str = "TOON input is required and must be a string";

/// Client for the optimizer REST API.
///
/// Cheap to clone; clones share one connection pool. All methods take `&self`
/// except [`set_telemetry`](Self::set_telemetry), so a client can be shared
/// across tasks for concurrent calls.
#[derive(Debug, Clone)]
pub struct YaviqClient {
    config: ClientConfig,
    client: Client,
}

impl YaviqClient {
    /// Create a client, falling back to `YAVIQ_API_KEY` / `YAVIQ_ENDPOINT`
    /// for missing arguments. Fails with a validation error when no API key
    /// can be found. Makes no network calls.
    pub fn new(api_key: Option<&str>, endpoint: Option<&str>) -> Result<Self> {
        Self::from_config(ClientConfig::resolve(api_key, endpoint)?)
    }

    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Start from explicit settings; unset values come from the environment
    /// when the builder is finished with [`ClientConfigBuilder::build_client`].
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.config.telemetry
    }

    pub fn set_telemetry(&mut self, enabled: bool) {
        self.config.telemetry = enabled;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// POST a JSON payload and return the unwrapped response data.
    ///
    /// Non-2xx statuses are classified: 4xx as validation errors, 5xx as
    /// engine failures, anything else as network errors.
    async fn post<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)?;
        debug!(path, bytes = payload.len(), "POST");

        let response = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "request failed before a response arrived");
                YaviqError::transport(e)
            })?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "response");

        if !status.is_success() {
            let error_body = response
                .bytes()
                .await
                .map(|b| String::from_utf8_lossy(&b).into_owned())
                .unwrap_or_default();
            let err = error_from_status(status.as_u16(), &error_body);
            warn!(path, status = status.as_u16(), code = err.code(), "request rejected");
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(YaviqError::transport)?;
        let parsed: Value = serde_json::from_slice(&bytes)?;
        unwrap_envelope(parsed)
    }

    /// Optimize text to reduce its token count while preserving meaning.
    ///
    /// Returns the service's result (optimized text, `tokensSaved`,
    /// `compression`, ...) unmodified.
    pub async fn optimize(&self, input: &str, options: OptimizeOptions) -> Result<EngineResponse> {
        require_text(input, INPUT_REQUIRED)?;

        let request = OptimizeRequest::new(input, &options);
        let response = EngineResponse::from(self.post(OPTIMIZE_PATH, &request).await?);

        if self.telemetry_enabled() {
            metrics::log_optimize(&response);
        }

        Ok(response)
    }

    /// Optimize the input, call the target LLM and optimize its reply, all in
    /// one server-side round trip. Returns `{final_answer, metrics, ..}`.
    pub async fn optimize_and_run(&self, input: &str, options: RunOptions) -> Result<EngineResponse> {
        require_text(input, INPUT_REQUIRED)?;

        let request = OptimizeRunRequest::new(input, &options);
        let response = EngineResponse::from(self.post(OPTIMIZE_RUN_PATH, &request).await?);

        if self.telemetry_enabled() {
            metrics::log_optimize_run(&response);
        }

        Ok(response)
    }

    /// Estimate savings by running a real optimize call.
    ///
    /// Uses the server's token counts when present and the local heuristic
    /// otherwise. For an offline estimate use [`count_tokens`](Self::count_tokens).
    pub async fn estimate_tokens(&self, input: &str, options: OptimizeOptions) -> Result<TokenEstimate> {
        require_text(input, INPUT_REQUIRED)?;

        let response = self.optimize(input, options).await?;
        Ok(TokenEstimate::from_response(input, &response))
    }

    /// Convert structured data (JSON, YAML, CSV) to TOON
    pub async fn to_toon(&self, input: &str, format: InputFormat) -> Result<String> {
        require_text(input, INPUT_REQUIRED)?;

        let request = ToToonRequest { input, format };
        self.post(CONVERT_TO_TOON_PATH, &request)
            .await
            .and_then(|data| take_string(data, "toon"))
            .map_err(|e| e.into_toon_parse("Convert to TOON failed"))
    }

    #[deprecated(note = "use `to_toon`")]
    pub async fn convert_to_compressed(&self, input: &str, format: InputFormat) -> Result<String> {
        self.to_toon(input, format).await
    }

    /// Convert TOON back into JSON
    pub async fn from_toon(&self, toon: &str) -> Result<Value> {
        require_text(toon, TOON_REQUIRED)?;

        let request = FromToonRequest { toon };
        self.post(CONVERT_FROM_TOON_PATH, &request)
            .await
            .and_then(|data| take_field(data, "json"))
            .map_err(|e| e.into_toon_parse("Convert from TOON failed"))
    }

    #[deprecated(note = "use `from_toon`")]
    pub async fn convert_from_compressed(&self, toon: &str) -> Result<Value> {
        self.from_toon(toon).await
    }

    /// Convert to TOON and report the format the service detected or used.
    /// `None` lets the service auto-detect.
    pub async fn convert(&self, input: &str, format: Option<InputFormat>) -> Result<ConvertResult> {
        require_text(input, INPUT_REQUIRED)?;

        let request = ToToonRequest {
            input,
            format: format.unwrap_or_default(),
        };
        self.post(CONVERT_TO_TOON_PATH, &request)
            .await
            .and_then(|data| serde_json::from_value::<ConvertResult>(data).map_err(YaviqError::from))
            .map_err(|e| e.into_toon_parse("Convert failed"))
    }

    /// Optimize documents for a retrieval-augmented prompt.
    ///
    /// A list of documents is joined with blank lines before sending.
    pub async fn optimize_rag(
        &self,
        docs: impl Into<RagDocuments>,
        options: RagOptions,
    ) -> Result<EngineResponse> {
        let input = docs.into().into_input();
        require_text(&input, "Documents are required")?;

        self.optimize_and_run(&input, options.into_run_options()).await
    }

    /// Compress prior chat turns alongside the current input
    pub async fn compress_history(
        &self,
        messages: &[ChatMessage],
        current_input: &str,
        options: HistoryOptions,
    ) -> Result<EngineResponse> {
        if messages.is_empty() {
            return Err(YaviqError::validation(
                "Messages array is required and must not be empty",
            ));
        }
        require_text(current_input, "Current input is required")?;

        self.optimize_and_run(current_input, options.into_run_options(messages))
            .await
    }

    /// Offline heuristic token count, see [`crate::metrics::count_tokens`]
    pub fn count_tokens(&self, text: &str) -> u64 {
        metrics::count_tokens(text)
    }
}

fn require_text(text: &str, message: &str) -> Result<()> {
    if text.is_empty() {
        return Err(YaviqError::validation(message));
    }
    Ok(())
}

fn take_field(data: Value, field: &str) -> Result<Value> {
    match data {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| YaviqError::Unexpected(format!("missing field `{}` in response", field))),
        other => Err(YaviqError::Unexpected(format!(
            "expected an object with `{}`, got {}",
            field, other
        ))),
    }
}

fn take_string(data: Value, field: &str) -> Result<String> {
    match take_field(data, field)? {
        Value::String(s) => Ok(s),
        other => Err(YaviqError::Unexpected(format!(
            "field `{}` is not a string: {}",
            field, other
        ))),
    }
}
