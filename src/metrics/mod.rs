//! Token accounting: the local heuristic counter, savings estimates and
//! telemetry lines

use crate::api::EngineResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Average words per token used by the heuristic counter
const WORDS_PER_TOKEN: f64 = 0.75;

/// Rough client-side token count: whitespace-separated words divided by 0.75.
///
/// This ignores model-specific tokenization, multi-byte characters and special
/// tokens, so it is less accurate than the counts reported by the service.
pub fn count_tokens(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }
    let words = text.split_whitespace().count();
    (words as f64 / WORDS_PER_TOKEN).round() as u64
}

/// Expected savings for a piece of input, as returned by
/// [`YaviqClient::estimate_tokens`](crate::YaviqClient::estimate_tokens)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenEstimate {
    pub original_tokens: u64,
    pub optimized_tokens: u64,
    /// Negative when the optimized form is larger
    pub estimated_savings: i64,
    /// Percentage of the original, rounded to two decimals
    pub estimated_savings_percent: f64,
}

impl TokenEstimate {
    pub fn from_counts(original_tokens: u64, optimized_tokens: u64) -> Self {
        // server counts can exceed i64; saturate rather than wrap
        let difference = i128::from(original_tokens) - i128::from(optimized_tokens);
        let estimated_savings = difference.clamp(i64::MIN.into(), i64::MAX.into()) as i64;
        let estimated_savings_percent = if original_tokens > 0 {
            let original = original_tokens as f64;
            round2((original - optimized_tokens as f64) / original * 100.0)
        } else {
            0.0
        };

        Self {
            original_tokens,
            optimized_tokens,
            estimated_savings,
            estimated_savings_percent,
        }
    }

    /// Prefer the counts reported by the service and fall back to the
    /// heuristic for whichever one is missing or zero.
    pub fn from_response(input: &str, response: &EngineResponse) -> Self {
        let original = response
            .original_tokens()
            .filter(|&n| n > 0)
            .unwrap_or_else(|| count_tokens(input));
        let optimized = response
            .optimized_tokens()
            .filter(|&n| n > 0)
            .unwrap_or_else(|| count_tokens(response.optimized_text().unwrap_or("")));

        Self::from_counts(original, optimized)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn log_optimize(response: &EngineResponse) {
    let tokens_saved = response.get("tokensSaved").cloned().unwrap_or(Value::from(0));
    let compression = response.get("compression").cloned().unwrap_or(Value::from(0));
    info!(
        target: "yaviq::telemetry",
        "optimize: tokensSaved={}, compression={}%",
        tokens_saved,
        compression
    );
}

pub(crate) fn log_optimize_run(response: &EngineResponse) {
    let metrics = response.metrics();
    let tokens_used = metrics
        .and_then(|m| m.get("total_tokens_used"))
        .cloned()
        .unwrap_or(Value::from(0));
    let savings = match metrics.and_then(|m| m.get("final_total_savings_percent")) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "0%".to_string(),
    };
    info!(
        target: "yaviq::telemetry",
        "optimize_and_run: tokensUsed={}, savings={}",
        tokens_used,
        savings
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that records formatted events
    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens(""), 0);
        assert_eq!(count_tokens("one two three"), 4);
        assert_eq!(count_tokens("   "), 0);
        assert_eq!(count_tokens("word"), 1);
        assert_eq!(count_tokens("  spaced\tout\nwords  here "), 5);
    }

    #[test]
    fn test_estimate_from_counts() {
        let estimate = TokenEstimate::from_counts(120, 80);
        assert_eq!(estimate.estimated_savings, 40);
        assert_eq!(estimate.estimated_savings_percent, 33.33);

        let grew = TokenEstimate::from_counts(10, 15);
        assert_eq!(grew.estimated_savings, -5);
        assert_eq!(grew.estimated_savings_percent, -50.0);
    }

    #[test]
    fn test_estimate_zero_original() {
        let estimate = TokenEstimate::from_counts(0, 0);
        assert_eq!(estimate.estimated_savings, 0);
        assert_eq!(estimate.estimated_savings_percent, 0.0);
    }

    #[test]
    fn test_estimate_prefers_server_counts() {
        let response = EngineResponse::from(json!({
            "optimized": "short",
            "originalTokens": 50,
            "optimizedTokens": 20
        }));
        let estimate = TokenEstimate::from_response("ignored input text", &response);
        assert_eq!(estimate.original_tokens, 50);
        assert_eq!(estimate.optimized_tokens, 20);
        assert_eq!(estimate.estimated_savings_percent, 60.0);
    }

    #[test]
    fn test_estimate_falls_back_to_heuristic() {
        let response = EngineResponse::from(json!({ "optimized": "one two three" }));
        let estimate = TokenEstimate::from_response("one two three four five six", &response);
        assert_eq!(estimate.original_tokens, 8);
        assert_eq!(estimate.optimized_tokens, 4);
        assert_eq!(estimate.estimated_savings, 4);
        assert_eq!(estimate.estimated_savings_percent, 50.0);
    }

    #[test]
    fn test_estimate_saturates_huge_counts() {
        let estimate = TokenEstimate::from_counts(u64::MAX, 0);
        assert_eq!(estimate.estimated_savings, i64::MAX);
        assert_eq!(estimate.estimated_savings_percent, 100.0);

        let estimate = TokenEstimate::from_counts(0, u64::MAX);
        assert_eq!(estimate.estimated_savings, i64::MIN);
        assert_eq!(estimate.estimated_savings_percent, 0.0);

        let response = EngineResponse::from(json!({
            "originalTokens": 1e19,
            "optimizedTokens": 20
        }));
        let estimate = TokenEstimate::from_response("", &response);
        assert_eq!(estimate.original_tokens, 10_000_000_000_000_000_000);
        assert_eq!(estimate.estimated_savings, i64::MAX);
        assert_eq!(estimate.estimated_savings_percent, 100.0);
    }

    #[test]
    fn test_estimate_zero_counts_use_heuristic() {
        let response = EngineResponse::from(json!({ "originalTokens": 0, "optimizedTokens": 0 }));
        let estimate = TokenEstimate::from_response("   ", &response);
        assert_eq!(estimate.original_tokens, 0);
        assert_eq!(estimate.optimized_tokens, 0);
        assert_eq!(estimate.estimated_savings_percent, 0.0);
    }

    #[test]
    fn test_log_optimize_line() {
        let response = EngineResponse::from(json!({
            "optimized": "short",
            "tokensSaved": 12,
            "compression": 40
        }));
        let logs = capture_logs(|| log_optimize(&response));

        assert!(logs.contains("yaviq::telemetry"));
        assert!(logs.contains("optimize: tokensSaved=12, compression=40%"));
    }

    #[test]
    fn test_log_optimize_defaults_to_zero() {
        let response = EngineResponse::from(json!({ "optimized": "short" }));
        let logs = capture_logs(|| log_optimize(&response));
        assert!(logs.contains("optimize: tokensSaved=0, compression=0%"));
    }

    #[test]
    fn test_log_optimize_run_line() {
        let response = EngineResponse::from(json!({
            "final_answer": "42",
            "metrics": {
                "total_tokens_used": 310,
                "final_total_savings_percent": "37.5%"
            }
        }));
        let logs = capture_logs(|| log_optimize_run(&response));

        assert!(logs.contains("yaviq::telemetry"));
        assert!(logs.contains("optimize_and_run: tokensUsed=310, savings=37.5%"));
    }

    #[test]
    fn test_log_optimize_run_without_metrics() {
        let response = EngineResponse::from(json!({ "final_answer": "42" }));
        let logs = capture_logs(|| log_optimize_run(&response));
        assert!(logs.contains("optimize_and_run: tokensUsed=0, savings=0%"));
    }
}
