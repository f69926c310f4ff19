// =============================================================================
// Advisory Client — Anthropic Messages API
// =============================================================================
//
// SECURITY: The API key is sent only as the x-api-key header and is never
// logged or serialized. All failure modes degrade to an unavailable outcome;
// this client never returns an error to the analysis pipeline.
// =============================================================================

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::advisory::{extract_json, normalize_conviction, normalize_signal, AdvisoryOutcome};
use crate::analysis::StatisticsSummary;
use crate::indicators::TechnicalConfirmation;
use crate::signals::generator::SignalSummary;
use crate::types::Direction;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the external advisory model.
#[derive(Clone)]
pub struct AdvisoryClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct RawAdvice {
    #[serde(default)]
    signal: Option<String>,
    #[serde(default)]
    conviction: Option<serde_json::Value>,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    risk_factors: Option<Vec<String>>,
}

impl AdvisoryClient {
    /// Create a new client. An empty `api_key` is allowed; every call will
    /// then return the unavailable outcome immediately.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    /// Ask the advisory model for a relative-performance judgment.
    ///
    /// Infallible by design: missing key, transport failures, non-2xx
    /// responses, and malformed replies all degrade to an unavailable or
    /// parse-error outcome.
    #[instrument(skip(self, stats, tech, signal), name = "advisory::recommend")]
    pub async fn recommend(
        &self,
        ticker_a: &str,
        ticker_b: &str,
        stats: &StatisticsSummary,
        tech: &TechnicalConfirmation,
        signal: &SignalSummary,
    ) -> AdvisoryOutcome {
        if self.api_key.is_empty() {
            return AdvisoryOutcome::unavailable(
                "AI recommendation unavailable: set ANTHROPIC_API_KEY in .env to enable.",
            );
        }

        let prompt = crate::advisory::prompt::build_prompt(ticker_a, ticker_b, stats, tech, signal);

        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "advisory request failed");
                return AdvisoryOutcome::unavailable(format!("AI recommendation failed: {e}"));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "advisory service returned an error status");
            return AdvisoryOutcome::unavailable(format!(
                "AI recommendation failed: service returned {status}"
            ));
        }

        let parsed: MessagesResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "advisory response body unreadable");
                return AdvisoryOutcome::unavailable(format!("AI recommendation failed: {e}"));
            }
        };

        let text = parsed
            .content
            .first()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default();

        debug!(chars = text.len(), "advisory reply received");
        self.parse_reply(&text)
    }

    /// Turn the model's reply text into a normalized outcome.
    fn parse_reply(&self, text: &str) -> AdvisoryOutcome {
        let candidate = extract_json(text);

        let raw: RawAdvice = match serde_json::from_str(candidate) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "advisory reply was not valid JSON");
                return AdvisoryOutcome {
                    signal: None,
                    conviction: 0,
                    recommendation: text.to_string(),
                    risk_factors: Vec::new(),
                    available: true,
                    model_used: Some(self.model.clone()),
                    parse_error: true,
                };
            }
        };

        let signal: Direction = raw
            .signal
            .as_deref()
            .map(normalize_signal)
            .unwrap_or(Direction::Neutral);

        let raw_conviction = raw
            .conviction
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(50);

        AdvisoryOutcome {
            signal: Some(signal),
            conviction: normalize_conviction(raw_conviction),
            recommendation: raw.recommendation.unwrap_or_default(),
            risk_factors: raw.risk_factors.unwrap_or_default(),
            available: true,
            model_used: Some(self.model.clone()),
            parse_error: false,
        }
    }
}
