//! Rate lookup client for the exchangerate-api.com pair endpoint.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RateError, RateResult};
use crate::types::{format_amount, ConversionRequest, ConversionResult};

/// Default upstream provider.
pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com";

/// Default bound on the outbound call. The upstream answers in well under a
/// second when healthy; anything slower is treated as unavailable.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of exchange rates.
///
/// The tool layer holds an `Arc<dyn RateSource>` so tests can substitute a
/// stub for the real provider.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Performs one rate lookup for an already-validated request.
    async fn convert(&self, request: &ConversionRequest) -> RateResult<ConversionResult>;
}

/// Configuration for the upstream rate provider.
#[derive(Debug, Clone)]
pub struct RatesConfig {
    /// API key issued by the provider.
    pub api_key: String,
    /// Provider base URL; overridable for tests.
    pub base_url: String,
    /// Bound on each outbound call.
    pub timeout: Duration,
}

impl RatesConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the provider's pair-conversion endpoint:
/// `GET {base}/v6/{key}/pair/{FROM}/{TO}/{amount}`.
///
/// One outbound call per lookup; no caching, no retries.
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    http: reqwest::Client,
    config: RatesConfig,
}

impl ExchangeRateClient {
    pub fn new(config: RatesConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn pair_url(&self, request: &ConversionRequest) -> String {
        format!(
            "{}/v6/{}/pair/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_key,
            request.from_currency(),
            request.to_currency(),
            format_amount(request.amount())
        )
    }
}

/// Body of a pair-conversion response. The provider reports errors inside a
/// 2xx envelope as `{"result": "error", ...}`, in which case the conversion
/// fields are absent.
#[derive(Debug, Deserialize)]
struct PairResponse {
    conversion_result: Option<f64>,
    conversion_rate: Option<f64>,
}

#[async_trait::async_trait]
impl RateSource for ExchangeRateClient {
    async fn convert(&self, request: &ConversionRequest) -> RateResult<ConversionResult> {
        debug!(
            from = request.from_currency(),
            to = request.to_currency(),
            amount = request.amount(),
            "pair conversion request"
        );

        let response = self
            .http
            .get(self.pair_url(request))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "exchange rate request failed");
                RateError::upstream_generic()
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "exchange rate provider returned an error status");
            return Err(RateError::upstream(status.as_u16()));
        }

        let body: PairResponse = response.json().await.map_err(|err| {
            warn!(error = %err, "exchange rate response body was not valid JSON");
            RateError::upstream_generic()
        })?;

        match (body.conversion_result, body.conversion_rate) {
            (Some(converted), Some(rate)) => Ok(ConversionResult::new(request, converted, rate)),
            _ => Err(RateError::UnknownCurrency(
                request.to_currency().to_string(),
            )),
        }
    }
}
