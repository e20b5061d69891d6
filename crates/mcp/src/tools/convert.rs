// The convert_currency tool: one rate lookup per invocation

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_number, json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use cambist_core::{ConversionRequest, RateError, RateSource};
use serde::Deserialize;
use std::sync::Arc;

/// Operation name advertised to callers.
pub const CONVERT_TOOL_NAME: &str = "convert_currency";

/// Converts an amount between two currencies using real-time rates.
///
/// All expected failures (bad arguments, provider outage, unknown code) are
/// reported as in-band text results; the connection never sees a protocol
/// fault for them.
pub struct ConvertCurrencyTool {
    source: Arc<dyn RateSource>,
}

impl ConvertCurrencyTool {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }
}

#[derive(Debug, Deserialize)]
struct ConvertArgs {
    amount: f64,
    from_currency: String,
    to_currency: String,
}

#[async_trait::async_trait]
impl Tool for ConvertCurrencyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: CONVERT_TOOL_NAME.to_string(),
            description:
                "Convert a currency amount from one currency to another using real-time exchange rates."
                    .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "amount": json_schema_number("The amount of money to convert."),
                    "from_currency": json_schema_string("The currency code to convert from (e.g., 'USD')."),
                    "to_currency": json_schema_string("The currency code to convert to (e.g., 'EUR').")
                }),
                vec!["amount", "from_currency", "to_currency"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ConvertArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(err) => {
                return Ok(CallToolResult::error(format!(
                    "Invalid arguments for convert_currency: {}",
                    err
                )));
            }
        };

        // Validation happens before the upstream is touched.
        let request = match ConversionRequest::new(args.amount, &args.from_currency, &args.to_currency) {
            Ok(request) => request,
            Err(err) => return Ok(CallToolResult::error(failure_text(&err))),
        };

        match self.source.convert(&request).await {
            Ok(result) => Ok(CallToolResult::text(result.to_string())),
            Err(err) => Ok(CallToolResult::error(failure_text(&err))),
        }
    }
}

/// The documented user-facing sentence for each failure mode.
fn failure_text(err: &RateError) -> String {
    match err {
        RateError::InvalidArgument(message) => message.clone(),
        RateError::UpstreamUnavailable { status: Some(code) } => {
            format!("Error: Unable to fetch exchange rates. Status code: {}", code)
        }
        RateError::UpstreamUnavailable { status: None } => {
            "Error: Unable to fetch exchange rates.".to_string()
        }
        RateError::UnknownCurrency(code) => format!("Invalid currency code: {}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cambist_core::{ConversionResult, RateResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub rate source that counts lookups and returns a canned outcome.
    struct StubSource {
        outcome: RateResult<(f64, f64)>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn ok(converted: f64, rate: f64) -> Self {
            Self {
                outcome: Ok((converted, rate)),
                calls: AtomicUsize::new(0),
            }
        }

        fn err(err: RateError) -> Self {
            Self {
                outcome: Err(err),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RateSource for StubSource {
        async fn convert(&self, request: &ConversionRequest) -> RateResult<ConversionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok((converted, rate)) => Ok(ConversionResult::new(request, *converted, *rate)),
                Err(err) => Err(err.clone()),
            }
        }
    }

    async fn run(source: Arc<StubSource>, arguments: serde_json::Value) -> CallToolResult {
        ConvertCurrencyTool::new(source)
            .execute(arguments)
            .await
            .unwrap()
    }

    #[test]
    fn schema_declares_the_contract() {
        let tool = ConvertCurrencyTool::new(Arc::new(StubSource::ok(1.0, 1.0)));
        let schema = tool.schema();

        assert_eq!(schema.name, "convert_currency");
        let required = schema.input_schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert_eq!(schema.input_schema["properties"]["amount"]["type"], "number");
        assert_eq!(
            schema.input_schema["properties"]["from_currency"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn renders_the_conversion_sentence() {
        let source = Arc::new(StubSource::ok(92.35, 0.9235));
        let result = run(
            source.clone(),
            serde_json::json!({"amount": 100, "from_currency": "USD", "to_currency": "EUR"}),
        )
        .await;

        assert_eq!(
            result.first_text(),
            Some("100 USD = 92.35 EUR (Exchange Rate: 0.9235)")
        );
        assert_eq!(result.is_error, None);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn lowercase_codes_are_uppercased_in_the_sentence() {
        let source = Arc::new(StubSource::ok(92.35, 0.9235));
        let result = run(
            source,
            serde_json::json!({"amount": 100, "from_currency": "usd", "to_currency": "eur"}),
        )
        .await;

        assert_eq!(
            result.first_text(),
            Some("100 USD = 92.35 EUR (Exchange Rate: 0.9235)")
        );
    }

    #[tokio::test]
    async fn missing_field_never_reaches_the_source() {
        let source = Arc::new(StubSource::ok(1.0, 1.0));
        let result = run(
            source.clone(),
            serde_json::json!({"from_currency": "USD", "to_currency": "EUR"}),
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert!(result.first_text().unwrap().contains("amount"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn non_numeric_amount_never_reaches_the_source() {
        let source = Arc::new(StubSource::ok(1.0, 1.0));
        let result = run(
            source.clone(),
            serde_json::json!({"amount": "lots", "from_currency": "USD", "to_currency": "EUR"}),
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn non_positive_amount_never_reaches_the_source() {
        let source = Arc::new(StubSource::ok(1.0, 1.0));
        let result = run(
            source.clone(),
            serde_json::json!({"amount": -5, "from_currency": "USD", "to_currency": "EUR"}),
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert!(result.first_text().unwrap().contains("amount"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn upstream_status_is_echoed_in_the_error_sentence() {
        let source = Arc::new(StubSource::err(RateError::upstream(503)));
        let result = run(
            source,
            serde_json::json!({"amount": 100, "from_currency": "USD", "to_currency": "EUR"}),
        )
        .await;

        assert_eq!(
            result.first_text(),
            Some("Error: Unable to fetch exchange rates. Status code: 503")
        );
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn unknown_currency_echoes_the_requested_code() {
        let source = Arc::new(StubSource::err(RateError::UnknownCurrency(
            "XYZ".to_string(),
        )));
        let result = run(
            source,
            serde_json::json!({"amount": 100, "from_currency": "USD", "to_currency": "XYZ"}),
        )
        .await;

        assert_eq!(result.first_text(), Some("Invalid currency code: XYZ"));
    }

    #[tokio::test]
    async fn generic_upstream_failure_has_no_status_code() {
        let source = Arc::new(StubSource::err(RateError::upstream_generic()));
        let result = run(
            source,
            serde_json::json!({"amount": 100, "from_currency": "USD", "to_currency": "EUR"}),
        )
        .await;

        assert_eq!(
            result.first_text(),
            Some("Error: Unable to fetch exchange rates.")
        );
    }
}
