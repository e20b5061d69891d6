use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cambist_core::{rates::DEFAULT_BASE_URL, ExchangeRateClient, RatesConfig};
use cambist_mcp::tools::{ConvertCurrencyTool, ToolRegistry};
use cambist_mcp::{McpService, StdioServer};
use cambist_server::{api, AppState, ServerConfig, Transport};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cambist")]
#[command(about = "Currency conversion tool server (MCP over SSE or stdio)", long_about = None)]
struct Args {
    /// Exchange-rate provider API key
    #[arg(long, env = "EXCHANGE_RATE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Host to bind the SSE listener to
    #[arg(long, env = "CAMBIST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port for the SSE listener
    #[arg(short, long, env = "CAMBIST_PORT", default_value_t = 8081)]
    port: u16,

    /// Transport to serve on
    #[arg(long, env = "CAMBIST_TRANSPORT", value_enum, default_value = "sse")]
    transport: Transport,

    /// Exchange-rate provider base URL
    #[arg(long, env = "EXCHANGE_RATE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Bound on each upstream call, in seconds
    #[arg(long, env = "CAMBIST_UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    upstream_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr: the stdio transport owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cambist=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let rates = RatesConfig::new(args.api_key)
        .with_base_url(args.base_url)
        .with_timeout(Duration::from_secs(args.upstream_timeout_secs));
    let client = Arc::new(ExchangeRateClient::new(rates)?);

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ConvertCurrencyTool::new(client)));

    let service = Arc::new(McpService::new(
        "cambist",
        env!("CARGO_PKG_VERSION"),
        registry,
    ));
    tracing::info!("Starting Cambist tool server");

    match args.transport {
        Transport::Stdio => StdioServer::new(service).run().await,
        Transport::Sse => {
            let config = ServerConfig {
                host: args.host,
                port: args.port,
            };
            api::serve(&config.bind_addr(), AppState::new(service)).await
        }
    }
}
