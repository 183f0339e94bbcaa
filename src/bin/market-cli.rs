use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "market-cli")]
#[command(about = "Command-line client for the market gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all cached quotes
    Stocks,
    /// Show one quote
    Quote { symbol: String },
    /// Show price history
    History {
        symbol: String,
        #[arg(long, default_value = "1mo")]
        period: String,
        #[arg(long, default_value = "1d")]
        interval: String,
    },
    /// Check gateway status
    Health,
    /// Search symbols by ticker or company name
    Search {
        query: String,
        #[arg(long, default_value = "NSE")]
        exchange: String,
    },
    /// Latest market headlines
    News,
    /// Ask for a seven-day price prediction
    Predict { symbol: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Stocks => client.get(format!("{}/api/stocks", base)),
        Commands::Quote { symbol } => client.get(format!("{}/api/stocks/{}", base, symbol)),
        Commands::History {
            symbol,
            period,
            interval,
        } => client
            .get(format!("{}/api/stocks/{}/history", base, symbol))
            .query(&[("period", period), ("interval", interval)]),
        Commands::Health => client.get(format!("{}/api/health", base)),
        Commands::Search { query, exchange } => client
            .get(format!("{}/api/search", base))
            .query(&[("q", query), ("exchange", exchange)]),
        Commands::News => client.get(format!("{}/api/news", base)),
        Commands::Predict { symbol } => client
            .post(format!("{}/api/predict", base))
            .json(&serde_json::json!({ "symbol": symbol })),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Some(retry) = res.headers().get("retry-after").and_then(|v| v.to_str().ok()) {
            eprintln!("Retry after: {}s", retry);
        }
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
