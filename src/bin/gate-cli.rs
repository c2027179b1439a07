use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Client for the header-gated inventory service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Secret token sent with every request
    #[arg(short, long)]
    token: Option<String>,

    #[arg(long, default_value = "x-secret-token")]
    header: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a user record
    User { id: u64 },
    /// Fetch an inventory item
    Item { id: u64 },
    /// Delete an inventory item
    DeleteItem { id: u64 },
    /// Check service liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            HeaderName::from_bytes(cli.header.as_bytes())?,
            HeaderValue::from_str(token)?,
        );
    }

    let request = match cli.command {
        Commands::User { id } => client.get(format!("{}/users/{}", cli.url, id)),
        Commands::Item { id } => client.get(format!("{}/inventory/{}", cli.url, id)),
        Commands::DeleteItem { id } => client.delete(format!("{}/inventory/{}", cli.url, id)),
        Commands::Health => client.get(format!("{}/health", cli.url)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("{}", status);

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
