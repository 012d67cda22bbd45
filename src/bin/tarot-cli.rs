use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "tarot-cli")]
#[command(about = "Command-line client for the tarot chat relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status banner, uptime and request count
    Status,
    /// Liveness check with request and error totals
    Ping,
    /// Ask the relay a question
    Ask {
        /// The question to ask
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Ping => {
            let res = client.get(format!("{}/ping", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Ask { question } => {
            let res = client
                .post(format!("{}/tarot-chat", base))
                .json(&json!({ "question": question }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
