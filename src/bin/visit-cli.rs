use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "visit-cli")]
#[command(about = "Command-line client for the visit-tracker service", long_about = None)]
struct Cli {
    /// Base URL of a running service.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service and database health
    Health,
    /// Hit the home route (records a visit)
    Visit,
    /// List registered users
    Users,
    /// Register a new user
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Show user and visit counts
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Visit => client.get(format!("{}/", base)).send().await?,
        Commands::Users => client.get(format!("{}/api/users", base)).send().await?,
        Commands::CreateUser { username, email } => {
            client
                .post(format!("{}/api/users", base))
                .json(&json!({ "username": username, "email": email }))
                .send()
                .await?
        }
        Commands::Stats => client.get(format!("{}/api/stats", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{}", pretty);
            } else {
                eprintln!("Error: service returned status {}", status);
                eprintln!("{}", pretty);
            }
        }
        Err(_) => {
            eprintln!("Error: service returned status {}", status);
            eprintln!("Response: {}", text);
        }
    }

    if status.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
