use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Management CLI for the storefront admin settings", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(long, env = "ADMIN_USER", default_value = "admin")]
    user: String,

    #[arg(long, env = "ADMIN_PASS")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// IP bypass settings
    Security {
        #[command(subcommand)]
        action: SecurityAction,
    },
    /// Gate and media status
    Status,
}

#[derive(Subcommand)]
enum SecurityAction {
    /// Print the current whitelist and bypass switch
    Show,
    /// Change the whitelist and/or the bypass switch
    Set {
        /// Comma-separated IPs; an empty value clears the list
        #[arg(long)]
        whitelist: Option<String>,

        #[arg(long)]
        bypass: Option<bool>,
    },
}

fn update_body(whitelist: Option<String>, bypass: Option<bool>) -> Value {
    let mut body = Map::new();
    if let Some(list) = whitelist {
        let ips = list
            .split(',')
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(|ip| Value::String(ip.to_string()))
            .collect();
        body.insert("ipWhitelist".to_string(), Value::Array(ips));
    }
    if let Some(bypass) = bypass {
        body.insert("ipBypass".to_string(), Value::Bool(bypass));
    }
    Value::Object(body)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');
    let security_url = format!("{base}/api/admin/security-config");

    let res = match cli.command {
        Commands::Security { action: SecurityAction::Show } => {
            client
                .get(&security_url)
                .basic_auth(&cli.user, Some(&cli.password))
                .send()
                .await?
        }
        Commands::Security {
            action: SecurityAction::Set { whitelist, bypass },
        } => {
            if whitelist.is_none() && bypass.is_none() {
                eprintln!("Nothing to change: pass --whitelist and/or --bypass");
                std::process::exit(2);
            }
            client
                .put(&security_url)
                .basic_auth(&cli.user, Some(&cli.password))
                .json(&update_body(whitelist, bypass))
                .send()
                .await?
        }
        Commands::Status => {
            client
                .get(format!("{base}/api/admin/status"))
                .basic_auth(&cli.user, Some(&cli.password))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
