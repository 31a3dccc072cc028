use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coverplan::api::ServerConfig;
use coverplan::core::ASSET_LIQUIDATION_FEE_RATE;

#[derive(Parser, Debug)]
#[command(
    name = "coverplan",
    about = "Life-insurance coverage needs estimator (calculator API + lead capture)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, help = "Webhook endpoint that receives saved quotes")]
        webhook_url: String,
        #[arg(
            long,
            default_value_t = ASSET_LIQUIDATION_FEE_RATE,
            help = "Fraction of asset value charged to liquidate illiquid assets"
        )]
        fee_rate: f64,
        #[arg(
            long,
            help = "Report submission success to clients even when the webhook call fails"
        )]
        mask_submit_failures: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            port,
            webhook_url,
            fee_rate,
            mask_submit_failures,
        } => {
            if !(0.0..=1.0).contains(&fee_rate) {
                eprintln!("--fee-rate must be between 0 and 1");
                std::process::exit(1);
            }
            let config = ServerConfig {
                port,
                webhook_url,
                fee_rate,
                mask_submit_failures,
            };
            if let Err(e) = coverplan::api::run_http_server(config).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
    }
}
