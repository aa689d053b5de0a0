use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::DEFAULT_PORT;

#[derive(Parser)]
#[command(name = "vnquote")]
#[command(about = "Vietnamese stock market history and analytics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch history for a symbol and print summary statistics
    Quote {
        /// Ticker symbol (e.g. VNM, VCB, HPG)
        symbol: String,

        /// Start date (YYYY-MM-DD), default 180 days before end
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), default today
        #[arg(long)]
        end: Option<String>,

        /// Data source: vci or tcbs
        #[arg(long, default_value = "vci")]
        source: String,

        /// Output format: text, json, or csv
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Start the web API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Data source: vci or tcbs
        #[arg(long, default_value = "vci")]
        source: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Quote {
            symbol,
            start,
            end,
            source,
            format,
        } => {
            commands::quote::run(symbol, start, end, source, format).await;
        }
        Commands::Serve { port, source } => {
            commands::serve::run(port, source).await;
        }
    }
}
