use clap::Parser;
use miette::{IntoDiagnostic, Result};
use monetizer::application::ledger::CreditLedger;
use monetizer::config::MonetizerConfig;
use monetizer::domain::account::Balance;
use monetizer::interfaces::csv::balance_writer::BalanceWriter;
use monetizer::interfaces::csv::chunk_reader::ChunkReader;
use monetizer::interfaces::ilp::intake::PaymentIntake;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Replays a CSV stream of accepted payment chunks through the credit
/// ledger and prints the final balances.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input chunk CSV file (destination, amount)
    input: PathBuf,

    /// Optional ceiling applied to every payer's balance.
    #[arg(long)]
    max_balance: Option<Decimal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the balance CSV; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.max_balance {
        Some(max) => MonetizerConfig::with_max_balance(Balance::new(max)),
        None => MonetizerConfig::unbounded(),
    };
    let ledger = CreditLedger::new(config);
    let intake = PaymentIntake::new(Arc::new(ledger.clone()));

    // Replay chunks
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = ChunkReader::new(file);
    for chunk_result in reader.chunks() {
        match chunk_result {
            Ok(chunk) => {
                if let Err(e) = intake.accept_chunk(&chunk.destination, &chunk.amount).await {
                    eprintln!("Error processing chunk: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading chunk: {}", e);
            }
        }
    }

    // Output final state
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_balances(ledger.snapshot()).into_diagnostic()?;

    Ok(())
}
