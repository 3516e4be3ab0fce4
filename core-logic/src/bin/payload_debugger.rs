use anyhow::{Context, Result};
use clap::Parser;
use core_logic::security::SecurityUtils;

/// Decrypts a captured completion payload to inspect the trace it carries.
#[derive(Parser)]
struct Args {
    /// The payload string as sent to the game/complete endpoint
    #[arg(short, long)]
    payload: String,
    /// The gameTag the payload was encrypted with (falls back to GAME_TAG)
    #[arg(short, long)]
    key: Option<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let key = args
        .key
        .or_else(|| std::env::var("GAME_TAG").ok())
        .context("Key definition not found (arg or .env)")?;

    println!("IV: {}", args.payload.get(..16).unwrap_or(&args.payload));
    println!("Attempting decryption...");

    match SecurityUtils::decrypt_payload(&args.payload, key.as_bytes()) {
        Ok(trace) => {
            let events: Vec<&str> = trace.split(';').collect();
            println!("SUCCESS! {} events", events.len());
            for event in events {
                println!("  {}", event);
            }
        }
        Err(e) => {
            println!("Failed: {}", e);
        }
    }

    Ok(())
}
