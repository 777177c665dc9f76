//! Invoice Pricing CLI
//!
//! Reads invoice line items from CSV and writes one priced row per invoice.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- invoices.csv [rates.json] > priced.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use invoice_pricing::{EngineError, InvoiceBatch, PricingEngine, RateTables, Result};
use log::info;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(EngineError::MissingArgument);
    }

    let rates = match args.get(2) {
        Some(path) => {
            info!("Loading rate tables from {}", path);
            RateTables::from_json(BufReader::new(File::open(path)?))?
        }
        None => RateTables::default(),
    };

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let mut batch = InvoiceBatch::new(PricingEngine::with_rates(rates)?);
    batch.process_csv(reader)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    batch.write_output(handle)?;

    Ok(())
}
