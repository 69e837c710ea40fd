use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::time::Instant;
use tracing::error;

use cluster_insights::config::validate_args;
use cluster_insights::utils::{format_elapsed, setup_logging};
use cluster_insights::{
    run_report, Args, CredentialSource, EnvCredentials, HttpTransport, ReportConfig, ReportError,
};

fn run(args: &Args) -> std::result::Result<(), ReportError> {
    let config = ReportConfig::from_args(args)?;
    let credentials = EnvCredentials::default().load();
    let transport = HttpTransport::new(config.base_url.clone())?;

    let outcome = run_report(&config, &credentials, &transport, Utc::now())?;
    println!(
        "\n{} clusters fetched, {} report rows",
        outcome.clusters, outcome.rows
    );
    Ok(())
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    match run(&args) {
        Ok(()) => {
            println!("Total execution time: {}", format_elapsed(start_time.elapsed()));
            Ok(())
        }
        Err(e) => {
            let code = e.code();
            error!(error_code = code.table_code(), "{}", e);
            eprintln!("{} ({}): {}", code.description(), code.table_code(), e);
            std::process::exit(code.exit_status());
        }
    }
}
