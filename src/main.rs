use clap::Parser;
use st2_rs::cli::{run_cli, Cli};
use st2_rs::display::print_error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before the logger so RUST_LOG can come from it
    let dotenv_result = dotenv::dotenv();
    env_logger::init();

    if let Err(e) = dotenv_result {
        log::debug!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();

    match run_cli(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            print_error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
