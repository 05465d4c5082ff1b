use crate::cli::ExecutionCommands;
use crate::commands::connect;
use crate::config::Config;
use crate::display::{format_status, print_error, print_json, print_success};
use crate::errors::Result;
use clap::Args;
use std::time::Duration;

#[derive(Args)]
pub struct WaitArgs {
    /// Execution ID
    pub id: String,

    /// Give up after this many seconds (0 waits forever)
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,

    /// Seconds between status checks (clamped to 1..=300)
    #[arg(long, default_value_t = 5)]
    pub interval: u64,
}

pub async fn handle(action: ExecutionCommands, config: &Config) -> Result<bool> {
    match action {
        ExecutionCommands::Status { id } => handle_status(&id, config).await,
        ExecutionCommands::Result { id } => handle_result(&id, config).await,
        ExecutionCommands::Wait(args) => handle_wait(args, config).await,
    }
}

async fn handle_status(id: &str, config: &Config) -> Result<bool> {
    let st2 = connect(config).await?;
    let status = st2.execution_status(id).await?;

    println!("{}: {}", id, format_status(&status));
    Ok(!matches!(status, st2_core::ExecutionStatus::Missing))
}

async fn handle_result(id: &str, config: &Config) -> Result<bool> {
    let st2 = connect(config).await?;
    let result = st2.execution_result(id).await?;

    print_json(&result)?;
    Ok(true)
}

async fn handle_wait(args: WaitArgs, config: &Config) -> Result<bool> {
    let st2 = connect(config).await?;

    let succeeded = st2
        .wait_for_execution(
            &args.id,
            Duration::from_secs(args.timeout),
            Duration::from_secs(args.interval),
        )
        .await?;

    if succeeded {
        print_success(&format!("Execution {} succeeded", args.id));
    } else {
        let status = st2.execution_status(&args.id).await?;
        print_error(&format!(
            "Execution {} did not succeed (status: {})",
            args.id,
            format_status(&status)
        ));
    }

    Ok(succeeded)
}
