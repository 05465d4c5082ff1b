use crate::commands::connect;
use crate::config::Config;
use crate::display::{print_json, print_success};
use crate::errors::{CliError, Result};
use clap::Args;
use serde_json::Value;

#[derive(Args)]
pub struct RequestArgs {
    /// API path, e.g. /api/v1/actions
    pub path: String,

    /// Query parameter (KEY=VALUE), may be repeated
    #[arg(short = 'p', long = "param")]
    pub params: Vec<String>,
}

#[derive(Args)]
pub struct BodyRequestArgs {
    /// API path, e.g. /api/v1/executions
    pub path: String,

    /// Query parameter (KEY=VALUE), may be repeated
    #[arg(short = 'p', long = "param")]
    pub params: Vec<String>,

    /// JSON request body
    #[arg(short, long, default_value = "{}")]
    pub data: String,
}

/// Split `KEY=VALUE` pairs
pub fn parse_params(raw: &[String]) -> Result<Vec<(&str, &str)>> {
    raw.iter()
        .map(|param| {
            param.split_once('=').ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "Invalid parameter '{}', expected KEY=VALUE",
                    param
                ))
            })
        })
        .collect()
}

fn parse_body(data: &str) -> Result<Value> {
    serde_json::from_str(data)
        .map_err(|e| CliError::InvalidInput(format!("Request body is not valid JSON: {}", e)))
}

pub async fn handle_get(args: RequestArgs, config: &Config) -> Result<bool> {
    let params = parse_params(&args.params)?;
    let st2 = connect(config).await?;

    let value = st2.client().get(&args.path, &params).await?;
    print_json(&value)?;
    Ok(true)
}

pub async fn handle_post(args: BodyRequestArgs, config: &Config) -> Result<bool> {
    let params = parse_params(&args.params)?;
    let body = parse_body(&args.data)?;
    let st2 = connect(config).await?;

    let value = st2.client().post(&args.path, &params, &body).await?;
    print_json(&value)?;
    Ok(true)
}

pub async fn handle_put(args: BodyRequestArgs, config: &Config) -> Result<bool> {
    let params = parse_params(&args.params)?;
    let body = parse_body(&args.data)?;
    let st2 = connect(config).await?;

    st2.client().put(&args.path, &params, &body).await?;
    print_success(&format!("PUT {}", args.path));
    Ok(true)
}

pub async fn handle_delete(args: RequestArgs, config: &Config) -> Result<bool> {
    let params = parse_params(&args.params)?;
    let st2 = connect(config).await?;

    st2.client().delete(&args.path, &params).await?;
    print_success(&format!("DELETE {}", args.path));
    Ok(true)
}
