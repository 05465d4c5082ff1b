use crate::commands::connect;
use crate::config::Config;
use crate::display::{print_info, print_success, print_warning};
use crate::errors::Result;
use st2_api::CredentialMode;

pub async fn handle(config: &Config) -> Result<bool> {
    let st2 = connect(config).await?;
    let client = st2.client();

    print_info(&format!("API: {}{}", client.base_uri(), client.path_prefix()));

    if !st2.is_authenticated() {
        return Ok(false);
    }

    let mode = match client.credential_mode() {
        CredentialMode::ApiKey => "API key",
        CredentialMode::Token => "auth token",
        CredentialMode::None => "no credentials",
    };
    print_success(&format!("Authenticated with {}", mode));

    match st2.version().await {
        Ok(Some(version)) => print_info(&format!("Server version: {}", version)),
        Ok(None) => {}
        Err(e) => print_warning(&format!("Could not read server version: {}", e)),
    }

    Ok(true)
}
