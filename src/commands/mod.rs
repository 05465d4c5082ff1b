pub mod config;
pub mod execution;
pub mod request;
pub mod whoami;

use crate::config::Config;
use crate::display::print_warning;
use crate::errors::Result;
use st2_api::St2;

/// Connect with the configured credentials, warning when none of them worked
pub(crate) async fn connect(config: &Config) -> Result<St2> {
    let st2 = St2::from_config(config).await?;

    if !st2.is_authenticated() {
        print_warning("Not authenticated; requests are sent without credentials");
    }

    Ok(st2)
}
