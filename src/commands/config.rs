use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::display::{print_success, print_warning};
use crate::errors::Result;

/// Handles the `config` command for configuration management and inspection.
///
/// Changes made by `set` and `unset` are written back to the config file
/// immediately.
pub fn handle(action: ConfigCommands, config: &mut Config) -> Result<bool> {
    match action {
        ConfigCommands::Show => {
            println!("Configuration file: {}", config.path().display());
            println!();
            print!("{}", config.show_config());
            Ok(true)
        }
        ConfigCommands::Get { section, key } => match config.get_value(&section, &key)? {
            Some(value) => {
                println!("{}", value);
                Ok(true)
            }
            None => {
                print_warning(&format!("{}.{} is not set", section, key));
                Ok(false)
            }
        },
        ConfigCommands::Set {
            section,
            key,
            value,
        } => {
            config.set_value(&section, &key, &value)?;
            config.save()?;
            print_success(&format!("Set {}.{}", section, key));
            Ok(true)
        }
        ConfigCommands::Unset { section, key } => {
            config.unset_value(&section, &key)?;
            config.save()?;
            print_success(&format!("Removed {}.{}", section, key));
            Ok(true)
        }
        ConfigCommands::Path => {
            println!("{}", config.path().display());
            Ok(true)
        }
    }
}
