use crate::errors::{CliError, ConfigError, Result};
use st2_api::auth::mask_secret;
use st2_api::ApiConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an alternative config file
pub const CONFIG_FILE_ENV: &str = "ST2_CONFIG_FILE";

const SECTION_STACKSTORM: &str = "stackstorm";
const SECTION_CREDENTIALS: &str = "credentials";

/// Keys whose values are masked by `show_config`
const SECRET_KEYS: &[&str] = &["api_key", "auth_token", "password"];

/// Configuration manager for the st2 client
///
/// Backed by an INI file:
///
/// ```ini
/// [stackstorm]
/// api_host = st2.example.com
/// verify = false
///
/// [credentials]
/// api_key = ...
/// user = st2admin
/// password = ...
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    config_path: PathBuf,
    data: ini::Ini,
    use_env: bool,
}

impl Config {
    /// Load the config file named by `ST2_CONFIG_FILE`, or `~/.st2/config`
    pub fn new() -> Result<Self> {
        let config_path = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_config_path()?,
        };
        Self::load_from(config_path)
    }

    /// Load a specific config file. A missing file yields an empty config.
    pub fn load_from(config_path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = config_path.into();

        let data = if config_path.exists() {
            ini::Ini::load_from_file(&config_path)
                .map_err(|e| ConfigError::IniError(e.to_string()))?
        } else {
            ini::Ini::new()
        };

        Ok(Config {
            config_path,
            data,
            use_env: true,
        })
    }

    /// Stop environment variables from overriding file values
    pub fn ignore_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Save the configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| ConfigError::DirectoryCreationFailed(e.to_string()))?;
            }
        }

        self.data
            .write_to_file(&self.config_path)
            .map_err(|e| ConfigError::IniError(e.to_string()))?;
        Ok(())
    }

    /// Get a configuration value
    pub fn get_value(&self, section: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .data
            .get_from(Some(section), key)
            .map(|s| s.to_string()))
    }

    /// Set a configuration value
    pub fn set_value(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        self.data.with_section(Some(section)).set(key, value);
        Ok(())
    }

    /// Remove a configuration value
    pub fn unset_value(&mut self, section: &str, key: &str) -> Result<()> {
        if let Some(section_map) = self.data.section_mut(Some(section)) {
            section_map.remove(key);
        }
        Ok(())
    }

    /// Environment variable first (when enabled), then the file
    fn lookup(&self, env_var: &str, section: &str, key: &str) -> Result<Option<String>> {
        if self.use_env {
            if let Ok(value) = std::env::var(env_var) {
                if !value.is_empty() {
                    return Ok(Some(value));
                }
            }
        }

        Ok(self
            .get_value(section, key)?
            .filter(|value| !value.is_empty()))
    }

    /// Read a boolean, accepting the spellings INI files commonly use
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool> {
        match self.get_value(section, key)? {
            None => Ok(default),
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: format!("{}.{}", section, key),
                    value,
                }
                .into()
            }),
        }
    }

    /// Base URI of the API. A bare host name is given an `https://` scheme.
    pub fn get_base_url(&self) -> Result<Option<String>> {
        Ok(self
            .lookup("ST2_BASE_URL", SECTION_STACKSTORM, "api_host")?
            .map(|host| host_to_uri(&host)))
    }

    pub fn get_api_key(&self) -> Result<Option<String>> {
        self.lookup("ST2_API_KEY", SECTION_CREDENTIALS, "api_key")
    }

    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        self.set_value(SECTION_CREDENTIALS, "api_key", api_key)
    }

    pub fn get_auth_token(&self) -> Result<Option<String>> {
        self.lookup("ST2_AUTH_TOKEN", SECTION_CREDENTIALS, "auth_token")
    }

    /// Username and password. Either one alone is returned with the other
    /// empty, so the client reports which argument is missing.
    pub fn get_credentials(&self) -> Result<Option<(String, String)>> {
        let username = self.lookup("ST2_USERNAME", SECTION_CREDENTIALS, "user")?;
        let password = self.lookup("ST2_PASSWORD", SECTION_CREDENTIALS, "password")?;

        match (username, password) {
            (None, None) => Ok(None),
            (u, p) => Ok(Some((u.unwrap_or_default(), p.unwrap_or_default()))),
        }
    }

    pub fn get_verify(&self) -> Result<bool> {
        self.get_bool(SECTION_STACKSTORM, "verify", true)
    }

    pub fn set_verify(&mut self, verify: bool) -> Result<()> {
        self.set_value(SECTION_STACKSTORM, "verify", if verify { "true" } else { "false" })
    }

    pub fn get_api_prefix(&self) -> Result<bool> {
        self.get_bool(SECTION_STACKSTORM, "api_prefix", true)
    }

    pub fn get_validate_api_key(&self) -> Result<bool> {
        self.get_bool(SECTION_STACKSTORM, "validate_api_key", true)
    }

    /// Per-request timeout in seconds
    pub fn get_request_timeout(&self) -> Result<Option<Duration>> {
        match self.get_value(SECTION_STACKSTORM, "request_timeout")? {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(|secs| Some(Duration::from_secs(secs)))
                .map_err(|_| {
                    ConfigError::InvalidValue {
                        field: format!("{}.request_timeout", SECTION_STACKSTORM),
                        value,
                    }
                    .into()
                }),
        }
    }

    /// Show all configuration as a formatted string, secrets masked
    pub fn show_config(&self) -> String {
        let mut output = String::new();

        for (section_name, section) in self.data.iter() {
            if let Some(section_name) = section_name {
                output.push_str(&format!("[{}]\n", section_name));
            }

            for (key, value) in section.iter() {
                let shown = if SECRET_KEYS.contains(&key) {
                    mask_secret(value)
                } else {
                    value.to_string()
                };
                output.push_str(&format!("{} = {}\n", key, shown));
            }
            output.push('\n');
        }

        output
    }
}

impl ApiConfig for Config {
    type Error = CliError;

    fn get_base_url(&self) -> Result<Option<String>> {
        Config::get_base_url(self)
    }

    fn get_api_key(&self) -> Result<Option<String>> {
        Config::get_api_key(self)
    }

    fn get_auth_token(&self) -> Result<Option<String>> {
        Config::get_auth_token(self)
    }

    fn get_credentials(&self) -> Result<Option<(String, String)>> {
        Config::get_credentials(self)
    }

    fn get_verify(&self) -> Result<bool> {
        Config::get_verify(self)
    }

    fn get_api_prefix(&self) -> Result<bool> {
        Config::get_api_prefix(self)
    }

    fn get_validate_api_key(&self) -> Result<bool> {
        Config::get_validate_api_key(self)
    }

    fn get_request_timeout(&self) -> Result<Option<Duration>> {
        Config::get_request_timeout(self)
    }
}

/// Default config file location
fn default_config_path() -> Result<PathBuf> {
    let home_dir = home::home_dir().ok_or_else(|| {
        ConfigError::DirectoryCreationFailed("Could not find home directory".to_string())
    })?;

    Ok(home_dir.join(".st2").join("config"))
}

fn host_to_uri(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_test_harness_layout() {
        let file = write_config(
            "[stackstorm]\napi_host = st2.example.com\n\n\
             [credentials]\napi_key = abc123\nuser = st2admin\npassword = secret\n",
        );
        let config = Config::load_from(file.path()).unwrap().ignore_env();

        assert_eq!(
            config.get_base_url().unwrap().as_deref(),
            Some("https://st2.example.com")
        );
        assert_eq!(config.get_api_key().unwrap().as_deref(), Some("abc123"));
        assert_eq!(
            config.get_credentials().unwrap(),
            Some(("st2admin".to_string(), "secret".to_string()))
        );
        assert!(config.get_verify().unwrap());
    }

    #[test]
    fn test_client_options_from_config() {
        let file = write_config(
            "[stackstorm]\napi_host = http://10.0.0.5:9101\nverify = no\napi_prefix = false\n\
             validate_api_key = off\nrequest_timeout = 30\n\n\
             [credentials]\nauth_token = tok\n",
        );
        let config = Config::load_from(file.path()).unwrap().ignore_env();
        let options = config.client_options().unwrap();

        assert_eq!(options.base_uri, "http://10.0.0.5:9101");
        assert!(!options.verify);
        assert!(!options.api_prefix);
        assert!(!options.validate_api_key);
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.auth_token.as_deref(), Some("tok"));
        assert_eq!(options.api_key, None);
        assert_eq!(options.username, None);
    }

    #[test]
    fn test_defaults_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent"))
            .unwrap()
            .ignore_env();
        let options = config.client_options().unwrap();

        assert_eq!(options.base_uri, "https://localhost");
        assert!(options.verify);
        assert!(options.api_prefix);
        assert!(options.validate_api_key);
        assert_eq!(options.request_timeout, None);
    }

    #[test]
    fn test_partial_credentials() {
        let file = write_config("[credentials]\nuser = st2admin\n");
        let config = Config::load_from(file.path()).unwrap().ignore_env();

        assert_eq!(
            config.get_credentials().unwrap(),
            Some(("st2admin".to_string(), String::new()))
        );
    }

    #[test]
    fn test_invalid_values() {
        let file = write_config("[stackstorm]\nverify = maybe\nrequest_timeout = soon\n");
        let config = Config::load_from(file.path()).unwrap().ignore_env();

        assert!(config.get_verify().is_err());
        assert!(config.get_request_timeout().is_err());
    }

    #[test]
    fn test_set_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config");

        let mut config = Config::load_from(&path).unwrap().ignore_env();
        config.set_api_key("key-0001-0002").unwrap();
        config.set_verify(false).unwrap();
        config.set_value("stackstorm", "api_host", "st2.local").unwrap();
        config.save().unwrap();

        let mut reloaded = Config::load_from(&path).unwrap().ignore_env();
        assert_eq!(reloaded.get_api_key().unwrap().as_deref(), Some("key-0001-0002"));
        assert!(!reloaded.get_verify().unwrap());

        reloaded.unset_value("credentials", "api_key").unwrap();
        assert_eq!(reloaded.get_api_key().unwrap(), None);
    }

    #[test]
    fn test_show_config_masks_secrets() {
        let file = write_config(
            "[stackstorm]\napi_host = st2.local\n\n[credentials]\napi_key = abcd1234wxyz\npassword = hunter22\n",
        );
        let config = Config::load_from(file.path()).unwrap();
        let shown = config.show_config();

        assert!(shown.contains("[stackstorm]"));
        assert!(shown.contains("api_host = st2.local"));
        assert!(shown.contains("api_key = abcd...wxyz"));
        assert!(!shown.contains("hunter22"));
    }

    #[test]
    fn test_host_to_uri() {
        assert_eq!(host_to_uri("st2"), "https://st2");
        assert_eq!(host_to_uri(" http://st2:9101 "), "http://st2:9101");
    }
}
