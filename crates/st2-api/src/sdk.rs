use crate::client::{ApiConfig, ClientOptions, St2ApiClient};
use crate::errors::{ApiError, Result};
use st2_core::{ExecutionStatus, ResponseValue};
use std::time::Duration;

/// Main SDK struct for StackStorm
pub struct St2 {
    api_client: St2ApiClient,
}

impl St2 {
    /// Connect and authenticate with the given options
    pub async fn new(options: ClientOptions) -> Result<Self> {
        let api_client = St2ApiClient::connect(options).await?;
        Ok(Self { api_client })
    }

    /// Connect using any configuration implementing ApiConfig
    pub async fn from_config<C>(config: &C) -> std::result::Result<Self, C::Error>
    where
        C: ApiConfig,
        C::Error: From<ApiError>,
    {
        let options = config.client_options()?;
        Ok(Self::new(options).await?)
    }

    /// Wrap an existing client
    pub fn from_client(api_client: St2ApiClient) -> Self {
        Self { api_client }
    }

    /// Access the underlying client for raw requests
    pub fn client(&self) -> &St2ApiClient {
        &self.api_client
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_client.authenticated()
    }

    /// Fetch the API root document (contains e.g. `version`)
    pub async fn api_info(&self) -> Result<ResponseValue> {
        self.api_client
            .get(self.api_client.path_prefix(), &[])
            .await
    }

    /// Server version reported by the API root, if any
    pub async fn version(&self) -> Result<Option<String>> {
        let info = self.api_info().await?;
        Ok(info
            .get("version")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string()))
    }

    pub async fn execution_status(&self, id: &str) -> Result<ExecutionStatus> {
        self.api_client.get_execution_status(id).await
    }

    pub async fn execution_result(&self, id: &str) -> Result<ResponseValue> {
        self.api_client.get_execution_result(id).await
    }

    pub async fn wait_for_execution(
        &self,
        id: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<bool> {
        self.api_client
            .wait_for_execution(id, timeout, interval)
            .await
    }
}
