//! Execution helpers: status, result, and waiting for completion

use crate::client::St2ApiClient;
use crate::errors::Result;
use log::{debug, info};
use st2_core::{ExecutionStatus, PollDecision, PollSchedule, ResponseValue, St2Error};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

impl St2ApiClient {
    fn execution_path(&self, id: &str) -> String {
        format!("{}/executions/{}", self.path_prefix(), id)
    }

    /// Get the status of an execution.
    ///
    /// An unknown id (404) yields [`ExecutionStatus::Missing`] instead of an
    /// error, as does a response without a `status` field.
    pub async fn get_execution_status(&self, id: &str) -> Result<ExecutionStatus> {
        if id.is_empty() {
            return Err(St2Error::missing_argument("id").into());
        }

        let execution = match self.get(&self.execution_path(id), &[]).await {
            Ok(execution) => execution,
            Err(e) if e.is_not_found() => {
                debug!("Execution {} not found", id);
                return Ok(ExecutionStatus::Missing);
            }
            Err(e) => return Err(e),
        };

        let status = execution
            .get("status")
            .map(ExecutionStatus::from_json)
            .unwrap_or(ExecutionStatus::Missing);

        debug!("Execution {} status: {}", id, status);
        Ok(status)
    }

    /// Get the result document of an execution.
    ///
    /// Unlike [`St2ApiClient::get_execution_status`], an unknown id is an
    /// invalid-argument error. A response without a `result` field is `Absent`.
    pub async fn get_execution_result(&self, id: &str) -> Result<ResponseValue> {
        if id.is_empty() {
            return Err(St2Error::missing_argument("id").into());
        }

        let execution = match self.get(&self.execution_path(id), &[]).await {
            Ok(execution) => execution,
            Err(e) if e.is_not_found() => {
                return Err(St2Error::InvalidInput(format!(
                    "execution '{}' cannot be found",
                    id
                ))
                .into());
            }
            Err(e) => return Err(e),
        };

        Ok(execution
            .get("result")
            .cloned()
            .map(ResponseValue::from)
            .unwrap_or_default())
    }

    /// Poll an execution until it succeeds, fails, disappears, or times out.
    ///
    /// `interval` is clamped to 1..=300 seconds. A zero `timeout` waits
    /// indefinitely. Returns true only when the execution succeeded.
    pub async fn wait_for_execution(
        &self,
        id: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<bool> {
        self.wait_for_execution_with_cancel(id, timeout, interval, &CancellationToken::new())
            .await
    }

    /// Same as [`St2ApiClient::wait_for_execution`], returning false as soon as
    /// `cancel` fires.
    pub async fn wait_for_execution_with_cancel(
        &self,
        id: &str,
        timeout: Duration,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if id.is_empty() {
            return Err(St2Error::missing_argument("id").into());
        }

        let mut schedule = PollSchedule::new(timeout, interval);
        debug!(
            "Waiting for execution {} (timeout: {:?}, interval: {:?})",
            id,
            schedule.timeout(),
            schedule.interval()
        );

        loop {
            if cancel.is_cancelled() {
                info!("Wait for execution {} cancelled", id);
                return Ok(false);
            }

            let status = self.get_execution_status(id).await?;

            match schedule.decide(&status) {
                PollDecision::Finished(succeeded) => {
                    info!(
                        "Execution {} finished waiting with status '{}' after {:?}",
                        id,
                        status,
                        schedule.elapsed()
                    );
                    return Ok(succeeded);
                }
                PollDecision::Wait(interval) => {
                    debug!("Execution {} is '{}', sleeping {:?}", id, status, interval);
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("Wait for execution {} cancelled", id);
                            return Ok(false);
                        }
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{ClientOptions, St2ApiClient};
    use std::time::Duration;

    fn client() -> St2ApiClient {
        St2ApiClient::new(&ClientOptions::default()).unwrap()
    }

    #[test]
    fn test_execution_path() {
        assert_eq!(client().execution_path("abc"), "/api/v1/executions/abc");

        let short = St2ApiClient::new(&ClientOptions::default().with_api_prefix(false)).unwrap();
        assert_eq!(short.execution_path("abc"), "/v1/executions/abc");
    }

    #[tokio::test]
    async fn test_empty_id_is_invalid() {
        let client = client();
        assert!(client
            .get_execution_status("")
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client
            .get_execution_result("")
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client
            .wait_for_execution("", Duration::ZERO, Duration::from_secs(1))
            .await
            .unwrap_err()
            .is_invalid_argument());
    }
}
