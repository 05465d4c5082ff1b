use crate::models::ExecutionStatus;
use std::time::Duration;

/// Shortest wait between two status queries
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Longest wait between two status queries
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// What the polling loop should do after observing a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Stop polling; `true` only when the execution succeeded
    Finished(bool),
    /// Sleep for the given duration, then query again
    Wait(Duration),
}

/// Bookkeeping for waiting on an execution.
///
/// The interval is clamped once, at construction. Elapsed time is the sum of
/// the intervals slept so far, not wall-clock time. A zero timeout means no
/// timeout at all.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    timeout: Option<Duration>,
    interval: Duration,
    elapsed: Duration,
}

impl PollSchedule {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        let timeout = if timeout.is_zero() { None } else { Some(timeout) };

        Self {
            timeout,
            interval: interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL),
            elapsed: Duration::ZERO,
        }
    }

    /// The clamped interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.timeout, Some(limit) if self.elapsed >= limit)
    }

    /// Decide the next step for an observed status.
    ///
    /// Terminal statuses finish immediately. Otherwise the timeout is checked
    /// before committing to another sleep, and a `Wait` is recorded as elapsed.
    pub fn decide(&mut self, status: &ExecutionStatus) -> PollDecision {
        if status.is_terminal() {
            return PollDecision::Finished(status.is_success());
        }

        if self.is_expired() {
            return PollDecision::Finished(false);
        }

        self.elapsed += self.interval;
        PollDecision::Wait(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> ExecutionStatus {
        ExecutionStatus::from("running")
    }

    #[test]
    fn test_interval_clamping() {
        let zero = PollSchedule::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(zero.interval(), Duration::from_secs(1));

        let huge = PollSchedule::new(Duration::ZERO, Duration::from_secs(1000));
        assert_eq!(huge.interval(), Duration::from_secs(300));

        let normal = PollSchedule::new(Duration::ZERO, Duration::from_secs(15));
        assert_eq!(normal.interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_terminal_statuses_finish_immediately() {
        let mut schedule = PollSchedule::new(Duration::from_secs(60), Duration::from_secs(5));
        assert_eq!(
            schedule.decide(&ExecutionStatus::Succeeded),
            PollDecision::Finished(true)
        );
        assert_eq!(
            schedule.decide(&ExecutionStatus::Failed),
            PollDecision::Finished(false)
        );
        assert_eq!(
            schedule.decide(&ExecutionStatus::Missing),
            PollDecision::Finished(false)
        );
        assert_eq!(schedule.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_interval_longer_than_timeout() {
        // timeout=5, interval=10: one clamped wait, then the next query decides
        let mut schedule = PollSchedule::new(Duration::from_secs(5), Duration::from_secs(10));
        assert_eq!(
            schedule.decide(&running()),
            PollDecision::Wait(Duration::from_secs(10))
        );
        assert_eq!(
            schedule.decide(&ExecutionStatus::Succeeded),
            PollDecision::Finished(true)
        );

        let mut schedule = PollSchedule::new(Duration::from_secs(5), Duration::from_secs(10));
        schedule.decide(&running());
        assert_eq!(schedule.decide(&running()), PollDecision::Finished(false));
    }

    #[test]
    fn test_timeout_accumulates_intervals() {
        let mut schedule = PollSchedule::new(Duration::from_secs(3), Duration::from_secs(1));
        for _ in 0..3 {
            assert_eq!(
                schedule.decide(&running()),
                PollDecision::Wait(Duration::from_secs(1))
            );
        }
        assert!(schedule.is_expired());
        assert_eq!(schedule.decide(&running()), PollDecision::Finished(false));
    }

    #[test]
    fn test_zero_timeout_never_expires() {
        let mut schedule = PollSchedule::new(Duration::ZERO, Duration::from_secs(300));
        assert_eq!(schedule.timeout(), None);
        for _ in 0..1000 {
            assert!(matches!(schedule.decide(&running()), PollDecision::Wait(_)));
        }
        assert!(!schedule.is_expired());
    }
}
