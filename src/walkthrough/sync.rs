//! Sync polling, modeled as an explicit state machine so the two backoff
//! intervals are a policy rather than inline constants.

use std::time::Duration;

use crate::api::error::ApiError;
use crate::api::types::{SyncRecord, SyncStatus};
use crate::config::PollPolicy;

/// What the driver should do after one status observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Sleep, then poll again.
    Wait(Duration),

    /// The sync reached a terminal status.
    Settled(SyncStatus),

    /// The very first observation failed; polling never began.
    Abort,
}

/// State machine over sync-status observations.
#[derive(Debug)]
pub struct SyncPoller {
    policy: PollPolicy,
    observed_once: bool,
}

impl SyncPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            observed_once: false,
        }
    }

    /// Feed one observation and learn what to do next. An error once
    /// polling has begun is transient: it gets the longer cooldown and
    /// the poll is retried rather than abandoned.
    pub fn step(&mut self, observed: Result<&SyncRecord, &ApiError>) -> PollStep {
        match observed {
            Ok(sync) => {
                self.observed_once = true;
                if sync.status == SyncStatus::Syncing {
                    PollStep::Wait(self.policy.interval)
                } else {
                    PollStep::Settled(sync.status.clone())
                }
            }
            Err(_) if self.observed_once => PollStep::Wait(self.policy.error_backoff),
            Err(_) => PollStep::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syncing() -> SyncRecord {
        SyncRecord {
            status: SyncStatus::Syncing,
            progress: None,
        }
    }

    fn settled(status: &str) -> SyncRecord {
        SyncRecord {
            status: SyncStatus::from(status.to_string()),
            progress: None,
        }
    }

    fn transient_error() -> ApiError {
        serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into()
    }

    fn policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(500),
            error_backoff: Duration::from_secs(3),
        }
    }

    #[test]
    fn settles_after_scripted_syncing_sequence() {
        let mut poller = SyncPoller::new(policy());
        let mut observations = 0;

        for record in [syncing(), syncing()] {
            observations += 1;
            assert_eq!(
                poller.step(Ok(&record)),
                PollStep::Wait(Duration::from_millis(500))
            );
        }
        observations += 1;
        assert_eq!(
            poller.step(Ok(&settled("good"))),
            PollStep::Settled(SyncStatus::Good)
        );
        assert_eq!(observations, 3);
    }

    #[test]
    fn transient_error_gets_the_longer_backoff_exactly_once() {
        let mut poller = SyncPoller::new(policy());
        let error = transient_error();

        let steps = [
            poller.step(Ok(&syncing())),
            poller.step(Err(&error)),
            poller.step(Ok(&syncing())),
            poller.step(Ok(&settled("bad"))),
        ];

        assert_eq!(steps[0], PollStep::Wait(Duration::from_millis(500)));
        assert_eq!(steps[1], PollStep::Wait(Duration::from_secs(3)));
        assert_eq!(steps[2], PollStep::Wait(Duration::from_millis(500)));
        assert_eq!(
            steps[3],
            PollStep::Settled(SyncStatus::Other("bad".to_string()))
        );

        let long_waits = steps
            .iter()
            .filter(|step| **step == PollStep::Wait(Duration::from_secs(3)))
            .count();
        assert_eq!(long_waits, 1);
    }

    #[test]
    fn error_before_any_observation_aborts() {
        let mut poller = SyncPoller::new(policy());
        assert_eq!(poller.step(Err(&transient_error())), PollStep::Abort);
    }

    #[test]
    fn non_good_terminal_status_is_preserved() {
        let mut poller = SyncPoller::new(policy());
        assert_eq!(
            poller.step(Ok(&settled("login failed"))),
            PollStep::Settled(SyncStatus::Other("login failed".to_string()))
        );
    }
}
