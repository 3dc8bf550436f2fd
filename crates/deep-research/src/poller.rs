use std::time::Duration;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::errors::{ResearchError, ResearchResult};
use crate::models::interaction::{Interaction, InteractionHandle, InteractionStatus};
use crate::providers::base::InteractionProvider;

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const REPORT_BUDGET: Duration = Duration::from_secs(900);
pub const NARRATIVE_BUDGET: Duration = Duration::from_secs(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Wall-clock limit measured from the first status query.
    pub budget: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, budget: Duration) -> Self {
        Self { interval, budget }
    }

    pub fn report() -> Self {
        Self::new(POLL_INTERVAL, REPORT_BUDGET)
    }

    pub fn narrative() -> Self {
        Self::new(POLL_INTERVAL, NARRATIVE_BUDGET)
    }
}

/// Observer for a running research job. All hooks default to no-ops.
pub trait Progress {
    fn submitted(&mut self, _handle: &InteractionHandle) {}

    /// Called after each non-terminal poll, right before sleeping.
    fn waiting(&mut self, _status: &InteractionStatus, _elapsed: Duration) {}
}

impl Progress for () {}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(Interaction),
    Failed {
        handle: InteractionHandle,
        detail: String,
    },
    TimedOut {
        handle: InteractionHandle,
        status: InteractionStatus,
        elapsed: Duration,
    },
}

impl PollOutcome {
    pub fn into_interaction(self) -> ResearchResult<Interaction> {
        match self {
            PollOutcome::Completed(interaction) => Ok(interaction),
            PollOutcome::Failed { handle, detail } => Err(ResearchError::Remote { handle, detail }),
            PollOutcome::TimedOut {
                handle,
                status,
                elapsed,
            } => Err(ResearchError::Timeout {
                handle,
                status,
                elapsed,
            }),
        }
    }
}

pub struct Poller<'a, P, C> {
    provider: &'a P,
    clock: &'a C,
    policy: PollPolicy,
}

impl<'a, P: InteractionProvider, C: Clock> Poller<'a, P, C> {
    pub fn new(provider: &'a P, clock: &'a C, policy: PollPolicy) -> Self {
        Self {
            provider,
            clock,
            policy,
        }
    }

    /// Re-queries `handle` every interval until it finishes or the budget runs out.
    ///
    /// A status that arrives after the budget has elapsed still wins over the
    /// timeout: the status is checked before the clock.
    pub fn wait(
        &self,
        handle: &InteractionHandle,
        progress: &mut dyn Progress,
    ) -> ResearchResult<PollOutcome> {
        let poll_start = self.clock.now();

        loop {
            let interaction =
                self.provider
                    .get(handle)
                    .map_err(|source| ResearchError::StatusQuery {
                        handle: handle.clone(),
                        source,
                    })?;

            match interaction.status {
                InteractionStatus::Completed => {
                    info!("Interaction {} completed", handle);
                    return Ok(PollOutcome::Completed(interaction));
                }
                InteractionStatus::Failed => {
                    let detail = interaction.error_detail();
                    info!("Interaction {} failed: {}", handle, detail);
                    return Ok(PollOutcome::Failed {
                        handle: handle.clone(),
                        detail,
                    });
                }
                InteractionStatus::Pending(_) => {}
            }

            let elapsed = self.clock.now().duration_since(poll_start);
            if elapsed > self.policy.budget {
                return Ok(PollOutcome::TimedOut {
                    handle: handle.clone(),
                    status: interaction.status,
                    elapsed,
                });
            }

            debug!(
                "Interaction {} is {} after {:.0}s",
                handle,
                interaction.status,
                elapsed.as_secs_f64()
            );
            progress.waiting(&interaction.status, elapsed);
            self.clock.sleep(self.policy.interval);
        }
    }
}
