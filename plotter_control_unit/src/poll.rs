//! Cooperative poll primitive.
//!
//! Every wait for an external condition (paper at the gate, operator
//! confirmation) goes through [`poll_until`] so the host never
//! busy-spins and an optional iteration cap can turn an endless wait
//! into [`RigError::PollExhausted`].

use plotter_common::config::PollConfig;
use plotter_common::consts::DEFAULT_POLL_INTERVAL_MS;
use plotter_common::error::RigError;
use plotter_common::hal::delay::Delay;
use std::time::Duration;
use tracing::{trace, warn};

/// Interval and optional cap of a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two evaluations.
    pub interval: Duration,
    /// Give up after this many delays. `None` waits forever.
    pub max_iterations: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_iterations: None,
        }
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: config.interval(),
            max_iterations: config.max_iterations,
        }
    }
}

impl PollPolicy {
    /// Same interval, capped at `max_iterations` delays.
    pub fn capped(self, max_iterations: u32) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            ..self
        }
    }
}

/// Evaluate `condition` until it returns `true`.
///
/// The condition is evaluated once before the first delay. Returns the
/// number of delays performed.
///
/// # Errors
///
/// - Whatever `condition` returns, immediately.
/// - `RigError::PollExhausted` once `max_iterations` delays passed
///   without the condition holding.
pub fn poll_until<D, F>(
    what: &'static str,
    policy: &PollPolicy,
    delay: &mut D,
    mut condition: F,
) -> Result<u32, RigError>
where
    D: Delay + ?Sized,
    F: FnMut() -> Result<bool, RigError>,
{
    let mut iterations = 0u32;
    loop {
        if condition()? {
            trace!("poll: {what} after {iterations} polls");
            return Ok(iterations);
        }
        if let Some(max) = policy.max_iterations {
            if iterations >= max {
                warn!("poll: gave up waiting for {what} after {iterations} polls");
                return Err(RigError::PollExhausted { what, iterations });
            }
        }
        delay.delay(policy.interval);
        iterations = iterations.saturating_add(1);
    }
}
