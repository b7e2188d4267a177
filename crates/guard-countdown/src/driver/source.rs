//! Tick sources.
//!
//! The driver does not own a clock. It pulls ticks from a [`TickSource`], so
//! the same loop runs on a real interval in production and on a hand-fired
//! channel in tests or inside a host event loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::error::{Error, Result};

/// Default tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// A source of discrete ticks.
#[async_trait::async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick.
    ///
    /// Returns `false` once the source is exhausted and will never tick again.
    async fn next_tick(&mut self) -> bool;
}

/// Fixed-period ticks backed by a tokio interval.
///
/// The first tick fires one full period after creation. If the process is
/// suspended and ticks are missed, they are not replayed in a burst; the
/// schedule simply resumes from the late tick.
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// Create an interval source. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if `period` is zero.
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::config_validation("tick period must be greater than 0"));
        }
        Ok(Self::starting_after(period))
    }

    /// One tick per second.
    #[must_use]
    pub fn every_second() -> Self {
        Self::starting_after(DEFAULT_TICK_PERIOD)
    }

    // `period` must be non-zero; `interval_at` panics otherwise.
    fn starting_after(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// The tick period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait::async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Create a manually fired tick source and its trigger.
#[must_use]
pub fn manual() -> (ManualTrigger, ManualTicks) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualTrigger { tx }, ManualTicks { rx })
}

/// Ticks delivered through a channel by a [`ManualTrigger`].
///
/// The source is exhausted once every trigger has been dropped and all
/// pending ticks have been consumed.
#[derive(Debug)]
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

#[async_trait::async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Fires ticks into a [`ManualTicks`] source.
#[derive(Debug, Clone)]
pub struct ManualTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTrigger {
    /// Queue one tick. Returns `false` if the source has been dropped.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }

    /// Whether the receiving source is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
