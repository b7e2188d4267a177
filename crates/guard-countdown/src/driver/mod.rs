//! Tick driver.
//!
//! The driver runs the countdown on a single tokio task. Each tick it
//! advances the [`CountdownStore`], derives a complete [`TickReport`], hands
//! it to observers, and only then publishes it on a watch channel, so
//! subscribers never see a half-applied tick.
//!
//! # Example
//!
//! ```no_run
//! use guard_countdown::driver::{IntervalTicks, TickDriver};
//! use guard_countdown::{CountdownStore, UnitSpec};
//!
//! # async fn demo() -> guard_countdown::Result<()> {
//! let store = CountdownStore::new(&[UnitSpec::new("police", 480)])?;
//! let session = TickDriver::new(store, IntervalTicks::every_second())
//!     .stop_when_complete(true)
//!     .start();
//!
//! let mut reports = session.subscribe();
//! while reports.changed().await.is_ok() {
//!     println!("{}", *reports.borrow_and_update());
//! }
//! let store = session.wait().await?;
//! assert!(store.is_complete());
//! # Ok(())
//! # }
//! ```

mod source;

pub use source::{
    manual, IntervalTicks, ManualTicks, ManualTrigger, TickSource, DEFAULT_TICK_PERIOD,
};

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::report::TickReport;
use crate::store::CountdownStore;

/// Receives every report right after the tick that produced it.
pub trait TickObserver: Send {
    /// Called once per tick with the fully recomputed report.
    fn on_tick(&mut self, report: &TickReport);
}

impl<F> TickObserver for F
where
    F: FnMut(&TickReport) + Send,
{
    fn on_tick(&mut self, report: &TickReport) {
        self(report);
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Limits {
    stop_when_complete: bool,
    max_ticks: Option<u64>,
}

impl Limits {
    fn reached(self, store: &CountdownStore) -> bool {
        (self.stop_when_complete && store.is_complete())
            || self.max_ticks.is_some_and(|max| store.ticks_elapsed() >= max)
    }
}

/// Builder for a tracking session.
pub struct TickDriver<S> {
    store: CountdownStore,
    source: S,
    observers: Vec<Box<dyn TickObserver>>,
    limits: Limits,
}

impl<S> std::fmt::Debug for TickDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickDriver")
            .field("store", &self.store)
            .field("observers", &self.observers.len())
            .field("stop_when_complete", &self.limits.stop_when_complete)
            .field("max_ticks", &self.limits.max_ticks)
            .finish_non_exhaustive()
    }
}

impl<S: TickSource + 'static> TickDriver<S> {
    /// Create a driver over a store and a tick source.
    #[must_use]
    pub fn new(store: CountdownStore, source: S) -> Self {
        Self {
            store,
            source,
            observers: Vec::new(),
            limits: Limits::default(),
        }
    }

    /// Register a per-tick observer.
    #[must_use]
    pub fn observer(mut self, observer: impl TickObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// End the session on its own once every unit has arrived.
    #[must_use]
    pub fn stop_when_complete(mut self, stop: bool) -> Self {
        self.limits.stop_when_complete = stop;
        self
    }

    /// End the session after this many ticks.
    #[must_use]
    pub fn max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.limits.max_ticks = max_ticks;
        self
    }

    /// Spawn the driver task. Must be called from within a tokio runtime.
    ///
    /// The returned session owns the task; dropping it cancels the timer.
    #[must_use]
    pub fn start(self) -> TrackingSession {
        let (report_tx, report_rx) = watch::channel(TickReport::from_store(&self.store));
        let (cancel_tx, cancel_rx) = oneshot::channel();

        info!(
            units = self.store.len(),
            overall_eta = self.store.overall_eta(),
            "Tracking session started"
        );
        let task = tokio::spawn(run(
            self.store,
            self.source,
            self.observers,
            self.limits,
            report_tx,
            cancel_rx,
        ));

        TrackingSession {
            task: Some(task),
            cancel: Some(cancel_tx),
            reports: report_rx,
        }
    }
}

async fn run<S: TickSource>(
    mut store: CountdownStore,
    mut source: S,
    mut observers: Vec<Box<dyn TickObserver>>,
    limits: Limits,
    reports: watch::Sender<TickReport>,
    mut cancel: oneshot::Receiver<()>,
) -> CountdownStore {
    while !limits.reached(&store) {
        tokio::select! {
            biased;
            _ = &mut cancel => {
                debug!("Tick driver cancelled");
                break;
            }
            more = source.next_tick() => {
                if !more {
                    debug!("Tick source exhausted");
                    break;
                }
                store.tick();
                let report = TickReport::from_store(&store);
                trace!(
                    tick = report.tick,
                    overall_eta = report.overall_eta_seconds,
                    "Tick applied"
                );
                for observer in &mut observers {
                    observer.on_tick(&report);
                }
                reports.send_replace(report);
            }
        }
    }

    info!(
        ticks = store.ticks_elapsed(),
        complete = store.is_complete(),
        "Tracking session ended"
    );
    store
}

/// A running tracking session.
///
/// This is the owned handle to the recurring timer. Call [`stop`](Self::stop)
/// to cancel it and recover the store; dropping the session aborts the task.
#[derive(Debug)]
pub struct TrackingSession {
    task: Option<JoinHandle<CountdownStore>>,
    cancel: Option<oneshot::Sender<()>>,
    reports: watch::Receiver<TickReport>,
}

impl TrackingSession {
    /// Subscribe to reports. The receiver starts at the latest report.
    ///
    /// `changed()` on the receiver fails once the session has ended.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TickReport> {
        self.reports.clone()
    }

    /// The most recently published report.
    #[must_use]
    pub fn latest(&self) -> TickReport {
        self.reports.borrow().clone()
    }

    /// Whether the driver task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the timer and return the final store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverJoin`] if the driver task panicked.
    pub async fn stop(mut self) -> Result<CountdownStore> {
        if let Some(cancel) = self.cancel.take() {
            // The task may already have ended on its own.
            let _ = cancel.send(());
        }
        self.join().await
    }

    /// Wait for the session to end on its own (completion, tick limit, or an
    /// exhausted source) and return the final store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverJoin`] if the driver task panicked.
    pub async fn wait(mut self) -> Result<CountdownStore> {
        self.join().await
    }

    async fn join(&mut self) -> Result<CountdownStore> {
        let task = self
            .task
            .take()
            .ok_or_else(|| Error::internal("tracking session already joined"))?;
        Ok(task.await?)
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("Tracking session dropped, aborting tick driver");
            }
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::unit::{UnitSpec, UnitStatus};

    fn store(specs: &[UnitSpec]) -> CountdownStore {
        CountdownStore::new(specs).unwrap()
    }

    #[tokio::test]
    async fn test_initial_report_available_before_first_tick() {
        let (_trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 360)]), ticks).start();

        let report = session.latest();
        assert_eq!(report.tick, 0);
        assert_eq!(report.overall_eta_seconds, 360);
        assert!(!report.complete);
    }

    #[tokio::test]
    async fn test_each_tick_is_published() {
        crate::logging::init_test_logging();
        let (trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 3)]), ticks).start();
        let mut reports = session.subscribe();

        for expected in [2_u32, 1, 0] {
            assert!(trigger.fire());
            reports.changed().await.unwrap();
            let report = reports.borrow_and_update().clone();
            assert_eq!(report.unit("A").unwrap().remaining_eta_seconds, expected);
        }
        let report = session.latest();
        assert_eq!(report.tick, 3);
        assert!(report.complete);
        assert_eq!(report.unit("A").unwrap().status, UnitStatus::Arrived);

        let store = session.stop().await.unwrap();
        assert!(store.is_complete());
    }

    #[tokio::test]
    async fn test_stop_cancels_timer() {
        let (trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 100)]), ticks).start();
        let mut reports = session.subscribe();

        trigger.fire();
        reports.changed().await.unwrap();

        let store = session.stop().await.unwrap();
        assert_eq!(store.get("A").unwrap().remaining_eta_seconds(), 99);
        assert!(trigger.is_closed());
        assert!(!trigger.fire());
        assert!(reports.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_drop_aborts_driver() {
        let (trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 100)]), ticks).start();
        let mut reports = session.subscribe();

        drop(session);
        assert!(reports.changed().await.is_err());
        assert!(trigger.is_closed());
    }

    #[tokio::test]
    async fn test_stop_when_complete() {
        let (trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 2)]), ticks)
            .stop_when_complete(true)
            .start();

        for _ in 0..5 {
            trigger.fire();
        }
        let store = session.wait().await.unwrap();
        assert!(store.is_complete());
        assert_eq!(store.ticks_elapsed(), 2);
    }

    #[tokio::test]
    async fn test_max_ticks() {
        let (trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 50)]), ticks)
            .max_ticks(Some(4))
            .start();

        for _ in 0..10 {
            trigger.fire();
        }
        let store = session.wait().await.unwrap();
        assert_eq!(store.ticks_elapsed(), 4);
        assert_eq!(store.get("A").unwrap().remaining_eta_seconds(), 46);
    }

    #[tokio::test]
    async fn test_exhausted_source_ends_session() {
        let (trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 50)]), ticks).start();

        trigger.fire();
        drop(trigger);
        let store = session.wait().await.unwrap();
        assert_eq!(store.ticks_elapsed(), 1);
    }

    #[tokio::test]
    async fn test_observers_see_every_tick_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let (trigger, ticks) = manual();
        let session = TickDriver::new(
            store(&[UnitSpec::new("A", 360), UnitSpec::new("B", 720)]),
            ticks,
        )
        .observer(move |report: &TickReport| {
            sink.lock()
                .unwrap()
                .push((report.tick, report.overall_eta_seconds));
        })
        .max_ticks(Some(3))
        .start();

        for _ in 0..3 {
            trigger.fire();
        }
        session.wait().await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![(1, 359), (2, 358), (3, 357)]);
    }

    #[tokio::test]
    async fn test_overall_eta_switches_to_next_unit() {
        let (trigger, ticks) = manual();
        let session = TickDriver::new(
            store(&[UnitSpec::new("A", 360), UnitSpec::new("B", 720)]),
            ticks,
        )
        .max_ticks(Some(360))
        .start();

        for _ in 0..360 {
            trigger.fire();
        }
        let store = session.wait().await.unwrap();
        assert_eq!(store.get("A").unwrap().remaining_eta_seconds(), 0);
        assert_eq!(store.overall_eta(), 360);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_driven_session_runs_in_wall_time() {
        let start = tokio::time::Instant::now();
        let session = TickDriver::new(
            store(&[UnitSpec::new("A", 5)]),
            IntervalTicks::every_second(),
        )
        .stop_when_complete(true)
        .start();

        let store = session.wait().await.unwrap();
        assert!(store.is_complete());
        assert_eq!(store.ticks_elapsed(), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_complete_store_ends_immediately() {
        let (_trigger, ticks) = manual();
        let session = TickDriver::new(store(&[UnitSpec::new("A", 0)]), ticks)
            .stop_when_complete(true)
            .start();

        let store = session.wait().await.unwrap();
        assert_eq!(store.ticks_elapsed(), 0);
    }

    #[test]
    fn test_driver_debug() {
        let (_trigger, ticks) = manual();
        let driver = TickDriver::new(CountdownStore::default(), ticks).max_ticks(Some(3));
        let debug_str = format!("{driver:?}");
        assert!(debug_str.contains("TickDriver"));
        assert!(debug_str.contains("max_ticks"));
    }
}
