/*!
 * Monitor Task - Periodic Heartbeat
 *
 * Background task that drives the scheduler's logical clock: every interval
 * it calls `Scheduler::tick()` (waking sleepers and aging one item) and hands
 * a fresh snapshot to the configured report sink.
 *
 * # Shutdown
 *
 * 1. **Preferred:** `shutdown().await` sends a shutdown command, awaits the
 *    task and consumes the handle.
 * 2. **Fallback:** dropping the handle without `shutdown()` aborts the task
 *    and logs a warning.
 *
 * # Example Usage
 *
 * ```no_run
 * # use std::time::Duration;
 * # use dqsched::process::{MonitorTask, Scheduler};
 * # async fn example() {
 * let scheduler = Scheduler::new();
 * let task = MonitorTask::spawn(scheduler.clone(), Duration::from_secs(1), None);
 *
 * // ... submit work ...
 *
 * task.shutdown().await;
 * # }
 * ```
 */

use super::scheduler::Scheduler;
use crate::monitoring::ReportSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{info, trace, warn};

/// Control messages for the monitor task
#[derive(Debug, Clone)]
pub enum MonitorCommand {
    /// Change the tick period
    UpdateInterval(Duration),
    /// Stop ticking (reports stop too)
    Pause,
    /// Resume ticking
    Resume,
    /// Run one tick right away
    Trigger,
    /// Shutdown the monitor task
    Shutdown,
}

/// Handle to the monitor background task
pub struct MonitorTask {
    command_tx: mpsc::UnboundedSender<MonitorCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl MonitorTask {
    /// Spawn the monitor on the current tokio runtime
    ///
    /// The first tick fires one full `period` after spawning.
    pub fn spawn(
        scheduler: Scheduler,
        period: Duration,
        sink: Option<Arc<dyn ReportSink>>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            run_monitor_loop(scheduler, period, sink, command_rx).await;
        });

        info!(period_ms = period.as_millis() as u64, "Monitor task spawned");

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    pub fn update_interval(&self, period: Duration) {
        let _ = self.command_tx.send(MonitorCommand::UpdateInterval(period));
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(MonitorCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.command_tx.send(MonitorCommand::Resume);
    }

    /// Run one tick immediately, independent of the interval
    pub fn trigger(&self) {
        let _ = self.command_tx.send(MonitorCommand::Trigger);
    }

    /// Shutdown the monitor gracefully and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(MonitorCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Monitor task shutdown error: {}", e);
            } else {
                info!("Monitor task shutdown complete");
            }
        }
    }
}

fn heartbeat(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    // One logical tick per firing; late firings are not made up in a burst
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn tick_and_report(scheduler: &Scheduler, sink: Option<&Arc<dyn ReportSink>>) {
    let outcome = scheduler.tick();
    trace!(tick = outcome.tick, "Monitor tick");
    if let Some(sink) = sink {
        sink.report(&scheduler.snapshot());
    }
}

async fn run_monitor_loop(
    scheduler: Scheduler,
    period: Duration,
    sink: Option<Arc<dyn ReportSink>>,
    mut command_rx: mpsc::UnboundedReceiver<MonitorCommand>,
) {
    let mut active = true;
    let mut interval = heartbeat(period);

    info!(period_ms = period.as_millis() as u64, "Monitor loop started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if active {
                    tick_and_report(&scheduler, sink.as_ref());
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(MonitorCommand::UpdateInterval(new_period)) => {
                        info!(period_ms = new_period.as_millis() as u64, "Monitor interval updated");
                        interval = heartbeat(new_period);
                    }
                    Some(MonitorCommand::Pause) => {
                        info!("Monitor task paused");
                        active = false;
                    }
                    Some(MonitorCommand::Resume) => {
                        info!("Monitor task resumed");
                        active = true;
                    }
                    Some(MonitorCommand::Trigger) => {
                        tick_and_report(&scheduler, sink.as_ref());
                    }
                    Some(MonitorCommand::Shutdown) | None => {
                        info!("Monitor task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for MonitorTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            warn!(
                "MonitorTask dropped without calling shutdown() - aborting task. \
                 Use `task.shutdown().await` for graceful cleanup."
            );
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::scheduler::Snapshot;
    use crate::process::types::{ItemClass, ItemState, Payload};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        snapshots: Mutex<Vec<Snapshot>>,
    }

    impl ReportSink for CollectingSink {
        fn report(&self, snapshot: &Snapshot) {
            self.snapshots.lock().push(snapshot.clone());
        }
    }

    const PERIOD: Duration = Duration::from_millis(10);

    #[tokio::test(start_paused = true)]
    async fn test_ticks_release_sleepers() {
        let scheduler = Scheduler::new();
        let id = scheduler.submit(ItemClass::Background, Payload::new("b"));
        scheduler.sleep(id, 2).unwrap();

        let task = MonitorTask::spawn(scheduler.clone(), PERIOD, None);

        tokio::time::sleep(Duration::from_millis(15)).await;
        assert_eq!(scheduler.state(id), Some(ItemState::Sleeping));
        assert_eq!(scheduler.remaining(id), Some(1));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(scheduler.state(id), Some(ItemState::Ready));

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_each_tick() {
        let scheduler = Scheduler::new();
        let sink = Arc::new(CollectingSink::default());
        let task = MonitorTask::spawn(scheduler.clone(), PERIOD, Some(sink.clone()));

        tokio::time::sleep(Duration::from_millis(35)).await;
        task.shutdown().await;

        let ticks: Vec<u64> = sink.snapshots.lock().iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume() {
        let scheduler = Scheduler::new();
        let task = MonitorTask::spawn(scheduler.clone(), PERIOD, None);

        task.pause();
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(scheduler.stats().ticks, 0);

        task.resume();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(scheduler.stats().ticks >= 1);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_ticks_immediately() {
        let scheduler = Scheduler::new();
        let task = MonitorTask::spawn(scheduler.clone(), Duration::from_secs(3600), None);

        task.trigger();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(scheduler.stats().ticks, 1);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_update() {
        let scheduler = Scheduler::new();
        let task = MonitorTask::spawn(scheduler.clone(), Duration::from_secs(3600), None);

        task.update_interval(PERIOD);
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(scheduler.stats().ticks, 2);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticking() {
        let scheduler = Scheduler::new();
        let task = MonitorTask::spawn(scheduler.clone(), PERIOD, None);

        tokio::time::sleep(Duration::from_millis(15)).await;
        task.shutdown().await;
        assert_eq!(scheduler.stats().ticks, 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.stats().ticks, 1);
    }

    #[tokio::test]
    async fn test_drop_without_shutdown_aborts() {
        let scheduler = Scheduler::new();
        let task = MonitorTask::spawn(scheduler.clone(), PERIOD, None);
        drop(task);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let ticks = scheduler.stats().ticks;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(scheduler.stats().ticks, ticks);
    }
}
