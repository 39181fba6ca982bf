use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::models::NotificationKind;
use crate::notifications::new_notification;
use crate::state::{AppHandle, AppState, Command};

const ALERT_PROBABILITY_CUTOFF: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub alert_added: bool,
    pub flags_added: u32,
}

/// One background refresh: occasionally raise a synthetic alert, and always
/// nudge the total-flags KPI by 0 to 2.
pub fn tick<R: Rng + ?Sized>(state: &mut AppState, rng: &mut R) -> TickReport {
    let mut report = TickReport::default();

    if rng.gen::<f64>() > ALERT_PROBABILITY_CUTOFF {
        let kind = if rng.gen::<f64>() > 0.5 {
            NotificationKind::Warning
        } else {
            NotificationKind::Info
        };
        let case_number: u32 = rng.gen_range(0..100);
        state.dispatch(Command::AddNotification(new_notification(
            kind,
            "New Fraud Alert",
            format!("Risk pattern detected in case {case_number}"),
            None,
        )));
        report.alert_added = true;
    }

    report.flags_added = rng.gen_range(0..3);
    let mut kpis = state.kpis().clone();
    kpis.total_flags += report.flags_added;
    state.dispatch(Command::UpdateKpiData(kpis));

    report
}

/// Owns the background refresh task. Stop it explicitly with [`TickerHandle::stop`];
/// dropping the handle aborts the task.
pub struct TickerHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl TickerHandle {
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        debug!(ticks = self.ticks(), "ticker stopped");
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub fn spawn_ticker(app: AppHandle, period: Duration, mut rng: StdRng) -> TickerHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let ticks = Arc::new(AtomicU64::new(0));
    let counter = ticks.clone();

    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = interval.tick() => {
                    let report = app.write(|state| tick(state, &mut rng));
                    counter.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        alert_added = report.alert_added,
                        flags_added = report.flags_added,
                        "background tick"
                    );
                }
            }
        }
    });

    TickerHandle {
        stop: Some(stop_tx),
        task: Some(task),
        ticks,
    }
}
