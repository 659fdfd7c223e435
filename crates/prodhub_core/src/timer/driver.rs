//! Async driver that ticks a [`PomodoroTimer`] once per unit.
//!
//! The tick task ends when a phase completes and the timer is left idle, or
//! when the handle is stopped.

use super::pomodoro::{PomodoroTimer, TickOutcome};
use crate::notify::Notifier;
use log::info;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest tick unit; `tokio::time::interval` rejects a zero period.
pub const MIN_TICK_UNIT: Duration = Duration::from_millis(1);

/// Shared handle to a timer driven by a background tick task.
///
/// Commands (`start`, `pause`, ...) go through [`TimerHandle::with_timer`];
/// the tick task only advances a running timer.
pub struct TimerHandle<N: Notifier> {
    timer: Arc<Mutex<PomodoroTimer<N>>>,
    task: JoinHandle<()>,
}

impl<N: Notifier> TimerHandle<N> {
    /// Runs `f` with exclusive access to the timer.
    pub fn with_timer<T>(&self, f: impl FnOnce(&mut PomodoroTimer<N>) -> T) -> T {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut timer)
    }

    /// True once the tick task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the tick task. The timer state is kept as-is.
    pub fn stop(self) {
        self.task.abort();
        info!("event=timer_driver module=timer status=stopped");
    }
}

/// Spawns a tick task on the current tokio runtime.
pub fn spawn_timer<N>(timer: PomodoroTimer<N>, unit: Duration) -> TimerHandle<N>
where
    N: Notifier + 'static,
{
    let unit = unit.max(MIN_TICK_UNIT);
    let timer = Arc::new(Mutex::new(timer));
    let shared = Arc::clone(&timer);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(unit);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of a tokio interval completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let (outcome, still_running) = {
                let mut timer = shared.lock().unwrap_or_else(PoisonError::into_inner);
                let outcome = timer.tick();
                (outcome, timer.is_running())
            };
            if let TickOutcome::PhaseCompleted { finished, next } = outcome {
                info!(
                    "event=timer_driver module=timer status=phase_completed finished={finished:?} next={next:?}"
                );
                if !still_running {
                    break;
                }
            }
        }
        info!("event=timer_driver module=timer status=finished");
    });
    TimerHandle { timer, task }
}
