//! Pomodoro state machine.

use crate::model::task::{Task, TaskId};
use crate::notify::Notifier;
use log::{info, warn};

/// Current timer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    fn flipped(self) -> Self {
        match self {
            Self::Work => Self::Break,
            Self::Break => Self::Work,
        }
    }

    fn completion_message(self) -> &'static str {
        match self {
            Self::Work => "Work session completed! Take a break.",
            Self::Break => "Break completed! Time to work.",
        }
    }
}

/// Externally visible timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    /// Counting down the work phase.
    Running,
    Paused,
    /// Counting down the break phase.
    BreakRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    Paused,
}

/// Phase durations in ticks (seconds when driven by [`super::spawn_timer`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub work_secs: u32,
    pub break_secs: u32,
    /// Keep counting into the next phase instead of stopping at Idle.
    pub auto_start_next_phase: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            break_secs: 5 * 60,
            auto_start_next_phase: false,
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running; nothing changed.
    NotRunning,
    Counting { remaining: u32 },
    PhaseCompleted { finished: Phase, next: Phase },
}

/// Work/break countdown linked to an optional task.
pub struct PomodoroTimer<N: Notifier> {
    settings: TimerSettings,
    phase: Phase,
    run_state: RunState,
    remaining: u32,
    selected_task: Option<TaskId>,
    notifier: N,
}

impl<N: Notifier> PomodoroTimer<N> {
    /// Creates an idle timer at the start of a work phase.
    ///
    /// Zero durations are raised to one tick.
    pub fn new(settings: TimerSettings, notifier: N) -> Self {
        let settings = TimerSettings {
            work_secs: settings.work_secs.max(1),
            break_secs: settings.break_secs.max(1),
            ..settings
        };
        Self {
            remaining: settings.work_secs,
            settings,
            phase: Phase::Work,
            run_state: RunState::Idle,
            selected_task: None,
            notifier,
        }
    }

    /// Idle/Paused -> Running. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.run_state == RunState::Running {
            return false;
        }
        self.run_state = RunState::Running;
        true
    }

    /// Running -> Paused. Returns `false` in any other state.
    pub fn pause(&mut self) -> bool {
        if self.run_state != RunState::Running {
            return false;
        }
        self.run_state = RunState::Paused;
        true
    }

    /// Pauses a running timer or resumes a paused one.
    pub fn toggle_pause(&mut self) -> bool {
        match self.run_state {
            RunState::Running => self.pause(),
            RunState::Paused => self.start(),
            RunState::Idle => false,
        }
    }

    /// Any -> Idle with the current phase's full duration.
    pub fn reset(&mut self) {
        self.run_state = RunState::Idle;
        self.remaining = self.phase_duration(self.phase);
    }

    /// Advances the countdown by one unit.
    pub fn tick(&mut self) -> TickOutcome {
        if self.run_state != RunState::Running {
            return TickOutcome::NotRunning;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Counting {
                remaining: self.remaining,
            };
        }

        let finished = self.phase;
        let next = finished.flipped();
        self.phase = next;
        self.remaining = self.phase_duration(next);
        if !self.settings.auto_start_next_phase {
            self.run_state = RunState::Idle;
        }
        info!(
            "event=timer_phase module=timer status=ok finished={finished:?} next={next:?} task_selected={}",
            self.selected_task.is_some()
        );
        if let Err(err) = self.notifier.notify(finished.completion_message()) {
            warn!("event=timer_notify module=timer status=error error={err}");
        }
        TickOutcome::PhaseCompleted { finished, next }
    }

    /// Updates the work duration; applies now when in an idle/paused work phase.
    pub fn set_work_duration(&mut self, secs: u32) {
        self.settings.work_secs = secs.max(1);
        self.refresh_remaining_for(Phase::Work);
    }

    /// Updates the break duration; applies now when in an idle/paused break.
    pub fn set_break_duration(&mut self, secs: u32) {
        self.settings.break_secs = secs.max(1);
        self.refresh_remaining_for(Phase::Break);
    }

    pub fn select_task(&mut self, id: Option<TaskId>) {
        self.selected_task = id;
    }

    pub fn selected_task(&self) -> Option<TaskId> {
        self.selected_task
    }

    pub fn status(&self) -> TimerStatus {
        match (self.run_state, self.phase) {
            (RunState::Idle, _) => TimerStatus::Idle,
            (RunState::Paused, _) => TimerStatus::Paused,
            (RunState::Running, Phase::Work) => TimerStatus::Running,
            (RunState::Running, Phase::Break) => TimerStatus::BreakRunning,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    /// Remaining time as `MM:SS`.
    pub fn remaining_clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    /// Human label for the current phase and selected task.
    ///
    /// A selected id missing from `tasks` is treated as no selection.
    pub fn status_label(&self, tasks: &[Task]) -> String {
        let selected = self
            .selected_task
            .and_then(|id| tasks.iter().find(|task| task.id == id));
        match (selected, self.phase) {
            (Some(task), Phase::Work) => format!("Working on: {}", task.text),
            (Some(task), Phase::Break) => format!("Break: {}", task.text),
            (None, Phase::Work) => "No task selected".to_string(),
            (None, Phase::Break) => "Break time".to_string(),
        }
    }

    fn phase_duration(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.settings.work_secs,
            Phase::Break => self.settings.break_secs,
        }
    }

    fn refresh_remaining_for(&mut self, phase: Phase) {
        if self.phase == phase && self.run_state != RunState::Running {
            self.remaining = self.phase_duration(phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PomodoroTimer, TimerSettings};
    use crate::notify::LogNotifier;

    #[test]
    fn remaining_clock_pads_minutes_and_seconds() {
        let mut timer = PomodoroTimer::new(TimerSettings::default(), LogNotifier);
        assert_eq!(timer.remaining_clock(), "25:00");
        timer.set_work_duration(65);
        assert_eq!(timer.remaining_clock(), "01:05");
    }

    #[test]
    fn zero_durations_are_raised_to_one_tick() {
        let settings = TimerSettings {
            work_secs: 0,
            break_secs: 0,
            auto_start_next_phase: false,
        };
        let timer = PomodoroTimer::new(settings, LogNotifier);
        assert_eq!(timer.remaining_secs(), 1);
        assert_eq!(timer.settings().break_secs, 1);
    }
}
