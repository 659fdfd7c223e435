//! Work/break interval timer.
//!
//! # Responsibility
//! - Model the two-phase countdown as a pure state machine.
//! - Drive it from a tokio task ticking once per unit.
//!
//! # Invariants
//! - `remaining` never underflows; reaching zero always flips the phase.
//! - Every phase completion raises exactly one notification attempt.

pub mod driver;
pub mod pomodoro;

pub use driver::{spawn_timer, TimerHandle, MIN_TICK_UNIT};
pub use pomodoro::{Phase, PomodoroTimer, TickOutcome, TimerSettings, TimerStatus};
