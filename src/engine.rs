use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::duration::{
    minutes_to_ms, parse_duration, parse_extension_minutes, DEFAULT_EXTEND_MINUTES,
    MAX_EXTEND_MINUTES, MAX_TIMER_DURATION_MS,
};
use crate::error::InputError;
use crate::render::{EngineEvent, TimerPhase};
use crate::steps::{Step, StepKey, STEPS};
use crate::task::Task;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;
pub const DEFAULT_FLIP_SETTLE_MS: u64 = 700;

/// Tunables for the engine, normally filled in from the user's config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub flip_settle: Duration,
    pub default_extend_minutes: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            flip_settle: Duration::from_millis(DEFAULT_FLIP_SETTLE_MS),
            default_extend_minutes: DEFAULT_EXTEND_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Capture,
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture { step_index: usize },
    Running,
    Completed,
    Extending,
}

impl Phase {
    pub fn view(&self) -> View {
        match self {
            Phase::Capture { .. } => View::Capture,
            _ => View::Timer,
        }
    }

    fn timer_phase(&self) -> Option<TimerPhase> {
        match self {
            Phase::Capture { .. } => None,
            Phase::Running => Some(TimerPhase::Running),
            Phase::Completed => Some(TimerPhase::Completed),
            Phase::Extending => Some(TimerPhase::Extending),
        }
    }
}

/// A single countdown. Replaced wholesale on every start, never adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub end: Instant,
    pub duration_ms: u64,
    pub running: bool,
}

impl TimerState {
    pub fn remaining_ms(&self, now: Instant) -> u64 {
        self.end.saturating_duration_since(now).as_millis() as u64
    }

    /// Share of the countdown still left, 1.0 at start down to 0.0
    pub fn fraction_remaining(&self, now: Instant) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms(now) as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

/// Handle for the active polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCycle {
    pub generation: u64,
    pub next_due: Instant,
}

/// What a successful answer did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    NextStep { step_index: usize },
    TimerStarted { duration_ms: u64 },
}

/// Owns the capture steps, the task being built and the countdown.
#[derive(Debug)]
pub struct WizardTimerEngine<C: Clock = SystemClock> {
    clock: C,
    settings: EngineSettings,
    phase: Phase,
    task: Task,
    timer: Option<TimerState>,
    cycle: Option<PollCycle>,
    generation: u64,
    flip_until: Option<Instant>,
    extend_value: String,
    error: Option<InputError>,
    events: Vec<EngineEvent>,
}

impl WizardTimerEngine<SystemClock> {
    pub fn with_system_clock(settings: EngineSettings) -> Self {
        Self::new(SystemClock, settings)
    }
}

impl<C: Clock> WizardTimerEngine<C> {
    pub fn new(clock: C, settings: EngineSettings) -> Self {
        let mut engine = Self {
            clock,
            settings,
            phase: Phase::Capture { step_index: 0 },
            task: Task::default(),
            timer: None,
            cycle: None,
            generation: 0,
            flip_until: None,
            extend_value: settings.default_extend_minutes.to_string(),
            error: None,
            events: Vec::new(),
        };
        engine.push_capture();
        engine
    }

    pub fn view(&self) -> View {
        self.phase.view()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the prompt being asked, or `None` once the timer is shown
    pub fn step_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Capture { step_index } => Some(step_index),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<&'static Step> {
        self.step_index().map(|i| &STEPS[i])
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn timer(&self) -> Option<&TimerState> {
        self.timer.as_ref()
    }

    pub fn poll_cycle(&self) -> Option<&PollCycle> {
        self.cycle.as_ref()
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        let now = self.clock.now();
        self.timer.map(|t| t.remaining_ms(now))
    }

    pub fn fraction_remaining(&self) -> Option<f64> {
        let now = self.clock.now();
        self.timer.map(|t| t.fraction_remaining(now))
    }

    /// Current contents of the extension field
    pub fn extend_value(&self) -> &str {
        &self.extend_value
    }

    pub fn error(&self) -> Option<&InputError> {
        self.error.as_ref()
    }

    /// True while the hourglass flip from the last (re)start is still settling
    pub fn is_flipping(&self) -> bool {
        let now = self.clock.now();
        self.flip_until.is_some_and(|until| now < until)
    }

    /// Time until the polling cycle wants the next tick
    pub fn poll_timeout(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.cycle.map(|cycle| cycle.next_due.saturating_duration_since(now))
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn submit_answer(&mut self, raw: &str) -> Result<Progress, InputError> {
        let Phase::Capture { step_index } = self.phase else {
            return Err(InputError::NotAvailable {
                action: "submit answer",
            });
        };
        let step = STEPS[step_index];
        let value = step.sanitize(raw);

        match self.apply_answer(step_index, &step, value) {
            Ok(progress) => {
                self.error = None;
                if let Progress::NextStep { .. } = progress {
                    self.push_capture();
                }
                Ok(progress)
            }
            Err(err) => {
                warn!(step = %step.key, error = %err, "answer rejected");
                self.error = Some(err.clone());
                self.push_capture();
                Err(err)
            }
        }
    }

    fn apply_answer(
        &mut self,
        step_index: usize,
        step: &Step,
        value: String,
    ) -> Result<Progress, InputError> {
        if value.is_empty() {
            return Err(InputError::EmptyInput);
        }

        match step.key {
            StepKey::Title => self.task.title = value,
            StepKey::Location => self.task.location = value,
            StepKey::Duration => {
                let duration_ms = parse_duration(&value)?;
                info!(duration_ms, "capture complete, starting timer");
                self.start_timer(duration_ms);
                return Ok(Progress::TimerStarted { duration_ms });
            }
        }

        let next = step_index + 1;
        self.phase = Phase::Capture { step_index: next };
        info!(step = %step.key, next, "answer accepted");
        Ok(Progress::NextStep { step_index: next })
    }

    /// Start a fresh countdown, replacing any timer and polling cycle.
    ///
    /// Zero is ignored; anything above the 24h cap is cut down to it.
    pub fn start_timer(&mut self, duration_ms: u64) {
        if duration_ms == 0 {
            return;
        }
        let duration_ms = duration_ms.min(MAX_TIMER_DURATION_MS);

        self.cancel_cycle();

        let now = self.clock.now();
        self.timer = Some(TimerState {
            end: now + Duration::from_millis(duration_ms),
            duration_ms,
            running: true,
        });
        self.task.duration_ms = duration_ms;
        self.phase = Phase::Running;

        self.generation += 1;
        self.cycle = Some(PollCycle {
            generation: self.generation,
            next_due: now + self.settings.poll_interval,
        });
        self.flip_until = Some(now + self.settings.flip_settle);

        info!(duration_ms, generation = self.generation, "timer started");
        self.events.push(EngineEvent::RestartVisual { duration_ms });
        self.push_timer();
    }

    /// Re-evaluate the countdown. Returns the remaining time when a cycle is
    /// active, `None` otherwise.
    pub fn poll_tick(&mut self) -> Option<u64> {
        let now = self.clock.now();
        let (Some(cycle), Some(timer)) = (self.cycle.as_mut(), self.timer.as_mut()) else {
            return None;
        };

        cycle.next_due = now + self.settings.poll_interval;
        let remaining = timer.remaining_ms(now);
        debug!(remaining, generation = cycle.generation, "poll tick");

        if remaining == 0 {
            timer.running = false;
            self.cycle = None;
            self.phase = Phase::Completed;
            info!(duration_ms = self.task.duration_ms, "timer completed");
        }

        self.push_timer();
        Some(remaining)
    }

    /// Poll only once the active cycle has reached its next due time.
    /// Callers that wake more often than the poll interval use this.
    pub fn poll_if_due(&mut self) -> Option<u64> {
        if self.poll_timeout()? > Duration::ZERO {
            return None;
        }
        self.poll_tick()
    }

    pub fn request_extend(&mut self) -> Result<(), InputError> {
        if !matches!(self.phase, Phase::Completed | Phase::Extending) {
            return Err(InputError::NotAvailable { action: "extend" });
        }

        self.phase = Phase::Extending;
        self.extend_value = self.settings.default_extend_minutes.to_string();
        self.push_timer();
        Ok(())
    }

    /// Restart the countdown with the given minutes. Returns the new duration.
    pub fn confirm_extend(&mut self, minutes_text: &str) -> Result<u64, InputError> {
        if self.phase != Phase::Extending {
            return Err(InputError::NotAvailable {
                action: "confirm extension",
            });
        }

        let parsed = parse_extension_minutes(minutes_text)
            .map(|minutes| (minutes, minutes_to_ms(minutes)))
            .and_then(|(minutes, ms)| match ms {
                0 => Err(InputError::InvalidExtension),
                ms => Ok((minutes, ms)),
            });

        match parsed {
            Ok((minutes, duration_ms)) => {
                self.extend_value = if minutes >= MAX_EXTEND_MINUTES as f64 {
                    MAX_EXTEND_MINUTES.to_string()
                } else {
                    minutes_text.trim().to_string()
                };
                info!(minutes, "extending timer");
                self.start_timer(duration_ms);
                Ok(duration_ms)
            }
            Err(err) => {
                warn!(input = minutes_text, "extension rejected");
                self.extend_value = self.settings.default_extend_minutes.to_string();
                self.push_timer();
                Err(err)
            }
        }
    }

    /// Drop everything and go back to the first prompt
    pub fn finish(&mut self) {
        self.cancel_cycle();
        self.timer = None;
        self.flip_until = None;
        self.task = Task::default();
        self.phase = Phase::Capture { step_index: 0 };
        self.extend_value = self.settings.default_extend_minutes.to_string();
        self.error = None;

        info!("session finished, back to capture");
        self.push_capture();
    }

    fn cancel_cycle(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            debug!(generation = cycle.generation, "polling cycle cancelled");
        }
    }

    fn push_capture(&mut self) {
        if let Some(step) = self.current_step() {
            self.events.push(EngineEvent::Capture {
                step: *step,
                error: self.error.as_ref().map(|e| e.to_string()),
            });
        }
    }

    fn push_timer(&mut self) {
        let now = self.clock.now();
        if let (Some(timer), Some(phase)) = (self.timer, self.phase.timer_phase()) {
            self.events.push(EngineEvent::Timer {
                task: self.task.clone(),
                remaining_ms: timer.remaining_ms(now),
                phase,
            });
        }
    }
}
