use crate::duration::format_remaining;
use crate::steps::Step;
use crate::task::Task;

/// What the countdown is doing while the timer view is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TimerPhase {
    Running,
    Completed,
    Extending,
}

/// Drawing surface the engine reports to.
///
/// The engine never calls this directly; it queues [`EngineEvent`]s and the
/// owner of the engine delivers them with [`EngineEvent::deliver`].
pub trait Renderer {
    fn render_capture(&mut self, step: &Step, error: Option<&str>);
    fn render_timer(&mut self, task: &Task, remaining_label: &str, phase: TimerPhase);
    /// The countdown was (re)started; flip the hourglass.
    fn restart_visual(&mut self, _duration_ms: u64) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Capture {
        step: Step,
        error: Option<String>,
    },
    Timer {
        task: Task,
        remaining_ms: u64,
        phase: TimerPhase,
    },
    RestartVisual {
        duration_ms: u64,
    },
}

impl EngineEvent {
    pub fn deliver<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        match self {
            EngineEvent::Capture { step, error } => renderer.render_capture(step, error.as_deref()),
            EngineEvent::Timer {
                task,
                remaining_ms,
                phase,
            } => renderer.render_timer(task, &format_remaining(*remaining_ms), *phase),
            EngineEvent::RestartVisual { duration_ms } => renderer.restart_visual(*duration_ms),
        }
    }
}
