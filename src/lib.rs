// Library surface for headless/integration tests and reuse.
// The terminal UI lives in the binary; everything here is UI-agnostic.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod logging;
pub mod render;
pub mod runtime;
pub mod steps;
pub mod task;

pub use engine::{Phase, Progress, View, WizardTimerEngine};
pub use error::InputError;
pub use render::{EngineEvent, Renderer, TimerPhase};
