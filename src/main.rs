pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use onething::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    engine::WizardTimerEngine,
    logging,
    render::{Renderer, TimerPhase},
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    steps::{Step, STEPS},
    task::Task,
    Phase,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;

const TICK_RATE_MS: u64 = 100;
const MAX_EXTEND_INPUT_LENGTH: usize = 8;

/// name one task, say where and for how long, then watch the sand run out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answers three prompts (title, location, duration) and then runs an hourglass countdown you can finish or extend."
)]
pub struct Cli {
    /// config file to read (defaults to the platform config directory)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// how often the countdown is re-evaluated, in milliseconds
    #[clap(long)]
    poll_interval_ms: Option<u64>,

    /// delay before the first prompt appears, in milliseconds
    #[clap(long)]
    intro_delay_ms: Option<u64>,

    /// how long the hourglass flip lasts, in milliseconds
    #[clap(long)]
    flip_settle_ms: Option<u64>,

    /// minutes pre-filled in the extension field
    #[clap(short = 'e', long)]
    extend_default: Option<u32>,

    /// save the effective settings to the config file before starting
    #[clap(long)]
    write_config: bool,

    /// log filter such as "debug" (ONETHING_LOG takes precedence)
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = self.intro_delay_ms {
            config.intro_delay_ms = ms;
        }
        if let Some(ms) = self.flip_settle_ms {
            config.flip_settle_ms = ms;
        }
        if let Some(minutes) = self.extend_default {
            config.default_extend_minutes = minutes;
        }
        config
    }
}

/// What the terminal renderer last heard from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenModel {
    Capture {
        step: Step,
        error: Option<String>,
    },
    Timer {
        title: String,
        meta: String,
        remaining_label: String,
        phase: TimerPhase,
    },
}

#[derive(Debug)]
pub struct App {
    pub engine: WizardTimerEngine,
    pub screen: ScreenModel,
    pub input: String,
    pub notice: Option<String>,
    pub capture_entered: Instant,
    pub intro_delay: Duration,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let engine = WizardTimerEngine::with_system_clock(config.engine_settings());
        let mut app = Self {
            engine,
            screen: ScreenModel::Capture {
                step: STEPS[0],
                error: None,
            },
            input: String::new(),
            notice: None,
            capture_entered: Instant::now(),
            intro_delay: config.intro_delay(),
        };
        app.sync();
        app
    }

    /// Deliver everything the engine queued since the last call
    pub fn sync(&mut self) {
        for event in self.engine.drain_events() {
            event.deliver(self);
        }
    }

    /// The prompt fades in a moment after the capture view appears
    pub fn prompt_live(&self) -> bool {
        self.capture_entered.elapsed() >= self.intro_delay
    }

    /// UI ticks come faster than the poll interval; the countdown only
    /// advances when its cycle is due.
    pub fn on_tick(&mut self) {
        self.engine.poll_if_due();
        self.sync();
    }

    /// Handle one key press. Returns false when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return false;
        }

        match self.engine.phase() {
            Phase::Capture { .. } => {
                if self.prompt_live() {
                    self.on_capture_key(key);
                }
            }
            Phase::Running => {
                if key.code == KeyCode::Char('f') {
                    self.engine.finish();
                }
            }
            Phase::Completed => match key.code {
                KeyCode::Char('f') | KeyCode::Enter => self.engine.finish(),
                KeyCode::Char('e') => {
                    let _ = self.engine.request_extend();
                }
                _ => {}
            },
            Phase::Extending => self.on_extend_key(key),
        }

        self.sync();
        true
    }

    fn on_capture_key(&mut self, key: KeyEvent) {
        let max_length = self
            .engine
            .current_step()
            .map_or(usize::MAX, |step| step.max_length);

        match key.code {
            KeyCode::Char(c) => {
                if self.input.chars().count() < max_length {
                    self.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let answer = self.input.clone();
                let _ = self.engine.submit_answer(&answer);
            }
            _ => {}
        }
    }

    fn on_extend_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('f') => self.engine.finish(),
            KeyCode::Char('e') => {
                let _ = self.engine.request_extend();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                if self.input.len() < MAX_EXTEND_INPUT_LENGTH {
                    self.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let minutes = self.input.clone();
                self.notice = self.engine.confirm_extend(&minutes).err().map(|e| e.to_string());
            }
            _ => {}
        }
    }
}

impl Renderer for App {
    fn render_capture(&mut self, step: &Step, error: Option<&str>) {
        if matches!(self.screen, ScreenModel::Timer { .. }) {
            self.capture_entered = Instant::now();
        }
        // a rejected answer stays in the field so it can be fixed
        if error.is_none() {
            self.input.clear();
        }
        self.notice = None;
        self.screen = ScreenModel::Capture {
            step: *step,
            error: error.map(str::to_string),
        };
    }

    fn render_timer(&mut self, task: &Task, remaining_label: &str, phase: TimerPhase) {
        if phase == TimerPhase::Extending {
            self.input = self.engine.extend_value().to_string();
        }
        self.screen = ScreenModel::Timer {
            title: task.title.clone(),
            meta: task.meta_label(),
            remaining_label: remaining_label.to_string(),
            phase,
        };
    }

    fn restart_visual(&mut self, duration_ms: u64) {
        info!(duration_ms, "hourglass flipped");
        self.input.clear();
        self.notice = None;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = logging::init_file_logging(&log_path, cli.log_level.as_deref()) {
            eprintln!("onething: logging disabled: {}", err);
        }
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = cli.apply_to(store.load());
    if cli.write_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config written");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    info!(?config, "starting");
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step_within(app.engine.poll_timeout()) {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.handle_key(key) {
                    break;
                }
            }
        }
    }

    info!("quitting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(&app.screen).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))));
        }
    }

    fn test_config() -> Config {
        Config {
            intro_delay_ms: 0,
            ..Config::default()
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["onething"]);

        assert_eq!(cli.config, None);
        assert_eq!(cli.poll_interval_ms, None);
        assert_eq!(cli.extend_default, None);
        assert!(!cli.write_config);
        assert_eq!(cli.log_level, None);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "onething",
            "--poll-interval-ms",
            "250",
            "-e",
            "15",
            "--intro-delay-ms",
            "0",
        ]);
        let config = cli.apply_to(Config::default());

        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.default_extend_minutes, 15);
        assert_eq!(config.intro_delay_ms, 0);
        assert_eq!(config.flip_settle_ms, Config::default().flip_settle_ms);
    }

    #[test]
    fn test_app_starts_on_first_prompt() {
        let app = App::new(&test_config());
        match &app.screen {
            ScreenModel::Capture { step, error } => {
                assert_eq!(step.label, "Title");
                assert!(error.is_none());
            }
            other => panic!("expected capture screen, got {:?}", other),
        }
    }

    #[test]
    fn test_keys_ignored_before_prompt_is_live() {
        let mut app = App::new(&Config {
            intro_delay_ms: 60_000,
            ..Config::default()
        });
        type_text(&mut app, "abc");
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_capture_flow_to_timer() {
        let mut app = App::new(&test_config());

        type_text(&mut app, "Write the report");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.input.is_empty());

        type_text(&mut app, "Home office");
        app.handle_key(key(KeyCode::Enter));

        type_text(&mut app, "45m");
        app.handle_key(key(KeyCode::Enter));

        match &app.screen {
            ScreenModel::Timer {
                title,
                meta,
                remaining_label,
                phase,
            } => {
                assert_eq!(title, "Write the report");
                assert_eq!(meta, "Home office • 45m");
                assert!(remaining_label == "45:00" || remaining_label == "44:59");
                assert_eq!(*phase, TimerPhase::Running);
            }
            other => panic!("expected timer screen, got {:?}", other),
        }
    }

    #[test]
    fn test_rejected_answer_stays_in_field() {
        let mut app = App::new(&test_config());
        type_text(&mut app, "Title");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Desk");
        app.handle_key(key(KeyCode::Enter));

        type_text(&mut app, "later");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input, "later");
        match &app.screen {
            ScreenModel::Capture { step, error } => {
                assert_eq!(step.label, "Duration");
                assert_eq!(
                    error.as_deref(),
                    Some("Try 30m, 1h, 1h 30m, or 90 minutes (max 24h).")
                );
            }
            other => panic!("expected capture screen, got {:?}", other),
        }
    }

    #[test]
    fn test_input_respects_step_limit() {
        let mut app = App::new(&test_config());
        type_text(&mut app, &"x".repeat(100));
        assert_eq!(app.input.chars().count(), 80);
    }

    #[test]
    fn test_backspace_edits_input() {
        let mut app = App::new(&test_config());
        type_text(&mut app, "abc");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "ab");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(&test_config());
        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert!(!app.handle_key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
    }

    #[test]
    fn test_finish_while_running_returns_to_capture() {
        let mut app = App::new(&test_config());
        for answer in ["Title", "Desk", "10m"] {
            type_text(&mut app, answer);
            app.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(app.engine.phase(), Phase::Running);

        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.engine.phase(), Phase::Capture { step_index: 0 });
        assert!(matches!(app.screen, ScreenModel::Capture { .. }));
    }

    #[test]
    fn test_tick_before_poll_interval_leaves_cycle_alone() {
        let mut app = App::new(&Config {
            poll_interval_ms: 5_000,
            ..test_config()
        });
        for answer in ["Title", "Desk", "10m"] {
            type_text(&mut app, answer);
            app.handle_key(key(KeyCode::Enter));
        }
        let cycle = *app.engine.poll_cycle().unwrap();

        app.on_tick();
        app.on_tick();

        assert_eq!(app.engine.poll_cycle(), Some(&cycle));
    }

    #[test]
    fn test_ui_renders_capture_screen() {
        let app = App::new(&test_config());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("What is your One Thing?"));
        assert!(content.contains("Title"));
        assert!(content.contains("Press Enter to continue"));
    }

    #[test]
    fn test_ui_renders_timer_screen() {
        let mut app = App::new(&test_config());
        for answer in ["Write the report", "Home office", "45m"] {
            type_text(&mut app, answer);
            app.handle_key(key(KeyCode::Enter));
        }
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Up next"));
        assert!(content.contains("Write the report"));
        assert!(content.contains("Time remaining"));
        assert!(content.contains("Stay with it until the sand runs out."));
    }

    #[test]
    fn test_start_tui_quits_on_escape() {
        let mut app = App::new(&test_config());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Tick).unwrap();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Key(key(KeyCode::Esc))).unwrap();
        let runner = Runner::new(
            onething::runtime::TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        start_tui(&mut terminal, &mut app, &runner).unwrap();
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 100);
        const _: () = assert!(TICK_RATE_MS <= onething::engine::DEFAULT_POLL_INTERVAL_MS);
    }
}
