use std::sync::mpsc;
use std::time::Duration;

use onething::clock::ManualClock;
use onething::engine::{EngineSettings, WizardTimerEngine};
use onething::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use onething::{Phase, View};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Headless integration using the internal runtime + engine without a TTY.
// Each Enter key from the test event source submits the next answer.
#[test]
fn headless_capture_flow_starts_timer() {
    let clock = ManualClock::new();
    let mut engine = WizardTimerEngine::new(clock.clone(), EngineSettings::default());

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    let mut answers = ["Write the report", "Home office", "45m"].into_iter();
    for _ in 0..3 {
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )))
        .unwrap();
    }

    for _ in 0..20u32 {
        match runner.step_within(engine.poll_timeout()) {
            AppEvent::Key(_) => {
                if let Some(answer) = answers.next() {
                    engine.submit_answer(answer).unwrap();
                }
            }
            AppEvent::Resize => {}
            AppEvent::Tick => {
                engine.poll_tick();
            }
        }
        if engine.view() == View::Timer {
            break;
        }
    }

    assert_eq!(engine.view(), View::Timer);
    assert_eq!(engine.task().location, "Home office");
    assert_eq!(engine.remaining_ms(), Some(45 * 60_000));
}

#[test]
fn headless_timer_completes_by_ticks() {
    let clock = ManualClock::new();
    let mut engine = WizardTimerEngine::new(clock.clone(), EngineSettings::default());
    engine.start_timer(2_000);

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(10)),
    );

    let mut ticks = 0;
    for _ in 0..50u32 {
        if let AppEvent::Tick = runner.step_within(engine.poll_timeout()) {
            // each runner tick stands for one 300ms polling period
            clock.advance(Duration::from_millis(300));
            if engine.poll_tick().is_some() {
                ticks += 1;
            }
        }
        if engine.phase() == Phase::Completed {
            break;
        }
    }

    assert_eq!(engine.phase(), Phase::Completed);
    // 2000ms / 300ms rounds up to seven polls
    assert_eq!(ticks, 7);
    assert_eq!(engine.poll_timeout(), None);
}

#[test]
fn headless_restart_keeps_single_cycle() {
    let clock = ManualClock::new();
    let mut engine = WizardTimerEngine::new(clock.clone(), EngineSettings::default());

    engine.start_timer(60_000);
    clock.advance(Duration::from_millis(250));
    engine.start_timer(60_000);
    clock.advance(Duration::from_millis(250));
    engine.start_timer(30_000);

    let cycle = engine.poll_cycle().copied().unwrap();
    assert_eq!(cycle.generation, 3);
    assert_eq!(engine.remaining_ms(), Some(30_000));

    clock.advance(Duration::from_millis(30_000));
    assert_eq!(engine.poll_tick(), Some(0));
    // a stale tick after completion does nothing
    assert_eq!(engine.poll_tick(), None);
    assert_eq!(engine.phase(), Phase::Completed);
}

#[test]
fn headless_ui_ticks_do_not_speed_up_polling() {
    let clock = ManualClock::new();
    let mut engine = WizardTimerEngine::new(clock.clone(), EngineSettings::default());
    engine.start_timer(60_000);

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    // twelve 100ms UI ticks cover 1.2s, four 300ms poll intervals
    let mut polls = 0;
    for _ in 0..12u32 {
        if let AppEvent::Tick = runner.step_within(engine.poll_timeout()) {
            clock.advance(Duration::from_millis(100));
            if engine.poll_if_due().is_some() {
                polls += 1;
            }
        }
    }

    assert_eq!(polls, 4);
    assert_eq!(engine.remaining_ms(), Some(60_000 - 1_200));
}
