//! End-to-end scenarios for the timer state machine.
//!
//! Every test drives the engine through its public API with an injected
//! clock, the same way a front end and its tick driver would.

use focusloop_core::timer::duration_for;
use focusloop_core::{
    Clock, Event, ManualClock, SessionType, Settings, SettingsPatch, Status, TimerEngine, TimerState,
};
use proptest::prelude::*;

fn fresh_engine(settings: Settings, now_ms: u64) -> (TimerEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new(now_ms);
    (TimerEngine::with_clock(settings, clock.clone()), clock)
}

fn state(session_type: SessionType, completed_work_sessions: u32) -> TimerState {
    TimerState {
        status: Status::Idle,
        session_type,
        seconds_left: 0,
        end_at_ms: None,
        completed_work_sessions,
    }
}

/// Run the current session to its deadline and return the completion event.
fn run_out<C: focusloop_core::Clock>(engine: &mut TimerEngine<C>) -> Event {
    engine.start();
    let end = engine.end_at_ms().expect("running timer has a deadline");
    engine.tick(end).expect("deadline completes the session")
}

#[test]
fn work_session_completes_into_short_break() {
    let (mut engine, _) = fresh_engine(Settings::default(), 0);
    engine.start();

    let event = engine.tick(1_500_000);
    assert!(matches!(event, Some(Event::SessionCompleted { .. })));
    assert_eq!(engine.seconds_left(), 300);
    assert_eq!(engine.status(), Status::Idle);
    assert_eq!(engine.session_type(), SessionType::ShortBreak);
    assert_eq!(engine.completed_work_sessions(), 1);
    assert_eq!(engine.end_at_ms(), None);
}

#[test]
fn fourth_work_session_leads_to_long_break() {
    let clock = ManualClock::new(0);
    let mut engine =
        TimerEngine::restore(Settings::default(), state(SessionType::Work, 3), clock);

    run_out(&mut engine);
    assert_eq!(engine.completed_work_sessions(), 4);
    assert_eq!(engine.session_type(), SessionType::LongBreak);
    assert_eq!(engine.seconds_left(), 900);
}

#[test]
fn short_break_completion_returns_to_work_without_counting() {
    let clock = ManualClock::new(0);
    let mut engine =
        TimerEngine::restore(Settings::default(), state(SessionType::ShortBreak, 1), clock);

    run_out(&mut engine);
    assert_eq!(engine.session_type(), SessionType::Work);
    assert_eq!(engine.completed_work_sessions(), 1);
}

#[test]
fn next_session_never_auto_starts() {
    let (mut engine, clock) = fresh_engine(Settings::default(), 0);
    run_out(&mut engine);
    clock.advance(10 * 60 * 1000);
    assert!(engine.tick(clock.now_ms()).is_none());
    assert_eq!(engine.status(), Status::Idle);
    assert_eq!(engine.seconds_left(), 300);
}

#[test]
fn pause_resume_loses_no_time() {
    let (mut engine, clock) = fresh_engine(Settings::default(), 0);
    engine.start();
    clock.set(123_400);
    engine.pause();
    let at_pause = engine.seconds_left();

    clock.set(9_000_000);
    engine.resume();
    engine.tick(clock.now_ms());
    assert_eq!(engine.seconds_left(), at_pause);
    assert_eq!(engine.status(), Status::Running);
}

#[test]
fn reset_restores_nominal_duration_from_any_status() {
    for prior in [Status::Idle, Status::Running, Status::Paused] {
        let (mut engine, clock) = fresh_engine(Settings::default(), 0);
        match prior {
            Status::Idle => {}
            Status::Running => {
                engine.start();
                clock.advance(5_000);
                engine.tick(clock.now_ms());
            }
            Status::Paused => {
                engine.start();
                clock.advance(5_000);
                engine.pause();
            }
        }
        engine.reset();
        assert_eq!(engine.status(), Status::Idle, "from {prior:?}");
        assert_eq!(engine.end_at_ms(), None, "from {prior:?}");
        assert_eq!(
            engine.seconds_left(),
            duration_for(engine.session_type(), engine.settings()),
            "from {prior:?}"
        );
    }
}

#[test]
fn idle_settings_update_retargets_immediately() {
    let (mut engine, _) = fresh_engine(Settings::default(), 0);
    engine
        .apply_settings_update(SettingsPatch {
            work_duration: Some(60),
            ..SettingsPatch::default()
        })
        .unwrap();
    assert_eq!(engine.seconds_left(), 60);
    assert_eq!(engine.end_at_ms(), None);
}

#[test]
fn running_settings_update_applies_to_next_session() {
    let (mut engine, clock) = fresh_engine(Settings::default(), 0);
    engine.start();
    clock.advance(2_000);
    engine.tick(clock.now_ms());
    let before = engine.state().clone();

    engine
        .apply_settings_update(SettingsPatch {
            short_break_duration: Some(120),
            work_duration: Some(60),
            ..SettingsPatch::default()
        })
        .unwrap();
    assert_eq!(engine.state(), &before);

    engine.tick(1_500_000);
    assert_eq!(engine.session_type(), SessionType::ShortBreak);
    assert_eq!(engine.seconds_left(), 120);
}

#[test]
fn double_start_keeps_first_deadline() {
    let (mut engine, clock) = fresh_engine(Settings::default(), 0);
    engine.start();
    let first = (engine.seconds_left(), engine.end_at_ms());
    clock.advance(700);
    engine.start();
    assert_eq!((engine.seconds_left(), engine.end_at_ms()), first);
}

#[test]
fn late_tick_completes_without_drift() {
    let (mut engine, _) = fresh_engine(Settings::default(), 0);
    engine.start();
    // the driver was throttled for far longer than the session
    let event = engine.tick(7_200_000);
    assert!(matches!(
        event,
        Some(Event::SessionCompleted {
            completed: SessionType::Work,
            next: SessionType::ShortBreak,
            ..
        })
    ));
    assert_eq!(engine.completed_work_sessions(), 1);
}

#[test]
fn rejected_update_names_the_field() {
    let (mut engine, _) = fresh_engine(Settings::default(), 0);
    let err = engine
        .apply_settings_update(SettingsPatch {
            long_break_duration: Some(0),
            ..SettingsPatch::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("long_break_duration"));
}

proptest! {
    #[test]
    fn countdown_never_increases(
        work in 1u32..10_000,
        start in 0u64..1_000_000_000,
        offsets in proptest::collection::vec(0u64..20_000_000, 1..40),
    ) {
        let mut offsets = offsets;
        let settings = Settings { work_duration: work, ..Settings::default() };
        let (mut engine, _) = fresh_engine(settings, start);
        engine.start();
        offsets.sort_unstable();

        let mut last = engine.seconds_left();
        for offset in offsets {
            if engine.tick(start + offset).is_some() {
                // the next session is armed at its own full duration
                break;
            }
            prop_assert!(engine.seconds_left() <= last);
            last = engine.seconds_left();
        }
    }

    #[test]
    fn deadline_present_iff_running(ops in proptest::collection::vec(0u8..6, 1..60)) {
        let settings = Settings {
            work_duration: 3,
            short_break_duration: 2,
            long_break_duration: 4,
            sessions_before_long_break: 2,
            label: String::new(),
        };
        let (mut engine, clock) = fresh_engine(settings, 0);
        for op in ops {
            match op {
                0 => { engine.start(); }
                1 => { engine.pause(); }
                2 => { engine.resume(); }
                3 => { engine.reset(); }
                4 => { clock.advance(900); engine.tick(clock.now_ms()); }
                _ => {
                    let _ = engine.apply_settings_update(SettingsPatch {
                        work_duration: Some(2),
                        ..SettingsPatch::default()
                    });
                }
            }
            prop_assert_eq!(engine.end_at_ms().is_some(), engine.status() == Status::Running);
        }
    }
}
