use autopresser::injector::Action;
use autopresser::{DryRunInjector, Mode, SharedState, Symbol, TimingEngine};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const IDLE_POLL: Duration = Duration::from_millis(50);

fn setup(mode: Mode, rate: f64, hold_ms: u64, release_ms: u64) -> (Arc<SharedState>, Arc<DryRunInjector>, TimingEngine) {
    let state = Arc::new(SharedState::new(Symbol::Space, mode, rate, hold_ms, release_ms));
    let injector = Arc::new(DryRunInjector::new());
    let engine = TimingEngine::spawn(state.clone(), injector.clone(), IDLE_POLL).unwrap();
    (state, injector, engine)
}

#[test]
fn test_fixed_rate_ten_hz_for_one_second() {
    let (_state, injector, engine) = setup(Mode::FixedRate, 10.0, 50, 50);

    assert!(engine.start());
    thread::sleep(Duration::from_millis(1000));
    engine.stop();

    let taps = injector.presses();
    assert!((9..=11).contains(&taps), "expected 10±1 taps, got {}", taps);
    assert_eq!(injector.presses(), injector.releases());
    assert!(injector.is_balanced());
}

#[test]
fn test_fixed_rate_spacing_does_not_drift() {
    let (_state, injector, engine) = setup(Mode::FixedRate, 50.0, 50, 50);

    engine.start();
    thread::sleep(Duration::from_millis(1010));
    engine.stop();

    let times = injector.press_times();
    assert!(times.len() >= 45, "too few taps: {}", times.len());

    // Tap n is scheduled at first + n * 20ms; an accumulated deadline keeps
    // late taps from pushing every later one back.
    let first = times[0];
    let last_index = times.len() - 1;
    let expected = Duration::from_millis(20 * last_index as u64);
    let actual = times[last_index] - first;
    let error = if actual > expected { actual - expected } else { expected - actual };
    assert!(error < Duration::from_millis(20), "drifted by {:?}", error);
}

#[test]
fn test_start_is_idempotent() {
    let (state, injector, engine) = setup(Mode::FixedRate, 10.0, 50, 50);

    assert!(engine.start());
    assert!(!engine.start());
    assert!(!engine.start());
    assert!(state.is_running());

    thread::sleep(Duration::from_millis(450));
    engine.stop();

    // One loop: taps at 0, 100, 200, 300, 400ms
    let taps = injector.presses();
    assert!((4..=6).contains(&taps), "double loop suspected: {} taps", taps);
}

#[test]
fn test_stop_when_idle_is_noop() {
    let (_state, injector, engine) = setup(Mode::FixedRate, 10.0, 50, 50);

    assert!(!engine.stop());
    assert!(!engine.request_stop());
    thread::sleep(Duration::from_millis(60));
    assert!(injector.events().is_empty());
}

#[test]
fn test_zero_rate_holds_until_stopped() {
    let (state, injector, engine) = setup(Mode::FixedRate, 0.0, 50, 50);
    assert_eq!(state.mode(), Mode::HoldUntilStopped);

    engine.start();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(injector.presses(), 1);
    assert_eq!(injector.releases(), 0);

    engine.stop();
    assert_eq!(injector.presses(), 1);
    assert_eq!(injector.releases(), 1);
    assert!(injector.is_balanced());
}

#[test]
fn test_legacy_sentinel_holds_until_stopped() {
    let (_state, injector, engine) = setup(Mode::FixedRate, -1.0, 50, 50);

    engine.start();
    thread::sleep(Duration::from_millis(120));
    engine.stop();

    let actions: Vec<Action> = injector.events().iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![Action::Press, Action::Release]);
}

#[test]
fn test_hold_release_pairs() {
    let (_state, injector, engine) = setup(Mode::HoldRelease, 10.0, 50, 50);

    engine.start();
    // Presses at 0, 100, 200, 300ms; stopping at 360ms lands in the fourth
    // release phase, clear of the fifth press
    thread::sleep(Duration::from_millis(360));
    engine.stop();

    assert_eq!(injector.presses(), 4);
    assert_eq!(injector.releases(), 4);
    assert!(injector.is_balanced());
}

#[test]
fn test_hold_release_four_pairs_in_400ms() {
    let (_state, injector, engine) = setup(Mode::HoldRelease, 10.0, 50, 50);

    engine.start();
    thread::sleep(Duration::from_millis(400));
    engine.stop();

    // A fifth press can only start once four full 100ms cycles have elapsed,
    // so it races the stop at exactly 400ms; the first 400ms hold four.
    let times = injector.press_times();
    let first = times[0];
    let within = times
        .iter()
        .filter(|t| t.duration_since(first) < Duration::from_millis(400))
        .count();
    assert_eq!(within, 4);
    assert!((4..=5).contains(&times.len()), "got {} presses", times.len());
    assert!(injector.is_balanced());
}

#[test]
fn test_zero_hold_and_release_do_not_spin() {
    let (_state, injector, engine) = setup(Mode::HoldRelease, 10.0, 0, 0);

    engine.start();
    thread::sleep(Duration::from_millis(100));
    engine.stop();

    // At least 1ms per cycle
    let presses = injector.presses();
    assert!((1..=110).contains(&presses), "got {} presses", presses);
    assert!(injector.is_balanced());
}

#[test]
fn test_tiny_rate_keeps_engine_alive() {
    let (state, injector, engine) = setup(Mode::FixedRate, 1e-20, 50, 50);

    engine.start();
    thread::sleep(Duration::from_millis(80));
    state.set_rate(50.0);
    thread::sleep(Duration::from_millis(200));
    engine.stop();

    // The loop survived the slow rate and picked up the new one
    assert!(injector.presses() >= 5, "got {}", injector.presses());
    assert!(injector.is_balanced());
}

#[test]
fn test_stop_mid_hold_still_releases() {
    let (_state, injector, engine) = setup(Mode::HoldRelease, 10.0, 200, 50);

    engine.start();
    thread::sleep(Duration::from_millis(50));
    engine.stop();

    // stop() waits for the hold to finish and the key to come back up
    assert_eq!(injector.presses(), 1);
    assert_eq!(injector.releases(), 1);
    let events = injector.events();
    let held = events[1].at - events[0].at;
    assert!(held >= Duration::from_millis(200), "released early: {:?}", held);
}

#[test]
fn test_hold_durations_apply_live() {
    let (state, injector, engine) = setup(Mode::HoldRelease, 10.0, 100, 100);

    engine.start();
    thread::sleep(Duration::from_millis(50));
    state.set_hold_ms(10);
    state.set_release_ms(10);
    thread::sleep(Duration::from_millis(350));
    engine.stop();

    // First cycle takes 200ms, later ones about 20ms
    assert!(injector.presses() >= 5, "got {}", injector.presses());
    assert!(injector.is_balanced());
}

#[test]
fn test_mode_switch_while_holding_releases_first() {
    let (state, injector, engine) = setup(Mode::HoldUntilStopped, 10.0, 30, 30);

    engine.start();
    thread::sleep(Duration::from_millis(100));
    state.set_mode(Mode::HoldRelease);
    thread::sleep(Duration::from_millis(150));
    engine.stop();

    assert!(injector.presses() >= 2);
    assert!(injector.is_balanced());
}

#[test]
fn test_restart_after_stop() {
    let (_state, injector, engine) = setup(Mode::FixedRate, 20.0, 50, 50);

    engine.start();
    thread::sleep(Duration::from_millis(120));
    engine.stop();
    let first_run = injector.presses();
    assert!(first_run >= 2);

    thread::sleep(Duration::from_millis(100));
    assert_eq!(injector.presses(), first_run);

    engine.start();
    thread::sleep(Duration::from_millis(120));
    engine.stop();
    assert!(injector.presses() > first_run);
    assert!(injector.is_balanced());
}

#[test]
fn test_shutdown_releases_held_key() {
    let (_state, injector, engine) = setup(Mode::HoldUntilStopped, 0.0, 50, 50);

    engine.start();
    thread::sleep(Duration::from_millis(80));
    drop(engine);

    assert_eq!(injector.presses(), 1);
    assert_eq!(injector.releases(), 1);
}

#[test]
fn test_pointer_symbol_clicks() {
    let state = Arc::new(SharedState::new(
        Symbol::Pointer(autopresser::MouseButton::Left),
        Mode::FixedRate,
        20.0,
        50,
        50,
    ));
    let injector = Arc::new(DryRunInjector::new());
    let engine = TimingEngine::spawn(state, injector.clone(), IDLE_POLL).unwrap();

    engine.start();
    thread::sleep(Duration::from_millis(120));
    engine.stop();

    let events = injector.events();
    assert!(!events.is_empty());
    assert!(events
        .iter()
        .all(|e| e.symbol == Symbol::Pointer(autopresser::MouseButton::Left)));
}
