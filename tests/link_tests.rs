//! Integration tests for the motorboard link layer.

use rs_irrigate::hal::{MockClock, MockTransport};
use rs_irrigate::{
    IrrigationConfig, IrrigationController, IrrigationState, LinkConfig, LinkError,
    MoistureSample, Motorboard, ProtocolError, PumpActuator,
};

const READY: &[u8] = b"\nG\n";

fn board_with(transport: MockTransport, config: LinkConfig) -> Motorboard<MockTransport, MockClock> {
    Motorboard::new(transport, MockClock::new(), config)
}

#[test]
fn establish_probes_and_measures_ping() {
    let mut transport = MockTransport::new();
    // One connectivity probe plus five ping probes, each acknowledged.
    transport.reply_with_n(6, READY);

    let mut board = board_with(transport, LinkConfig::default());
    board.establish().unwrap();

    assert_eq!(board.session().transport().write_count(), 6);
    // Each probe costs three sentinel characters at one ms apiece.
    assert_eq!(board.last_ping_ms(), Some(3));
}

#[test]
fn establish_gives_up_after_budget() {
    let config = LinkConfig::default().with_establish_budget_ms(200);
    let mut board = board_with(MockTransport::new(), config);

    assert_eq!(
        board.establish(),
        Err(LinkError::Unavailable { budget_ms: 200 })
    );
    // It kept probing until the budget ran out.
    assert!(board.session().transport().write_count() > 1);
    assert!(board.last_ping_ms().is_none());
}

#[test]
fn ping_averages_only_completed_probes() {
    let mut transport = MockTransport::new();
    // Probe plus two pings answered; the third ping gets silence.
    transport.reply_with_n(3, READY);

    let mut board = board_with(transport, LinkConfig::default());
    board.establish().unwrap();

    // Probe, two good pings, one timed-out ping, then the measurement
    // stopped.
    assert_eq!(board.session().transport().write_count(), 4);
    assert_eq!(board.last_ping_ms(), Some(3));
}

#[test]
fn establish_succeeds_even_with_ping_disabled() {
    let mut transport = MockTransport::new();
    transport.reply_with(READY);

    let config = LinkConfig::default().with_ping_probes(0);
    let mut board = board_with(transport, config);
    board.establish().unwrap();

    assert_eq!(board.last_ping_ms(), None);
}

#[test]
fn test_connection_reflects_board_presence() {
    let mut transport = MockTransport::new();
    transport.reply_with_n(6, READY);
    transport.reply_with(READY);

    let mut board = board_with(transport, LinkConfig::default());
    board.establish().unwrap();

    assert!(board.test_connection());
    // No further replies scripted: the next probe times out.
    assert!(!board.test_connection());
}

#[test]
fn pump_actuation_sends_the_motor_directives() {
    let mut transport = MockTransport::new();
    transport.reply_with_n(6, READY);
    transport.reply_with_n(2, READY);

    let mut board = board_with(transport, LinkConfig::default());
    board.establish().unwrap();
    let establish_writes = board.session().transport().write_count();

    board.turn_on().unwrap();
    assert!(board.is_on());
    // The whole 120 s run goes out up front, tiled into 5 s pulses.
    let run = "L 100 R 100 D 5000 ".repeat(24).into_bytes();
    assert_eq!(board.session().transport().writes.last().unwrap(), &run);

    // Turning an already-running pump on costs nothing on the wire.
    board.turn_on().unwrap();
    assert_eq!(
        board.session().transport().write_count(),
        establish_writes + 1
    );

    board.turn_off().unwrap();
    assert!(!board.is_on());
    assert_eq!(
        board.session().transport().writes.last().unwrap(),
        b"L 0 R 0 D 0 "
    );
}

#[test]
fn unconfirmed_stop_keeps_the_pump_flagged_on() {
    let mut transport = MockTransport::new();
    transport.reply_with_n(6, READY);
    transport.reply_with(READY);

    let config = LinkConfig::default().with_command_timeout_ms(50);
    let mut board = board_with(transport, config);
    board.establish().unwrap();
    board.turn_on().unwrap();

    // The board never acknowledges the stop: the motor state is
    // unknown, so the pump stays flagged on for a retry.
    assert_eq!(
        board.turn_off(),
        Err(LinkError::Protocol(ProtocolError::Timeout { timeout_ms: 50 }))
    );
    assert!(board.is_on());

    // Retry with the board answering again.
    board.session_mut().transport_mut().reply_with(READY);
    board.turn_off().unwrap();
    assert!(!board.is_on());
}

#[test]
fn pump_run_tiles_pulses_with_a_remainder() {
    let mut transport = MockTransport::new();
    transport.reply_with_n(6, READY);
    transport.reply_with(READY);

    let config = LinkConfig::default().with_pump_run_ms(12_000);
    let mut board = board_with(transport, config);
    board.establish().unwrap();

    board.turn_on().unwrap();
    assert_eq!(
        board.session().transport().writes.last().unwrap(),
        b"L 100 R 100 D 5000 L 100 R 100 D 5000 L 100 R 100 D 2000 "
    );
}

#[test]
fn pump_run_on_the_wire_covers_the_scheduled_pour() {
    let mut transport = MockTransport::new();
    transport.reply_with_n(6, READY);
    transport.reply_with(READY);

    let mut board = board_with(transport, LinkConfig::default());
    board.establish().unwrap();

    let config = IrrigationConfig::default()
        .with_idle_ms(1_000)
        .with_staging_ms(500)
        .with_base_pour_ms(20_000);
    let mut controller = IrrigationController::new(board, config);

    let dry = MoistureSample::Level(5);
    controller.tick(dry, 1_000).unwrap();
    controller.tick(dry, 1_500).unwrap();
    assert_eq!(controller.state(), IrrigationState::Pouring);

    // The directives sent at pour start must keep the motors running
    // for at least the scheduled pour duration.
    let writes = &controller.pump().session().transport().writes;
    let run = std::str::from_utf8(writes.last().unwrap()).unwrap();
    let tokens: Vec<&str> = run.split_whitespace().collect();
    let covered_ms: u32 = tokens
        .chunks(2)
        .filter(|pair| pair[0] == "D")
        .map(|pair| pair[1].parse::<u32>().unwrap())
        .sum();
    assert!(covered_ms >= controller.pour_ms());

    // Ticks inside the pour add nothing on the wire; the board was
    // given the whole run up front and the stop comes at the deadline.
    let during_pour = controller.pump().session().transport().write_count();
    for step in 1..=7u32 {
        controller.tick(dry, 1_500 + step * 2_000).unwrap();
    }
    assert_eq!(
        controller.pump().session().transport().write_count(),
        during_pour
    );
}

#[test]
fn unestablished_link_keeps_motor_commands_off_the_wire() {
    let config = LinkConfig::default().with_establish_budget_ms(100);
    let mut board = board_with(MockTransport::new(), config);
    assert!(board.establish().is_err());
    assert!(!board.is_link_up());

    // Pour attempts are refused locally, not written to the port.
    let probe_writes = board.session().transport().write_count();
    assert_eq!(
        board.turn_on(),
        Err(LinkError::Unavailable { budget_ms: 100 })
    );
    assert!(!board.is_on());
    assert_eq!(board.session().transport().write_count(), probe_writes);
}

#[test]
fn late_board_recovers_through_a_probe() {
    let config = LinkConfig::default().with_establish_budget_ms(100);
    let mut board = board_with(MockTransport::new(), config);
    assert!(board.establish().is_err());

    // The board comes up late: one successful probe re-arms the pump.
    board.session_mut().transport_mut().reply_with_n(2, READY);
    assert!(board.test_connection());
    assert!(board.is_link_up());

    board.turn_on().unwrap();
    assert!(board.is_on());
}

#[test]
fn self_test_sweeps_a_half_sine() {
    let mut transport = MockTransport::new();
    transport.reply_with_n(6, READY);
    transport.reply_with_n(13, READY);

    let mut board = board_with(transport, LinkConfig::default());
    board.establish().unwrap();
    let before = board.session().transport().write_count();

    board.self_test().unwrap();

    // 0° to 180° in 15° steps, 800 ms split across the sweep.
    let writes = &board.session().transport().writes[before..];
    assert_eq!(writes.len(), 13);
    assert_eq!(writes.first().unwrap(), b"L 0 R 0 D 61 ");
    assert_eq!(writes[6], b"L 100 R 100 D 61 ");
    assert_eq!(writes.last().unwrap(), b"L 0 R 0 D 61 ");
}
