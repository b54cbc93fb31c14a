use crate::config::Config;
use crate::modem::{Modem, Phase, RequestError, Step, TaskSet};
use crate::pins::{Pin, Pull};
use crate::responses::RegistrationStatus;
use crate::tests::mock::{
    clear_recorded_responses, record_response, recorded_responses, Clock, MockPins, MockTimer, MockTransport,
};
use mockall::predicate::eq;

type ModemType = Modem<MockTransport, MockPins, MockTimer, 1_000, 128, 64, 64>;

fn modem(clock: &Clock, pins: MockPins) -> ModemType {
    modem_with_config(clock, pins, Config::default())
}

fn modem_with_config(clock: &Clock, pins: MockPins, config: Config) -> ModemType {
    clear_recorded_responses();
    Modem::new(MockTransport::new(), pins, clock.timer(), config)
}

fn unexpected_response(_status: u32, _length: u32) {
    panic!("Callback of rejected request called");
}

fn update(modem: &mut ModemType, count: usize) {
    for _ in 0..count {
        modem.update();
    }
}

/// Cold boot from standby to idle
fn boot(modem: &mut ModemType, clock: &Clock) {
    modem.init();
    assert_eq!(Step::Reset, modem.step());

    modem.engine.transport.add_line("APP RDY");
    modem.engine.transport.add_ok_response();
    modem.engine.transport.add_ok_response();

    // Reset line held
    modem.update();
    assert_eq!(Step::Reset, modem.step());

    clock.advance(2_500);
    modem.update();
    assert_eq!(Step::WaitForReady, modem.step());

    update(modem, 3);
    assert_eq!(Step::Idle, modem.step());
}

/// Runs the configuration sequence up to the first registration query
fn configure_until_registration(modem: &mut ModemType, clock: &Clock) {
    assert_eq!(Step::Idle, modem.step());

    modem.update();
    assert_eq!(Step::SetPowerSaving, modem.step());

    for _ in 0..5 {
        modem.engine.transport.add_ok_response();
    }
    update(modem, 5);
    assert_eq!(Step::Delay, modem.step());

    clock.advance(3_000);
    modem.update();
    assert_eq!(Step::GetRegistration, modem.step());
}

/// Runs the configuration sequence, network registered on the first query
fn configure(modem: &mut ModemType, clock: &Clock) {
    configure_until_registration(modem, clock);

    modem.engine.transport.add_line("+CEREG: 0,1");
    modem.engine.transport.add_ok_response();
    modem.update();
    assert_eq!(Step::Idle, modem.step());
}

#[test]
fn test_new_in_standby() {
    let clock = Clock::new();
    let modem = modem(&clock, MockPins::new());

    assert_eq!(Step::Standby, modem.step());
    assert_eq!(TaskSet::empty(), modem.tasks());
    assert!(!modem.is_busy());
    assert!(!modem.engine.transport.opened);
}

#[test]
fn test_init_boots_to_idle() {
    let clock = Clock::new();
    let mut pins = MockPins::new();
    pins.expect_enable_output().with(eq(Pin::Reset), eq(false)).times(1).return_const(());
    pins.expect_set().with(eq(Pin::Reset)).times(1).return_const(());
    pins.expect_reset().with(eq(Pin::Reset)).times(1).return_const(());
    let mut modem = modem(&clock, pins);

    boot(&mut modem, &clock);

    assert!(modem.tasks().contains(TaskSet::CONFIGURE | TaskSet::INFO));
    assert!(modem.engine.transport.opened);
    assert_eq!(Some(115_200), modem.engine.transport.baud_rate);
    assert_eq!("ATE0\r\nAT\r\n", modem.engine.transport.written());
}

#[test]
fn test_wait_for_ready_skips_boot_messages() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    modem.init();
    clock.advance(2_500);
    modem.update();

    modem.engine.transport.add_line("RDY");
    modem.engine.transport.add_line("APP RDY");
    modem.update();
    assert_eq!(Step::WaitForReady, modem.step());
    modem.update();
    assert_eq!(Step::DisableEcho, modem.step());
}

#[test]
fn test_disable_echo_skips_echo() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    modem.init();
    clock.advance(2_500);
    modem.update();

    modem.engine.transport.add_line("APP RDY");
    modem.engine.transport.add_line("ATE0");
    modem.engine.transport.add_ok_response();
    update(&mut modem, 2);
    assert_eq!(Step::DisableEcho, modem.step());
    modem.update();
    assert_eq!(Step::Attention, modem.step());
}

#[test]
fn test_ready_timeout_returns_to_standby() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    modem.init();
    clock.advance(2_500);
    modem.update();

    clock.advance(11_999);
    modem.update();
    assert_eq!(Step::WaitForReady, modem.step());

    clock.advance(1);
    modem.update();
    assert_eq!(Step::Error, modem.step());

    modem.update();
    assert_eq!(Step::Standby, modem.step());
    assert!(!modem.engine.transport.opened);
    assert_eq!(1, modem.engine.transport.close_count);
}

#[test]
fn test_configuration() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    assert!(!modem.tasks().contains(TaskSet::CONFIGURE));
    assert_eq!(Some(RegistrationStatus::RegisteredHome), modem.registration());
    assert_eq!(
        "ATE0\r\nAT\r\n\
         AT+QPSMS=1,,,\"00111000\",\"00000001\"\r\n\
         AT+QCFG=\"psm/enter\",1\r\n\
         AT+QCFG=\"nwscanseq\",0302\r\n\
         AT+QCFG=\"iotopmode\",2,1\r\n\
         AT+COPS=0\r\n\
         AT+CEREG?\r\n",
        modem.engine.transport.written()
    );
}

#[test]
fn test_configuration_custom_settings() {
    let clock = Clock::new();
    let config = Config::new().psm_timers("00100001", "00000010").scan_sequence("02").iot_op_mode("0,1");
    let mut modem = modem_with_config(&clock, MockPins::with_status(false), config);

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    let written = modem.engine.transport.written();
    assert!(written.contains("AT+QPSMS=1,,,\"00100001\",\"00000010\"\r\n"));
    assert!(written.contains("AT+QCFG=\"nwscanseq\",02\r\n"));
    assert!(written.contains("AT+QCFG=\"iotopmode\",0,1\r\n"));
}

#[test]
fn test_registration_retried_while_searching() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure_until_registration(&mut modem, &clock);

    modem.engine.transport.add_line("+CEREG: 0,2");
    modem.engine.transport.add_ok_response();
    modem.update();
    assert_eq!(Step::Delay, modem.step());
    assert_eq!(Some(RegistrationStatus::Searching), modem.registration());

    // Poll interval not elapsed yet
    clock.advance(2_999);
    modem.update();
    assert_eq!(Step::Delay, modem.step());

    clock.advance(1);
    modem.update();
    assert_eq!(Step::GetRegistration, modem.step());

    modem.engine.transport.add_line("+CEREG: 0,5");
    modem.engine.transport.add_ok_response();
    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert_eq!(2, modem.engine.transport.written().matches("AT+CEREG?\r\n").count());
}

#[test]
fn test_registration_failed() {
    for (line, status) in [
        ("+CEREG: 0,0", RegistrationStatus::NotSearching),
        ("+CEREG: 0,3", RegistrationStatus::Denied),
        ("+CEREG: 0,4", RegistrationStatus::Unknown),
        ("+CEREG: 0,9", RegistrationStatus::Unknown),
    ] {
        let clock = Clock::new();
        let mut modem = modem(&clock, MockPins::with_status(false));

        boot(&mut modem, &clock);
        configure_until_registration(&mut modem, &clock);

        modem.engine.transport.add_line(line);
        modem.engine.transport.add_ok_response();
        modem.update();
        assert_eq!(Step::Error, modem.step(), "{}", line);
        assert_eq!(Some(status), modem.registration());

        // Cleared by the operator selection already
        assert!(!modem.tasks().contains(TaskSet::CONFIGURE));

        modem.update();
        assert_eq!(Step::Standby, modem.step(), "{}", line);
        assert!(!modem.engine.transport.opened);
    }
}

#[test]
fn test_configuration_command_rejected() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    modem.update();

    modem.engine.transport.add_ok_response();
    modem.engine.transport.add_error_response();
    update(&mut modem, 2);
    assert_eq!(Step::Error, modem.step());

    // Configuration gets retried on the next power-up
    modem.update();
    assert_eq!(Step::Standby, modem.step());
    assert!(modem.tasks().contains(TaskSet::CONFIGURE));
}

#[test]
fn test_info_served_last_then_standby() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    modem.update();
    assert_eq!(Step::GetSignalQuality, modem.step());

    modem.engine.transport.add_line("+QCSQ: \"eMTC\",-73,-100,152,-11");
    modem.engine.transport.add_ok_response();
    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert!(modem.tasks().is_empty());

    let quality = modem.signal_quality().unwrap();
    assert_eq!("eMTC", quality.mode.as_str());
    assert_eq!(-73, quality.rssi);

    modem.update();
    assert_eq!(Step::Standby, modem.step());
    assert!(!modem.engine.transport.opened);
}

#[test]
fn test_wakeup_powered_modem() {
    let clock = Clock::new();
    let mut pins = MockPins::new();
    pins.expect_enable_input().with(eq(Pin::Status), eq(Pull::Down)).times(1).return_const(());
    pins.expect_read().with(eq(Pin::Status)).times(1).return_const(true);
    pins.expect_deinit().with(eq(Pin::Status)).times(1).return_const(());
    let mut modem = modem(&clock, pins);

    modem.wakeup();
    assert_eq!(Step::Attention, modem.step());
    assert!(modem.tasks().contains(TaskSet::INFO));
    assert!(modem.engine.transport.opened);

    modem.engine.transport.add_ok_response();
    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert_eq!("AT\r\n", modem.engine.transport.written());
}

#[test]
fn test_wakeup_pulse() {
    let clock = Clock::new();
    let mut pins = MockPins::new();
    pins.expect_enable_input().return_const(());
    pins.expect_read().return_const(false);
    pins.expect_deinit().return_const(());
    pins.expect_set().with(eq(Pin::Reset)).return_const(());
    pins.expect_reset().with(eq(Pin::Reset)).times(1).return_const(());
    let mut modem = modem(&clock, pins);

    modem.wakeup();
    assert_eq!(Step::Wakeup, modem.step());

    modem.update();
    assert_eq!(Step::Wakeup, modem.step());

    clock.advance(100);
    modem.update();
    assert_eq!(Step::WaitForReady, modem.step());
}

#[test]
fn test_wakeup_ignored_while_busy() {
    let clock = Clock::new();
    let mut pins = MockPins::new();
    pins.expect_enable_output().return_const(());
    pins.expect_enable_input().never();
    pins.expect_read().never();
    let mut modem = modem(&clock, pins);

    modem.init();
    modem.wakeup();
    assert_eq!(Step::Reset, modem.step());
}

/// Scripts a successful HTTP GET transaction, including the trailer after the body
fn add_http_response(modem: &mut ModemType, body: &[u8]) {
    let transport = &mut modem.engine.transport;
    transport.add_line("CONNECT");
    transport.add_ok_response();
    transport.add_ok_response();
    transport.add_line(&format!("+QHTTPGET: 0,200,{}", body.len()));
    transport.add_line("CONNECT");
    transport.add_response(body);
    transport.add_response(b"\r\nOK\r\n\r\n+QHTTPREAD: 0\r\n");
}

/// Scripts the HTTP transaction up to the `+QHTTPGET` result
fn add_http_get_result(modem: &mut ModemType, result: &str) {
    let transport = &mut modem.engine.transport;
    transport.add_line("CONNECT");
    transport.add_ok_response();
    transport.add_ok_response();
    transport.add_line(result);
}

#[test]
fn test_http_get() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    modem.http_get("http://example.com", record_response).unwrap();
    assert!(modem.http_pending());
    assert!(modem.response().is_empty());
    add_http_response(&mut modem, b"0123456789");

    // HTTP is served before INFO
    modem.update();
    assert_eq!(Step::SetUrl, modem.step());

    update(&mut modem, 8);
    assert_eq!(Step::SendCallback, modem.step());
    assert!(recorded_responses().is_empty());

    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert!(!modem.http_pending());
    assert_eq!(vec![(200, 10)], recorded_responses());
    assert_eq!(b"0123456789", modem.response());

    let written = modem.engine.transport.written();
    assert!(written.ends_with(
        "AT+QHTTPURL=18\r\n\
         http://example.com\
         AT+QHTTPGET=20\r\n\
         AT+QHTTPREAD\r\n"
    ));
}

#[test]
fn test_http_get_followed_by_info() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    modem.http_get("http://example.com", record_response).unwrap();
    add_http_response(&mut modem, b"0123456789");
    update(&mut modem, 10);
    assert_eq!(Step::Idle, modem.step());

    // Trailer of the body got consumed, the next query starts on a clean line
    assert_eq!(0, modem.engine.transport.pending());

    modem.update();
    assert_eq!(Step::GetSignalQuality, modem.step());

    modem.engine.transport.add_line("+QCSQ: \"NBIoT\",-91,-105,98,-12");
    modem.engine.transport.add_ok_response();
    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert_eq!(-91, modem.signal_quality().unwrap().rssi);
}

#[test]
fn test_http_get_sequential_requests() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    let bodies: [&[u8]; 2] = [b"first body", b"second"];
    for body in bodies {
        modem.http_get("http://example.com/data", record_response).unwrap();
        add_http_response(&mut modem, body);
        update(&mut modem, 10);

        assert_eq!(Step::Idle, modem.step());
        assert_eq!(body, modem.response());
    }

    assert_eq!(vec![(200, 10), (200, 6)], recorded_responses());
    assert_eq!(2, modem.engine.transport.written().matches("AT+QHTTPURL=23\r\n").count());
}

#[test]
fn test_http_get_url_too_long() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::new());

    let url = format!("http://example.com/{}", "a".repeat(60));
    assert_eq!(Err(RequestError::UrlTooLong), modem.http_get(&url, record_response));

    // Modem not woken up
    assert_eq!(Step::Standby, modem.step());
    assert!(!modem.http_pending());
}

#[test]
fn test_http_get_waits_for_result() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    modem.engine.transport.add_line("CONNECT");
    modem.engine.transport.add_ok_response();
    modem.engine.transport.add_ok_response();
    update(&mut modem, 4);
    assert_eq!(Step::WaitHttpGet, modem.step());

    // Modem timeout plus one second
    clock.advance(20_999);
    modem.update();
    assert_eq!(Step::WaitHttpGet, modem.step());

    clock.advance(1);
    modem.update();
    assert_eq!(Step::Error, modem.step());

    modem.update();
    assert_eq!(Step::Standby, modem.step());
    assert_eq!(vec![(0, 0)], recorded_responses());
}

#[test]
fn test_http_timeout_clamped() {
    assert_eq!(65_535, Config::new().http_timeout_s(u32::MAX).http_timeout_s);
    assert_eq!(1, Config::new().http_timeout_s(0).http_timeout_s);

    let clock = Clock::new();
    let config = Config {
        http_timeout_s: u32::MAX,
        ..Config::default()
    };
    let mut modem = modem_with_config(&clock, MockPins::with_status(false), config);

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    modem.engine.transport.add_line("CONNECT");
    modem.engine.transport.add_ok_response();
    modem.engine.transport.add_ok_response();
    update(&mut modem, 5);
    assert_eq!(Step::WaitHttpGet, modem.step());

    clock.advance(1_000_000);
    modem.update();
    assert_eq!(Step::WaitHttpGet, modem.step());
}

#[test]
fn test_http_get_response_exceeding_buffer() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    add_http_get_result(&mut modem, "+QHTTPGET: 0,200,100");
    update(&mut modem, 5);
    assert_eq!(Step::SendCallback, modem.step());

    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert!(!modem.engine.transport.written().contains("AT+QHTTPREAD"));
    assert_eq!(vec![(200, 0)], recorded_responses());
    assert!(modem.response().is_empty());
}

#[test]
fn test_http_get_modem_error() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    add_http_get_result(&mut modem, "+QHTTPGET: 703");
    update(&mut modem, 6);
    assert_eq!(Step::Idle, modem.step());
    assert!(!modem.engine.transport.written().contains("AT+QHTTPREAD"));
    assert_eq!(vec![(0, 0)], recorded_responses());
}

#[test]
fn test_http_get_rejected_while_pending() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);

    modem.http_get("http://example.com", record_response).unwrap();
    let result = modem.http_get("http://example.org/other", unexpected_response);
    assert_eq!(Err(RequestError::Pending), result);

    // First request is unaffected
    add_http_get_result(&mut modem, "+QHTTPGET: 0,204,0");
    update(&mut modem, 6);
    assert_eq!(Step::Idle, modem.step());
    assert!(modem.engine.transport.written().contains("AT+QHTTPURL=18\r\n"));
    assert_eq!(vec![(204, 0)], recorded_responses());
}

#[test]
fn test_http_get_device_error_aborts() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    modem.engine.transport.add_error_response();
    update(&mut modem, 2);
    assert_eq!(Step::Error, modem.step());

    modem.update();
    assert_eq!(Step::Standby, modem.step());
    assert!(!modem.http_pending());
    assert!(!modem.is_busy());
    assert!(!modem.engine.transport.opened);
    assert_eq!(vec![(0, 0)], recorded_responses());
}

#[test]
fn test_http_get_body_timeout() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    add_http_get_result(&mut modem, "+QHTTPGET: 0,200,10");
    modem.engine.transport.add_line("CONNECT");
    modem.engine.transport.add_response(b"0123");
    update(&mut modem, 7);
    assert_eq!(Step::HttpReadContent, modem.step());

    clock.advance(5_000);
    modem.update();
    assert_eq!(Step::Error, modem.step());

    modem.update();
    assert_eq!(vec![(0, 0)], recorded_responses());
    assert!(modem.response().is_empty());
}

#[test]
fn test_http_get_missing_trailer_keeps_body() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    add_http_get_result(&mut modem, "+QHTTPGET: 0,200,10");
    modem.engine.transport.add_line("CONNECT");
    modem.engine.transport.add_response(b"0123456789");
    update(&mut modem, 7);
    assert_eq!(Step::HttpReadOk, modem.step());

    clock.advance(5_000);
    modem.update();
    assert_eq!(Step::SendCallback, modem.step());

    modem.update();
    assert_eq!(Step::Idle, modem.step());
    assert_eq!(vec![(200, 10)], recorded_responses());
    assert_eq!(b"0123456789", modem.response());
}

#[test]
fn test_http_get_read_error_discards_body() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    add_http_get_result(&mut modem, "+QHTTPGET: 0,200,10");
    modem.engine.transport.add_line("CONNECT");
    modem.engine.transport.add_response(b"0123456789\r\nOK\r\n\r\n+QHTTPREAD: 717\r\n");
    update(&mut modem, 10);
    assert_eq!(Step::Idle, modem.step());
    assert_eq!(vec![(200, 0)], recorded_responses());
    assert!(modem.response().is_empty());
}

#[test]
fn test_http_get_wakes_modem() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(true));

    modem.http_get("http://example.com", record_response).unwrap();
    assert_eq!(Step::Attention, modem.step());
    assert!(modem.tasks().contains(TaskSet::HTTP | TaskSet::INFO));

    modem.engine.transport.add_ok_response();
    update(&mut modem, 2);
    assert_eq!(Step::SetUrl, modem.step());
}

#[test]
fn test_reset_aborts_request() {
    let clock = Clock::new();
    let mut modem = modem(&clock, MockPins::with_status(false));

    boot(&mut modem, &clock);
    configure(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    modem.reset();
    assert_eq!(Step::Reset, modem.step());
    assert!(!modem.http_pending());
    assert!(modem.tasks().contains(TaskSet::CONFIGURE));
    assert_eq!(vec![(0, 0)], recorded_responses());

    // Accepts the next request right away
    assert_eq!(Ok(()), modem.http_get("http://example.com", record_response));
}

#[test]
fn test_deinit_aborts_request() {
    let clock = Clock::new();
    let mut pins = MockPins::new();
    pins.expect_enable_output().return_const(());
    pins.expect_set().return_const(());
    pins.expect_reset().return_const(());
    pins.expect_deinit().with(eq(Pin::Reset)).times(2).return_const(());
    let mut modem = modem(&clock, pins);

    boot(&mut modem, &clock);
    modem.http_get("http://example.com", record_response).unwrap();

    modem.deinit();
    assert_eq!(Step::Standby, modem.step());
    assert!(!modem.is_busy());
    assert!(!modem.engine.transport.opened);

    // Nothing left to abort
    modem.deinit();
    assert_eq!(vec![(0, 0)], recorded_responses());
}

#[test]
fn test_step_phases() {
    assert_eq!(Phase::Lifecycle, Step::Idle.phase());
    assert_eq!(Phase::Lifecycle, Step::WaitForReady.phase());
    assert_eq!(Phase::Configuration, Step::GetRegistration.phase());
    assert_eq!(Phase::Info, Step::GetSignalQuality.phase());
    assert_eq!(Phase::Http, Step::HttpReadContent.phase());
    assert_eq!(Phase::Http, Step::HttpReadStatus.phase());
    assert_eq!(Phase::Meta, Step::Delay.phase());
    assert_eq!(Phase::Meta, Step::Error.phase());
}

#[test]
fn test_step_successors() {
    let mut step = Step::SetUrl;
    let mut visited = vec![step];
    while step != Step::Idle {
        step = step.next();
        visited.push(step);
    }

    assert_eq!(
        vec![
            Step::SetUrl,
            Step::SendUrl,
            Step::SetHttpGet,
            Step::WaitHttpGet,
            Step::HttpRead,
            Step::HttpReadContent,
            Step::HttpReadOk,
            Step::HttpReadStatus,
            Step::SendCallback,
            Step::Idle,
        ],
        visited
    );
    assert_eq!(Step::Standby, Step::Standby.next());
}
