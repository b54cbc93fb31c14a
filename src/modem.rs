//! # BG95 modem controller
//!
//! Step based state machine driving the modem through power-up, network configuration, signal quality
//! queries and HTTP GET requests. Every call of [Modem::update] executes one non-blocking unit of work and
//! performs at most one step transition.
//!
//! High level goals are tracked as independent tasks ([TaskSet]) and served one after another whenever the
//! modem is idle. Once no task is left, the modem returns to standby and the transport gets closed.
//!
//! ## Example
//!
//! ````
//! # use bg95_at::config::Config;
//! # use bg95_at::example::{ExamplePins, ExampleTimer, ExampleTransport};
//! # use bg95_at::modem::{Modem, Step};
//! #
//! fn on_response(status: u32, length: u32) {
//!     assert_eq!((0, 0), (status, length));
//! }
//!
//! // 128 bytes line buffer, URLs up to 64 bytes, response bodies up to 512 bytes
//! let mut modem: Modem<_, _, _, 1_000, 128, 64, 512> = Modem::new(
//!     ExampleTransport::default(),
//!     ExamplePins::default(),
//!     ExampleTimer::default(),
//!     Config::default(),
//! );
//!
//! // Starts the cold boot sequence
//! modem.init();
//! assert_eq!(Step::Reset, modem.step());
//!
//! // Queue a request. The callback gets called exactly once.
//! modem.http_get("http://example.com", on_response).unwrap();
//! assert!(modem.http_pending());
//!
//! // Aborts the pending request
//! modem.deinit();
//! assert!(!modem.is_busy());
//! assert!(modem.response().is_empty());
//! ````
use crate::commands::{
    Attention, AutomaticOperator, EnterPsmImmediately, GetRegistrationStatus, GetSignalQuality, HttpGet, HttpRead,
    SetEcho, SetIotOpMode, SetPowerSavingMode, SetScanSequence, SetUrl,
};
use crate::config::Config;
use crate::engine::{AtEngine, Error};
use crate::log;
use crate::pins::{ModemPins, Pin, Pull};
use crate::responses::{HttpGetResult, HttpReadResult, Registration, RegistrationStatus, SignalQuality};
use crate::transport::Transport;
use bitflags::bitflags;
use fugit_timer::Timer;
use heapless::{String, Vec};

bitflags! {
    /// Outstanding high level goals
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct TaskSet: u8 {
        /// Network configuration, raised by a modem reset
        const CONFIGURE = 1 << 0;
        /// Signal quality query, raised whenever the modem leaves standby
        const INFO = 1 << 1;
        /// HTTP request, raised by [Modem::http_get]
        const HTTP = 1 << 2;
    }
}

/// Group of steps belonging to one sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Power-up and idle handling
    Lifecycle,
    Configuration,
    Info,
    Http,
    /// Error recovery and delays
    Meta,
}

/// Current position of the state machine
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Transport closed, modem presumably in PSM
    Standby,

    /// Something went wrong. Aborts pending requests and returns to standby.
    Error,

    /// Waits for the duration of a [DelayRequest], then continues with its step
    Delay,

    /// Short pulse on the reset line for waking the modem
    Wakeup,

    /// Long pulse on the reset line for a cold boot
    Reset,

    /// Waits for `APP RDY`
    WaitForReady,

    /// ATE0
    DisableEcho,

    /// AT
    Attention,

    /// Dispatches pending tasks
    Idle,

    /// AT+QPSMS
    SetPowerSaving,

    /// AT+QCFG="psm/enter"
    SetPsmEnter,

    /// AT+QCFG="nwscanseq"
    SetScanSequence,

    /// AT+QCFG="iotopmode"
    SetIotOpMode,

    /// AT+COPS=0
    SetOperator,

    /// AT+CEREG?
    GetRegistration,

    /// AT+QCSQ
    GetSignalQuality,

    /// AT+QHTTPURL
    SetUrl,

    /// Raw URL bytes after `CONNECT`
    SendUrl,

    /// AT+QHTTPGET
    SetHttpGet,

    /// Waits for the `+QHTTPGET` result
    WaitHttpGet,

    /// AT+QHTTPREAD
    HttpRead,

    /// Raw response body after `CONNECT`
    HttpReadContent,

    /// `OK` following the response body
    HttpReadOk,

    /// Waits for the `+QHTTPREAD` result
    HttpReadStatus,

    /// Passes the result to the request callback
    SendCallback,
}

impl Step {
    pub fn phase(&self) -> Phase {
        match self {
            Step::Standby
            | Step::Wakeup
            | Step::Reset
            | Step::WaitForReady
            | Step::DisableEcho
            | Step::Attention
            | Step::Idle => Phase::Lifecycle,
            Step::SetPowerSaving
            | Step::SetPsmEnter
            | Step::SetScanSequence
            | Step::SetIotOpMode
            | Step::SetOperator
            | Step::GetRegistration => Phase::Configuration,
            Step::GetSignalQuality => Phase::Info,
            Step::SetUrl
            | Step::SendUrl
            | Step::SetHttpGet
            | Step::WaitHttpGet
            | Step::HttpRead
            | Step::HttpReadContent
            | Step::HttpReadOk
            | Step::HttpReadStatus
            | Step::SendCallback => Phase::Http,
            Step::Error | Step::Delay => Phase::Meta,
        }
    }

    /// Successor within the phase, taken once the step completed successfully
    ///
    /// Steps with their own branching return themselves.
    pub fn next(&self) -> Step {
        match self {
            Step::Wakeup | Step::Reset => Step::WaitForReady,
            Step::WaitForReady => Step::DisableEcho,
            Step::DisableEcho => Step::Attention,
            Step::Attention => Step::Idle,

            Step::SetPowerSaving => Step::SetPsmEnter,
            Step::SetPsmEnter => Step::SetScanSequence,
            Step::SetScanSequence => Step::SetIotOpMode,
            Step::SetIotOpMode => Step::SetOperator,
            Step::SetOperator => Step::GetRegistration,
            Step::GetRegistration => Step::Idle,

            Step::GetSignalQuality => Step::Idle,

            Step::SetUrl => Step::SendUrl,
            Step::SendUrl => Step::SetHttpGet,
            Step::SetHttpGet => Step::WaitHttpGet,
            Step::WaitHttpGet => Step::HttpRead,
            Step::HttpRead => Step::HttpReadContent,
            Step::HttpReadContent => Step::HttpReadOk,
            Step::HttpReadOk => Step::HttpReadStatus,
            Step::HttpReadStatus => Step::SendCallback,
            Step::SendCallback => Step::Idle,

            Step::Standby | Step::Error | Step::Delay | Step::Idle => *self,
        }
    }
}

/// Payload of [Step::Delay]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayRequest {
    /// Step entered once the delay elapsed
    pub next_step: Step,

    pub delay_ms: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpMethod {
    Get,
}

/// Called once per accepted request with the HTTP status and the length of the received body, s.
/// [Modem::response]. `(0, 0)` signals an aborted request.
pub type ResponseCallback = fn(u32, u32);

/// Accepted HTTP request
pub struct HttpRequest<const URL_SIZE: usize> {
    pub method: HttpMethod,

    pub url: String<URL_SIZE>,

    /// Length of the response body reported by the modem
    pub response_size: u32,

    /// HTTP status code reported by the modem
    pub status: u32,

    pub callback: ResponseCallback,
}

/// Errors when requesting a task
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Another HTTP request is still pending. The pending request is not affected.
    Pending,

    /// The URL exceeds the URL capacity of the driver
    UrlTooLong,
}

/// BG95 modem driver
///
/// TIMER_HZ: Tick rate of the timer used for timeouts and delays
///
/// RX_SIZE: Capacity of the line buffer in bytes
///
/// URL_SIZE: Maximum length of a request URL in bytes
///
/// BODY_SIZE: Capacity of the response body buffer in bytes. Larger responses are discarded.
pub struct Modem<
    T: Transport,
    P: ModemPins,
    C: Timer<TIMER_HZ>,
    const TIMER_HZ: u32,
    const RX_SIZE: usize,
    const URL_SIZE: usize,
    const BODY_SIZE: usize,
> {
    /// AT command engine
    pub(crate) engine: AtEngine<T, C, TIMER_HZ, RX_SIZE>,

    /// Reset and status lines
    pub(crate) pins: P,

    config: Config,

    step: Step,

    tasks: TaskSet,

    /// Payload of the delay step
    delay: DelayRequest,

    /// Present while the HTTP task is pending
    http: Option<HttpRequest<URL_SIZE>>,

    /// Body of the current or last HTTP response
    response: Vec<u8, BODY_SIZE>,

    /// Last signal quality reported by the modem
    signal_quality: Option<SignalQuality>,

    /// Last registration status reported by the modem
    registration: Option<RegistrationStatus>,
}

impl<
        T: Transport,
        P: ModemPins,
        C: Timer<TIMER_HZ>,
        const TIMER_HZ: u32,
        const RX_SIZE: usize,
        const URL_SIZE: usize,
        const BODY_SIZE: usize,
    > Modem<T, P, C, TIMER_HZ, RX_SIZE, URL_SIZE, BODY_SIZE>
{
    /// Creates a new driver in standby. Call [Modem::init] for powering up the modem.
    pub fn new(transport: T, pins: P, timer: C, config: Config) -> Self {
        Self {
            engine: AtEngine::new(transport, timer),
            pins,
            config,
            step: Step::Standby,
            tasks: TaskSet::empty(),
            delay: DelayRequest {
                next_step: Step::Standby,
                delay_ms: 0,
            },
            http: None,
            response: Vec::new(),
            signal_quality: None,
            registration: None,
        }
    }

    /// Resets all tasks and starts the cold boot sequence
    pub fn init(&mut self) {
        self.pins.enable_output(Pin::Reset, false);

        self.abort_http();
        self.tasks = TaskSet::empty();
        self.enter_step(Step::Standby);
        self.enter_step(Step::Reset);
    }

    /// Closes the transport and releases the reset line. A pending request gets aborted.
    pub fn deinit(&mut self) {
        self.abort_http();
        self.enter_step(Step::Standby);
        self.pins.deinit(Pin::Reset);
    }

    /// Executes a single step. Needs to be called regularly.
    pub fn update(&mut self) {
        let step = self.run_step();
        if step != self.step {
            self.enter_step(step);
        }
    }

    /// Power cycles and reconfigures the modem. A pending request gets aborted.
    pub fn reset(&mut self) {
        self.abort_http();
        self.enter_step(Step::Reset);
    }

    /// Wakes the modem up, if in standby
    ///
    /// If the status line is already high, the modem is still powered and just gets resynchronized by an `AT`.
    pub fn wakeup(&mut self) {
        if self.step != Step::Standby {
            return;
        }

        self.pins.enable_input(Pin::Status, Pull::Down);
        let powered = self.pins.read(Pin::Status);
        self.pins.deinit(Pin::Status);

        self.enter_step(if powered { Step::Attention } else { Step::Wakeup });
    }

    /// Returns true unless in standby
    pub fn is_busy(&self) -> bool {
        self.step != Step::Standby
    }

    /// Starts an HTTP GET request, waking the modem up if required
    ///
    /// The callback is called exactly once, with the HTTP status and the response length, or `(0, 0)` if the
    /// request was aborted. The body is available by [Modem::response] until the next request gets accepted.
    /// If the response exceeds `BODY_SIZE`, the body is discarded and the length is reported as zero.
    pub fn http_get(&mut self, url: &str, callback: ResponseCallback) -> Result<(), RequestError> {
        let url = String::try_from(url).map_err(|_| RequestError::UrlTooLong)?;

        self.wakeup();

        if self.http_pending() {
            return Err(RequestError::Pending);
        }

        self.response.clear();
        self.tasks.insert(TaskSet::HTTP);
        self.http = Some(HttpRequest {
            method: HttpMethod::Get,
            url,
            response_size: 0,
            status: 0,
            callback,
        });

        Ok(())
    }

    /// Body of the last completed HTTP response
    ///
    /// Empty while a request is pending, after an aborted request or if the response did not fit.
    pub fn response(&self) -> &[u8] {
        if self.http.is_some() {
            return &[];
        }

        &self.response
    }

    /// Returns true while an HTTP request is pending
    pub fn http_pending(&self) -> bool {
        self.tasks.contains(TaskSet::HTTP)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn tasks(&self) -> TaskSet {
        self.tasks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Signal quality of the last successful query
    pub fn signal_quality(&self) -> Option<&SignalQuality> {
        self.signal_quality.as_ref()
    }

    /// Result of the last registration query
    pub fn registration(&self) -> Option<RegistrationStatus> {
        self.registration
    }

    /// Applies the side effects of a step change
    fn enter_step(&mut self, step: Step) {
        if step == self.step {
            return;
        }

        if self.step == Step::Standby {
            self.tasks.insert(TaskSet::INFO);
            self.engine.open(self.config.baud_rate);
        } else if step == Step::Standby {
            self.engine.close();
        }

        if step == Step::Reset {
            self.tasks.insert(TaskSet::CONFIGURE);
        }

        self.engine.start_command();

        if step == Step::Error {
            log::warn!("Error in step {:?}", self.step);
        } else {
            log::debug!("Step {:?} -> {:?}", self.step, step);
        }

        self.step = step;
    }

    /// Executes one unit of work of the current step. Returns the step to continue with.
    fn run_step(&mut self) -> Step {
        let step = self.step;

        let result = match step {
            Step::Standby => return step,
            Step::Error => {
                self.abort_http();
                return Step::Standby;
            }
            Step::Delay => {
                self.engine.set_timeout_ms(self.delay.delay_ms);
                if self.engine.timed_out() {
                    return self.delay.next_step;
                }
                return step;
            }
            Step::Wakeup | Step::Reset => {
                let hold = match step {
                    Step::Reset => self.config.reset_hold_ms,
                    _ => self.config.wakeup_pulse_ms,
                };
                self.engine.set_timeout_ms(hold);

                if !self.engine.timed_out() {
                    self.pins.set(Pin::Reset);
                    return step;
                }

                self.pins.reset(Pin::Reset);
                return Step::WaitForReady;
            }
            Step::WaitForReady => {
                self.engine.set_timeout_ms(self.config.ready_timeout_ms);
                match self.engine.expect_match("APP RDY") {
                    // Boot messages
                    Err(nb::Error::Other(Error::Unexpected)) => return step,
                    result => result,
                }
            }
            Step::DisableEcho => {
                self.engine.command_with(&SetEcho(false));
                match self.engine.expect_ok() {
                    // Echo of the command itself
                    Err(nb::Error::Other(Error::Unexpected)) => return step,
                    result => result,
                }
            }
            Step::Attention => {
                self.engine.command_with(&Attention);
                self.engine.expect_ok()
            }
            Step::Idle => return self.next_task(),
            Step::SetPowerSaving => {
                self.engine.command_with(&SetPowerSavingMode {
                    periodic_tau: self.config.psm_periodic_tau,
                    active_time: self.config.psm_active_time,
                });
                self.engine.expect_ok()
            }
            Step::SetPsmEnter => {
                self.engine.command_with(&EnterPsmImmediately);
                self.engine.expect_ok()
            }
            Step::SetScanSequence => {
                self.engine.command_with(&SetScanSequence(self.config.scan_sequence));
                self.engine.expect_ok()
            }
            Step::SetIotOpMode => {
                self.engine.command_with(&SetIotOpMode(self.config.iot_op_mode));
                self.engine.expect_ok()
            }
            Step::SetOperator => {
                self.engine.command_with(&AutomaticOperator);
                self.engine.set_timeout_ms(self.config.operator_timeout_ms);
                match self.engine.expect_ok() {
                    Ok(()) => {
                        self.tasks.remove(TaskSet::CONFIGURE);
                        return self.delay_step(step.next(), self.config.registration_poll_ms);
                    }
                    result => result,
                }
            }
            Step::GetRegistration => {
                self.engine.command_with(&GetRegistrationStatus);
                match self.engine.expect_response_with::<Registration>() {
                    Ok(registration) => return self.handle_registration(registration.status),
                    Err(error) => Err(error),
                }
            }
            Step::GetSignalQuality => {
                self.engine.command_with(&GetSignalQuality);
                match self.engine.expect_response_with::<SignalQuality>() {
                    Ok(quality) => {
                        log::info!("{}: {} dBm", quality.mode.as_str(), quality.rssi);
                        self.tasks.remove(TaskSet::INFO);
                        self.signal_quality = Some(quality);
                        return Step::Idle;
                    }
                    Err(error) => Err(error),
                }
            }
            Step::SetUrl => {
                let Some(request) = &self.http else {
                    return Step::Error;
                };

                self.engine.command_with(&SetUrl {
                    length: request.url.len(),
                });
                self.engine.expect_match("CONNECT")
            }
            Step::SendUrl => {
                let Some(request) = &self.http else {
                    return Step::Error;
                };

                self.engine.command_raw(request.url.as_bytes());
                self.engine.expect_ok()
            }
            Step::SetHttpGet => {
                self.engine.command_with(&HttpGet {
                    timeout_s: self.config.http_timeout_s,
                });
                self.engine.expect_ok()
            }
            Step::WaitHttpGet => {
                let timeout = self.config.http_timeout_s.saturating_add(1).saturating_mul(1_000);
                self.engine.set_timeout_ms(timeout);
                match self.engine.expect_match_with::<HttpGetResult>() {
                    Ok(result) => return self.handle_http_result(result),
                    Err(error) => Err(error),
                }
            }
            Step::HttpRead => {
                self.engine.command_with(&HttpRead);
                self.engine.expect_match("CONNECT")
            }
            Step::HttpReadContent => {
                self.engine.set_timeout_ms(self.config.http_read_timeout_ms);
                self.engine.expect_raw(&mut self.response)
            }
            Step::HttpReadOk => {
                self.engine.set_timeout_ms(self.config.http_read_timeout_ms);
                match self.engine.expect_ok() {
                    Err(nb::Error::Other(error)) => return self.skip_read_trailer(error),
                    result => result,
                }
            }
            Step::HttpReadStatus => {
                self.engine.set_timeout_ms(self.config.http_read_timeout_ms);
                match self.engine.expect_match_with::<HttpReadResult>() {
                    Ok(result) => return self.handle_read_result(result),
                    Err(nb::Error::WouldBlock) => return step,
                    Err(nb::Error::Other(error)) => return self.skip_read_trailer(error),
                }
            }
            Step::SendCallback => {
                self.send_callback();
                return Step::Idle;
            }
        };

        match result {
            Ok(()) => step.next(),
            Err(nb::Error::WouldBlock) => step,
            Err(nb::Error::Other(error)) => {
                log::debug!("Step {:?} failed: {:?}", step, error);
                Step::Error
            }
        }
    }

    /// Picks the next task to serve. Returns to standby if there is nothing left to do.
    fn next_task(&self) -> Step {
        if self.tasks.contains(TaskSet::CONFIGURE) {
            return Step::SetPowerSaving;
        }

        if self.tasks.contains(TaskSet::HTTP) {
            return Step::SetUrl;
        }

        // Served last, as the modem does not report a sane RSSI without some traffic
        if self.tasks.contains(TaskSet::INFO) {
            return Step::GetSignalQuality;
        }

        Step::Standby
    }

    fn handle_registration(&mut self, status: RegistrationStatus) -> Step {
        self.registration = Some(status);

        match status {
            RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming => {
                log::info!("Network registered");
                Step::Idle
            }
            RegistrationStatus::Searching => {
                log::info!("Searching network");
                // TODO: Give up after a configurable number of attempts, the modem may search forever
                self.delay_step(Step::GetRegistration, self.config.registration_poll_ms)
            }
            RegistrationStatus::NotSearching => {
                log::warn!("Network search stopped");
                Step::Error
            }
            RegistrationStatus::Denied | RegistrationStatus::Unknown => {
                log::warn!("Network registration denied");
                Step::Error
            }
        }
    }

    fn handle_http_result(&mut self, result: HttpGetResult) -> Step {
        let Some(request) = &mut self.http else {
            return Step::Error;
        };

        request.status = result.status;
        request.response_size = result.length;

        if result.error != 0 {
            log::warn!("HTTP GET failed with error {}", result.error);
            return Step::SendCallback;
        }

        log::info!("HTTP GET {} ({} bytes)", result.status, result.length);
        if BODY_SIZE == 0 || result.length == 0 {
            return Step::SendCallback;
        }

        let length = result.length as usize;
        if length > BODY_SIZE || self.response.resize_default(length).is_err() {
            log::warn!("HTTP response of {} bytes exceeds buffer of {} bytes", length, BODY_SIZE);
            request.response_size = 0;
            return Step::SendCallback;
        }

        Step::HttpRead
    }

    /// The body is complete at this point, a failed trailer does not invalidate it
    fn skip_read_trailer(&mut self, error: Error) -> Step {
        log::warn!("Missing HTTP read trailer: {:?}", error);
        Step::SendCallback
    }

    fn handle_read_result(&mut self, result: HttpReadResult) -> Step {
        if result.error != 0 {
            log::warn!("HTTP read failed with error {}", result.error);
            if let Some(request) = &mut self.http {
                request.response_size = 0;
            }
            self.response.clear();
        }

        Step::SendCallback
    }

    /// Stashes the delay payload and returns the delay step
    fn delay_step(&mut self, next_step: Step, delay_ms: u32) -> Step {
        self.delay = DelayRequest { next_step, delay_ms };
        Step::Delay
    }

    /// Completes the pending request with the received result
    fn send_callback(&mut self) {
        if let Some(HttpRequest {
            status,
            response_size,
            callback,
            ..
        }) = self.http.take()
        {
            callback(status, response_size);
        }
        self.tasks.remove(TaskSet::HTTP);
    }

    /// Completes the pending request, if any, with `(0, 0)`
    fn abort_http(&mut self) {
        if let Some(HttpRequest { method, callback, .. }) = self.http.take() {
            log::warn!("Aborting HTTP {:?} request", method);
            callback(0, 0);
        }
        self.response.clear();
        self.tasks.remove(TaskSet::HTTP);
    }
}
