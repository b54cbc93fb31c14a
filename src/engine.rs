//! # AT line protocol engine
//!
//! Splits the byte stream of a [Transport] into lines and matches them against expected responses.
//! All `expect_*` methods are non-blocking and follow the [nb] convention:
//!
//! * `Ok(..)`: the expected response has been received
//! * `Err(nb::Error::WouldBlock)`: no (complete) response yet, call again later
//! * `Err(nb::Error::Other(..))`: the exchange failed, s. [Error]
//!
//! One logical exchange is called a session. A session gets started by [AtEngine::start_command], which
//! resets the parser, the timeout and the "command sent" latch. Commands are transmitted at most once per
//! session, so `command()` and `expect_*()` may be called together on every poll.
//!
//! ## Example
//!
//! ````
//! # use bg95_at::engine::AtEngine;
//! # use bg95_at::example::{ExampleTimer, ExampleTransport};
//! #
//! let mut engine: AtEngine<_, _, 1_000, 128> = AtEngine::new(ExampleTransport::default(), ExampleTimer::default());
//! engine.open(115_200);
//!
//! // Sends "AT+CEREG?\r\n" exactly once, even if polled repeatedly
//! engine.command("+CEREG?");
//! engine.command("+CEREG?");
//!
//! // Nothing received yet
//! assert_eq!(Err(nb::Error::WouldBlock), engine.expect_ok());
//! ````
use crate::commands::Command;
use crate::log;
use crate::responses::FromLine;
use crate::transport::Transport;
use core::fmt::Write as _;
use core::ops::Range;
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Prefix of every command
pub const COMMAND_PREFIX: &str = "AT";

/// Terminator of every command
pub const COMMAND_SUFFIX: &str = "\r\n";

/// Timeout of a session if not overridden by [AtEngine::set_timeout_ms]
pub const DEFAULT_TIMEOUT_MS: u32 = 300;

/// Reasons an expectation fails
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The modem responded with an explicit `ERROR`
    Device,

    /// A line was received, but it did not match the expected response
    Unexpected,

    /// A line exceeded the capacity of the line buffer
    Overflow,

    /// The session timeout elapsed before the expected response was received
    Timeout,
}

/// Accumulates received bytes into lines
///
/// Several lines may be stored in sequence, e.g. the data line and the trailing `OK` of a query response.
/// Clearing just resets the cursors, so the content of the last lines stays readable until it gets
/// overwritten by the next expectation.
pub struct LineBuffer<const N: usize> {
    bytes: [u8; N],

    /// Write cursor
    head: usize,

    /// Start of the current (unterminated) line
    start: usize,

    /// Lines completed since last clear
    count: usize,

    /// End of the first line completed since last clear
    first_end: usize,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0x0; N],
            head: 0,
            start: 0,
            count: 0,
            first_end: 0,
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.start = 0;
        self.count = 0;
        self.first_end = 0;
    }

    /// Feeds a single byte. Returns the range of the line if the byte completed one.
    ///
    /// `\r` and NUL bytes are discarded, empty lines are skipped.
    pub fn push(&mut self, byte: u8) -> Result<Option<Range<usize>>, Error> {
        match byte {
            b'\n' => {
                if self.head == self.start {
                    return Ok(None);
                }

                let line = self.start..self.head;
                self.start = self.head;
                self.count += 1;
                if self.count == 1 {
                    self.first_end = line.end;
                }

                Ok(Some(line))
            }
            b'\r' | 0x0 => Ok(None),
            _ => {
                if self.head >= N {
                    return Err(Error::Overflow);
                }

                self.bytes[self.head] = byte;
                self.head += 1;
                Ok(None)
            }
        }
    }

    /// Number of lines completed since last clear
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn get(&self, line: Range<usize>) -> &[u8] {
        &self.bytes[line]
    }

    /// Range of the first line completed since the last clear
    pub fn first_line(&self) -> Range<usize> {
        0..self.first_end
    }

    /// Returns the given line as text. Invalid UTF-8 is treated as line noise.
    pub fn text(&self, line: Range<usize>) -> Result<&str, Error> {
        core::str::from_utf8(self.get(line)).map_err(|_| Error::Unexpected)
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking AT command engine
///
/// TIMER_HZ: Tick rate of the timer used for timeout measurement
///
/// RX_SIZE: Capacity of the line buffer in bytes. Limits the total length of the lines belonging to one
/// response.
pub struct AtEngine<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> {
    /// Serial transport
    pub(crate) transport: T,

    /// Timer used for timeout measurement
    pub(crate) timer: C,

    /// True while the transport is opened
    open: bool,

    /// True once the command of the current session has been transmitted
    sent: bool,

    /// Start of the current session
    start: TimerInstantU32<TIMER_HZ>,

    /// Timeout of the current session
    timeout: TimerDurationU32<TIMER_HZ>,

    /// Timeout every session starts with
    default_timeout: TimerDurationU32<TIMER_HZ>,

    /// Received lines
    line: LineBuffer<RX_SIZE>,

    /// Bytes already received by `expect_raw()`
    raw_offset: usize,
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> AtEngine<T, C, TIMER_HZ, RX_SIZE> {
    pub fn new(transport: T, mut timer: C) -> Self {
        let start = timer.now();

        Self {
            transport,
            timer,
            open: false,
            sent: false,
            start,
            timeout: TimerDurationU32::millis(DEFAULT_TIMEOUT_MS),
            default_timeout: TimerDurationU32::millis(DEFAULT_TIMEOUT_MS),
            line: LineBuffer::new(),
            raw_offset: 0,
        }
    }

    /// Opens the transport and starts a new session
    pub fn open(&mut self, baud_rate: u32) {
        self.transport.open(baud_rate);
        self.open = true;
        self.start_command();
    }

    /// Closes the transport. Calling it on a closed engine has no effect.
    pub fn close(&mut self) {
        if self.open {
            self.transport.close();
            self.open = false;
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Starts a new session: resets the parser and the timeout, and allows the next command to be sent
    pub fn start_command(&mut self) {
        self.sent = false;
        self.start = self.timer.now();
        self.timeout = self.default_timeout;
        self.clear_expectation();
    }

    /// Overrides the timeout of the current session. Measured from the session start.
    pub fn set_timeout_ms(&mut self, timeout: u32) {
        self.timeout = TimerDurationU32::millis(timeout);
    }

    /// Sets the timeout every new session starts with
    pub fn set_default_timeout_ms(&mut self, timeout: u32) {
        self.default_timeout = TimerDurationU32::millis(timeout);
    }

    /// Returns true once the session timeout has elapsed
    ///
    /// Tolerates a single wraparound of the timer counter.
    pub fn timed_out(&mut self) -> bool {
        let elapsed = self.timer.now().ticks().wrapping_sub(self.start.ticks());
        elapsed >= self.timeout.ticks()
    }

    /// Sends `AT<body>\r\n`. No-op if a command has already been sent in this session.
    pub fn command(&mut self, body: &str) {
        self.command_with(body);
    }

    /// Sends the given encoded command. No-op if a command has already been sent in this session.
    pub fn command_with<Cmd: Command + ?Sized>(&mut self, command: &Cmd) {
        if self.sent {
            return;
        }

        if self.write_command(command).is_err() {
            log::warn!("Transmitting command failed");
        }

        self.sent = true;
    }

    fn write_command<Cmd: Command + ?Sized>(&mut self, command: &Cmd) -> core::fmt::Result {
        let mut writer = TransportWriter {
            transport: &mut self.transport,
        };

        writer.write_str(COMMAND_PREFIX)?;
        command.encode(&mut writer)?;
        writer.write_str(COMMAND_SUFFIX)
    }

    /// Sends raw bytes without prefix and suffix. No-op if something has already been sent in this session.
    pub fn command_raw(&mut self, content: &[u8]) {
        if self.sent {
            return;
        }

        if self.transport.write_all(content).is_err() {
            log::warn!("Transmitting raw data failed");
        }

        self.sent = true;
    }

    /// Expects a single `OK` line
    pub fn expect_ok(&mut self) -> nb::Result<(), Error> {
        self.expect_match("OK")
    }

    /// Expects the next line to be equal to `expected`
    pub fn expect_match(&mut self, expected: &str) -> nb::Result<(), Error> {
        let line = self.expect_next(true)?;

        if self.line.get(line) != expected.as_bytes() {
            return Err(nb::Error::Other(Error::Unexpected));
        }

        Ok(())
    }

    /// Expects the next line to be decodable as `R`
    pub fn expect_match_with<R: FromLine>(&mut self) -> nb::Result<R, Error> {
        let line = self.expect_next(true)?;
        let text = self.line.text(line)?;

        R::from_line(text).map_err(|_| nb::Error::Other(Error::Unexpected))
    }

    /// Expects a single data line followed by `OK`. Returns the data line.
    ///
    /// May be called again after the data line has been received, in which case just the `OK` is awaited.
    pub fn expect_response(&mut self) -> nb::Result<&str, Error> {
        if self.line.count() == 0 {
            self.expect_next(false)?;
        }

        let data = self.line.first_line();
        self.expect_ok()?;

        Ok(self.line.text(data)?)
    }

    /// Expects a single data line decodable as `R`, followed by `OK`
    pub fn expect_response_with<R: FromLine>(&mut self) -> nb::Result<R, Error> {
        let text = self.expect_response()?;
        R::from_line(text).map_err(|_| nb::Error::Other(Error::Unexpected))
    }

    /// Expects exactly `buffer.len()` raw bytes, which may arrive over several calls
    pub fn expect_raw(&mut self, buffer: &mut [u8]) -> nb::Result<(), Error> {
        while self.raw_offset < buffer.len() {
            match self.pop() {
                Some(byte) => {
                    buffer[self.raw_offset] = byte;
                    self.raw_offset += 1;
                }
                None => break,
            }
        }

        if self.raw_offset == buffer.len() {
            self.raw_offset = 0;
            return Ok(());
        }

        if self.timed_out() {
            log::warn!("Raw read timed out after {} of {} bytes", self.raw_offset, buffer.len());
            self.raw_offset = 0;
            return Err(nb::Error::Other(Error::Timeout));
        }

        Err(nb::Error::WouldBlock)
    }

    /// Resets the line parser for a fresh expectation
    fn clear_expectation(&mut self) {
        self.line.clear();
        self.raw_offset = 0;
    }

    /// Returns the next line, checking for timeouts and explicit errors
    ///
    /// The parser gets reset if this is the last line of the response or the expectation failed.
    fn expect_next(&mut self, last_line: bool) -> nb::Result<Range<usize>, Error> {
        let result = match self.parse_line() {
            Err(nb::Error::WouldBlock) if !self.timed_out() => return Err(nb::Error::WouldBlock),
            Err(nb::Error::WouldBlock) => Err(nb::Error::Other(Error::Timeout)),
            Ok(line) if self.line.get(line.clone()) == b"ERROR" => Err(nb::Error::Other(Error::Device)),
            result => result,
        };

        if last_line || result.is_err() {
            self.clear_expectation();
        }

        result
    }

    /// Drains the available bytes until a line is completed
    fn parse_line(&mut self) -> nb::Result<Range<usize>, Error> {
        while let Some(byte) = self.pop() {
            if let Some(line) = self.line.push(byte)? {
                if let Ok(text) = self.line.text(line.clone()) {
                    log::trace!("RX: {}", text);
                }

                return Ok(line);
            }
        }

        Err(nb::Error::WouldBlock)
    }

    /// Returns a single received byte, if available
    fn pop(&mut self) -> Option<u8> {
        match self.transport.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(_) => {
                log::warn!("Checking transport for received data failed");
                return None;
            }
        }

        let mut byte = [0x0; 1];
        match self.transport.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(_) => {
                log::warn!("Reading from transport failed");
                None
            }
        }
    }
}

/// Formats directly into the transport
struct TransportWriter<'a, T: Transport> {
    transport: &'a mut T,
}

impl<T: Transport> core::fmt::Write for TransportWriter<'_, T> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.transport.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}
