//! Mocks for doc examples
use crate::pins::{ModemPins, Pin, Pull};
use crate::transport::Transport;
use core::convert::Infallible;
use embedded_io::{ErrorType, Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Transport mock, silently accepting all writes and never receiving anything
#[derive(Default)]
pub struct ExampleTransport {
    /// Bytes written since creation
    pub written: usize,
}

impl ErrorType for ExampleTransport {
    type Error = Infallible;
}

impl Read for ExampleTransport {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

impl ReadReady for ExampleTransport {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

impl Write for ExampleTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Transport for ExampleTransport {
    fn open(&mut self, _baud_rate: u32) {}

    fn close(&mut self) {}
}

/// Pin mock, the status line is always low
#[derive(Default)]
pub struct ExamplePins {}

impl ModemPins for ExamplePins {
    fn enable_output(&mut self, _pin: Pin, _high: bool) {}

    fn enable_input(&mut self, _pin: Pin, _pull: Pull) {}

    fn read(&mut self, _pin: Pin) -> bool {
        false
    }

    fn set(&mut self, _pin: Pin) {}

    fn reset(&mut self, _pin: Pin) {}

    fn deinit(&mut self, _pin: Pin) {}
}

/// Timer mock, time stands still
#[derive(Default)]
pub struct ExampleTimer {}

impl Timer<1_000> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<1000> {
        TimerInstantU32::from_ticks(0)
    }

    fn start(&mut self, _duration: TimerDurationU32<1000>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        nb::Result::Err(nb::Error::WouldBlock)
    }
}
