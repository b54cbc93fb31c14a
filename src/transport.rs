//! # Serial transport
//!
//! The modem is attached by a plain byte stream, usually a UART. The driver only needs to open/close the
//! stream, write bytes and pop single bytes while some are available, so the contract is expressed with the
//! [embedded_io] traits plus two lifecycle methods.
use embedded_io::{Read, ReadReady, Write};

/// Byte stream used for communicating with the modem
///
/// All operations are expected to be non-blocking:
/// * [Write::write_all] queues the bytes for transmission
/// * [ReadReady::read_ready] returns true if at least one received byte is buffered
/// * [Read::read] is only called after `read_ready()` returned true, with a one byte buffer
pub trait Transport: Read + ReadReady + Write {
    /// Enables the peripheral with the given baud rate
    fn open(&mut self, baud_rate: u32);

    /// Disables the peripheral. Needs to be idempotent.
    fn close(&mut self);
}
