//! # BG95 AT driver
//!
//! Non-blocking driver for Quectel BG95 cellular modems. The crate consists of two layers:
//!
//! * [engine::AtEngine]: turns the raw byte stream of a serial [transport::Transport] into lines and offers
//!   non-blocking `expect_*` primitives with timeout tracking. Pending results are reported as
//!   [nb::Error::WouldBlock].
//! * [modem::Modem]: a step based state machine on top of the engine. It sequences modem power-up, network
//!   registration, signal quality queries and HTTP GET requests.
//!
//! Nothing in this crate blocks. The caller has to poll [modem::Modem::update] from its main loop.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod commands;
pub mod config;
pub mod engine;
pub mod modem;
pub mod pins;
pub mod responses;
pub mod transport;

#[cfg(feature = "examples")]
pub mod example;

#[cfg(test)]
mod tests;

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("'log' and 'defmt' features are mutually exclusive");
#[cfg(not(any(feature = "log", feature = "defmt")))]
compile_error!("please enable a logging feature, e.g. 'log' or 'defmt'");
#[cfg(feature = "defmt")]
pub(crate) use defmt as log;
#[cfg(feature = "log")]
pub(crate) use log;
