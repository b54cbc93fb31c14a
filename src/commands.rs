//! # Outgoing AT commands
//!
//! Every command knows how to encode its body. The `AT` prefix and the line suffix are added by
//! [AtEngine](crate::engine::AtEngine).
use core::fmt::{Result, Write};

/// Encodes the body of an AT command, e.g. `+CEREG?` for `AT+CEREG?\r\n`
pub trait Command {
    fn encode<W: Write>(&self, out: &mut W) -> Result;
}

/// Plain command body, e.g. `"+QHTTPREAD"`
impl Command for str {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str(self)
    }
}

/// ATE0 / ATE1
#[derive(Clone, Debug, PartialEq)]
pub struct SetEcho(pub bool);

impl Command for SetEcho {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str(if self.0 { "E1" } else { "E0" })
    }
}

/// Bare `AT`, used for synchronizing the baud rate and checking liveness
#[derive(Clone, Debug, PartialEq)]
pub struct Attention;

impl Command for Attention {
    fn encode<W: Write>(&self, _out: &mut W) -> Result {
        Ok(())
    }
}

/// AT+QPSMS=1,,,"<T3412>","<T3324>"
///
/// Enables power saving mode with the requested timers
#[derive(Clone, Debug, PartialEq)]
pub struct SetPowerSavingMode<'a> {
    /// Requested periodic TAU (T3412), encoded as GPRS timer 3 bit string
    pub periodic_tau: &'a str,

    /// Requested active time (T3324), encoded as GPRS timer 2 bit string
    pub active_time: &'a str,
}

impl Command for SetPowerSavingMode<'_> {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        write!(out, "+QPSMS=1,,,\"{}\",\"{}\"", self.periodic_tau, self.active_time)
    }
}

/// AT+QCFG="psm/enter",1
///
/// Enter PSM as soon as the RRC connection has been released
#[derive(Clone, Debug, PartialEq)]
pub struct EnterPsmImmediately;

impl Command for EnterPsmImmediately {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str("+QCFG=\"psm/enter\",1")
    }
}

/// AT+QCFG="nwscanseq",<sequence>
#[derive(Clone, Debug, PartialEq)]
pub struct SetScanSequence<'a>(pub &'a str);

impl Command for SetScanSequence<'_> {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        write!(out, "+QCFG=\"nwscanseq\",{}", self.0)
    }
}

/// AT+QCFG="iotopmode",<mode>,<effect>
#[derive(Clone, Debug, PartialEq)]
pub struct SetIotOpMode<'a>(pub &'a str);

impl Command for SetIotOpMode<'_> {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        write!(out, "+QCFG=\"iotopmode\",{}", self.0)
    }
}

/// AT+COPS=0
///
/// Automatic operator selection
#[derive(Clone, Debug, PartialEq)]
pub struct AutomaticOperator;

impl Command for AutomaticOperator {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str("+COPS=0")
    }
}

/// AT+CEREG?
#[derive(Clone, Debug, PartialEq)]
pub struct GetRegistrationStatus;

impl Command for GetRegistrationStatus {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str("+CEREG?")
    }
}

/// AT+QCSQ
#[derive(Clone, Debug, PartialEq)]
pub struct GetSignalQuality;

impl Command for GetSignalQuality {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str("+QCSQ")
    }
}

/// AT+QHTTPURL=<length>
///
/// The modem answers with `CONNECT` and expects exactly `length` raw URL bytes afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct SetUrl {
    pub length: usize,
}

impl Command for SetUrl {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        write!(out, "+QHTTPURL={}", self.length)
    }
}

/// AT+QHTTPGET=<timeout>
#[derive(Clone, Debug, PartialEq)]
pub struct HttpGet {
    /// Response timeout in seconds
    pub timeout_s: u32,
}

impl Command for HttpGet {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        write!(out, "+QHTTPGET={}", self.timeout_s)
    }
}

/// AT+QHTTPREAD
///
/// The modem answers with `CONNECT` followed by the raw response body.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRead;

impl Command for HttpRead {
    fn encode<W: Write>(&self, out: &mut W) -> Result {
        out.write_str("+QHTTPREAD")
    }
}
