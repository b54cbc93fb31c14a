//! # Modem responses
//!
//! Decoders for informational lines sent by the modem. A decoding failure gets reported as
//! [Error::Unexpected](crate::engine::Error::Unexpected) by the engine.
use core::num::ParseIntError;
use heapless::String;

/// Error while decoding a response line
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub message: &'static str,
}

impl From<&'static str> for ParseError {
    fn from(message: &'static str) -> Self {
        ParseError { message }
    }
}

impl From<ParseIntError> for ParseError {
    fn from(_: ParseIntError) -> Self {
        ParseError {
            message: "Failed to parse integer",
        }
    }
}

/// Decodes a single response line
pub trait FromLine: Sized {
    fn from_line(line: &str) -> Result<Self, ParseError>;
}

/// EPS network registration state, `<stat>` field of `+CEREG`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationStatus {
    /// Not registered and not searching for an operator
    NotSearching,
    RegisteredHome,
    /// Not registered, but searching for an operator
    Searching,
    Denied,
    Unknown,
    RegisteredRoaming,
}

impl RegistrationStatus {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }
}

impl From<u32> for RegistrationStatus {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::NotSearching,
            1 => Self::RegisteredHome,
            2 => Self::Searching,
            3 => Self::Denied,
            5 => Self::RegisteredRoaming,
            _ => Self::Unknown,
        }
    }
}

/// Response of `AT+CEREG?`, e.g. `+CEREG: 0,1`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Registration {
    /// URC presentation mode (`<n>`)
    pub mode: u32,

    pub status: RegistrationStatus,
}

impl FromLine for Registration {
    fn from_line(line: &str) -> Result<Self, ParseError> {
        let line = line.strip_prefix("+CEREG: ").ok_or("Missing '+CEREG: '")?;

        // Depending on <n>, location fields may follow <stat>. They are not of interest here.
        let mut fields = line.splitn(3, ',');
        let mode = fields.next().ok_or("Missing <n>")?.trim().parse()?;
        let status: u32 = fields.next().ok_or("Missing ','")?.trim().parse()?;

        Ok(Registration {
            mode,
            status: status.into(),
        })
    }
}

/// Response of `AT+QCSQ`, e.g. `+QCSQ: "eMTC",-73,-100,152,-11`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality {
    /// Serving system, e.g. `eMTC`, `NBIoT` or `NOSERVICE`
    pub mode: String<15>,

    /// Received signal strength in dBm. Zero if not reported (e.g. `NOSERVICE`).
    pub rssi: i32,
}

impl FromLine for SignalQuality {
    fn from_line(line: &str) -> Result<Self, ParseError> {
        let line = line.strip_prefix("+QCSQ: \"").ok_or("Missing '+QCSQ: \"'")?;
        let (mode, rest) = line.split_once('"').ok_or("Missing closing '\"'")?;

        if mode.is_empty() {
            return Err("Empty system mode".into());
        }
        let mode = String::try_from(mode).map_err(|_| "System mode too long")?;

        let rssi = rest
            .strip_prefix(',')
            .and_then(|rest| rest.split(',').next())
            .and_then(|rssi| rssi.trim().parse().ok())
            .unwrap_or(0);

        Ok(SignalQuality { mode, rssi })
    }
}

/// Final result of `AT+QHTTPGET`, e.g. `+QHTTPGET: 0,200,1024`
///
/// Only the error code is mandatory. The modem omits the remaining fields if the request failed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpGetResult {
    /// Zero on success, otherwise a modem specific error code
    pub error: u32,

    /// HTTP status code
    pub status: u32,

    /// Length of the response body in bytes
    pub length: u32,
}

impl FromLine for HttpGetResult {
    fn from_line(line: &str) -> Result<Self, ParseError> {
        let line = line.strip_prefix("+QHTTPGET: ").ok_or("Missing '+QHTTPGET: '")?;

        let mut fields = line.splitn(3, ',').map(|field| field.trim().parse::<u32>());
        let error = fields.next().ok_or("Missing <err>")??;

        let mut result = HttpGetResult {
            error,
            ..Default::default()
        };

        // Fields are taken in order, until the first one missing or malformed
        if let Some(Ok(status)) = fields.next() {
            result.status = status;

            if let Some(Ok(length)) = fields.next() {
                result.length = length;
            }
        }

        Ok(result)
    }
}

/// Final result of `AT+QHTTPREAD`, e.g. `+QHTTPREAD: 0`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpReadResult {
    /// Zero if the body was read completely, otherwise a modem specific error code
    pub error: u32,
}

impl FromLine for HttpReadResult {
    fn from_line(line: &str) -> Result<Self, ParseError> {
        let line = line.strip_prefix("+QHTTPREAD: ").ok_or("Missing '+QHTTPREAD: '")?;
        let error = line.trim().parse()?;

        Ok(HttpReadResult { error })
    }
}
