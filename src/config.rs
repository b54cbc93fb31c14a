//! # Modem configuration
//!
//! Timings and network settings used by [Modem](crate::modem::Modem). The defaults fit a BG95 operated in
//! LTE-M/NB-IoT with power saving mode.
//!
//! ````
//! # use bg95_at::config::Config;
//! let config = Config::new().baud_rate(9_600).http_timeout_s(30);
//! assert_eq!(9_600, config.baud_rate);
//! ````

/// Modem configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Baud rate of the serial transport
    pub baud_rate: u32,

    /// Time the reset line is held high on a cold reset (ms)
    pub reset_hold_ms: u32,

    /// Time the reset line is held high for waking the modem up (ms)
    pub wakeup_pulse_ms: u32,

    /// Maximum time to wait for `APP RDY` after power-up (ms)
    pub ready_timeout_ms: u32,

    /// Timeout of the operator selection command (ms)
    pub operator_timeout_ms: u32,

    /// Delay between network registration queries (ms)
    pub registration_poll_ms: u32,

    /// HTTP response timeout passed to the modem (s), 1 to 65535
    pub http_timeout_s: u32,

    /// Timeout for reading the HTTP response body (ms)
    pub http_read_timeout_ms: u32,

    /// Requested periodic TAU (T3412) as GPRS timer 3 bit string
    pub psm_periodic_tau: &'static str,

    /// Requested active time (T3324) as GPRS timer 2 bit string
    pub psm_active_time: &'static str,

    /// RAT scan sequence, e.g. `0302` for NB-IoT before eMTC
    pub scan_sequence: &'static str,

    /// IoT operating mode and when it takes effect, e.g. `2,1` for eMTC and NB-IoT, immediately
    pub iot_op_mode: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            reset_hold_ms: 2_500,
            wakeup_pulse_ms: 100,
            ready_timeout_ms: 12_000,
            operator_timeout_ms: 3_000,
            registration_poll_ms: 3_000,
            http_timeout_s: 20,
            http_read_timeout_ms: 5_000,
            // 24 hours
            psm_periodic_tau: "00111000",
            // 2 seconds
            psm_active_time: "00000001",
            scan_sequence: "0302",
            iot_op_mode: "2,1",
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn reset_hold_ms(mut self, duration: u32) -> Self {
        self.reset_hold_ms = duration;
        self
    }

    pub fn wakeup_pulse_ms(mut self, duration: u32) -> Self {
        self.wakeup_pulse_ms = duration;
        self
    }

    pub fn ready_timeout_ms(mut self, timeout: u32) -> Self {
        self.ready_timeout_ms = timeout;
        self
    }

    pub fn operator_timeout_ms(mut self, timeout: u32) -> Self {
        self.operator_timeout_ms = timeout;
        self
    }

    pub fn registration_poll_ms(mut self, delay: u32) -> Self {
        self.registration_poll_ms = delay;
        self
    }

    /// Sets the HTTP response timeout, clamped to the range accepted by the modem
    pub fn http_timeout_s(mut self, timeout: u32) -> Self {
        self.http_timeout_s = timeout.clamp(1, 65_535);
        self
    }

    pub fn http_read_timeout_ms(mut self, timeout: u32) -> Self {
        self.http_read_timeout_ms = timeout;
        self
    }

    /// Sets the requested PSM timers, s. [Config::psm_periodic_tau] and [Config::psm_active_time]
    pub fn psm_timers(mut self, periodic_tau: &'static str, active_time: &'static str) -> Self {
        self.psm_periodic_tau = periodic_tau;
        self.psm_active_time = active_time;
        self
    }

    pub fn scan_sequence(mut self, sequence: &'static str) -> Self {
        self.scan_sequence = sequence;
        self
    }

    pub fn iot_op_mode(mut self, mode: &'static str) -> Self {
        self.iot_op_mode = mode;
        self
    }
}
