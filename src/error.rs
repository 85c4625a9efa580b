//! Errors raised while turning a thermistor description into a table.
//!
//! Lookup itself cannot fail: samples outside the tabulated range are
//! extrapolated, so every error here belongs to build time.

use thiserror_no_std::Error;

/// The thermistor parameters cannot produce a usable table.
///
/// Kept `Copy` and heap free so it can be reported from `no_std` code too.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// `Tstart` is not below `Tstop`
    #[error("temperature range is empty: Tstart {start} must be below Tstop {stop}")]
    EmptyRange { start: i16, stop: i16 },

    #[error("temperature step must be positive, got {0}")]
    NonPositiveStep(i16),

    /// A resistance, beta or ADC full scale of zero
    #[error("{name} must be greater than zero")]
    ZeroParameter { name: &'static str },

    /// The range and step leave fewer than two points to interpolate between
    #[error("table needs at least 2 entries, the range and step produce {count}")]
    TooFewEntries { count: usize },

    /// The divider equation produced a reading outside `[0, counts]`
    #[error("ADC value at {temperature} C falls outside [0, {counts}]")]
    AdcOutOfRange { temperature: i16, counts: u16 },

    /// Two neighbouring thresholds are equal or run against the divider's direction
    #[error(
        "ADC thresholds are not strictly monotonic at entry {index} ({temperature} C): {previous} then {adc}"
    )]
    NotMonotonic {
        index: usize,
        temperature: i16,
        previous: u16,
        adc: u16,
    },
}

/// Any failure of a generation run.
#[cfg(feature = "std")]
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}
