//! Builds a [`ThermistorTable`] from a [`ThermistorConfig`].
//!
//! Each tabulated temperature is run through the beta equation
//!
//! ```text
//! 1/T = 1/T0 + (1/B) * ln(R/R0)   =>   R = R0 * exp(B * (1/T - 1/T0))
//! ```
//!
//! with temperatures in kelvin, and the resulting resistance through the
//! divider equation for the configured [`Divider`]. The readings are rounded
//! to whole counts and must come out strictly monotonic, otherwise the
//! table is rejected.

use crate::config::ThermistorConfig;
use crate::error::ConfigurationError;
use crate::table::{Direction, Divider, LookupTable};

const KELVIN_OFFSET: f64 = 273.15;

/// One tabulated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub temperature: i16,
    pub adc: u16,
    /// Thermistor resistance at `temperature`, rounded to whole ohms
    pub resistance: u32,
}

/// The validated output of [`build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermistorTable {
    entries: Vec<TableEntry>,
    thresholds: Vec<u16>,
    t_start: i16,
    t_step: i16,
    direction: Direction,
    counts: u16,
}

impl ThermistorTable {
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn counts(&self) -> u16 {
        self.counts
    }

    pub fn t_start(&self) -> i16 {
        self.t_start
    }

    pub fn t_step(&self) -> i16 {
        self.t_step
    }

    /// Borrows the table in the form the lookup engine searches.
    pub fn as_lookup(&self) -> LookupTable<'_> {
        LookupTable::new(&self.thresholds, self.t_start, self.t_step, self.direction)
    }
}

/// Resistance of the thermistor at `temp_c`, from the beta equation.
pub fn resistance_at(r_nominal: f64, t_nominal_c: f64, beta: f64, temp_c: f64) -> f64 {
    let exponent = beta * (1.0 / (temp_c + KELVIN_OFFSET) - 1.0 / (t_nominal_c + KELVIN_OFFSET));
    r_nominal * exponent.exp()
}

/// Reading the ADC would produce with the thermistor at `r_therm`.
pub fn resistance_to_counts(divider: Divider, r_therm: f64, r_pulldown: f64, counts: f64) -> f64 {
    match divider {
        Divider::ThermistorHigh => counts * r_pulldown / (r_therm + r_pulldown),
        Divider::ThermistorLow => counts * r_therm / (r_therm + r_pulldown),
    }
}

/// Computes and checks the table for `config`.
///
/// # Examples
///
/// ```
/// use thermistor_lookup::{build, Divider, ThermistorConfig};
///
/// let config = ThermistorConfig {
///     board: "demo".into(),
///     thermistor: "10k NTC".into(),
///     t_start: 0,
///     t_stop: 100,
///     t_step: 20,
///     t_nominal: 25,
///     r_nominal: 10000,
///     r_pulldown: 10000,
///     beta: 3950,
///     counts: 1023,
///     divider: Divider::ThermistorHigh,
/// };
///
/// let table = build(&config).unwrap();
/// let adcs: Vec<u16> = table.entries().iter().map(|entry| entry.adc).collect();
/// assert_eq!(adcs, [235, 454, 669, 819, 908]);
/// ```
pub fn build(config: &ThermistorConfig) -> Result<ThermistorTable, ConfigurationError> {
    config.validate()?;

    let direction = config.divider.direction();
    let mut entries: Vec<TableEntry> = Vec::new();

    for temperature in config.temperatures() {
        let resistance = resistance_at(
            config.r_nominal.into(),
            config.t_nominal.into(),
            config.beta.into(),
            temperature.into(),
        );
        let adc = resistance_to_counts(
            config.divider,
            resistance,
            config.r_pulldown.into(),
            config.counts.into(),
        )
        .round();

        if !adc.is_finite() || adc < 0.0 || adc > f64::from(config.counts) {
            return Err(ConfigurationError::AdcOutOfRange {
                temperature,
                counts: config.counts,
            });
        }

        let entry = TableEntry {
            temperature,
            adc: adc as u16,
            resistance: resistance.round().min(f64::from(u32::MAX)) as u32,
        };
        log::debug!(
            "[{:2}] C={:4} R={:8} adc={:5}",
            entries.len(),
            entry.temperature,
            entry.resistance,
            entry.adc
        );

        if let Some(previous) = entries.last() {
            if !direction.precedes(previous.adc, entry.adc) {
                return Err(ConfigurationError::NotMonotonic {
                    index: entries.len(),
                    temperature,
                    previous: previous.adc,
                    adc: entry.adc,
                });
            }
        }

        entries.push(entry);
    }

    if entries.len() < 2 {
        return Err(ConfigurationError::TooFewEntries {
            count: entries.len(),
        });
    }

    log::info!(
        "Built {} entry table for {} ({} to {} C, ADC {:?} {} to {})",
        entries.len(),
        config.thermistor,
        config.t_start,
        entries[entries.len() - 1].temperature,
        direction,
        entries[0].adc,
        entries[entries.len() - 1].adc
    );

    Ok(ThermistorTable {
        thresholds: entries.iter().map(|entry| entry.adc).collect(),
        entries,
        t_start: config.t_start,
        t_step: config.t_step,
        direction,
        counts: config.counts,
    })
}
