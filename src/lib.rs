//! Thermistor temperatures from ADC readings without runtime floating point.
//!
//! At build time, [`build`] runs a thermistor's beta equation and the
//! voltage divider it sits in over a range of temperatures. The result is
//! a strictly monotonic table of ADC thresholds, and [`codegen`] renders it
//! as C or Rust source. At run time, [`LookupTable::lookup`] turns a
//! reading back into a temperature with a binary search and integer linear
//! interpolation. Readings past either end of the table are extrapolated
//! along the end segment rather than clamped.
//!
//! Everything needed at run time works in `no_std` and never allocates.
//! The builder, configuration loading and code generation need the `std`
//! feature, which is on by default.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod error;
mod interpolate;
mod table;

#[cfg(feature = "std")]
mod builder;
#[cfg(feature = "std")]
pub mod codegen;
#[cfg(feature = "std")]
mod config;

#[cfg(feature = "std")]
pub use builder::{build, resistance_at, resistance_to_counts, TableEntry, ThermistorTable};
#[cfg(feature = "std")]
pub use config::ThermistorConfig;
#[cfg(feature = "std")]
pub use error::Error;
pub use error::ConfigurationError;
pub use table::{Direction, Divider, LookupTable};

use embedded_hal::adc::{Channel, OneShot};

/// Reads a thermistor through an ADC channel and converts the reading with
/// a [`LookupTable`].
#[derive(Debug)]
pub struct ThermistorReader<Pin> {
    pin: Pin,
    table: LookupTable<'static>,
}

impl<Pin> ThermistorReader<Pin> {
    /// Returns a reader for the thermistor on `pin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermistor_lookup::{Direction, LookupTable, ThermistorReader};
    /// # use embedded_hal_mock::adc::MockChan0;
    /// #
    /// # let pin = MockChan0 {};
    ///
    /// static TABLE: LookupTable<'static> =
    ///     LookupTable::new(&[235, 454, 669, 819, 908], 0, 20, Direction::Rising);
    ///
    /// let reader = ThermistorReader::new(pin, TABLE);
    pub fn new<ADC>(pin: Pin, table: LookupTable<'static>) -> Self
    where
        Pin: Channel<ADC>,
    {
        Self { pin, table }
    }

    /// Destroys the reader and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Returns the table readings are converted with.
    pub fn table(&self) -> &LookupTable<'static> {
        &self.table
    }

    /// Takes one ADC reading and returns the temperature in the table's
    /// units. Readings outside the table are extrapolated, see
    /// [`LookupTable::lookup`].
    ///
    /// # Examples
    ///
    /// ```
    /// use thermistor_lookup::{Direction, LookupTable, ThermistorReader};
    /// # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
    /// #
    /// # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 561)];
    /// # let mut adc = Mock::new(&expectations);
    /// # let pin = MockChan0 {};
    ///
    /// static TABLE: LookupTable<'static> =
    ///     LookupTable::new(&[235, 454, 669, 819, 908], 0, 20, Direction::Rising);
    ///
    /// let mut reader = ThermistorReader::new(pin, TABLE);
    ///
    /// // A reading of 561 lies halfway between the 20 C and 40 C thresholds
    /// assert_eq!(reader.read(&mut adc), Ok(30));
    /// ```
    pub fn read<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<i16, nb::Error<<Adc as OneShot<ADC, Word, Pin>>::Error>>
    where
        Word: Into<u16>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        let adc_value = adc.read(&mut self.pin)?;

        Ok(self.table.lookup(adc_value.into()))
    }

    /// Returns the lowest tabulated temperature.
    pub fn min_temperature(&self) -> i16 {
        self.table.min_temperature()
    }

    /// Returns the highest tabulated temperature.
    pub fn max_temperature(&self) -> i16 {
        self.table.max_temperature()
    }
}
