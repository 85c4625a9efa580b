use crate::interpolate::interpolate;

/// Whether ADC counts rise or fall as the temperature rises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

impl Direction {
    /// Returns `true` if `a` comes strictly before `b` in this direction.
    pub const fn precedes(self, a: u16, b: u16) -> bool {
        match self {
            Direction::Rising => a < b,
            Direction::Falling => a > b,
        }
    }
}

/// Which leg of the voltage divider the thermistor sits on.
///
/// The ADC is assumed to measure the tap between the thermistor and the
/// fixed resistor, with the top of the divider at the ADC reference and the
/// bottom at ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Divider {
    /// Thermistor between the reference and the tap, fixed resistor to ground.
    /// Readings rise with temperature.
    #[default]
    ThermistorHigh,
    /// Fixed resistor between the reference and the tap, thermistor to ground.
    /// Readings fall with temperature.
    ThermistorLow,
}

impl Divider {
    pub fn direction(self) -> Direction {
        match self {
            Divider::ThermistorHigh => Direction::Rising,
            Divider::ThermistorLow => Direction::Falling,
        }
    }
}

/// A table of ADC thresholds, one per temperature step, and the parameters
/// needed to turn a position in it back into a temperature.
///
/// Entry `i` is the reading expected at `t_start + i * t_step`. The
/// thresholds must be strictly monotonic in `direction`; this is checked
/// when the table is built, not when it is searched.
///
/// # Examples
///
/// ```
/// use thermistor_lookup::{Direction, LookupTable};
///
/// static TABLE: LookupTable<'static> =
///     LookupTable::new(&[235, 454, 669, 819, 908], 0, 20, Direction::Rising);
///
/// assert_eq!(TABLE.lookup(454), 20);
/// assert_eq!(TABLE.lookup(561), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTable<'a> {
    thresholds: &'a [u16],
    t_start: i16,
    t_step: i16,
    direction: Direction,
}

impl<'a> LookupTable<'a> {
    /// Wraps `thresholds`, which must hold at least two entries, each
    /// strictly after the previous one in `direction`, or this function
    /// will panic when running in debug mode.
    pub const fn new(
        thresholds: &'a [u16],
        t_start: i16,
        t_step: i16,
        direction: Direction,
    ) -> Self {
        debug_assert!(
            thresholds.len() >= 2,
            "A lookup table needs at least two thresholds"
        );

        if cfg!(debug_assertions) {
            let mut index = 1;
            while index < thresholds.len() {
                assert!(
                    direction.precedes(thresholds[index - 1], thresholds[index]),
                    "The thresholds must be strictly monotonic in the table's direction"
                );
                index += 1;
            }
        }

        Self {
            thresholds,
            t_start,
            t_step,
            direction,
        }
    }

    /// Returns the temperature for the ADC reading `adc`.
    ///
    /// Readings between two thresholds are interpolated linearly. Readings
    /// beyond either end follow the slope of the nearest end segment rather
    /// than being clamped, so the error grows with the distance from the
    /// table. Fractions are rounded half away from zero and the result
    /// saturates at the bounds of `i16`.
    pub fn lookup(&self, adc: u16) -> i16 {
        let at_or_before = match self.direction {
            Direction::Rising => self.thresholds.partition_point(|&threshold| threshold <= adc),
            Direction::Falling => self.thresholds.partition_point(|&threshold| threshold >= adc),
        };
        let index = at_or_before
            .saturating_sub(1)
            .min(self.thresholds.len() - 2);

        let temperature = interpolate(
            self.thresholds[index].into(),
            self.thresholds[index + 1].into(),
            self.temperature_at(index).into(),
            self.temperature_at(index + 1).into(),
            adc.into(),
        );

        temperature.clamp(i16::MIN.into(), i16::MAX.into()) as i16
    }

    /// Same as [`lookup`](LookupTable::lookup), under the name firmware calls it by.
    pub fn adc_to_temp(&self, adc: u16) -> i16 {
        self.lookup(adc)
    }

    /// Returns the tabulated temperature of entry `index`.
    pub fn temperature_at(&self, index: usize) -> i16 {
        (i32::from(self.t_start) + index as i32 * i32::from(self.t_step)) as i16
    }

    pub fn thresholds(&self) -> &'a [u16] {
        self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn t_start(&self) -> i16 {
        self.t_start
    }

    pub fn t_step(&self) -> i16 {
        self.t_step
    }

    /// The reading at the first tabulated temperature.
    pub fn first_adc(&self) -> u16 {
        self.thresholds[0]
    }

    /// The reading at the last tabulated temperature.
    pub fn last_adc(&self) -> u16 {
        self.thresholds[self.thresholds.len() - 1]
    }

    /// The lowest tabulated temperature.
    pub fn min_temperature(&self) -> i16 {
        self.t_start
    }

    /// The highest tabulated temperature.
    pub fn max_temperature(&self) -> i16 {
        self.temperature_at(self.thresholds.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISING: [u16; 5] = [235, 454, 669, 819, 908];
    const FALLING: [u16; 5] = [788, 569, 354, 204, 115];

    fn rising() -> LookupTable<'static> {
        LookupTable::new(&RISING, 0, 20, Direction::Rising)
    }

    fn falling() -> LookupTable<'static> {
        LookupTable::new(&FALLING, 0, 20, Direction::Falling)
    }

    // Temperature on the line through two table points, computed in floating point.
    fn on_line(table: &LookupTable, index: usize, adc: u16) -> f64 {
        let x0 = f64::from(table.thresholds()[index]);
        let x1 = f64::from(table.thresholds()[index + 1]);
        let y0 = f64::from(table.temperature_at(index));
        let y1 = f64::from(table.temperature_at(index + 1));
        y0 + (f64::from(adc) - x0) * (y1 - y0) / (x1 - x0)
    }

    #[test]
    #[should_panic]
    fn panics_if_table_is_too_short() {
        LookupTable::new(&[100], 0, 10, Direction::Rising);
    }

    #[test]
    #[should_panic]
    fn panics_if_thresholds_run_against_direction() {
        LookupTable::new(&FALLING, 0, 20, Direction::Rising);
    }

    #[test]
    #[should_panic]
    fn panics_if_thresholds_repeat() {
        LookupTable::new(&[100, 200, 200, 300], 0, 10, Direction::Rising);
    }

    #[test]
    fn matching_exact_values() {
        for table in [rising(), falling()] {
            for (index, &adc) in table.thresholds().iter().enumerate() {
                assert_eq!(table.lookup(adc), table.temperature_at(index));
            }
        }
    }

    #[test]
    fn interpolates() {
        assert_eq!(rising().lookup(344), 10);
        assert_eq!(rising().lookup(561), 30);
        assert_eq!(rising().lookup(300), 6);
        assert_eq!(falling().lookup(678), 10);
        assert_eq!(falling().lookup(279), 50);
        assert_eq!(falling().lookup(700), 8);
    }

    #[test]
    fn midpoints_are_within_one_degree_of_mean() {
        for table in [rising(), falling()] {
            for index in 0..table.len() - 1 {
                let a0 = u32::from(table.thresholds()[index]);
                let a1 = u32::from(table.thresholds()[index + 1]);
                let mean = (table.temperature_at(index) + table.temperature_at(index + 1)) / 2;
                let result = table.lookup(((a0 + a1) / 2) as u16);
                assert!((result - mean).abs() <= 1, "{} vs {}", result, mean);
            }
        }
    }

    #[test]
    fn extrapolates_below_first_entry() {
        let table = rising();
        for adc in [0, 100, 200, 234] {
            let expected = on_line(&table, 0, adc).round() as i16;
            assert_eq!(table.lookup(adc), expected);
        }
        assert_eq!(table.lookup(0), -21);
        assert!(table.lookup(0) < table.min_temperature());

        let table = falling();
        for adc in [789, 900, 1023] {
            let expected = on_line(&table, 0, adc).round() as i16;
            assert_eq!(table.lookup(adc), expected);
        }
    }

    #[test]
    fn extrapolates_above_last_entry() {
        let table = rising();
        for adc in [909, 950, 1023] {
            let expected = on_line(&table, 3, adc).round() as i16;
            assert_eq!(table.lookup(adc), expected);
        }
        assert_eq!(table.lookup(1023), 106);
        assert!(table.lookup(1023) > table.max_temperature());

        let table = falling();
        for adc in [0, 50, 114] {
            let expected = on_line(&table, 3, adc).round() as i16;
            assert_eq!(table.lookup(adc), expected);
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let table = LookupTable::new(&[100, 102, 104], 0, 1, Direction::Rising);
        assert_eq!(table.lookup(101), 1);
        assert_eq!(table.lookup(103), 2);
        assert_eq!(table.lookup(99), -1);
        assert_eq!(table.lookup(105), 3);

        let table = LookupTable::new(&[104, 102, 100], 0, 1, Direction::Falling);
        assert_eq!(table.lookup(103), 1);
        assert_eq!(table.lookup(105), -1);
    }

    #[test]
    fn saturates_at_i16_bounds() {
        let table = LookupTable::new(&[1000, 1001], 0, 100, Direction::Rising);
        assert_eq!(table.lookup(u16::MAX), i16::MAX);
        assert_eq!(table.lookup(0), i16::MIN);
    }

    #[test]
    fn boundaries() {
        assert_eq!(rising().first_adc(), 235);
        assert_eq!(rising().last_adc(), 908);
        assert_eq!(falling().first_adc(), 788);
        assert_eq!(falling().last_adc(), 115);
        assert_eq!(rising().min_temperature(), 0);
        assert_eq!(rising().max_temperature(), 80);
    }

    #[test]
    fn divider_decides_direction() {
        assert_eq!(Divider::ThermistorHigh.direction(), Direction::Rising);
        assert_eq!(Divider::ThermistorLow.direction(), Direction::Falling);
        assert_eq!(Divider::default(), Divider::ThermistorHigh);
        assert!(Direction::Rising.precedes(1, 2));
        assert!(!Direction::Rising.precedes(2, 2));
        assert!(Direction::Falling.precedes(2, 1));
    }
}
