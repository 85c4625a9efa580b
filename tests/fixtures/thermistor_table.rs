// Thermistor lookup table generated by thermistor-table
// for a circuit with the following parameters:
//
// |Parameter |Value                         |
// |----------|------------------------------|
// |Input File|ten_k.json                    |
// |Board     |test board                    |
// |Thermistor|generic 10k NTC               |
// |Tstart    |0                             |
// |Tstop     |100                           |
// |Tstep     |20                            |
// |Tnominal  |25                            |
// |Rnominal  |10000                         |
// |Rpulldown |10000                         |
// |beta      |3950                          |
// |counts    |1023                          |
// |divider   |thermistor high               |

pub static THERM_TABLE: thermistor_lookup::LookupTable<'static> = thermistor_lookup::LookupTable::new(
    &[
          235, // [ 0] C=   0 R=33621
          454, // [ 1] C=  20 R=12535
          669, // [ 2] C=  40 R=5301
          819, // [ 3] C=  60 R=2486
          908, // [ 4] C=  80 R=1270
    ],
    0,
    20,
    thermistor_lookup::Direction::Rising,
);

/// Temperature in C for the ADC reading `adc`.
///
/// Readings outside the table are extrapolated along the nearest end
/// segment, with growing error the further they are from the table.
pub fn adc_to_temp(adc: u16) -> i16 {
    THERM_TABLE.lookup(adc)
}
