//! Thermistor circuit description, as read from a JSON file.
//!
//! ```json
//! {
//!     "board": "diyBMSv4 prototype",
//!     "thermistor": "Sunlord SDNT2012X473F4150FTF",
//!     "Tstart": 0,
//!     "Tstop": 80,
//!     "Tstep": 8,
//!     "Tnominal": 25,
//!     "Rnominal": 47000,
//!     "Rpulldown": 47000,
//!     "beta": 4150,
//!     "counts": 1023
//! }
//! ```
//!
//! `Tstop` is exclusive. An optional `"divider"` key selects
//! `"thermistor_high"` (the default) or `"thermistor_low"`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigurationError, Error};
use crate::table::Divider;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThermistorConfig {
    /// Free-form board description, only copied into generated comments
    pub board: String,
    /// Manufacturer and part number, only copied into generated comments
    pub thermistor: String,
    /// First tabulated temperature (C)
    #[serde(rename = "Tstart")]
    pub t_start: i16,
    /// End of the tabulated range (C), exclusive
    #[serde(rename = "Tstop")]
    pub t_stop: i16,
    #[serde(rename = "Tstep")]
    pub t_step: i16,
    /// Temperature at which the thermistor measures `r_nominal` (C)
    #[serde(rename = "Tnominal")]
    pub t_nominal: i16,
    #[serde(rename = "Rnominal")]
    pub r_nominal: u32,
    /// Fixed resistor on the other leg of the divider
    #[serde(rename = "Rpulldown")]
    pub r_pulldown: u32,
    /// B value (K)
    pub beta: u32,
    /// ADC full scale, e.g. 1023 for a 10-bit converter
    pub counts: u16,
    #[serde(default)]
    pub divider: Divider,
}

impl ThermistorConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("Reading thermistor configuration from {}", path.display());

        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Checks the parameters that can be judged without building the table.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.t_start >= self.t_stop {
            return Err(ConfigurationError::EmptyRange {
                start: self.t_start,
                stop: self.t_stop,
            });
        }
        if self.t_step <= 0 {
            return Err(ConfigurationError::NonPositiveStep(self.t_step));
        }

        let positive = [
            ("Rnominal", self.r_nominal),
            ("Rpulldown", self.r_pulldown),
            ("beta", self.beta),
            ("counts", u32::from(self.counts)),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigurationError::ZeroParameter { name });
            }
        }

        Ok(())
    }

    /// The tabulated temperatures, `t_start` up to but excluding `t_stop`.
    pub fn temperatures(&self) -> impl Iterator<Item = i16> {
        let step = self.t_step.max(1) as usize;
        (self.t_start..self.t_stop).step_by(step)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn ten_k() -> ThermistorConfig {
        ThermistorConfig {
            board: "test board".to_string(),
            thermistor: "generic 10k NTC".to_string(),
            t_start: 0,
            t_stop: 100,
            t_step: 20,
            t_nominal: 25,
            r_nominal: 10000,
            r_pulldown: 10000,
            beta: 3950,
            counts: 1023,
            divider: Divider::ThermistorHigh,
        }
    }

    const DIY_BMS: &str = r#"{
        "board": "diyBMSv4 prototype (oshpark purple) board",
        "thermistor": "Sunlord SDNT2012X473F4150FTF",
        "Tstart": 0,
        "Tstop": 80,
        "Tstep": 8,
        "Tnominal": 25,
        "Rnominal": 47000,
        "Rpulldown": 47000,
        "beta": 4150,
        "counts": 1023
    }"#;

    #[test]
    fn parses_json() {
        let config = ThermistorConfig::from_json(DIY_BMS).unwrap();

        assert_eq!(config.board, "diyBMSv4 prototype (oshpark purple) board");
        assert_eq!(config.thermistor, "Sunlord SDNT2012X473F4150FTF");
        assert_eq!(config.t_start, 0);
        assert_eq!(config.t_stop, 80);
        assert_eq!(config.t_step, 8);
        assert_eq!(config.t_nominal, 25);
        assert_eq!(config.r_nominal, 47000);
        assert_eq!(config.r_pulldown, 47000);
        assert_eq!(config.beta, 4150);
        assert_eq!(config.counts, 1023);
        assert_eq!(config.divider, Divider::ThermistorHigh);
    }

    #[test]
    fn parses_divider() {
        let json = DIY_BMS.replace(r#""counts": 1023"#, r#""counts": 1023, "divider": "thermistor_low""#);
        let config = ThermistorConfig::from_json(&json).unwrap();
        assert_eq!(config.divider, Divider::ThermistorLow);
    }

    #[test]
    fn rejects_missing_and_unknown_fields() {
        let missing = DIY_BMS.replace(r#""beta": 4150,"#, "");
        assert!(matches!(
            ThermistorConfig::from_json(&missing),
            Err(Error::Parse(_))
        ));

        let unknown = DIY_BMS.replace(r#""beta": 4150,"#, r#""beta": 4150, "gamma": 1,"#);
        assert!(matches!(
            ThermistorConfig::from_json(&unknown),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ThermistorConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn validates() {
        assert_eq!(ten_k().validate(), Ok(()));

        let config = ThermistorConfig {
            t_start: 100,
            t_stop: 100,
            ..ten_k()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::EmptyRange {
                start: 100,
                stop: 100
            })
        );

        let config = ThermistorConfig {
            t_step: -5,
            ..ten_k()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::NonPositiveStep(-5))
        );

        let config = ThermistorConfig {
            r_pulldown: 0,
            ..ten_k()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::ZeroParameter { name: "Rpulldown" })
        );

        let config = ThermistorConfig {
            counts: 0,
            ..ten_k()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::ZeroParameter { name: "counts" })
        );
    }

    #[test]
    fn temperatures_exclude_stop() {
        let temperatures: Vec<i16> = ten_k().temperatures().collect();
        assert_eq!(temperatures, [0, 20, 40, 60, 80]);

        let config = ThermistorConfig {
            t_start: -10,
            t_stop: 11,
            t_step: 7,
            ..ten_k()
        };
        let temperatures: Vec<i16> = config.temperatures().collect();
        assert_eq!(temperatures, [-10, -3, 4]);
    }
}
