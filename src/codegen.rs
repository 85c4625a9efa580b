//! Renders a built table as source files for a firmware build.
//!
//! [`Target::C`] produces a header declaring `adc_to_temp` and a source file
//! holding the table and the function body, ready to compile on targets
//! without floating point. [`Target::Rust`] produces one file to `include!`
//! in firmware that depends on this crate, exposing a `static` [`LookupTable`]
//! and an `adc_to_temp` wrapper.
//!
//! Output is deterministic: the same configuration always renders the same
//! text.
//!
//! [`LookupTable`]: crate::LookupTable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::builder::{build, ThermistorTable};
use crate::config::ThermistorConfig;
use crate::error::Error;
use crate::table::{Direction, Divider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    C,
    Rust,
}

impl Target {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "c" => Some(Target::C),
            "rust" | "rs" => Some(Target::Rust),
            _ => None,
        }
    }
}

/// A single rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// All files rendered for one table. Nothing touches the disk until
/// [`write`](Artifacts::write).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    artifacts: Vec<Artifact>,
}

impl Artifacts {
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn get(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.file_name == file_name)
    }

    /// Writes every artifact into `dir` and returns the paths written.
    ///
    /// Files are first written next to their destination under a temporary
    /// name and only renamed into place once all of them were written.
    /// Existing files are moved aside while the new ones are renamed in, and
    /// put back if any rename fails, so a failed run does not leave a header
    /// without its source.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, Error> {
        let dir = dir.as_ref();
        let mut staged: Vec<Staged> = Vec::new();

        for artifact in &self.artifacts {
            let file = Staged {
                path: dir.join(&artifact.file_name),
                temporary: dir.join(format!(".{}.tmp", artifact.file_name)),
                backup: dir.join(format!(".{}.bak", artifact.file_name)),
            };

            if let Err(error) = fs::write(&file.temporary, &artifact.contents) {
                let _ = fs::remove_file(&file.temporary);
                for file in &staged {
                    let _ = fs::remove_file(&file.temporary);
                }
                return Err(error.into());
            }
            staged.push(file);
        }

        let mut replaced: Vec<(&Staged, bool)> = Vec::with_capacity(staged.len());
        for (position, file) in staged.iter().enumerate() {
            match file.replace() {
                Ok(backed_up) => replaced.push((file, backed_up)),
                Err(error) => {
                    log::error!("Could not write {}: {}", file.path.display(), error);
                    for (file, backed_up) in replaced.iter().rev() {
                        file.restore(*backed_up);
                    }
                    for file in &staged[position..] {
                        let _ = fs::remove_file(&file.temporary);
                    }
                    return Err(error.into());
                }
            }
        }

        let mut written = Vec::with_capacity(replaced.len());
        for (file, backed_up) in replaced {
            if backed_up {
                let _ = fs::remove_file(&file.backup);
            }
            log::info!("Wrote {}", file.path.display());
            written.push(file.path.clone());
        }

        Ok(written)
    }
}

/// An artifact written under its temporary name, waiting to replace `path`.
#[derive(Debug)]
struct Staged {
    path: PathBuf,
    temporary: PathBuf,
    backup: PathBuf,
}

impl Staged {
    /// Renames the temporary file to `path`, first moving an existing file
    /// there to `backup`. Returns whether a backup was made.
    fn replace(&self) -> io::Result<bool> {
        let backed_up = self.path.is_file();
        if backed_up {
            fs::rename(&self.path, &self.backup)?;
        }

        if let Err(error) = fs::rename(&self.temporary, &self.path) {
            if backed_up {
                let _ = fs::rename(&self.backup, &self.path);
            }
            return Err(error);
        }

        Ok(backed_up)
    }

    /// Undoes a successful [`replace`](Staged::replace).
    fn restore(&self, backed_up: bool) {
        let _ = fs::remove_file(&self.path);
        if backed_up {
            let _ = fs::rename(&self.backup, &self.path);
        }
    }
}

/// Renders `table` for `target`, naming the files after `name`.
///
/// `input_file` is only recorded in the parameter comment.
pub fn render(
    config: &ThermistorConfig,
    table: &ThermistorTable,
    target: Target,
    name: &str,
    input_file: &str,
) -> Artifacts {
    let parameters = parameter_rows(config, input_file);

    let artifacts = match target {
        Target::C => vec![
            Artifact {
                file_name: format!("{}.h", name),
                contents: c_header(name, &parameters),
            },
            Artifact {
                file_name: format!("{}.c", name),
                contents: c_source(name, table, &parameters),
            },
        ],
        Target::Rust => vec![Artifact {
            file_name: format!("{}.rs", name),
            contents: rust_module(table, &parameters),
        }],
    };

    Artifacts { artifacts }
}

/// Loads the configuration at `config_path`, builds its table and writes
/// the artifacts for `target` into `output_dir`.
///
/// Nothing is written unless the table was built successfully.
pub fn generate(
    config_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    target: Target,
    name: &str,
) -> Result<Vec<PathBuf>, Error> {
    let config_path = config_path.as_ref();
    let config = ThermistorConfig::load(config_path)?;
    let table = build(&config)?;

    let input_file = config_path
        .file_name()
        .map(|file_name| file_name.to_string_lossy().into_owned())
        .unwrap_or_default();

    render(&config, &table, target, name, &input_file).write(output_dir)
}

fn parameter_rows(config: &ThermistorConfig, input_file: &str) -> Vec<String> {
    let divider = match config.divider {
        Divider::ThermistorHigh => "thermistor high",
        Divider::ThermistorLow => "thermistor low",
    };
    let rows = [
        ("Input File", input_file.to_string()),
        ("Board", config.board.clone()),
        ("Thermistor", config.thermistor.clone()),
        ("Tstart", config.t_start.to_string()),
        ("Tstop", config.t_stop.to_string()),
        ("Tstep", config.t_step.to_string()),
        ("Tnominal", config.t_nominal.to_string()),
        ("Rnominal", config.r_nominal.to_string()),
        ("Rpulldown", config.r_pulldown.to_string()),
        ("beta", config.beta.to_string()),
        ("counts", config.counts.to_string()),
        ("divider", divider.to_string()),
    ];

    let mut lines = vec![
        "|Parameter |Value                         |".to_string(),
        "|----------|------------------------------|".to_string(),
    ];
    lines.extend(
        rows.iter()
            .map(|(name, value)| format!("|{:<10}|{:<30}|", name, value)),
    );
    lines
}

fn table_rows(table: &ThermistorTable) -> impl Iterator<Item = String> + '_ {
    table.entries().iter().enumerate().map(|(index, entry)| {
        format!(
            "    {:5}, // [{:2}] C={:4} R={}",
            entry.adc, index, entry.temperature, entry.resistance
        )
    })
}

fn include_guard(name: &str) -> String {
    let mut guard: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    guard.push_str("_H");
    guard
}

fn c_parameter_block(parameters: &[String]) -> String {
    let mut block = String::from(
        "/*\n * Thermistor lookup table generated by thermistor-table\n * for a circuit with the following parameters:\n *\n",
    );
    for line in parameters {
        block.push_str(" * ");
        block.push_str(line);
        block.push('\n');
    }
    block.push_str(" */\n\n");
    block
}

fn c_header(name: &str, parameters: &[String]) -> String {
    let guard = include_guard(name);
    let mut header = format!("#ifndef {guard}\n#define {guard}\n\n#include <stdint.h>\n\n");
    header.push_str(&c_parameter_block(parameters));
    header.push_str(C_DECLARATION);
    header.push_str(&format!("#endif // {guard}\n"));
    header
}

fn c_source(name: &str, table: &ThermistorTable, parameters: &[String]) -> String {
    let lookup = table.as_lookup();
    let mut source = format!("#include <stdint.h>\n#include \"{}.h\"\n\n", name);
    source.push_str(&c_parameter_block(parameters));

    source.push_str("static const uint16_t therm_table[] =\n{\n");
    for row in table_rows(table) {
        source.push_str(&row);
        source.push('\n');
    }
    source.push_str("};\n\n");

    let at_or_before = match table.direction() {
        Direction::Rising => "<=",
        Direction::Falling => ">=",
    };
    source.push_str(&format!(
        "#define T_START ({})\n#define T_STEP ({})\n#define T_LAST_IDX ({})\n",
        table.t_start(),
        table.t_step(),
        lookup.len() - 1
    ));
    source.push_str("#define T_AT_IDX(idx) ((int32_t)T_START + ((int32_t)(idx) * T_STEP))\n");
    source.push_str(&format!(
        "#define AT_OR_BEFORE(entry, adc) ((entry) {} (adc))\n\n",
        at_or_before
    ));

    source.push_str(C_DEFINITION);
    source
}

fn rust_module(table: &ThermistorTable, parameters: &[String]) -> String {
    let direction = match table.direction() {
        Direction::Rising => "Rising",
        Direction::Falling => "Falling",
    };

    let mut module = String::from(
        "// Thermistor lookup table generated by thermistor-table\n// for a circuit with the following parameters:\n//\n",
    );
    for line in parameters {
        module.push_str("// ");
        module.push_str(line);
        module.push('\n');
    }
    module.push('\n');

    module.push_str(
        "pub static THERM_TABLE: thermistor_lookup::LookupTable<'static> = thermistor_lookup::LookupTable::new(\n    &[\n",
    );
    for row in table_rows(table) {
        module.push_str("    ");
        module.push_str(&row);
        module.push('\n');
    }
    module.push_str(&format!(
        "    ],\n    {},\n    {},\n    thermistor_lookup::Direction::{},\n);\n\n",
        table.t_start(),
        table.t_step(),
        direction
    ));
    module.push_str(RUST_DEFINITION);
    module
}

const C_DECLARATION: &str = r#"#ifdef __cplusplus
extern "C" {
#endif

/**
 * Get temperature in C from ADC input.
 *
 * @param adc ADC counts for the temperature sensor
 *
 * Calculates the temperature in C from a temperature sensor ADC value.
 * The calculation uses a lookup table generated for a specific thermistor
 * circuit. If the input is outside the range of the pre-computed lookup table,
 * it interpolates linearly beyond the table, with an increasing amount of
 * error the further outside the table range.
 */
extern int16_t adc_to_temp(uint16_t adc);

#ifdef __cplusplus
}
#endif

"#;

const C_DEFINITION: &str = r#"// Calculate temperature using lookup table.
// See header file for API description
int16_t adc_to_temp(uint16_t adc)
{
    // Number of entries at or before adc
    uint16_t lo = 0;
    uint16_t hi = T_LAST_IDX + 1;
    while (lo < hi)
    {
        uint16_t mid = lo + ((hi - lo) >> 1);
        if (AT_OR_BEFORE(therm_table[mid], adc))
        {
            lo = mid + 1;
        }
        else
        {
            hi = mid;
        }
    }

    // Past either end, keep using the end segment
    uint16_t idx = (lo > 0) ? (lo - 1) : 0;
    if (idx > T_LAST_IDX - 1)
    {
        idx = T_LAST_IDX - 1;
    }

    int32_t adc0 = therm_table[idx];
    int32_t range = (int32_t)therm_table[idx + 1] - adc0;
    int32_t delta = ((int32_t)adc - adc0) * T_STEP;
    if (range < 0)
    {
        range = -range;
        delta = -delta;
    }

    // Round half away from zero
    int32_t half = range / 2;
    int32_t temp = ((delta >= 0) ? (delta + half) : (delta - half)) / range;
    temp += T_AT_IDX(idx);

    if (temp > INT16_MAX)
    {
        return INT16_MAX;
    }
    if (temp < INT16_MIN)
    {
        return INT16_MIN;
    }
    return (int16_t)temp;
}
"#;

const RUST_DEFINITION: &str = r#"/// Temperature in C for the ADC reading `adc`.
///
/// Readings outside the table are extrapolated along the nearest end
/// segment, with growing error the further they are from the table.
pub fn adc_to_temp(adc: u16) -> i16 {
    THERM_TABLE.lookup(adc)
}
"#;
