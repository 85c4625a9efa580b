//! Generate a thermistor lookup table from a JSON circuit description.
//!
//! Usage: `thermistor-table <config.json> [options]`
//!
//! Options:
//!   --output-dir <dir>  Directory the artifacts are written to (default: .)
//!   --name <name>       Base name of the artifacts (default: thermistor_table)
//!   --target <target>   `c` for a header and source file, `rust` for a module
//!   -v, --verbose       Also log every table row
//!   -q, --quiet         Only log errors

use std::env;
use std::path::PathBuf;
use std::process;

use log::{Level, LevelFilter, Log, Metadata, Record};
use thermistor_lookup::codegen::{self, Target};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => eprintln!("{}: {}", record.level(), record.args()),
            _ => eprintln!("{}", record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

struct Options {
    config: PathBuf,
    output_dir: PathBuf,
    name: String,
    target: Target,
    level: LevelFilter,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut config = None;
    let mut options = Options {
        config: PathBuf::new(),
        output_dir: PathBuf::from("."),
        name: "thermistor_table".to_string(),
        target: Target::C,
        level: LevelFilter::Info,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--output-dir" => {
                i += 1;
                options.output_dir = args
                    .get(i)
                    .ok_or("--output-dir requires a value")?
                    .into();
            }
            "--name" => {
                i += 1;
                options.name = args.get(i).ok_or("--name requires a value")?.to_string();
            }
            "--target" => {
                i += 1;
                let name = args.get(i).ok_or("--target requires a value")?;
                options.target =
                    Target::from_name(name).ok_or_else(|| format!("Unknown target: {}", name))?;
            }
            "-v" | "--verbose" => options.level = LevelFilter::Debug,
            "-q" | "--quiet" => options.level = LevelFilter::Error,
            argument if argument.starts_with('-') => {
                return Err(format!("Unknown argument: {}", argument));
            }
            argument => {
                if config.replace(PathBuf::from(argument)).is_some() {
                    return Err("Only one configuration file may be given".to_string());
                }
            }
        }
        i += 1;
    }

    options.config = config.ok_or("Missing configuration file")?;
    if options.name.is_empty() {
        return Err("--name must not be empty".to_string());
    }
    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: thermistor-table <config.json> [--output-dir <dir>] [--name <name>] [--target c|rust] [-v|-q]");
            process::exit(2);
        }
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(options.level);
    }

    if let Err(e) = codegen::generate(
        &options.config,
        &options.output_dir,
        options.target,
        &options.name,
    ) {
        log::error!("{}: {}", options.config.display(), e);
        process::exit(1);
    }
}
