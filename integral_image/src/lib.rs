//! Multi-threaded integral images (summed-area tables).
//!
//! Cell `(i, j)` of an integral image holds the sum of every source cell with
//! row `<= i` and column `<= j`, computed independently per channel. See
//! [`integrate_channel`] for how work is split across threads.

mod decode;
mod error;
mod export;
mod integrator;
mod matrix;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::DynamicImage;
use log::{error, info};

pub use decode::{image_from_dynamic, load_image};
pub use error::Error;
pub use export::{export_console, export_txt, write_console, write_txt, General, PRECISION};
pub use integrator::{
    block_ranges, integrate_channel, integrate_column, integrate_row, ImageIntegrator,
};
pub use matrix::{Channel, Image};

/// Suffix appended to each input path to name its output file.
pub const OUTPUT_SUFFIX: &str = ".integral.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: usize,
}

impl Config {
    /// Validates a requested thread count against the hardware.
    ///
    /// `0` selects every available hardware thread.
    pub fn with_threads(requested: usize) -> Result<Self, Error> {
        let available = hardware_threads();
        match requested {
            0 => Ok(Self {
                num_threads: available,
            }),
            n if n > available => Err(Error::ThreadsOutOfRange {
                requested: n,
                available,
            }),
            n => Ok(Self { num_threads: n }),
        }
    }
}

/// Why the `-t` command-line option was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadArgError {
    /// `-t` given without a value.
    Missing,
    OutOfRange(Error),
}

impl ThreadArgError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Missing => 1,
            Self::OutOfRange(_) => 2,
        }
    }
}

impl fmt::Display for ThreadArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "thread number not specified"),
            Self::OutOfRange(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ThreadArgError {}

/// Builds the config from the `-t` option: absent, present without a value,
/// or present with a count.
pub fn config_from_thread_arg(arg: Option<Option<usize>>) -> Result<Config, ThreadArgError> {
    match arg {
        None => Ok(default_config()),
        Some(None) => Err(ThreadArgError::Missing),
        Some(Some(n)) => Config::with_threads(n).map_err(ThreadArgError::OutOfRange),
    }
}

pub fn hardware_threads() -> usize {
    num_cpus::get().max(1)
}

pub fn default_config() -> Config {
    Config {
        num_threads: hardware_threads(),
    }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub inputs: Vec<PathBuf>,
    pub config: Config,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// `<path>.integral.txt`, next to the input.
pub fn integral_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Integrates an image that is already in memory.
pub fn process_dynamic(dyn_img: &DynamicImage, num_threads: usize) -> Result<Image<f64>> {
    let source = image_from_dynamic(dyn_img)?;
    integrate(&source, num_threads)
}

fn integrate(source: &Image<f32>, num_threads: usize) -> Result<Image<f64>> {
    let mut integral = Image::new_fill(source.rows(), source.cols(), source.channels(), 0.0);
    let mut integrator = ImageIntegrator::with_image(source);
    integrator.set_target(&mut integral);
    integrator.integrate_image(num_threads)?;
    Ok(integral)
}

/// Decodes, integrates and writes one image. Returns the output path.
pub fn process_file(path: &Path, config: &Config) -> Result<PathBuf> {
    let source = load_image(path)?;
    info!(
        "{}: {}x{}, {} channel(s)",
        path.display(),
        source.cols(),
        source.rows(),
        source.channels()
    );
    let integral = integrate(&source, config.num_threads)?;
    let out = integral_path(path);
    export_txt(&integral, &out)?;
    info!("Output saved: {}", out.display());
    Ok(out)
}

/// Runs [`process_file`] on every input in order. A failing input is logged
/// and skipped.
pub fn process(params: Params) -> Report {
    let Params { inputs, config } = params;
    info!("Starting integral image, {} input(s)", inputs.len());
    info!("Threads: {}", config.num_threads);

    let mut report = Report::default();
    for path in inputs {
        match process_file(&path, &config) {
            Ok(out) => report.written.push(out),
            Err(e) => {
                error!("{}: {e:#}", path.display());
                report.failed.push(path);
            }
        }
    }
    report
}
