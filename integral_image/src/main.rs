// CLI entry for integral_image
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};
use integral_image::{config_from_thread_arg, process, Params};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(name = "integral_image", version, about = "Multi-threaded integral image computation")]
struct Cli {
    /// Input image paths
    #[arg(short = 'i', long = "input", num_args = 1.., value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Number of threads (0 = all hardware threads)
    #[arg(short = 't', long = "threads", num_args = 0..=1)]
    threads: Option<Option<usize>>,
}

fn main() -> ExitCode {
    env_logger::init();
    // clap exits with status 2 on malformed arguments, e.g. a negative thread count
    let cli = Cli::parse();
    let config = match config_from_thread_arg(cli.threads) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let report = process(Params {
        inputs: cli.inputs,
        config,
    });
    info!(
        "Done: {} written, {} failed",
        report.written.len(),
        report.failed.len()
    );
    ExitCode::SUCCESS
}
