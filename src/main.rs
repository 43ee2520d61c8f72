use clap::Parser;
use std::process::ExitCode;

use dockhand::config::DeployConfig;
use dockhand::pipeline::{self, LiveStages};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// All deployment parameters are fixed constants; the binary takes no
/// flags beyond the clap-provided `--help`/`--version`.
#[derive(Parser)]
#[command(name = "dockhand")]
#[command(version = VERSION)]
#[command(about = "Automated container build-and-deploy pipeline")]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();

    let config = DeployConfig::from_defaults();
    match pipeline::run(&config, &mut LiveStages) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {} [{}]", err, err.code());
            ExitCode::FAILURE
        }
    }
}
