//! `loc`: command-line cmdlets for AWS Location Service.
//!
//! Every cmdlet maps onto one service operation:
//!
//! ```bash
//! # List geofences in a collection
//! loc Get-LOCGeofenceList fleet-A --MaxResult 50
//!
//! # Echo the collection name instead of the response
//! loc get-loc-geofence-list fleet-A --select '^CollectionName'
//!
//! # Delete geofences without prompting
//! loc Remove-LOCGeofence fleet-A g1 g2 --force
//!
//! # One invocation per pipeline element
//! echo '[{"CollectionName":"fleet-A"},{"CollectionName":"fleet-B"}]' \
//!     | loc Get-LOCGeofenceList --input-object -
//! ```

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches};
use colored::Colorize;
use human_panic::setup_panic;
use loc_cli::cli::{self, GlobalArgs};
use loc_cli::config::Settings;
use loc_cli::{cmdlets, runner};
use loc_core::cli::ExitCode;

#[tokio::main]
async fn main() {
    setup_panic!();

    let matches = cli::build_command(cmdlets::catalog()).get_matches();

    let exit_code = match run(&matches).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            ExitCode::INVALID_INPUT
        }
    };

    std::process::exit(exit_code.as_i32());
}

async fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let globals = GlobalArgs::from_arg_matches(matches)?;
    let settings = Settings::load(globals.config.as_deref())?.with_overrides(&globals);
    settings.validate()?;

    runner::init_logging(globals.verbose, &settings.general.log_level)?;

    runner::execute(matches, &settings).await
}
