use std::path::PathBuf;

use clap::{Args, Subcommand};
use cmdferry_proto::DEFAULT_MAX_PAYLOAD;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod catalog;
pub mod consume;
pub mod doctor;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transfer a command to a consumer process and execute it.
    Run(RunArgs),
    /// Consumer role entry; relaunched internally by `run`.
    #[command(hide = true)]
    Consume(ConsumeArgs),
    /// List the interactive command templates.
    Catalog(CatalogArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Consume(args) => consume::run(args),
        Command::Catalog(args) => catalog::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command string to transfer; opens the interactive menu when
    /// omitted. An empty string is a valid no-op command.
    #[arg(long, short = 'c')]
    pub command: Option<String>,
    /// Length fifo path. Default: <tmp>/cmdferry-<pid>.fifo
    #[arg(long, value_name = "PATH")]
    pub fifo: Option<PathBuf>,
    /// Maximum command size in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct ConsumeArgs {
    /// Length fifo path created by the producer.
    #[arg(long, value_name = "PATH")]
    pub length_fifo: PathBuf,
    /// Inherited pipe read descriptor carrying the payload.
    #[arg(long, value_name = "FD")]
    pub payload_fd: i32,
    /// Maximum command size in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
