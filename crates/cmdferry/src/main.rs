mod cmd;
mod exit;
mod logging;
mod menu;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cmdferry", version, about = "Two-process command handoff over pipe + fifo")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "CMDFERRY_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    // A relaunched consumer role picks its level up from the environment.
    std::env::set_var("CMDFERRY_LOG_LEVEL", cli.log_level.as_str());

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from(["cmdferry", "run", "--command", "echo hello"])
            .expect("run args should parse");
        assert!(matches!(cli.command, Command::Run(_)));
    }

    #[test]
    fn parses_spawn_contract_for_consume() {
        // The producer relaunches this binary with exactly these args;
        // they must keep parsing.
        let args = cmdferry_session::consumer_args(std::path::Path::new("/tmp/len.fifo"), 5, 4096);
        let mut argv = vec![std::ffi::OsString::from("cmdferry")];
        argv.extend(args);

        let cli = Cli::try_parse_from(argv).expect("consumer spawn args should parse");
        match cli.command {
            Command::Consume(consume) => {
                assert_eq!(consume.length_fifo, std::path::PathBuf::from("/tmp/len.fifo"));
                assert_eq!(consume.payload_fd, 5);
                assert_eq!(consume.max_payload, 4096);
            }
            other => panic!("expected consume subcommand, got {other:?}"),
        }
    }

    #[test]
    fn run_allows_empty_command_string() {
        let cli = Cli::try_parse_from(["cmdferry", "run", "--command", ""])
            .expect("empty command should parse");
        match cli.command {
            Command::Run(run) => assert_eq!(run.command.as_deref(), Some("")),
            other => panic!("expected run subcommand, got {other:?}"),
        }
    }

    #[test]
    fn parses_catalog_and_doctor() {
        assert!(matches!(
            Cli::try_parse_from(["cmdferry", "catalog"]).unwrap().command,
            Command::Catalog(_)
        ));
        assert!(matches!(
            Cli::try_parse_from(["cmdferry", "doctor"]).unwrap().command,
            Command::Doctor(_)
        ));
    }
}
