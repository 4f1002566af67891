use std::path::PathBuf;

use cmdferry_session::{run_producer, ProducerConfig};
use tracing::info;

use crate::cmd::RunArgs;
use crate::exit::{io_error, session_error, CliResult, SUCCESS};
use crate::menu::{prompt_loop, MenuOutcome};
use crate::output::{print_transfer, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let Some(command) = resolve_command(&args)? else {
        info!("exit requested from menu");
        return Ok(SUCCESS);
    };

    let config = ProducerConfig {
        fifo_path: args.fifo.clone().unwrap_or_else(default_fifo_path),
        max_payload: args.max_payload,
    };

    let report = run_producer(&command, &config)
        .map_err(|err| session_error("transfer failed", err))?;

    print_transfer(&command, &report, format);

    // The consumer's exit code is the invoked command's; pass it through
    // so the command's result is observable from this entry point.
    Ok(report.exit_code())
}

fn resolve_command(args: &RunArgs) -> CliResult<Option<String>> {
    if let Some(command) = &args.command {
        return Ok(Some(command.clone()));
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let outcome = prompt_loop(&mut stdin.lock(), &mut stdout)
        .map_err(|err| io_error("menu input failed", err))?;

    match outcome {
        MenuOutcome::Command(command) => Ok(Some(command)),
        MenuOutcome::Exit => Ok(None),
    }
}

fn default_fifo_path() -> PathBuf {
    std::env::temp_dir().join(format!("cmdferry-{}.fifo", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fifo_path_is_per_process() {
        let path = default_fifo_path();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("cmdferry-"));
        assert!(name.ends_with(".fifo"));
        assert!(name.contains(&std::process::id().to_string()));
    }

    #[test]
    fn explicit_command_skips_the_menu() {
        let args = RunArgs {
            command: Some("echo hi".to_string()),
            fifo: None,
            max_payload: 1024,
        };
        let resolved = resolve_command(&args).unwrap();
        assert_eq!(resolved.as_deref(), Some("echo hi"));
    }
}
