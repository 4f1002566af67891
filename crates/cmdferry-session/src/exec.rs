use std::process::{Command, ExitStatus};

use tracing::{debug, info};

use crate::error::{Result, SessionError};

/// Invoke `command` in the ambient shell, synchronously.
///
/// Standard streams are inherited; output is not captured. The invoked
/// command's failure is the caller's to interpret — only a failure to
/// start the interpreter itself is an error here. An empty command is a
/// valid no-op.
pub fn execute(command: &str) -> Result<ExitStatus> {
    debug!(command, "invoking shell");

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .map_err(SessionError::Shell)?;

    info!(code = status.code(), success = status.success(), "command finished");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_command_reports_success() {
        let status = execute("true").unwrap();
        assert!(status.success());
        assert_eq!(status.code(), Some(0));
    }

    #[test]
    fn failing_command_surfaces_exit_code() {
        let status = execute("exit 7").unwrap();
        assert!(!status.success());
        assert_eq!(status.code(), Some(7));
    }

    #[test]
    fn empty_command_is_a_no_op() {
        let status = execute("").unwrap();
        assert!(status.success());
    }

    #[test]
    fn command_with_quotes_and_spaces() {
        let status = execute("test \"a b\" = \"a b\"").unwrap();
        assert!(status.success());
    }
}
