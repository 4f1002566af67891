use std::ffi::OsString;
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};

use cmdferry_channel::PipeReader;
use tracing::info;

use crate::error::{Result, SessionError};

/// Subcommand name the consumer role is relaunched under.
///
/// This is the spawn contract between the producer and the CLI: the
/// producer invokes its own executable with this subcommand and the
/// endpoint arguments from [`consumer_args`], and the CLI routes it to
/// [`crate::run_consumer`].
pub const CONSUMER_SUBCOMMAND: &str = "consume";

/// Argument vector for relaunching the consumer role.
pub fn consumer_args(fifo_path: &Path, payload_fd: RawFd, max_payload: usize) -> Vec<OsString> {
    vec![
        OsString::from(CONSUMER_SUBCOMMAND),
        OsString::from("--length-fifo"),
        fifo_path.as_os_str().to_os_string(),
        OsString::from("--payload-fd"),
        OsString::from(payload_fd.to_string()),
        OsString::from("--max-payload"),
        OsString::from(max_payload.to_string()),
    ]
}

/// A spawned consumer process.
pub struct ConsumerHandle {
    child: Child,
}

impl ConsumerHandle {
    /// The consumer's process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Wait for the consumer to finish (blocking).
    pub fn wait(mut self) -> Result<ExitStatus> {
        self.child.wait().map_err(SessionError::Wait)
    }
}

/// Spawn the consumer role as a child of this process.
///
/// The consumer inherits the pipe read end across the spawn and receives
/// its descriptor number as an argument; the producer's own copy is
/// closed here so only the two intended endpoint owners remain.
pub fn spawn_consumer(
    fifo_path: &Path,
    payload: PipeReader,
    max_payload: usize,
) -> Result<ConsumerHandle> {
    let exe = std::env::current_exe().map_err(SessionError::Spawn)?;
    spawn_consumer_with_program(&exe, fifo_path, payload, max_payload)
}

/// Spawn the consumer role from an explicit program path.
pub fn spawn_consumer_with_program(
    program: &Path,
    fifo_path: &Path,
    payload: PipeReader,
    max_payload: usize,
) -> Result<ConsumerHandle> {
    let args = consumer_args(fifo_path, payload.as_raw_fd(), max_payload);
    let child = Command::new(program)
        .args(&args)
        .spawn()
        .map_err(SessionError::Spawn)?;

    info!(pid = child.id(), program = %program.display(), "spawned consumer");

    // The child holds its own inherited copy of the read end now; drop
    // ours so the pipe reports EOF once the write end closes.
    drop(payload);

    Ok(ConsumerHandle { child })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdferry_channel::BytePipe;

    #[test]
    fn consumer_args_follow_spawn_contract() {
        let args = consumer_args(Path::new("/tmp/len.fifo"), 7, 1024);
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "consume",
                "--length-fifo",
                "/tmp/len.fifo",
                "--payload-fd",
                "7",
                "--max-payload",
                "1024",
            ]
        );
    }

    #[test]
    fn spawn_failure_is_reported() {
        let (reader, _writer) = BytePipe::create().unwrap();
        let result = spawn_consumer_with_program(
            Path::new("/nonexistent/cmdferry-test-binary"),
            Path::new("/tmp/len.fifo"),
            reader,
            1024,
        );
        assert!(matches!(result, Err(SessionError::Spawn(_))));
    }

    #[test]
    fn spawned_child_is_waitable() {
        // `true` ignores the role arguments; this exercises only the
        // spawn/wait plumbing and fd handoff.
        let (reader, _writer) = BytePipe::create().unwrap();
        let handle = spawn_consumer_with_program(
            Path::new("/bin/true"),
            Path::new("/tmp/len.fifo"),
            reader,
            1024,
        )
        .unwrap();

        assert!(handle.id() > 0);
        let status = handle.wait().unwrap();
        assert!(status.success());
    }
}
