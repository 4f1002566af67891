use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

use tracing::debug;

use crate::error::{ChannelError, Result};

/// Anonymous pipe transport for the command payload.
///
/// The pipe is created once by the producer before the process split; the
/// consumer inherits the read end across spawn and reconstructs it from
/// its raw descriptor. Each process closes its own copies independently —
/// the kernel destroys the pipe when the last descriptor goes away.
pub struct BytePipe;

impl BytePipe {
    /// Allocate a new pipe, returning its read and write ends.
    pub fn create() -> Result<(PipeReader, PipeWriter)> {
        let mut fds = [0 as libc::c_int; 2];

        // SAFETY: `fds` is a valid writable array of two c_ints.
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(ChannelError::PipeCreate(std::io::Error::last_os_error()));
        }

        // SAFETY: both descriptors were just created and are owned
        // exclusively here.
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

        debug!(read_fd = fds[0], write_fd = fds[1], "allocated byte pipe");

        Ok((
            PipeReader {
                inner: File::from(read),
            },
            PipeWriter {
                inner: File::from(write),
            },
        ))
    }
}

/// Owned read end of a [`BytePipe`]. Closed on drop.
#[derive(Debug)]
pub struct PipeReader {
    inner: File,
}

/// Owned write end of a [`BytePipe`]. Closed on drop.
#[derive(Debug)]
pub struct PipeWriter {
    inner: File,
}

impl PipeReader {
    /// Adopt an inherited pipe read descriptor.
    ///
    /// # Safety
    ///
    /// `fd` must be an open pipe read end that no other owner will close;
    /// the returned reader takes ownership and closes it on drop.
    pub unsafe fn from_raw_fd(fd: RawFd) -> Self {
        Self {
            inner: File::from_raw_fd(fd),
        }
    }
}

impl PipeWriter {
    /// Mark the write end close-on-exec.
    ///
    /// A spawned consumer must not inherit the write end: while it holds a
    /// copy, its own read loop can never observe EOF after the producer
    /// closes.
    pub fn set_cloexec(&self) -> Result<()> {
        let fd = self.inner.as_raw_fd();

        // SAFETY: `fd` is an open descriptor owned by `self.inner`.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
        if flags < 0 {
            return Err(ChannelError::Io(std::io::Error::last_os_error()));
        }

        // SAFETY: as above; setting FD_CLOEXEC does not invalidate the fd.
        if unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
            return Err(ChannelError::Io(std::io::Error::last_os_error()));
        }

        Ok(())
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl AsRawFd for PipeReader {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

impl AsRawFd for PipeWriter {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

impl IntoRawFd for PipeReader {
    fn into_raw_fd(self) -> RawFd {
        self.inner.into_raw_fd()
    }
}
