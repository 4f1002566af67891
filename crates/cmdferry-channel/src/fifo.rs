use std::ffi::CString;
use std::fs::{File, OpenOptions, Permissions};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ChannelError, Result};

/// Named FIFO transport for the length token.
///
/// The producer creates the FIFO before the process split and owns its
/// filesystem entry; the consumer opens the same path independently. Both
/// `open_writer` and `open_reader` block until the opposite end is opened,
/// which is the transfer's rendezvous barrier: neither side can run ahead
/// of the other into a stale or absent token.
pub struct LengthFifo {
    path: PathBuf,
    created_inode: Option<(u64, u64)>,
}

impl LengthFifo {
    /// Default permission mode for created FIFOs: read+write for owner
    /// and group.
    pub const DEFAULT_FIFO_MODE: u32 = 0o660;

    /// Create a named FIFO at `path`.
    ///
    /// If the path already holds a FIFO it is treated as stale and
    /// replaced. Any other existing file is an error and is never removed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_mode(path, Self::DEFAULT_FIFO_MODE)
    }

    /// Create a named FIFO at `path` with an explicit permission mode.
    pub fn create_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|e| ChannelError::FifoCreate {
                path: path.clone(),
                source: e,
            })?;
            if metadata.file_type().is_fifo() {
                debug!(?path, "removing stale fifo");
                std::fs::remove_file(&path).map_err(|e| ChannelError::FifoCreate {
                    path: path.clone(),
                    source: e,
                })?;
            } else {
                return Err(ChannelError::FifoCreate {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "existing path is not a fifo",
                    ),
                });
            }
        }

        let c_path =
            CString::new(path.as_os_str().as_bytes()).map_err(|_| ChannelError::FifoCreate {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path contains an interior NUL byte",
                ),
            })?;

        // SAFETY: `c_path` is a valid NUL-terminated path string.
        if unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) } != 0 {
            return Err(ChannelError::FifoCreate {
                path,
                source: std::io::Error::last_os_error(),
            });
        }

        // mkfifo narrows the mode through the umask; apply it explicitly.
        std::fs::set_permissions(&path, Permissions::from_mode(mode)).map_err(|e| {
            ChannelError::FifoCreate {
                path: path.clone(),
                source: e,
            }
        })?;

        let created_metadata =
            std::fs::symlink_metadata(&path).map_err(|e| ChannelError::FifoCreate {
                path: path.clone(),
                source: e,
            })?;
        let created_inode = Some((created_metadata.dev(), created_metadata.ino()));

        info!(?path, "created length fifo");

        Ok(Self {
            path,
            created_inode,
        })
    }

    /// Open the write end (blocking).
    ///
    /// Blocks until the consumer has opened the read end.
    pub fn open_writer(&self) -> Result<File> {
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| ChannelError::FifoOpen {
                path: self.path.clone(),
                source: e,
            })?;
        debug!(path = ?self.path, "opened fifo write end");
        Ok(file)
    }

    /// Open the read end of the FIFO at `path` (blocking).
    ///
    /// Blocks until a writer has opened the other end. The consumer calls
    /// this without owning the filesystem entry.
    pub fn open_reader(path: impl AsRef<Path>) -> Result<File> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| ChannelError::FifoOpen {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(?path, "opened fifo read end");
        Ok(file)
    }

    /// The path this FIFO was created at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LengthFifo {
    fn drop(&mut self) {
        if let Some((expected_dev, expected_ino)) = self.created_inode {
            if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
                if metadata.file_type().is_fifo()
                    && metadata.dev() == expected_dev
                    && metadata.ino() == expected_ino
                {
                    debug!(path = ?self.path, "unlinking fifo");
                    let _ = std::fs::remove_file(&self.path);
                } else {
                    debug!(
                        path = ?self.path,
                        "fifo path identity changed; skipping unlink"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn temp_fifo_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cmdferry-fifo-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("len.fifo")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn create_applies_permissive_mode() {
        let path = temp_fifo_path("mode");
        let fifo = LengthFifo::create(&path).unwrap();

        let metadata = std::fs::symlink_metadata(&path).unwrap();
        assert!(metadata.file_type().is_fifo());
        assert_eq!(metadata.permissions().mode() & 0o777, 0o660);

        drop(fifo);
        cleanup(&path);
    }

    #[test]
    fn create_replaces_stale_fifo() {
        let path = temp_fifo_path("stale");
        let first = LengthFifo::create(&path).unwrap();
        // Simulate a leftover entry from a crashed producer.
        std::mem::forget(first);

        let second = LengthFifo::create(&path).unwrap();
        assert!(path.exists());

        drop(second);
        cleanup(&path);
    }

    #[test]
    fn create_rejects_existing_non_fifo() {
        let path = temp_fifo_path("regular");
        std::fs::write(&path, b"regular-file").unwrap();

        let result = LengthFifo::create(&path);
        assert!(matches!(result, Err(ChannelError::FifoCreate { .. })));
        assert!(path.exists(), "non-fifo file must never be removed");

        cleanup(&path);
    }

    #[test]
    fn drop_unlinks_fifo() {
        let path = temp_fifo_path("unlink");
        let fifo = LengthFifo::create(&path).unwrap();
        assert!(path.exists());

        drop(fifo);
        assert!(!path.exists(), "fifo entry should be unlinked on drop");
        cleanup(&path);
    }

    #[test]
    fn drop_does_not_remove_replaced_path() {
        let path = temp_fifo_path("replaced");
        let fifo = LengthFifo::create(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::write(&path, b"replacement-file").unwrap();

        drop(fifo);
        assert!(
            path.exists(),
            "drop must not remove path if inode identity changed"
        );
        cleanup(&path);
    }

    #[test]
    fn writer_and_reader_rendezvous() {
        let path = temp_fifo_path("rendezvous");
        let fifo = LengthFifo::create(&path).unwrap();

        let reader_path = path.clone();
        let reader = std::thread::spawn(move || {
            let mut file = LengthFifo::open_reader(&reader_path).unwrap();
            let mut buf = String::new();
            file.read_to_string(&mut buf).unwrap();
            buf
        });

        let mut writer = fifo.open_writer().unwrap();
        writer.write_all(b"42").unwrap();
        drop(writer);

        assert_eq!(reader.join().unwrap(), "42");
        drop(fifo);
        cleanup(&path);
    }
}
