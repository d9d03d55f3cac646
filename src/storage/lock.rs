use std::fs::{File, OpenOptions};
use std::path::Path;
use crate::core::error::{Error, ErrorKind, Result};

/// Single writer per journal, held for the lifetime of the store handle.
///
/// Uses `flock`, so the lock dies with the process and a crashed writer never
/// leaves a stale lock behind.
pub struct StoreLock {
    pub file: File,
}

impl StoreLock {
    /// Takes the exclusive lock at `path` without blocking.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            use libc::{flock, LOCK_EX, LOCK_NB};

            let fd = file.as_raw_fd();
            // SAFETY: fd belongs to `file`, which outlives the call
            if unsafe { flock(fd, LOCK_EX | LOCK_NB) } != 0 {
                return Err(Error::new(
                    ErrorKind::InvalidState,
                    format!("{} is held by another process", path.display()),
                ));
            }
        }

        Ok(StoreLock { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            use libc::{flock, LOCK_UN};

            let fd = self.file.as_raw_fd();
            unsafe {
                flock(fd, LOCK_UN);
            }
        }
    }
}
