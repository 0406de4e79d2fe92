use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::unix::pipe;
use tokio_util::sync::CancellationToken;

use crate::command::{Command, CommandQueue};

/// Reads newline-delimited command text from a named pipe and feeds the
/// command queue. Writers come and go: end-of-input closes the session
/// and the pipe is reopened after the retry interval, which also
/// throttles the no-writer case. Transient open and read errors take
/// the same retry path; nothing here is fatal once the FIFO exists.
pub struct CommandPipe {
    path: PathBuf,
    queue: CommandQueue,
    retry: Duration,
}

impl CommandPipe {
    pub fn new(path: PathBuf, queue: CommandQueue, retry: Duration) -> Self {
        Self { path, queue, retry }
    }

    pub async fn run(self, cancel: CancellationToken) {
        if let Err(e) = ensure_fifo(&self.path) {
            log::error!("cannot create command pipe {}: {e}", self.path.display());
            return;
        }
        log::info!("listening for commands on {}", self.path.display());
        loop {
            match pipe::OpenOptions::new().open_receiver(&self.path) {
                Ok(receiver) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        outcome = self.session(receiver) => match outcome {
                            Ok(count) => log::debug!("pipe writer closed after {count} commands"),
                            Err(e) => log::warn!("pipe read error: {e}"),
                        },
                    }
                }
                Err(e) => log::warn!("pipe open failed: {e}"),
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.retry) => {}
            }
        }
        log::info!("pipe command reader stopped");
    }

    /// One writer session, read until end-of-input. The receiver is
    /// opened non-blocking; reads park on the reactor, never on a
    /// thread the other tasks share.
    async fn session(&self, receiver: pipe::Receiver) -> io::Result<usize> {
        let mut lines = BufReader::new(receiver).lines();
        let mut count = 0usize;
        while let Some(line) = lines.next_line().await? {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            log::debug!("pipe command: {text:?}");
            self.queue.push(Command::new(text));
            count += 1;
        }
        Ok(count)
    }
}

/// Create the FIFO unless it already exists.
fn ensure_fifo(path: &Path) -> io::Result<()> {
    let raw = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "nul byte in pipe path"))?;
    if unsafe { libc::mkfifo(raw.as_ptr(), 0o644) } != 0 {
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(err);
        }
    }
    Ok(())
}
