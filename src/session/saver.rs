//! Debounced background writer for session files.
//!
//! [`DebouncedSaver::request`] hands the latest encoded session to a worker
//! thread. The worker waits for the configured delay; a newer request that
//! arrives first replaces the pending bytes and restarts the wait, so only the
//! most recent state is written. At most one write is ever pending. A write
//! that has started is always completed.

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error};

enum Request {
    Save(Vec<u8>),
    Flush(Sender<()>),
}

/// Handle onto the writer thread of one session file.
///
/// Dropping the handle writes whatever is still pending and joins the thread.
#[derive(Debug)]
pub struct DebouncedSaver {
    requests: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    /// Start a writer for `path` that waits `delay` before writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(path: impl Into<PathBuf>, delay: Duration) -> std::io::Result<Self> {
        let path = path.into();
        let (tx, rx) = unbounded();
        let worker = std::thread::Builder::new()
            .name("session-saver".to_owned())
            .spawn(move || run(&path, delay, &rx))?;
        Ok(Self {
            requests: Some(tx),
            worker: Some(worker),
        })
    }

    /// Schedule `bytes` to be written, superseding any pending write.
    pub fn request(&self, bytes: Vec<u8>) {
        if let Some(tx) = &self.requests
            && tx.send(Request::Save(bytes)).is_err()
        {
            error!("Session saver stopped; save request dropped");
        }
    }

    /// Write any pending bytes now and wait until they are on disk.
    pub fn flush(&self) {
        let Some(tx) = &self.requests else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(Request::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        // Closing the channel tells the worker to write what is pending and stop.
        self.requests.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("Session saver thread panicked");
        }
    }
}

fn run(path: &Path, delay: Duration, requests: &Receiver<Request>) {
    let mut pending: Option<Vec<u8>> = None;
    loop {
        let Some(bytes) = pending.take() else {
            match requests.recv() {
                Ok(Request::Save(bytes)) => pending = Some(bytes),
                Ok(Request::Flush(ack)) => {
                    let _ = ack.send(());
                }
                Err(_) => return,
            }
            continue;
        };

        select! {
            recv(requests) -> request => match request {
                Ok(Request::Save(newer)) => {
                    debug!(path = %path.display(), "Coalescing session save");
                    pending = Some(newer);
                }
                Ok(Request::Flush(ack)) => {
                    write(path, &bytes);
                    let _ = ack.send(());
                }
                Err(_) => {
                    write(path, &bytes);
                    return;
                }
            },
            default(delay) => write(path, &bytes),
        }
    }
}

fn write(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent()
        && let Err(err) = fs::create_dir_all(parent)
    {
        error!(path = %parent.display(), error = %err, "Cannot create session directory");
        return;
    }
    match fs::write(path, bytes) {
        Ok(()) => debug!(path = %path.display(), len = bytes.len(), "Session saved"),
        Err(err) => error!(path = %path.display(), error = %err, "Failed to save session"),
    }
}
