//! Child process capture.
//!
//! Spawns a command with its output redirected into a single pipe, drains the
//! pipe on a reader thread while the child runs, and always reaps the child.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Which child streams end up in the captured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// stdout and stderr share one pipe, preserving program order.
    Merged,
    /// stdout only; stderr is discarded.
    StdoutOnly,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

/// Captured output and exit status of a completed child.
#[derive(Debug)]
pub struct CapturedRun {
    pub output: Vec<u8>,
    pub status: ExitStatus,
}

impl CapturedRun {
    /// Exit code, `None` when the child was killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Owns a spawned child and reaps it on every exit path.
///
/// The child leads its own process group, so a kill also reaches anything it
/// left running in the background.
struct ChildGuard {
    child: Option<Child>,
    group: u32,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        let group = child.id();
        Self {
            child: Some(child),
            group,
        }
    }

    fn wait(&mut self, deadline: Option<Duration>) -> Result<ExitStatus, ProcessError> {
        let Some(child) = self.child.as_mut() else {
            return Err(ProcessError::Io(std::io::Error::other("child already reaped")));
        };

        let status = match deadline {
            None => child.wait().map_err(ProcessError::Io)?,
            Some(limit) => {
                let started = Instant::now();
                loop {
                    if let Some(status) = child.try_wait().map_err(ProcessError::Io)? {
                        break status;
                    }
                    if started.elapsed() >= limit {
                        self.kill();
                        return Err(ProcessError::TimedOut(limit));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };
        self.child = None;
        Ok(status)
    }

    /// Kill the whole process group and reap the child if it is still ours.
    fn kill(&mut self) {
        kill_group(self.group);
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.kill();
        }
    }
}

#[cfg(unix)]
fn isolate_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_group(_command: &mut Command) {}

#[cfg(unix)]
fn kill_group(group: u32) {
    let Ok(pgid) = i32::try_from(group) else {
        return;
    };
    // SAFETY: kill(2) with a negative pid only signals that process group.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_group: u32) {}

/// Run `command` to completion and capture its output.
///
/// The command is consumed so the parent's copies of the pipe's write end are
/// closed before reading; otherwise the reader would never see EOF. The
/// deadline covers both the child's exit and the pipe reaching EOF.
pub fn run_captured(
    mut command: Command,
    mode: StreamMode,
    deadline: Option<Duration>,
) -> Result<CapturedRun, ProcessError> {
    let (reader, writer) = std::io::pipe().map_err(ProcessError::Io)?;
    command.stdin(Stdio::null());
    match mode {
        StreamMode::Merged => {
            let stderr_writer = writer.try_clone().map_err(ProcessError::Io)?;
            command.stdout(writer);
            command.stderr(stderr_writer);
        }
        StreamMode::StdoutOnly => {
            command.stdout(writer);
            command.stderr(Stdio::null());
        }
    }
    isolate_group(&mut command);

    let started = Instant::now();
    let child = command.spawn().map_err(ProcessError::Spawn)?;
    drop(command);
    let mut guard = ChildGuard::new(child);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut reader = reader;
        let mut buf = Vec::new();
        let _ = tx.send(reader.read_to_end(&mut buf).map(|_| buf));
    });

    let status = guard.wait(deadline)?;

    let drained = match deadline {
        None => rx.recv().map_err(|_| reader_gone())?,
        Some(limit) => match rx.recv_timeout(limit.saturating_sub(started.elapsed())) {
            Ok(drained) => drained,
            Err(RecvTimeoutError::Timeout) => {
                // The child exited but something it started still holds the pipe.
                kill_group(guard.group);
                return Err(ProcessError::TimedOut(limit));
            }
            Err(RecvTimeoutError::Disconnected) => return Err(reader_gone()),
        },
    };
    let output = drained.map_err(ProcessError::Io)?;

    Ok(CapturedRun { output, status })
}

fn reader_gone() -> ProcessError {
    ProcessError::Io(std::io::Error::other("output reader stopped"))
}
