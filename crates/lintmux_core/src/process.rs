//! Running one linter process under a deadline.
//!
//! The deadline covers the whole job: waiting for the process and draining
//! its output. A background child that inherits the pipes keeps them open
//! after the linter itself exits, so both must finish in time.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender};

use crate::error::JobError;
use crate::job::Job;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything a finished linter process left behind.
///
/// Exit status and output are independent; a non-zero status says nothing
/// about whether the output is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was ended by a signal.
    pub status: Option<i32>,
    pub elapsed: Duration,
}

impl RawOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

type Chunk = (Stream, io::Result<String>);

/// Runs `job` to completion, killing it once `deadline` has passed.
///
/// On unix the process gets its own process group, and a timeout kills the
/// whole group so that children spawned through a shell die with it.
pub fn run(job: &Job, dir: Option<&Path>, deadline: Option<Duration>) -> Result<RawOutput, JobError> {
    let mut command = Command::new(&job.program);
    command
        .args(&job.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let start = Instant::now();
    let expires = deadline.map(|deadline| start + deadline);
    let mut child = command.spawn().map_err(|source| JobError::Launch {
        linter: job.linter.clone(),
        path: job.path.clone(),
        program: job.program.clone(),
        source,
    })?;

    let timed_out = |deadline: Duration| JobError::Timeout {
        linter: job.linter.clone(),
        path: job.path.clone(),
        deadline,
    };
    let io_error = |source: io::Error| JobError::Io {
        linter: job.linter.clone(),
        path: job.path.clone(),
        source,
    };

    let (tx, rx) = crossbeam_channel::unbounded::<Chunk>();
    let mut pending = 0;
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(stdout, Stream::Stdout, tx.clone());
        pending += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(stderr, Stream::Stderr, tx.clone());
        pending += 1;
    }
    drop(tx);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if let (Some(deadline), Some(expires)) = (deadline, expires)
                    && Instant::now() >= expires
                {
                    kill(&mut child);
                    return Err(timed_out(deadline));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                kill(&mut child);
                return Err(io_error(source));
            }
        }
    };

    let mut output = RawOutput {
        status: status.code(),
        ..RawOutput::default()
    };
    for _ in 0..pending {
        let received = match expires {
            Some(expires) => rx.recv_deadline(expires),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok((stream, text)) => {
                let text = text.map_err(io_error)?;
                match stream {
                    Stream::Stdout => output.stdout = text,
                    Stream::Stderr => output.stderr = text,
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // The linter exited but something it started still holds
                // the pipes open; the group id outlives the leader.
                kill(&mut child);
                return Err(timed_out(deadline.unwrap_or_default()));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io_error(io::Error::other("output reader stopped early")));
            }
        }
    }
    output.elapsed = start.elapsed();
    Ok(output)
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R, stream: Stream, tx: Sender<Chunk>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let text = reader
            .read_to_end(&mut buf)
            .map(|_| String::from_utf8_lossy(&buf).into_owned());
        // The receiver is gone once the job has timed out.
        tx.send((stream, text)).ok();
    });
}

#[cfg(unix)]
fn kill(child: &mut Child) {
    if let Ok(pid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg only sends a signal; the group id is our child's pid.
        unsafe {
            libc::killpg(pid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
