//! External command execution.
//!
//! Output pipes are drained on reader threads so a chatty child (image pull
//! progress) can never block on a full pipe while we poll for exit.

use std::{
    io::Read,
    process::{Child, Command, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use berth_core::{
    application::{
        ApplicationError,
        ports::{CommandSpec, ProcessOutput, ProcessRunner, Sleeper},
    },
    error::BerthResult,
};
use tracing::{debug, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs commands with `std::process`, enforcing [`CommandSpec::timeout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip_all, fields(program = %command.program))]
    fn run(&self, command: &CommandSpec) -> BerthResult<ProcessOutput> {
        debug!(command = %command.display(), cwd = %command.working_dir.display(), "spawning");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ApplicationError::ProcessSpawn {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_with_timeout(&mut child, command.timeout) {
            Ok(status) => status,
            Err(WaitError::TimedOut(limit)) => {
                warn!(seconds = limit.as_secs(), "command timed out, killing");
                let _ = child.kill();
                let _ = child.wait();
                return Err(ApplicationError::ProcessTimedOut {
                    program: command.program.clone(),
                    seconds: limit.as_secs(),
                }
                .into());
            }
            Err(WaitError::Io(e)) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ApplicationError::ProcessSpawn {
                    program: command.program.clone(),
                    reason: e.to_string(),
                }
                .into());
            }
        };

        let output = ProcessOutput {
            success: status.success(),
            exit_code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };
        debug!(exit_code = ?output.exit_code, "finished");
        Ok(output)
    }
}

enum WaitError {
    TimedOut(Duration),
    Io(std::io::Error),
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
) -> Result<std::process::ExitStatus, WaitError> {
    let Some(limit) = timeout else {
        return child.wait().map_err(WaitError::Io);
    };

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if started.elapsed() >= limit => return Err(WaitError::TimedOut(limit)),
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(WaitError::Io(e)),
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Blocking sleep on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
