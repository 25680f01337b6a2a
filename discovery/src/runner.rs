//! Interpreter invocation.
//!
//! All introspection goes through the [`CommandRunner`] capability: hand it a
//! query, get the interpreter's entire stdout back or an
//! [`InvocationError`]. [`ProcessRunner`] launches a real interpreter
//! process; [`ScriptedRunner`] replays canned output for tests and offline
//! use.
//!
//! Calls block until the interpreter exits. Each request can be aborted
//! through a [`CancelToken`], which kills the child process.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use crate::config::InterpreterSpec;
use crate::error::InvocationError;

/// Interval between cancellation checks while waiting on a child.
const WAIT_SLICE: Duration = Duration::from_millis(25);

/// Maximum stderr characters kept in a [`InvocationError::NonZeroExit`].
const STDERR_PREVIEW_CHARS: usize = 400;

/// Per-request cancellation flag.
///
/// Clones share the same flag, so one clone can be handed to the thread
/// running the request and another kept by whoever may cancel it.
///
/// # Examples
///
/// ```
/// use psform_discovery::runner::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs one interpreter query and returns its stdout.
pub trait CommandRunner: Send + Sync {
    /// Short label for logs and errors (usually the program name).
    fn label(&self) -> &str;

    /// Runs `query` to completion.
    ///
    /// # Errors
    ///
    /// Any [`InvocationError`]: missing binary, non-zero exit, timeout or
    /// cancellation.
    fn run(&self, query: &str, cancel: &CancelToken) -> Result<String, InvocationError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn run(&self, query: &str, cancel: &CancelToken) -> Result<String, InvocationError> {
        (**self).run(query, cancel)
    }
}

/// Launches the interpreter as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// `program` is invoked with `args` followed by the query as the last
    /// argument.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    pub fn from_spec(spec: &InterpreterSpec, timeout: Option<Duration>) -> Self {
        Self::new(spec.program.clone(), spec.args.clone()).with_timeout(timeout)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn spawn(&self, query: &str) -> Result<Child, InvocationError> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(query)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    InvocationError::NotFound {
                        program: self.program.clone(),
                    }
                } else {
                    InvocationError::Spawn {
                        program: self.program.clone(),
                        source: e,
                    }
                }
            })
    }

    fn kill(&self, child: &mut Child) {
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl CommandRunner for ProcessRunner {
    fn label(&self) -> &str {
        &self.program
    }

    fn run(&self, query: &str, cancel: &CancelToken) -> Result<String, InvocationError> {
        if cancel.is_cancelled() {
            return Err(InvocationError::Cancelled {
                program: self.program.clone(),
            });
        }

        debug!(program = %self.program, query, "Launching interpreter");
        let mut child = self.spawn(query)?;

        // Drain both pipes in the background so a chatty child cannot block
        // on a full pipe buffer while we wait for it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            if cancel.is_cancelled() {
                debug!(program = %self.program, "Cancelling interpreter invocation");
                self.kill(&mut child);
                return Err(InvocationError::Cancelled {
                    program: self.program.clone(),
                });
            }
            let slice = match self.timeout {
                Some(timeout) => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        debug!(
                            program = %self.program,
                            timeout_ms = timeout.as_millis() as u64,
                            "Interpreter timed out, killing process"
                        );
                        self.kill(&mut child);
                        return Err(InvocationError::TimedOut {
                            program: self.program.clone(),
                            timeout_ms: timeout.as_millis() as u64,
                        });
                    }
                    WAIT_SLICE.min(timeout - elapsed)
                }
                None => WAIT_SLICE,
            };
            match child.wait_timeout(slice) {
                Ok(Some(status)) => break status,
                Ok(None) => continue,
                Err(e) => {
                    self.kill(&mut child);
                    return Err(InvocationError::Io(e));
                }
            }
        };

        let stdout = collect(stdout)?;
        let stderr = collect(stderr).unwrap_or_default();

        if !status.success() {
            return Err(InvocationError::NonZeroExit {
                program: self.program.clone(),
                code: status.code(),
                stderr: stderr_preview(&stderr),
            });
        }

        debug!(
            program = %self.program,
            elapsed_ms = started.elapsed().as_millis() as u64,
            output_len = stdout.len(),
            "Interpreter finished"
        );
        Ok(stdout)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<String, InvocationError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let buf = handle
        .join()
        .map_err(|_| std::io::Error::other("pipe reader thread panicked"))??;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn stderr_preview(stderr: &str) -> String {
    let trimmed = stderr.trim();
    match trimmed.char_indices().nth(STDERR_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Replays canned responses instead of launching a process.
///
/// Responses are consumed in order; every query is recorded. Once the
/// script is exhausted further calls return empty output.
///
/// # Examples
///
/// ```
/// use psform_discovery::runner::{CancelToken, CommandRunner, ScriptedRunner};
///
/// let runner = ScriptedRunner::new("pwsh").respond("Name\n----\nGet-Foo\n");
/// let out = runner.run("Get-Command", &CancelToken::new()).unwrap();
/// assert!(out.contains("Get-Foo"));
/// assert_eq!(runner.calls(), ["Get-Command"]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    label: String,
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Queues a successful response.
    pub fn respond(self, stdout: impl Into<String>) -> Self {
        self.push(Ok(stdout.into()))
    }

    /// Queues a non-zero exit with the given stderr.
    pub fn fail(self, stderr: impl Into<String>) -> Self {
        self.push(Err(stderr.into()))
    }

    fn push(self, response: Result<String, String>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for ScriptedRunner {
    fn label(&self) -> &str {
        &self.label
    }

    fn run(&self, query: &str, cancel: &CancelToken) -> Result<String, InvocationError> {
        if cancel.is_cancelled() {
            return Err(InvocationError::Cancelled {
                program: self.label.clone(),
            });
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.to_string());
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        match next {
            Some(Ok(stdout)) => Ok(stdout),
            Some(Err(stderr)) => Err(InvocationError::NonZeroExit {
                program: self.label.clone(),
                code: Some(1),
                stderr,
            }),
            None => Ok(String::new()),
        }
    }
}
