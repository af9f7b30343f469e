//! Spawns the tool and streams its classified output to an [`EventSink`].

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::classify::ClassifiedLine;
use crate::classify::OutputEvent;
use crate::config::AntConfig;
use crate::config::MessageImportance;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Warning;
use crate::error::AntError;
use crate::error::Result;
use crate::quote::unquote;
use crate::task::ExternalTool;

/// Exit code reported when the tool was killed for running too long.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const LINE_CHANNEL_CAPACITY: usize = 1024;

// Grandchildren may keep the pipes open after the child exits.
const IO_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    Warning {
        warning: Warning,
    },
    Started {
        program: PathBuf,
        args: Vec<String>,
    },
    Output {
        stream: OutputStream,
        line: ClassifiedLine,
    },
    Finished {
        exit_code: i32,
        timed_out: bool,
    },
}

/// Receives events in the order they happened.
pub trait EventSink {
    fn on_event(&mut self, event: TaskEvent);
}

impl EventSink for Vec<TaskEvent> {
    fn on_event(&mut self, event: TaskEvent) {
        self.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: TaskEvent) {
        match event {
            // Already logged when it was raised.
            TaskEvent::Warning { .. } => {}
            TaskEvent::Started { program, args } => {
                tracing::info!(target: "ant", "starting {} {}", program.display(), args.join(" "));
            }
            TaskEvent::Output { line, .. } => match line.event {
                OutputEvent::CompileWarning {
                    source_file,
                    line_number,
                    message,
                } => tracing::warn!(target: "ant", "{source_file}:{line_number}:{message}"),
                OutputEvent::PhaseBoundary { name } => tracing::info!(target: "ant", "{name}:"),
                OutputEvent::Message { text, importance } => match importance {
                    MessageImportance::High => tracing::info!(target: "ant", "{text}"),
                    MessageImportance::Normal => tracing::debug!(target: "ant", "{text}"),
                    MessageImportance::Low => tracing::trace!(target: "ant", "{text}"),
                },
            },
            TaskEvent::Finished {
                exit_code,
                timed_out,
            } => {
                if timed_out {
                    tracing::warn!(target: "ant", "timed out");
                } else {
                    tracing::info!(target: "ant", "exited with code {exit_code}");
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunParams {
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub stdout_importance: MessageImportance,
    pub stderr_importance: MessageImportance,
}

impl RunParams {
    fn importance(&self, stream: OutputStream) -> MessageImportance {
        match stream {
            OutputStream::Stdout => self.stdout_importance,
            OutputStream::Stderr => self.stderr_importance,
        }
    }
}

impl From<&AntConfig> for RunParams {
    fn from(config: &AntConfig) -> Self {
        Self {
            cwd: config.cwd.clone(),
            env: config.env.clone(),
            timeout: config.timeout,
            stdout_importance: config.stdout_importance,
            stderr_importance: config.stderr_importance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub timed_out: bool,
    pub duration: Duration,
    pub compile_warnings: usize,
    pub warnings: Vec<Warning>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Runs `tool` to completion.
///
/// Fatal configuration problems are returned before anything is spawned.
/// Lines from stdout and stderr are classified one at a time, in the order
/// they arrive, and handed to `sink`.
pub async fn run_tool<T>(tool: &T, params: &RunParams, sink: &mut dyn EventSink) -> Result<RunOutcome>
where
    T: ExternalTool + ?Sized,
{
    let program = tool.locate_tool()?;
    let mut diagnostics = Diagnostics::new();
    let args = tool.command_line_args(&mut diagnostics)?;
    for warning in diagnostics.warnings() {
        sink.on_event(TaskEvent::Warning {
            warning: warning.clone(),
        });
    }

    tracing::debug!(
        "running {}: {} {}",
        tool.tool_name(),
        program.display(),
        args.join(" ")
    );
    sink.on_event(TaskEvent::Started {
        program: program.clone(),
        args: args.clone(),
    });

    let mut command = Command::new(&program);
    command
        .args(args.iter().map(|arg| unquote(arg).into_owned()))
        .envs(&params.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &params.cwd {
        command.current_dir(cwd);
    }

    let start = Instant::now();
    let mut child = command.spawn().map_err(|source| {
        tracing::error!("failed to spawn {}: {source}", program.display());
        AntError::Spawn {
            program: program.clone(),
            source,
        }
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout pipe was unexpectedly not available"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr pipe was unexpectedly not available"))?;

    let (tx, mut rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
    let readers = [
        tokio::spawn(forward_lines(stdout, OutputStream::Stdout, tx.clone())),
        tokio::spawn(forward_lines(stderr, OutputStream::Stderr, tx)),
    ];

    let mut compile_warnings = 0;
    let (status, timed_out) = {
        let dispatch = dispatch_lines(tool, params, &mut rx, sink, &mut compile_warnings);
        tokio::pin!(dispatch);
        let wait = wait_for_exit(&mut child, params.timeout);
        tokio::pin!(wait);

        let mut drained = false;
        let exited = loop {
            tokio::select! {
                exited = &mut wait => break exited?,
                () = &mut dispatch, if !drained => drained = true,
            }
        };
        if exited.1 {
            tracing::warn!(
                "{} did not finish within {:?}; killed it",
                tool.tool_name(),
                params.timeout.unwrap_or_default()
            );
        }
        if !drained
            && tokio::time::timeout(IO_DRAIN_TIMEOUT, &mut dispatch)
                .await
                .is_err()
        {
            tracing::debug!("output pipes still open after exit; no longer reading them");
        }
        exited
    };

    for reader in readers {
        finish_reader(reader).await;
    }

    let exit_code = if timed_out {
        TIMEOUT_EXIT_CODE
    } else {
        status.code().unwrap_or(-1)
    };
    sink.on_event(TaskEvent::Finished {
        exit_code,
        timed_out,
    });

    Ok(RunOutcome {
        exit_code,
        timed_out,
        duration: start.elapsed(),
        compile_warnings,
        warnings: diagnostics.into_warnings(),
    })
}

/// Waits for the child, killing it once `timeout` elapses. The flag reports
/// whether it was killed.
async fn wait_for_exit(
    child: &mut Child,
    timeout: Option<Duration>,
) -> io::Result<(ExitStatus, bool)> {
    let Some(timeout) = timeout else {
        return Ok((child.wait().await?, false));
    };
    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => Ok((status?, false)),
        Err(_) => {
            child.start_kill()?;
            Ok((child.wait().await?, true))
        }
    }
}

async fn dispatch_lines<T>(
    tool: &T,
    params: &RunParams,
    rx: &mut mpsc::Receiver<(OutputStream, String)>,
    sink: &mut dyn EventSink,
    compile_warnings: &mut usize,
) where
    T: ExternalTool + ?Sized,
{
    while let Some((stream, line)) = rx.recv().await {
        let classified = tool.classify_line(&line, params.importance(stream));
        if matches!(classified.event, OutputEvent::CompileWarning { .. }) {
            *compile_warnings += 1;
        }
        sink.on_event(TaskEvent::Output {
            stream,
            line: classified,
        });
    }
}

async fn forward_lines<R>(
    reader: R,
    stream: OutputStream,
    tx: mpsc::Sender<(OutputStream, String)>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if tx.send((stream, decode_line(&buf))).await.is_err() {
            return Ok(());
        }
    }
}

async fn finish_reader(reader: JoinHandle<io::Result<()>>) {
    if !reader.is_finished() {
        reader.abort();
        return;
    }
    match reader.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::warn!("failed to read tool output: {err}"),
        Err(err) => tracing::warn!("output reader task failed: {err}"),
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
