//! Command execution - run a shell command, tee its output live, capture everything

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// Outcome of a single command run.
///
/// Created once by [`run_command`] and read-only afterwards. `stdout` and
/// `stderr` hold the complete captured streams; any truncation happens later,
/// at render time.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// The exact command string that was handed to the shell
    pub command: String,
    /// Child exit code (128 + signal on unix when signal-terminated)
    pub exit_code: i32,
    /// Full captured stdout
    pub stdout: String,
    /// Full captured stderr
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Elapsed seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 1000.0
    }

    /// Formatted full log: command, timing block, STDOUT/STDERR sections
    /// (omitted when empty) and an exit footer. Never truncated.
    pub fn combined_log(&self) -> String {
        fn fmt_ts(dt: &DateTime<Utc>) -> String {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S %Z")
                .to_string()
        }

        let mut lines: Vec<String> = vec![
            format!("$ {}", self.command),
            String::new(),
            "── Timing ───────────────────────────────────".to_string(),
            format!("  Started:  {}", fmt_ts(&self.started_at)),
            format!("  Finished: {}", fmt_ts(&self.finished_at)),
            format!("  Duration: {:.1}s", self.duration_secs()),
            String::new(),
        ];

        if !self.stdout.is_empty() {
            lines.push("── STDOUT ───────────────────────────────────".to_string());
            lines.push(String::new());
            lines.push(self.stdout.trim_end_matches('\n').to_string());
            lines.push(String::new());
        }

        if !self.stderr.is_empty() {
            lines.push("── STDERR ───────────────────────────────────".to_string());
            lines.push(String::new());
            lines.push(self.stderr.trim_end_matches('\n').to_string());
            lines.push(String::new());
        }

        let status = if self.succeeded() { "OK" } else { "FAILED" };
        lines.push("── Exit ─────────────────────────────────────".to_string());
        lines.push(format!("  Code:   {}  ({})", self.exit_code, status));
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Run `command` through a shell, tee-ing output to the terminal while
/// capturing it.
///
/// The command goes through a shell interpreter so pipes, redirects and
/// globbing behave as the user typed them. Fails only when the shell itself
/// cannot be spawned; a non-zero child exit is captured as data.
///
/// stdout and stderr are drained on two parallel threads so that a child
/// producing large interleaved output never deadlocks on a full pipe buffer.
/// Each drain path owns its accumulator exclusively and both paths are joined
/// before the result is assembled.
pub fn run_command(command: &str) -> Result<RunResult> {
    let started_at = Utc::now();

    let mut child = shell_command(command)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn shell for: {}", command))?;

    let stdout_pipe = child.stdout.take().context("child stdout was not piped")?;
    let stderr_pipe = child.stderr.take().context("child stderr was not piped")?;

    let (stdout_bytes, stderr_bytes) = thread::scope(|s| {
        let out = s.spawn(move || drain(stdout_pipe, &mut io::stdout()));
        let err = s.spawn(move || drain(stderr_pipe, &mut io::stderr()));
        let out = out.join().unwrap_or_else(|_| {
            Err(io::Error::new(io::ErrorKind::Other, "stdout drain thread panicked"))
        });
        let err = err.join().unwrap_or_else(|_| {
            Err(io::Error::new(io::ErrorKind::Other, "stderr drain thread panicked"))
        });
        (out, err)
    });
    // Reap the child before surfacing any drain error so a failed drain path
    // cannot leak an unwaited process.
    let status = child.wait().context("failed to wait for child process")?;
    let finished_at = Utc::now();

    let stdout_bytes = stdout_bytes.context("failed to drain child stdout")?;
    let stderr_bytes = stderr_bytes.context("failed to drain child stderr")?;

    Ok(RunResult {
        command: command.to_string(),
        exit_code: exit_code(status),
        stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        started_at,
        finished_at,
    })
}

/// Read one stream to completion, echoing each chunk to `echo` (flushed per
/// line) and accumulating the raw bytes.
fn drain(pipe: impl Read, echo: &mut impl Write) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(pipe);
    let mut captured = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        echo.write_all(&line)?;
        echo.flush()?;
        captured.extend_from_slice(&line);
    }
    Ok(captured)
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
