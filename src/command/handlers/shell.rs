//! Shell execution: run_command

use crate::actions::params::CommandParams;
use crate::core::error::{HandlerError, HandlerResult};
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Bounds applied to every shell run
#[derive(Debug, Clone, Copy)]
pub struct ShellLimits {
    pub timeout: Duration,
    pub output_limit: usize,
}

impl Default for ShellLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            output_limit: 500,
        }
    }
}

/// Run through the platform shell.
///
/// Everything the shell starts is killed if the run outlives
/// `limits.timeout`: pipelines, subshells and background jobs included.
/// Stdout is reported, or stderr when stdout is empty, cut to
/// `limits.output_limit` characters.
pub async fn run_command(params: &CommandParams, limits: ShellLimits) -> HandlerResult {
    let mut cmd = shell_command(&params.command);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| HandlerError::io("Failed to run command", e))?;
    // Also fires if this future is dropped mid-run (session interrupted)
    let mut tree = TreeGuard { pid: child.id() };

    let waited = tokio::time::timeout(limits.timeout, collect_output(&mut child)).await;
    let output = match waited {
        Ok(result) => {
            tree.disarm();
            result.map_err(|e| HandlerError::io("Failed to run command", e))?
        }
        Err(_) => {
            tracing::warn!(command = %params.command, "Command timed out, killing its process tree");
            drop(tree);
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "Shell already gone");
            }
            return Err(HandlerError::TimedOut {
                command: params.command.clone(),
                seconds: limits.timeout.as_secs(),
            });
        }
    };

    let stream = if output.stdout.is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    let text = String::from_utf8_lossy(stream);

    if text.trim().is_empty() {
        return Ok(match output.status.code() {
            Some(code) => format!("Command finished with no output (exit code {})", code),
            None => "Command finished with no output".to_string(),
        });
    }

    Ok(format!(
        "Command output: {}",
        truncate_chars(&text, limits.output_limit)
    ))
}

/// Wait for exit while draining both pipes, leaving `child` usable afterwards
async fn collect_output(child: &mut Child) -> io::Result<Output> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (status, stdout, stderr) =
        tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kills the process tree rooted at the shell when dropped, unless disarmed
struct TreeGuard {
    pid: Option<u32>,
}

impl TreeGuard {
    fn disarm(&mut self) {
        self.pid = None;
    }
}

impl Drop for TreeGuard {
    fn drop(&mut self) {
        if let Some(pid) = self.pid.take() {
            if let Err(e) = kill_process_tree(pid) {
                tracing::warn!(pid, error = %e, "Failed to kill command process tree");
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    // New group led by the shell, so the whole tree can be signalled at once
    cmd.process_group(0);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(unix)]
fn kill_process_tree(pgid: u32) -> io::Result<()> {
    let pgid = libc::pid_t::try_from(pgid)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    // Negative pid addresses every member of the group
    let result = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(windows)]
fn kill_process_tree(pid: u32) -> io::Result<()> {
    let status = std::process::Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("taskkill exited with {}", status),
        ))
    }
}

/// Longest prefix of `text` with at most `limit` characters
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
