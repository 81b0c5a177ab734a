//! Running the archiving tools as subprocesses

use crate::command::{Invocation, InvocationShape};
use crate::error::{PackError, Result};
use crate::options::DEFAULT_MAX_OUTPUT_BUFFER_SIZE;
use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;

/// Limits applied to a single tool run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Maximum number of bytes accepted on stdout or stderr
    pub max_output_buffer_size: usize,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            max_output_buffer_size: DEFAULT_MAX_OUTPUT_BUFFER_SIZE,
        }
    }
}

/// Captured output of a successful tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs [`Invocation`]s
pub trait Executor: Send + Sync {
    /// Run the invocation and wait for it to finish
    fn run_blocking(
        &self,
        invocation: &Invocation,
        options: &ExecOptions,
    ) -> Result<ProcessOutput>;

    /// Run the invocation asynchronously. The subprocess is started when the
    /// returned future is first polled.
    #[cfg(feature = "tokio")]
    fn run_background(
        &self,
        invocation: Invocation,
        options: ExecOptions,
    ) -> futures::future::BoxFuture<'static, Result<ProcessOutput>>;
}

/// [`Executor`] spawning real subprocesses
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    fn command(invocation: &Invocation) -> Result<Command> {
        let mut command = match invocation.shape {
            InvocationShape::Shell => shell_command(&invocation.command_line())?,
            InvocationShape::Direct => {
                let mut command = Command::new(&invocation.program);
                add_args(&mut command, &invocation.args);
                command
            }
        };

        if let Some(working_dir) = &invocation.working_dir {
            command.current_dir(working_dir);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }
}

/// `sh -c` with the tool replacing the shell, so that killing the child stops
/// the tool itself.
fn shell_command(line: &str) -> Result<Command> {
    if cfg!(windows) {
        return Err(PackError::shell_unavailable(line));
    }
    let mut command = Command::new("sh");
    command.arg("-c").arg(format!("exec {line}"));
    Ok(command)
}

// Arguments are already quoted for the Windows command line parser.
#[cfg(windows)]
fn add_args(command: &mut Command, args: &[String]) {
    use std::os::windows::process::CommandExt;
    for arg in args {
        command.raw_arg(arg);
    }
}

#[cfg(not(windows))]
fn add_args(command: &mut Command, args: &[String]) {
    command.args(args);
}

/// Read at most `limit + 1` bytes, enough to tell whether `limit` was exceeded
fn read_bounded(stream: Option<impl Read>, limit: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(stream) = stream {
        stream
            .take(limit.saturating_add(1) as u64)
            .read_to_end(&mut buf)?;
    }
    Ok(buf)
}

#[cfg(feature = "tokio")]
async fn read_bounded_async(
    stream: Option<impl tokio::io::AsyncRead + Unpin>,
    limit: usize,
) -> io::Result<Vec<u8>> {
    use tokio::io::AsyncReadExt;

    let mut buf = Vec::new();
    if let Some(stream) = stream {
        stream
            .take(limit.saturating_add(1) as u64)
            .read_to_end(&mut buf)
            .await?;
    }
    Ok(buf)
}

/// Turn the captured output of a finished tool into a result.
///
/// The output limit is checked before the exit status so that a tool which
/// floods its output is reported as such even when it also fails.
fn check_output(
    invocation: &Invocation,
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    limit: usize,
) -> Result<ProcessOutput> {
    if stdout.len() > limit || stderr.len() > limit {
        return Err(PackError::output_limit_exceeded(
            invocation.command_line(),
            limit,
        ));
    }

    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    if !status.success() {
        return Err(PackError::subprocess(
            invocation.command_line(),
            status.code(),
            &stderr,
        ));
    }

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr,
    })
}

impl Executor for ProcessExecutor {
    fn run_blocking(
        &self,
        invocation: &Invocation,
        options: &ExecOptions,
    ) -> Result<ProcessOutput> {
        tracing::debug!("running `{}`", invocation.command_line());
        let limit = options.max_output_buffer_size;
        let mut child = Self::command(invocation)?
            .spawn()
            .map_err(|err| PackError::spawn(&invocation.program, err))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Each stream is drained on its own thread. The first one to go over
        // the limit kills the tool so the other stream reaches its end.
        let (exceeded, over_limit) = mpsc::channel::<bool>();
        let (stdout, stderr) = std::thread::scope(|scope| {
            let stdout = scope.spawn({
                let exceeded = exceeded.clone();
                move || {
                    let read = read_bounded(stdout, limit);
                    let _ = exceeded.send(matches!(&read, Ok(buf) if buf.len() > limit));
                    read
                }
            });
            let stderr = scope.spawn(move || {
                let read = read_bounded(stderr, limit);
                let _ = exceeded.send(matches!(&read, Ok(buf) if buf.len() > limit));
                read
            });

            for over in over_limit {
                if over {
                    let _ = child.kill();
                }
            }

            (join_reader(stdout), join_reader(stderr))
        });
        let (stdout, stderr) = (stdout?, stderr?);

        let status = child.wait()?;
        check_output(invocation, status, stdout, stderr, limit)
    }

    #[cfg(feature = "tokio")]
    fn run_background(
        &self,
        invocation: Invocation,
        options: ExecOptions,
    ) -> futures::future::BoxFuture<'static, Result<ProcessOutput>> {
        use futures::future::{select, Either};
        use std::pin::pin;

        Box::pin(async move {
            tracing::debug!("running `{}` in the background", invocation.command_line());
            let limit = options.max_output_buffer_size;
            let mut child = tokio::process::Command::from(Self::command(&invocation)?)
                .spawn()
                .map_err(|err| PackError::spawn(&invocation.program, err))?;
            let stdout = pin!(read_bounded_async(child.stdout.take(), limit));
            let stderr = pin!(read_bounded_async(child.stderr.take(), limit));

            // Kill the tool as soon as either stream goes over the limit.
            let (stdout, stderr) = match select(stdout, stderr).await {
                Either::Left((stdout, stderr)) => {
                    let stdout = stdout?;
                    if stdout.len() > limit {
                        let _ = child.start_kill();
                    }
                    (stdout, stderr.await?)
                }
                Either::Right((stderr, stdout)) => {
                    let stderr = stderr?;
                    if stderr.len() > limit {
                        let _ = child.start_kill();
                    }
                    (stdout.await?, stderr)
                }
            };
            if stdout.len() > limit || stderr.len() > limit {
                let _ = child.start_kill();
            }

            let status = child.wait().await?;
            check_output(&invocation, status, stdout, stderr, limit)
        })
    }
}

fn join_reader(
    handle: std::thread::ScopedJoinHandle<'_, io::Result<Vec<u8>>>,
) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(read) => Ok(read?),
        Err(_) => Err(PackError::Io(io::Error::other("output reader panicked"))),
    }
}


#[cfg(all(test, windows))]
mod windows_tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_shell_lines_are_rejected() {
        let invocation = Invocation {
            program: "zip".to_string(),
            args: vec!["-r".to_string(), "a.zip".to_string(), "a".to_string()],
            working_dir: None,
            shape: InvocationShape::Shell,
        };
        assert_matches!(
            ProcessExecutor.run_blocking(&invocation, &ExecOptions::default()),
            Err(PackError::ShellUnavailable { .. })
        );
    }
}
