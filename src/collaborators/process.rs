//! Subprocess helpers shared by the collaborator implementations.

use std::io;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Build a command from a shell-style command line such as `"python detect.py -v"`.
pub(super) fn command_from_line(line: &str) -> io::Result<Command> {
    let parts = shlex::split(line).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unparsable command line: {}", line),
        )
    })?;
    let (program, args) = parts.split_first().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Empty command line".to_string())
    })?;
    let mut command = Command::new(program);
    command.args(args);
    Ok(command)
}

/// Run `command` to completion, capturing stdout and stderr.
pub(super) async fn run(mut command: Command) -> io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
}

/// Run `command` with `input` written to its stdin, capturing stdout and stderr.
///
/// Stdin is fed from a separate task so a program that streams its output while
/// reading cannot deadlock against us.
pub(super) async fn run_with_input(mut command: Command, input: Vec<u8>) -> io::Result<Output> {
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn()?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdin not captured"))?;

    let writer = tokio::spawn(async move {
        stdin.write_all(&input).await?;
        stdin.shutdown().await
    });

    let output = child.wait_with_output().await?;

    match writer.await {
        Ok(Ok(())) => {}
        // The program may exit without consuming all of its input.
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => return Err(e),
        Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e)),
    }

    Ok(output)
}
