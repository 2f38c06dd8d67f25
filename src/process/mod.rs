//! Subprocess execution for compiler, linker and program runs.
//!
//! Compiles run in parallel and have their output captured and replayed as a
//! whole; the link step streams; program runs inherit the terminal.

mod streaming;

use camino::Utf8PathBuf;
use std::{
    io::{self, BufReader},
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
};
use streaming::{Forwarded, forward_child_output, replay_captured};
use tracing::info;

fn log_command_execution(cmd: &Command) {
    let program_path = PathBuf::from(cmd.get_program());
    let program_display = Utf8PathBuf::from_path_buf(program_path.clone()).map_or_else(
        |_| program_path.to_string_lossy().into_owned(),
        Utf8PathBuf::into_string,
    );
    let args: Vec<String> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    info!("Running command: {} {}", program_display, args.join(" "));
}

/// Run `cmd`, streaming its stdout and stderr to ours as they arrive.
///
/// # Errors
///
/// Returns an [`io::Error`] if the process cannot be spawned or awaited.
pub fn run_streaming(cmd: &mut Command) -> io::Result<ExitStatus> {
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    log_command_execution(cmd);
    let child = cmd.spawn()?;
    spawn_and_stream_output(child)
}

/// Run `cmd` to completion, then replay its output in one piece.
///
/// # Errors
///
/// Returns an [`io::Error`] if the process cannot be spawned or awaited.
pub fn run_captured(cmd: &mut Command) -> io::Result<ExitStatus> {
    cmd.stdin(Stdio::null());
    log_command_execution(cmd);
    let output = cmd.output()?;
    replay_captured(&output.stdout, io::stdout().lock(), "stdout");
    replay_captured(&output.stderr, io::stderr().lock(), "stderr");
    Ok(output.status)
}

/// Run `cmd` attached to this process's terminal.
///
/// # Errors
///
/// Returns an [`io::Error`] if the process cannot be spawned or awaited.
pub fn run_interactive(cmd: &mut Command) -> io::Result<ExitStatus> {
    log_command_execution(cmd);
    cmd.status()
}

fn handle_forwarding_thread_result(result: thread::Result<Forwarded>, stream_name: &str) {
    match result {
        Ok(Forwarded::Complete) => {}
        Ok(Forwarded::Truncated) => {
            tracing::debug!("{stream_name} forwarding encountered closed pipe; output truncated");
        }
        Err(err) => {
            tracing::warn!("{stream_name} forwarding thread panicked: {err:?}");
        }
    }
}

fn spawn_and_stream_output(mut child: Child) -> io::Result<ExitStatus> {
    let Some(stdout) = child.stdout.take() else {
        terminate_child(&mut child, "stdout pipe unavailable");
        return Err(io::Error::other("child process missing stdout pipe"));
    };
    let Some(stderr) = child.stderr.take() else {
        terminate_child(&mut child, "stderr pipe unavailable");
        return Err(io::Error::other("child process missing stderr pipe"));
    };

    let out_handle = thread::spawn(move || {
        let mut lock = io::stdout().lock();
        forward_child_output(BufReader::new(stdout), &mut lock, "stdout")
    });
    let err_handle = thread::spawn(move || {
        let mut lock = io::stderr().lock();
        forward_child_output(BufReader::new(stderr), &mut lock, "stderr")
    });

    let status = child.wait()?;
    handle_forwarding_thread_result(out_handle.join(), "stdout");
    handle_forwarding_thread_result(err_handle.join(), "stderr");
    Ok(status)
}

fn terminate_child(child: &mut Child, context: &str) {
    if let Err(err) = child.kill() {
        tracing::debug!("failed to kill child after {context}: {err}");
    }
    if let Err(err) = child.wait() {
        tracing::debug!("failed to reap child after {context}: {err}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captured_run_reports_exit_status() {
        let status = run_captured(Command::new("sh").args(["-c", "exit 3"])).expect("spawn sh");
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn streaming_run_reports_success() {
        let status =
            run_streaming(Command::new("sh").args(["-c", "echo linked"])).expect("spawn sh");
        assert!(status.success());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let err = run_captured(&mut Command::new("rivet-no-such-compiler"))
            .expect_err("missing program");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
