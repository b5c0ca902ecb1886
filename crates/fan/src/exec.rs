//! Run a cached or downloaded executable in the foreground

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, instrument};

/// Exit code reported when the child ended without one
const EXIT_UNKNOWN: i32 = 1;

/// Spawn `executable` with `args`, sharing this process's stdio, and wait.
#[instrument(skip(args), fields(argc = args.len()))]
pub fn execute(executable: &Path, args: &[String]) -> io::Result<ExitStatus> {
    let status = Command::new(executable)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    debug!(%status, "Target exited");
    Ok(status)
}

/// Exit code to report for a finished child.
///
/// On unix a child killed by a signal maps to `128 + signal`, as shells do.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    EXIT_UNKNOWN
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_execute_reports_exit_code() {
        let status = execute(
            Path::new("/bin/sh"),
            &["-c".to_string(), "exit 7".to_string()],
        )
        .unwrap();
        assert_eq!(exit_code(status), 7);
    }

    #[test]
    fn test_execute_missing_binary_fails() {
        let err = execute(Path::new("/definitely/not/here"), &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_signal_exit_code() {
        // Raw wait status for "killed by SIGKILL".
        let status = ExitStatus::from_raw(9);
        assert_eq!(exit_code(status), 137);
    }
}
