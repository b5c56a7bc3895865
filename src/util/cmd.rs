use crate::display;
use crate::prelude::*;
use nu_ansi_term::{Color, Style};
use std::iter;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// If the CLI display string length exceeds this value, then the command
/// will be printed using multiline format.
const LONG_CMD_THRESHOLD: usize = 100;

/// The process exited with a non-zero status.
///
/// Displays as the captured `stderr` of the process, because that's what
/// the user needs to see to fix their input.
#[derive(Debug, thiserror::Error)]
#[error("{stderr}")]
pub(crate) struct ProcessFailure {
    pub(crate) program: String,
    pub(crate) status: ExitStatus,
    pub(crate) stderr: String,
}

impl ProcessFailure {
    fn new(program: &str, status: ExitStatus, stderr: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_owned();
        let stderr = if stderr.is_empty() {
            format!("Process `{program}` failed with {status}")
        } else {
            stderr
        };

        Self {
            program: program.to_owned(),
            status,
            stderr,
        }
    }
}

/// Runs the program to completion and returns its `stdout`.
///
/// The process is killed if the returned future is dropped or if it doesn't
/// finish within the `timeout`.
pub(crate) async fn run_cmd(
    program: &str,
    args: impl IntoIterator<Item = impl Into<String>>,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    let args: Vec<String> = args.into_iter().map(Into::into).collect();

    let cli = render_cli(program, args.iter().map(String::as_str));
    debug!("{cli}");

    let start = Instant::now();

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("couldn't spawn `{program}`"))?
        .wait_with_output();

    let output = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, output)
            .await
            .with_context(|| format!("Process `{program}` didn't finish within {timeout:?}"))?,
        None => output.await,
    };

    let output = output.context("couldn't run command")?;

    info!(
        status = %output.status,
        "⏱ `{program}` finished in {}",
        display::elapsed(start)
    );

    if !output.status.success() {
        return Err(ProcessFailure::new(program, output.status, &output.stderr).into());
    }

    Ok(output.stdout)
}

fn render_cli<'a>(
    program: &'a str,
    args: impl ExactSizeIterator<Item = &'a str> + Clone,
) -> String {
    let program = Color::Blue.paint(quote(program));

    let args = args.map(|arg| {
        let arg = quote(arg);
        if arg.starts_with('-') {
            Color::Blue.paint(arg)
        } else {
            Style::new().paint(arg)
        }
    });

    let parts = iter::once(program).chain(args);

    let compact = parts.clone().join(" ");
    if compact.len() <= LONG_CMD_THRESHOLD {
        return compact;
    }
    format!("(\n  {}\n)", { parts }.format("\n    "))
}

fn quote(arg: &str) -> String {
    // Only a nul byte makes quoting fail, and that can't reach a process anyway
    shlex::try_quote(arg)
        .map(Into::into)
        .unwrap_or_else(|_| format!("{arg:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};
    use lazy_regex::regex_replace_all;

    fn assert_render_cli(args: &[&str], expected: Expect) {
        let cli = render_cli("ffmpeg", args.iter().copied());
        let plain = regex_replace_all!(r"\x1b\[[0-9;]*m", &cli, |_| "");
        expected.assert_eq(&plain);
    }

    #[test]
    fn render_short_cli() {
        assert_render_cli(
            &["-y", "-i", "input_a b.mp4", "-an", "output_a b.mp4"],
            expect!["ffmpeg -y -i 'input_a b.mp4' -an 'output_a b.mp4'"],
        );
    }

    #[test]
    fn render_long_cli() {
        assert_render_cli(
            &[
                "-y",
                "-i",
                "/tmp/.cvXYZ/input_a_very_long_recording_name.ogg",
                "-vn",
                "/tmp/.cvXYZ/output_a_very_long_recording_name.ogg",
            ],
            expect![[r#"
                (
                  ffmpeg
                    -y
                    -i
                    /tmp/.cvXYZ/input_a_very_long_recording_name.ogg
                    -vn
                    /tmp/.cvXYZ/output_a_very_long_recording_name.ogg
                )"#]],
        );
    }

    #[cfg(unix)]
    #[test_log::test(tokio::test)]
    async fn captures_stdout_on_success() {
        let stdout = run_cmd("sh", ["-c", "echo hello"], None).await.unwrap();
        assert_eq!(stdout, b"hello\n");
    }

    #[cfg(unix)]
    #[test_log::test(tokio::test)]
    async fn failure_carries_stderr() {
        let err = run_cmd("sh", ["-c", "echo 'No such filter' >&2; exit 3"], None)
            .await
            .unwrap_err();

        let failure = err.downcast_ref::<ProcessFailure>().unwrap();

        assert_eq!(failure.program, "sh");
        assert_eq!(failure.status.code(), Some(3));
        assert_eq!(err.to_string(), "No such filter");
    }

    #[cfg(unix)]
    #[test_log::test(tokio::test)]
    async fn failure_without_stderr_mentions_status() {
        let err = run_cmd("sh", ["-c", "exit 1"], None).await.unwrap_err();

        expect!["Process `sh` failed with exit status: 1"].assert_eq(&err.to_string());
    }

    #[cfg(unix)]
    #[test_log::test(tokio::test)]
    async fn timeout_kills_the_process() {
        let err = run_cmd("sleep", ["5"], Some(Duration::from_millis(50)))
            .await
            .unwrap_err();

        expect!["Process `sleep` didn't finish within 50ms"].assert_eq(&err.to_string());
    }

    #[test_log::test(tokio::test)]
    async fn missing_program() {
        let err = run_cmd("cheesevideo-no-such-program", ["-version"], None)
            .await
            .unwrap_err();

        expect!["couldn't spawn `cheesevideo-no-such-program`"].assert_eq(&err.to_string());
    }
}
