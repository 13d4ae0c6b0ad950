//! Invocation engine
//!
//! Runs a rendered request to completion, or until the caller's
//! cancellation token fires or the deadline passes. Exactly one of output,
//! `Interrupted`, `TimedOut` or an execution error comes back; an
//! interrupted backend is killed and reaped before this returns, and
//! whatever it printed is discarded.
//!
//! Once cancellation or expiry has happened it wins, even if the backend
//! finished in the same instant.

use std::future::Future;
use std::io;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{DialogError, Result};
use crate::render::{Invocation, Request};

/// Exit status and captured streams of a backend run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// `None` when the process was ended by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    pub fn exited(code: i32, stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }
}

/// When to stop waiting on a backend.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    pub cancel: Option<CancellationToken>,
    pub deadline: Option<std::time::Instant>,
}

impl Interrupt {
    /// Resolves when the token is cancelled; never if there is none.
    pub(crate) async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }

    /// Resolves at the deadline; never if there is none.
    pub(crate) async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
            None => std::future::pending().await,
        }
    }

    /// The interruption that has already happened, if any. Cancellation is
    /// reported ahead of expiry.
    pub(crate) fn fired(&self) -> Option<DialogError> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            Some(DialogError::Interrupted)
        } else if self.deadline.is_some_and(|d| std::time::Instant::now() >= d) {
            Some(DialogError::TimedOut)
        } else {
            None
        }
    }
}

/// Run `request`, blocking the calling thread.
pub fn invoke(request: Request, interrupt: Interrupt) -> Result<RawOutput> {
    block_on(async move {
        match request {
            Request::Process(invocation) => run(invocation, &interrupt).await,
            #[cfg(windows)]
            Request::Native(native) => crate::native::invoke(native, &interrupt).await,
        }
    })?
}

/// Drive `future` on a private current-thread runtime. A caller already
/// inside a runtime gets a scoped thread, since runtimes do not nest.
pub(crate) fn block_on<F>(future: F) -> Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    let run = move || -> io::Result<F::Output> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(future))
    };

    if tokio::runtime::Handle::try_current().is_err() {
        return Ok(run()?);
    }

    std::thread::scope(|scope| {
        scope
            .spawn(run)
            .join()
            .map_err(|_| DialogError::Io(io::Error::other("dialog thread panicked")))?
            .map_err(DialogError::from)
    })
}

/// Spawn `invocation` and wait for it under `interrupt`.
pub async fn run(invocation: Invocation, interrupt: &Interrupt) -> Result<RawOutput> {
    if let Some(err) = interrupt.fired() {
        return Err(err);
    }

    let program = invocation.program.display().to_string();
    debug!(program = %program, args = ?invocation.args, "Spawning dialog backend");

    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(if invocation.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // the backend leads its own group; `terminate` signals all of it
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| DialogError::Spawn {
        program: program.clone(),
        source,
    })?;
    // taken now, `Child::id` is gone once the child has been reaped
    let group = child.id();

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let finished = {
        let work = async {
            let ((), status, out, err) = tokio::try_join!(
                feed(stdin, invocation.stdin.as_deref()),
                child.wait(),
                drain(stdout),
                drain(stderr),
            )?;
            Ok::<_, io::Error>(RawOutput {
                code: status.code(),
                stdout: out,
                stderr: err,
            })
        };
        tokio::pin!(work);

        tokio::select! {
            biased;
            _ = interrupt.cancelled() => Err(DialogError::Interrupted),
            _ = interrupt.expired() => Err(DialogError::TimedOut),
            res = &mut work => res.map_err(DialogError::from),
        }
    };

    match finished {
        Ok(output) => match interrupt.fired() {
            Some(err) => Err(err),
            None => {
                debug!(program = %program, code = ?output.code, "Dialog backend exited");
                Ok(output)
            }
        },
        Err(err) => {
            debug!(program = %program, "Stopping dialog backend: {}", err);
            terminate(&mut child, group, &program).await;
            Err(err)
        }
    }
}

async fn feed(stdin: Option<ChildStdin>, payload: Option<&str>) -> io::Result<()> {
    let (Some(mut stdin), Some(payload)) = (stdin, payload) else {
        return Ok(());
    };
    match stdin.write_all(payload.as_bytes()).await {
        // the backend quit without reading its input
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the backend and everything it started, then reap it.
async fn terminate(child: &mut Child, group: Option<u32>, program: &str) {
    #[cfg(unix)]
    if let Some(pgid) = group.and_then(|id| libc::pid_t::try_from(id).ok()) {
        // a negative pid addresses the whole group
        if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                warn!("Failed to signal process group of {}: {}", program, err);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = group;

    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    if let Err(e) = child.kill().await {
        warn!("Failed to terminate {}: {}", program, e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sh(script: &str) -> Invocation {
        Invocation {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            stdin: None,
        }
    }

    fn within(d: Duration) -> Interrupt {
        Interrupt {
            cancel: None,
            deadline: Some(std::time::Instant::now() + d),
        }
    }

    #[tokio::test]
    async fn test_captures_output_and_code() {
        let out = run(sh("printf 'a\\nb'; printf oops >&2; exit 3"), &Interrupt::default())
            .await
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, b"a\nb");
        assert_eq!(out.stderr, b"oops");
    }

    #[tokio::test]
    async fn test_stdin_is_fed_and_closed() {
        let mut invocation = sh("cat");
        invocation.stdin = Some("var data = {}\n".to_string());
        let out = run(invocation, &Interrupt::default()).await.unwrap();
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout, b"var data = {}\n");
    }

    #[tokio::test]
    async fn test_timeout_discards_partial_output() {
        let started = std::time::Instant::now();
        let err = run(sh("echo partial; exec sleep 30"), &within(Duration::from_millis(300)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts() {
        let token = CancellationToken::new();
        let interrupt = Interrupt {
            cancel: Some(token.clone()),
            deadline: None,
        };
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });
        let err = run(sh("exec sleep 30"), &interrupt).await.unwrap_err();
        assert!(matches!(err, DialogError::Interrupted));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_spawns() {
        let token = CancellationToken::new();
        token.cancel();
        let interrupt = Interrupt {
            cancel: Some(token),
            deadline: None,
        };
        let missing = Invocation {
            program: PathBuf::from("/nonexistent/helper"),
            args: vec![],
            stdin: None,
        };
        assert!(matches!(run(missing, &interrupt).await, Err(DialogError::Interrupted)));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let missing = Invocation {
            program: PathBuf::from("/nonexistent/helper"),
            args: vec![],
            stdin: None,
        };
        match run(missing, &Interrupt::default()).await {
            Err(DialogError::Spawn { program, .. }) => assert_eq!(program, "/nonexistent/helper"),
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[test]
    fn test_blocking_invoke_outside_runtime() {
        let out = invoke(Request::Process(sh("echo hi")), Interrupt::default()).unwrap();
        assert_eq!(out, RawOutput::exited(0, "hi\n"));
    }

    #[tokio::test]
    async fn test_blocking_invoke_inside_runtime() {
        let out = invoke(Request::Process(sh("echo hi")), Interrupt::default()).unwrap();
        assert_eq!(out.stdout, b"hi\n");
    }
}
