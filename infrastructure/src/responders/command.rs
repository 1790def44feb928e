//! Process-backed responder
//!
//! Runs a configured program once per request: the rendered prompt is
//! written to stdin and stdout becomes the statement. The orchestrator
//! bounds every call with its own timeout; dropping the future kills the
//! child.

use super::prompt::PromptTemplate;
use async_trait::async_trait;
use council_application::{ParticipantResponder, PromptContext, ResponderError, ResponderReply};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, warn};

/// Maximum reply size kept (256 KB)
const MAX_REPLY_SIZE: usize = 256 * 1024;

/// Maximum stderr kept for error messages (16 KB)
const MAX_STDERR_SIZE: usize = 16 * 1024;

/// Responder that runs an external command
#[derive(Debug, Clone)]
pub struct CommandResponder {
    program: String,
    args: Vec<String>,
    working_dir: Option<String>,
}

impl CommandResponder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<String>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, input: &str) -> Result<String, ResponderError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            ResponderError::Unavailable(format!("Failed to spawn {}: {}", self.program, e))
        })?;

        let (written, stdout, stderr) = tokio::join!(
            feed(child.stdin.take(), input),
            read_capped(child.stdout.take(), MAX_REPLY_SIZE, false),
            read_capped(child.stderr.take(), MAX_STDERR_SIZE, true),
        );
        let failed = |what: &str, e: std::io::Error| {
            ResponderError::RequestFailed(format!("Failed to {} {}: {}", what, self.program, e))
        };
        written.map_err(|e| failed("write prompt to", e))?;
        let (stdout, overflow) = stdout.map_err(|e| failed("read output of", e))?;
        let (stderr, _) = stderr.map_err(|e| failed("read errors of", e))?;

        if overflow {
            // The child may still be blocked on its closed stdout
            if let Err(e) = child.start_kill() {
                debug!(program = %self.program, error = %e, "Responder already exited");
            }
        }
        let status = child.wait().await.map_err(|e| failed("wait for", e))?;

        if overflow {
            warn!(
                program = %self.program,
                limit = MAX_REPLY_SIZE,
                "Responder output truncated"
            );
        } else if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            warn!(
                program = %self.program,
                code = ?status.code(),
                "Responder command failed"
            );
            return Err(ResponderError::RequestFailed(format!(
                "{} exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            )));
        }

        let mut stdout = String::from_utf8_lossy(&stdout).into_owned();
        if stdout.len() > MAX_REPLY_SIZE {
            let mut cut = MAX_REPLY_SIZE;
            while !stdout.is_char_boundary(cut) {
                cut -= 1;
            }
            stdout.truncate(cut);
        }
        Ok(stdout.trim().to_string())
    }
}

/// Write the prompt and close stdin. A child that exits without reading
/// its input is not an error.
async fn feed(stdin: Option<ChildStdin>, input: &str) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input.as_bytes()).await {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("Responder closed stdin before reading the prompt");
            Ok(())
        }
        other => other,
    }
}

/// Read at most `cap` bytes, reporting whether there was more. With
/// `drain` the rest is discarded so the child never blocks on the pipe;
/// otherwise the pipe is closed early.
async fn read_capped<R: AsyncRead + Unpin>(
    reader: Option<R>,
    cap: usize,
    drain: bool,
) -> std::io::Result<(Vec<u8>, bool)> {
    let mut buf = Vec::new();
    let Some(mut reader) = reader else {
        return Ok((buf, false));
    };
    (&mut reader).take(cap as u64 + 1).read_to_end(&mut buf).await?;
    let overflow = buf.len() > cap;
    if overflow && drain {
        tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    }
    buf.truncate(cap);
    Ok((buf, overflow))
}

#[async_trait]
impl ParticipantResponder for CommandResponder {
    async fn respond(&self, context: &PromptContext) -> Result<ResponderReply, ResponderError> {
        let prompt = PromptTemplate::render(context);
        debug!(
            program = %self.program,
            kind = context.kind(),
            bytes = prompt.len(),
            "Running responder"
        );

        let statement = self.run(&prompt).await?;
        if statement.is_empty() {
            return Err(ResponderError::InvalidReply(format!(
                "{} produced no output",
                self.program
            )));
        }
        Ok(ResponderReply::text(statement))
    }
}
