use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::{ProbeError, ProbeRun, parse_probe_output};

/// Hard wall-clock bound on one probe process.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the output line may trail the probe's exit.
const OUTPUT_DRAIN: Duration = Duration::from_millis(500);

/// Launch seam for the external capability probe.
pub trait ProbeRunner {
    fn run(&self, host: &str) -> impl Future<Output = ProbeRun> + Send;
}

/// Runs `<program> [args..] <host>` and parses its standard output.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ProbeRunner for CommandProbe {
    async fn run(&self, host: &str) -> ProbeRun {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .arg(host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                let err = ProbeError::spawn(self.program.display().to_string(), source);
                tracing::warn!(%host, error = %err, "probe not started");
                return ProbeRun::failed(err.to_string());
            }
        };

        // only the first line is parsed; a background child keeping the pipe
        // open must not hold the run past the probe's own exit
        let stdout = child.stdout.take();
        let reader_host = host.to_string();
        let mut reader = tokio::spawn(async move {
            let mut line = String::new();
            let Some(pipe) = stdout else {
                return line;
            };
            let mut pipe = BufReader::new(pipe);
            loop {
                line.clear();
                match pipe.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) if line.trim().is_empty() => continue,
                    Ok(_) => break,
                    Err(source) => {
                        tracing::warn!(host = %reader_host, error = %ProbeError::output(source), "probe output truncated");
                        break;
                    }
                }
            }
            line
        });

        let waited = tokio::time::timeout(self.timeout, child.wait()).await;

        match waited {
            Err(_elapsed) => {
                reader.abort();
                if let Err(err) = child.kill().await {
                    tracing::warn!(%host, error = %err, "failed to kill probe");
                }
                let err = ProbeError::Timeout {
                    host: host.to_string(),
                    timeout: self.timeout,
                };
                tracing::warn!(%host, "{err}");
                ProbeRun::timed_out()
            }
            Ok(status) => {
                match status {
                    Ok(status) if !status.success() => {
                        let err = ProbeError::Exit { status };
                        tracing::debug!(%host, error = %err, "probe finished with error");
                    }
                    Ok(_) => {}
                    Err(source) => {
                        tracing::debug!(%host, error = %ProbeError::output(source), "probe wait failed");
                    }
                }
                let line = match tokio::time::timeout(OUTPUT_DRAIN, &mut reader).await {
                    Ok(Ok(line)) => line,
                    _ => {
                        reader.abort();
                        tracing::debug!(%host, "probe exited without a complete output line");
                        String::new()
                    }
                };
                ProbeRun::completed(parse_probe_output(&line))
            }
        }
    }
}
