use std::time::Duration;

use thiserror::Error;

/// Failures of a single probe invocation. They are logged and folded into
/// default capabilities, never returned to the assembler.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to start probe {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read probe output: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },
    #[error("probe exited with {status}")]
    Exit { status: std::process::ExitStatus },
    #[error("probe for {host} killed after {timeout:?}")]
    Timeout { host: String, timeout: Duration },
}

impl ProbeError {
    pub(crate) fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    pub(crate) fn output(source: std::io::Error) -> Self {
        Self::Output { source }
    }
}
