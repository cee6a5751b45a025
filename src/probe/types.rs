/// Transport capabilities observed on a mail exchange.
///
/// Every flag defaults to `false` and the certificate to empty, which is
/// also what an unfinished or unparseable probe leaves behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub starttls: bool,
    pub requiretls: bool,
    pub blocktls: bool,
    pub cert: String,
}

/// How a probe invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The process exited; its output was parsed, whatever the exit status.
    Completed,
    /// The process could not be started or its output could not be read.
    Failed(String),
    /// The process overran the timeout and was killed.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRun {
    pub outcome: ProbeOutcome,
    pub capabilities: Capabilities,
}

impl ProbeRun {
    pub fn completed(capabilities: Capabilities) -> Self {
        Self {
            outcome: ProbeOutcome::Completed,
            capabilities,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            outcome: ProbeOutcome::Failed(reason.into()),
            capabilities: Capabilities::default(),
        }
    }

    pub fn timed_out() -> Self {
        Self {
            outcome: ProbeOutcome::TimedOut,
            capabilities: Capabilities::default(),
        }
    }
}
