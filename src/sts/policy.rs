use std::fmt;

/// `mode` field of an MTA-STS policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StsMode {
    Enforce,
    Testing,
    None,
}

impl StsMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "enforce" => Some(Self::Enforce),
            "testing" => Some(Self::Testing),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enforce => "enforce",
            Self::Testing => "testing",
            Self::None => "none",
        }
    }
}

impl fmt::Display for StsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StsPolicyIssue {
    UnsupportedVersion(String),
    UnsupportedMode(String),
    MissingMode,
    MissingMx,
}

impl fmt::Display for StsPolicyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion(version) => write!(f, "unsupported version {version:?}"),
            Self::UnsupportedMode(mode) => write!(f, "unsupported mode {mode:?}"),
            Self::MissingMode => f.write_str("no 'mode' entry"),
            Self::MissingMx => f.write_str("no 'mx' entries"),
        }
    }
}

/// Key/value view over the fetched document lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StsPolicyDocument {
    pub mode: StsMode,
    pub max_age: Option<u64>,
    pub mx: Vec<String>,
}

impl StsPolicyDocument {
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, StsPolicyIssue> {
        let mut mode = None;
        let mut max_age = None;
        let mut mx = Vec::new();

        for line in lines {
            let Some((key, value)) = line.as_ref().split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "version" => {
                    if !value.eq_ignore_ascii_case("STSv1") {
                        return Err(StsPolicyIssue::UnsupportedVersion(value.to_string()));
                    }
                }
                "mode" => {
                    mode = Some(
                        StsMode::parse(value)
                            .ok_or_else(|| StsPolicyIssue::UnsupportedMode(value.to_string()))?,
                    );
                }
                "max_age" => max_age = value.parse().ok(),
                "mx" if !value.is_empty() => mx.push(value.to_ascii_lowercase()),
                _ => (),
            }
        }

        let mode = mode.ok_or(StsPolicyIssue::MissingMode)?;
        if mx.is_empty() && mode != StsMode::None {
            return Err(StsPolicyIssue::MissingMx);
        }
        Ok(Self { mode, max_age, mx })
    }
}
