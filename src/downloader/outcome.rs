use std::fmt;

/// How one platform's fetch-and-verify sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success { checksum: String, filename: String },
    FetchFailed { reason: String },
    ChecksumMismatch { expected: String, actual: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub platform: String,
    pub status: OutcomeStatus,
}

impl DownloadOutcome {
    pub fn success(platform: &str, checksum: String, filename: String) -> Self {
        DownloadOutcome {
            platform: platform.to_string(),
            status: OutcomeStatus::Success { checksum, filename },
        }
    }

    pub fn fetch_failed(platform: &str, reason: impl Into<String>) -> Self {
        DownloadOutcome {
            platform: platform.to_string(),
            status: OutcomeStatus::FetchFailed {
                reason: reason.into(),
            },
        }
    }

    pub fn checksum_mismatch(platform: &str, expected: String, actual: String) -> Self {
        DownloadOutcome {
            platform: platform.to_string(),
            status: OutcomeStatus::ChecksumMismatch { expected, actual },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }

    /// `"<hex>  <filename>"`, the sha256sum listing format.
    pub fn checksum_line(&self) -> Option<String> {
        match &self.status {
            OutcomeStatus::Success { checksum, filename } => {
                Some(format!("{}  {}", checksum, filename))
            }
            _ => None,
        }
    }

    pub fn detail(&self) -> String {
        match &self.status {
            OutcomeStatus::Success { .. } => self.checksum_line().unwrap_or_default(),
            OutcomeStatus::FetchFailed { reason } => format!("download failed: {}", reason),
            OutcomeStatus::ChecksumMismatch { expected, actual } => {
                format!("checksum mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.platform, self.detail())
    }
}

/// Every outcome of a run, sorted by platform key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    pub outcomes: Vec<DownloadOutcome>,
    pub success_count: usize,
    pub total_count: usize,
}

impl AggregateResult {
    pub fn from_outcomes(mut outcomes: Vec<DownloadOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.platform.cmp(&b.platform));
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        let total_count = outcomes.len();
        AggregateResult {
            outcomes,
            success_count,
            total_count,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success_count == self.total_count
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// One line per verified artifact, in platform-key order.
    pub fn checksum_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(DownloadOutcome::checksum_line)
            .collect()
    }
}
